//! Interview domain types: the setup configuration and the persisted record.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Allowed question counts for a session setup.
pub const QUESTION_COUNTS: [u8; 4] = [3, 5, 7, 10];

/// Experience bracket selected during setup. Wire format matches the
/// original form values ("0-1", "1-3", "3-5", "5+").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperienceLevel {
    #[serde(rename = "0-1")]
    Entry,
    #[serde(rename = "1-3")]
    Early,
    #[serde(rename = "3-5")]
    Mid,
    #[serde(rename = "5+")]
    Senior,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "0-1",
            ExperienceLevel::Early => "1-3",
            ExperienceLevel::Mid => "3-5",
            ExperienceLevel::Senior => "5+",
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExperienceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0-1" => Ok(ExperienceLevel::Entry),
            "1-3" => Ok(ExperienceLevel::Early),
            "3-5" => Ok(ExperienceLevel::Mid),
            "5+" => Ok(ExperienceLevel::Senior),
            other => Err(format!(
                "'{other}' is not a valid experience bracket (expected 0-1, 1-3, 3-5 or 5+)"
            )),
        }
    }
}

/// Immutable interview setup. Built once from the setup request, validated,
/// then embedded verbatim into the persisted record at session end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewConfig {
    pub role: String,
    pub description: String,
    pub experience: ExperienceLevel,
    pub skills: Vec<String>,
    pub question_count: u8,
}

impl InterviewConfig {
    /// Validates and normalizes raw setup input. `skills` arrives as the
    /// comma-separated text the setup form collects.
    pub fn new(
        role: &str,
        description: &str,
        experience: ExperienceLevel,
        skills: &str,
        question_count: u8,
    ) -> Result<Self, String> {
        let role = role.trim();
        if role.is_empty() {
            return Err("role is required".to_string());
        }

        let skills = parse_skills(skills);
        if skills.is_empty() {
            return Err("at least one skill is required".to_string());
        }

        if !QUESTION_COUNTS.contains(&question_count) {
            return Err(format!(
                "questionCount must be one of {QUESTION_COUNTS:?}, got {question_count}"
            ));
        }

        Ok(InterviewConfig {
            role: role.to_string(),
            description: description.trim().to_string(),
            experience,
            skills,
            question_count,
        })
    }

    /// Comma-joined skills, for prompt embedding and fallback templating.
    pub fn skills_joined(&self) -> String {
        self.skills.join(", ")
    }
}

/// Splits comma-separated skill text, trimming whitespace and dropping empties.
pub fn parse_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// A persisted interview record. Read-only once written; retrievable only by
/// its owning user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub description: String,
    pub experience: String,
    pub skills: Vec<String>,
    pub questions: Vec<String>,
    pub answers: Vec<String>,
    /// The embedded `FeedbackReport`, stored as JSONB.
    pub feedback: Value,
    pub persona: String,
    pub overall_score: i32,
    pub duration_minutes: i32,
    pub created_at: DateTime<Utc>,
}
