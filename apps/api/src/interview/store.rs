//! Result Persister and interview queries.
//!
//! Owner scoping lives in the SQL predicate (`WHERE ... AND user_id = $n`),
//! never in post-fetch filtering, so a record owned by another user is
//! indistinguishable from an absent one.

use anyhow::Context;
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::feedback::FeedbackReport;
use crate::interview::persona::Persona;
use crate::models::interview::{InterviewConfig, InterviewRow};

/// Default and maximum page sizes for the owner's interview list.
const DEFAULT_LIST_LIMIT: i64 = 20;
const MAX_LIST_LIMIT: i64 = 100;

/// A completed interview ready to persist.
#[derive(Debug, Clone)]
pub struct InterviewDraft {
    pub config: InterviewConfig,
    pub persona: Persona,
    pub questions: Vec<String>,
    pub answers: Vec<String>,
    pub feedback: FeedbackReport,
    pub duration_minutes: i64,
}

impl InterviewDraft {
    /// Rejects partial records before any write: missing questions, missing
    /// feedback entries, or misaligned arrays.
    pub fn validate(&self) -> Result<(), String> {
        if self.questions.is_empty() {
            return Err("questions are required".to_string());
        }
        if self.answers.len() != self.questions.len() {
            return Err(format!(
                "answers length {} does not match questions length {}",
                self.answers.len(),
                self.questions.len()
            ));
        }
        if self.feedback.question_feedback.len() != self.questions.len() {
            return Err(format!(
                "feedback entries {} do not match questions length {}",
                self.feedback.question_feedback.len(),
                self.questions.len()
            ));
        }
        Ok(())
    }
}

/// Persists a completed interview on behalf of `user_id`. Returns the
/// generated record id.
pub async fn save_interview(
    pool: &PgPool,
    user_id: Uuid,
    draft: &InterviewDraft,
) -> Result<Uuid, AppError> {
    draft.validate().map_err(AppError::Validation)?;

    let id = Uuid::new_v4();
    let feedback = serde_json::to_value(&draft.feedback)
        .context("failed to serialize feedback report")?;

    sqlx::query(
        r#"
        INSERT INTO interviews
            (id, user_id, role, description, experience, skills, questions,
             answers, feedback, persona, overall_score, duration_minutes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(&draft.config.role)
    .bind(&draft.config.description)
    .bind(draft.config.experience.as_str())
    .bind(&draft.config.skills)
    .bind(&draft.questions)
    .bind(&draft.answers)
    .bind(feedback)
    .bind(draft.persona.as_str())
    .bind(draft.feedback.overall_feedback.overall_score)
    .bind(draft.duration_minutes as i32)
    .execute(pool)
    .await?;

    info!("Saved interview {id} for user {user_id}");
    Ok(id)
}

/// Fetches a single interview scoped to its owner.
pub async fn fetch_interview(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<InterviewRow, AppError> {
    sqlx::query_as::<_, InterviewRow>(
        "SELECT * FROM interviews WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Interview {id} not found")))
}

/// Lists the owner's interviews, newest first.
pub async fn list_interviews(
    pool: &PgPool,
    user_id: Uuid,
    limit: Option<i64>,
) -> Result<Vec<InterviewRow>, AppError> {
    let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);

    let rows = sqlx::query_as::<_, InterviewRow>(
        "SELECT * FROM interviews WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Dashboard headline numbers for the owner.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub total_interviews: i64,
    pub average_score: Option<f64>,
    pub latest_score: Option<i32>,
}

pub async fn dashboard_summary(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<DashboardSummary, AppError> {
    let (total, average): (i64, Option<f64>) = sqlx::query_as(
        "SELECT COUNT(*), AVG(overall_score)::float8 FROM interviews WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let latest: Option<i32> = sqlx::query_scalar(
        "SELECT overall_score FROM interviews WHERE user_id = $1
         ORDER BY created_at DESC LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(DashboardSummary {
        total_interviews: total,
        average_score: average,
        latest_score: latest,
    })
}
