//! Feedback Generator — scores the completed interview.
//!
//! Same best-effort contract as question generation: the caller always gets a
//! `FeedbackReport` whose per-question list is index-aligned with the question
//! set and whose scores are integers in [0, 100]. Model failures and
//! malformed output are masked by a fixed neutral report.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::interview::prompts::{FEEDBACK_PROMPT_TEMPLATE, FEEDBACK_SYSTEM};
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{extract_json_object, TextGenerator};
use crate::models::interview::InterviewConfig;

/// Score used for every entry of the neutral fallback report.
pub const FALLBACK_SCORE: i32 = 70;

/// Per-question scoring detail. Wire names match the persisted layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionFeedback {
    pub question: String,
    pub answer: String,
    pub feedback: String,
    pub score: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallFeedback {
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    #[serde(rename = "overallScore")]
    pub overall_score: i32,
}

/// The complete feedback report embedded into the interview record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackReport {
    #[serde(rename = "questionFeedback")]
    pub question_feedback: Vec<QuestionFeedback>,
    #[serde(rename = "overallFeedback")]
    pub overall_feedback: OverallFeedback,
}

/// Generates the feedback report for a finished session. Infallible.
///
/// `questions` and `answers` must be index-aligned; empty answer strings mean
/// the candidate did not respond to that question.
pub async fn generate_feedback(
    generator: &dyn TextGenerator,
    config: &InterviewConfig,
    questions: &[String],
    answers: &[String],
) -> FeedbackReport {
    let prompt = FEEDBACK_PROMPT_TEMPLATE
        .replace("{role}", &config.role)
        .replace("{experience}", config.experience.as_str())
        .replace("{skills}", &config.skills_joined())
        .replace("{qa_pairs}", &format_qa_pairs(questions, answers));

    let system = format!("{FEEDBACK_SYSTEM} {JSON_ONLY_SYSTEM}");

    match generator.generate(&prompt, &system).await {
        Ok(raw) => parse_feedback(&raw, questions, answers).unwrap_or_else(|| {
            warn!("Feedback generation returned unusable output, using fallback");
            fallback_feedback(questions, answers)
        }),
        Err(e) => {
            warn!("Feedback generation failed ({e}), using fallback");
            fallback_feedback(questions, answers)
        }
    }
}

fn format_qa_pairs(questions: &[String], answers: &[String]) -> String {
    questions
        .iter()
        .enumerate()
        .map(|(i, q)| {
            let answer = answers.get(i).map(String::as_str).unwrap_or("");
            format!("Q{n}: {q}\nA{n}: {answer}", n = i + 1)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Salvages a report from raw model output and normalizes it so the
/// length and score invariants hold regardless of what the model produced.
fn parse_feedback(raw: &str, questions: &[String], answers: &[String]) -> Option<FeedbackReport> {
    let json = extract_json_object(raw)?;
    let mut report: FeedbackReport = serde_json::from_str(json).ok()?;
    normalize(&mut report, questions, answers);
    Some(report)
}

/// Clamps all scores into [0, 100] and realigns `questionFeedback` with the
/// question set: extra entries are dropped, missing ones padded with neutral
/// entries, and question/answer text is restored from the authoritative
/// transcript (models routinely paraphrase it).
fn normalize(report: &mut FeedbackReport, questions: &[String], answers: &[String]) {
    report.question_feedback.truncate(questions.len());

    for (i, question) in questions.iter().enumerate() {
        let answer = displayed_answer(answers, i);
        if i < report.question_feedback.len() {
            let entry = &mut report.question_feedback[i];
            entry.question = question.clone();
            entry.answer = answer;
            entry.score = entry.score.clamp(0, 100);
        } else {
            report.question_feedback.push(neutral_entry(question, answer));
        }
    }

    let overall = &mut report.overall_feedback;
    overall.overall_score = overall.overall_score.clamp(0, 100);
    if overall.strengths.is_empty() {
        overall.strengths.push("Good effort".to_string());
    }
    if overall.improvements.is_empty() {
        overall.improvements.push("More practice needed".to_string());
    }
}

/// The fixed neutral report: every question scored 70 with generic feedback,
/// overall 70 with one generic strength and one generic improvement.
pub fn fallback_feedback(questions: &[String], answers: &[String]) -> FeedbackReport {
    FeedbackReport {
        question_feedback: questions
            .iter()
            .enumerate()
            .map(|(i, q)| neutral_entry(q, displayed_answer(answers, i)))
            .collect(),
        overall_feedback: OverallFeedback {
            strengths: vec!["Good effort".to_string()],
            improvements: vec!["More practice needed".to_string()],
            overall_score: FALLBACK_SCORE,
        },
    }
}

fn neutral_entry(question: &str, answer: String) -> QuestionFeedback {
    QuestionFeedback {
        question: question.to_string(),
        answer,
        feedback: "Standard feedback".to_string(),
        score: FALLBACK_SCORE,
    }
}

fn displayed_answer(answers: &[String], i: usize) -> String {
    match answers.get(i) {
        Some(a) if !a.trim().is_empty() => a.clone(),
        _ => "No answer".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use crate::models::interview::ExperienceLevel;
    use async_trait::async_trait;

    struct CannedGenerator(String);

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
            Ok(self.0.clone())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
            Err(LlmError::Api {
                status: 500,
                message: "overloaded".to_string(),
            })
        }
    }

    fn config() -> InterviewConfig {
        InterviewConfig::new(
            "Backend Engineer",
            "",
            ExperienceLevel::Early,
            "Go,SQL",
            3,
        )
        .unwrap()
    }

    fn questions() -> Vec<String> {
        vec!["Q1?".to_string(), "Q2?".to_string(), "Q3?".to_string()]
    }

    fn answers() -> Vec<String> {
        vec!["A1".to_string(), "A2".to_string(), "A3".to_string()]
    }

    fn valid_report_json() -> String {
        serde_json::json!({
            "questionFeedback": [
                {"question": "Q1?", "answer": "A1", "feedback": "Solid.", "score": 85},
                {"question": "Q2?", "answer": "A2", "feedback": "Vague.", "score": 55},
                {"question": "Q3?", "answer": "A3", "feedback": "Good depth.", "score": 78}
            ],
            "overallFeedback": {
                "strengths": ["Clear communication"],
                "improvements": ["Quantify impact"],
                "overallScore": 72
            }
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_parses_valid_report() {
        let generator = CannedGenerator(valid_report_json());
        let report = generate_feedback(&generator, &config(), &questions(), &answers()).await;
        assert_eq!(report.question_feedback.len(), 3);
        assert_eq!(report.question_feedback[0].score, 85);
        assert_eq!(report.overall_feedback.overall_score, 72);
    }

    #[tokio::test]
    async fn test_parses_report_wrapped_in_prose_and_fences() {
        let generator = CannedGenerator(format!(
            "Here is your feedback:\n```json\n{}\n```",
            valid_report_json()
        ));
        let report = generate_feedback(&generator, &config(), &questions(), &answers()).await;
        assert_eq!(report.question_feedback.len(), 3);
    }

    #[tokio::test]
    async fn test_failed_call_yields_neutral_report() {
        let report = generate_feedback(&FailingGenerator, &config(), &questions(), &answers()).await;
        assert_eq!(report.overall_feedback.overall_score, FALLBACK_SCORE);
        assert!(report
            .question_feedback
            .iter()
            .all(|qf| qf.score == FALLBACK_SCORE));
        assert_eq!(report.question_feedback.len(), 3);
    }

    #[tokio::test]
    async fn test_non_json_output_yields_neutral_report() {
        let generator = CannedGenerator("You did great, around a 90 I'd say!".to_string());
        let report = generate_feedback(&generator, &config(), &questions(), &answers()).await;
        assert_eq!(report.overall_feedback.overall_score, FALLBACK_SCORE);
    }

    #[tokio::test]
    async fn test_out_of_range_scores_are_clamped() {
        let generator = CannedGenerator(
            serde_json::json!({
                "questionFeedback": [
                    {"question": "Q1?", "answer": "A1", "feedback": "f", "score": 150},
                    {"question": "Q2?", "answer": "A2", "feedback": "f", "score": -20},
                    {"question": "Q3?", "answer": "A3", "feedback": "f", "score": 50}
                ],
                "overallFeedback": {
                    "strengths": ["s"],
                    "improvements": ["i"],
                    "overallScore": 999
                }
            })
            .to_string(),
        );
        let report = generate_feedback(&generator, &config(), &questions(), &answers()).await;
        assert_eq!(report.question_feedback[0].score, 100);
        assert_eq!(report.question_feedback[1].score, 0);
        assert_eq!(report.overall_feedback.overall_score, 100);
    }

    #[tokio::test]
    async fn test_misaligned_report_is_realigned() {
        // Model returned only one entry for a three-question interview
        let generator = CannedGenerator(
            serde_json::json!({
                "questionFeedback": [
                    {"question": "paraphrased", "answer": "paraphrased", "feedback": "f", "score": 80}
                ],
                "overallFeedback": {"strengths": [], "improvements": [], "overallScore": 60}
            })
            .to_string(),
        );
        let report = generate_feedback(&generator, &config(), &questions(), &answers()).await;
        assert_eq!(report.question_feedback.len(), 3);
        // Question text restored from the authoritative transcript
        assert_eq!(report.question_feedback[0].question, "Q1?");
        assert_eq!(report.question_feedback[2].score, FALLBACK_SCORE);
        // Empty strength/improvement lists are backfilled
        assert_eq!(report.overall_feedback.strengths.len(), 1);
        assert_eq!(report.overall_feedback.improvements.len(), 1);
    }

    #[tokio::test]
    async fn test_all_empty_answers_still_produce_valid_report() {
        let empty = vec![String::new(), String::new(), String::new()];
        let report = generate_feedback(&FailingGenerator, &config(), &questions(), &empty).await;
        assert_eq!(report.question_feedback.len(), 3);
        assert!(report
            .question_feedback
            .iter()
            .all(|qf| qf.answer == "No answer"));
        assert!(report
            .question_feedback
            .iter()
            .all(|qf| (0..=100).contains(&qf.score)));
    }

    #[test]
    fn test_report_serializes_with_camel_case_wire_names() {
        let report = fallback_feedback(&questions(), &answers());
        let value = serde_json::to_value(&report).unwrap();
        assert!(value.get("questionFeedback").is_some());
        assert!(value["overallFeedback"].get("overallScore").is_some());
    }
}
