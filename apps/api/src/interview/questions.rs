//! Question Generator — produces the ordered question list for a session.
//!
//! Best-effort by contract: the caller never observes an error, only a
//! (possibly generic) list of exactly `question_count` questions. Any model
//! failure or unusable output is masked by the role/skill-templated fallback.

use tracing::warn;

use crate::interview::prompts::{QUESTION_PROMPT_TEMPLATE, QUESTION_SYSTEM};
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{extract_json_array, TextGenerator};
use crate::models::interview::InterviewConfig;

/// Generates the question list for a configured session. Infallible.
pub async fn generate_questions(
    generator: &dyn TextGenerator,
    config: &InterviewConfig,
) -> Vec<String> {
    let prompt = QUESTION_PROMPT_TEMPLATE
        .replace("{question_count}", &config.question_count.to_string())
        .replace("{role}", &config.role)
        .replace("{experience}", config.experience.as_str())
        .replace("{skills}", &config.skills_joined())
        .replace("{description}", &config.description);

    let count = config.question_count as usize;
    let system = format!("{QUESTION_SYSTEM} {JSON_ONLY_SYSTEM}");

    match generator.generate(&prompt, &system).await {
        Ok(raw) => parse_questions(&raw, count).unwrap_or_else(|| {
            warn!("Question generation returned unusable output, using fallback");
            fallback_questions(&config.role, &config.skills, count)
        }),
        Err(e) => {
            warn!("Question generation failed ({e}), using fallback");
            fallback_questions(&config.role, &config.skills, count)
        }
    }
}

/// Salvages a question list from raw model output. Returns `None` when the
/// output yields fewer than `count` usable questions.
fn parse_questions(raw: &str, count: usize) -> Option<Vec<String>> {
    let json = extract_json_array(raw)?;
    let parsed: Vec<String> = serde_json::from_str(json).ok()?;

    let questions: Vec<String> = parsed
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .take(count)
        .collect();

    (questions.len() == count).then_some(questions)
}

/// Fixed fallback list seeded from the role and skills, truncated to exactly
/// `count` entries. The template pool always covers the largest allowed count.
pub fn fallback_questions(role: &str, skills: &[String], count: usize) -> Vec<String> {
    let mut pool = vec![format!("Tell me about your experience as a {role}.")];

    for skill in skills {
        pool.push(format!(
            "What are your strengths with {skill}, and how have you applied them?"
        ));
    }

    pool.extend(
        [
            "Describe a challenging problem you faced in this field and how you approached it."
                .to_string(),
            format!("Why are you interested in this {role} position?"),
            "Where do you see yourself in five years?".to_string(),
            "Tell me about a time you received difficult feedback and what you did with it."
                .to_string(),
            "How do you keep your skills current in this field?".to_string(),
            "What accomplishment are you most proud of, and what was your role in it?".to_string(),
            "How do you prioritize your work when everything feels urgent?".to_string(),
        ]
        .into_iter(),
    );

    for skill in skills {
        pool.push(format!("Walk me through a recent project where you used {skill}."));
    }

    pool.truncate(count);
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use crate::models::interview::ExperienceLevel;
    use async_trait::async_trait;

    struct CannedGenerator(&'static str);

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
            Err(LlmError::EmptyContent)
        }
    }

    fn config(count: u8) -> InterviewConfig {
        InterviewConfig::new(
            "Backend Engineer",
            "Builds APIs",
            ExperienceLevel::Early,
            "Go,SQL",
            count,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_parses_clean_json_array() {
        let generator =
            CannedGenerator(r#"["What is an index?", "Explain goroutines.", "Describe ACID."]"#);
        let questions = generate_questions(&generator, &config(3)).await;
        assert_eq!(questions.len(), 3);
        assert_eq!(questions[0], "What is an index?");
    }

    #[tokio::test]
    async fn test_parses_array_embedded_in_prose_and_fences() {
        let generator = CannedGenerator(
            "Here you go:\n```json\n[\"Q1?\", \"Q2?\", \"Q3?\", \"Q4?\", \"Q5?\"]\n```\nGood luck!",
        );
        let questions = generate_questions(&generator, &config(5)).await;
        assert_eq!(questions.len(), 5);
        assert_eq!(questions[4], "Q5?");
    }

    #[tokio::test]
    async fn test_truncates_overlong_model_output() {
        let generator = CannedGenerator(r#"["Q1?", "Q2?", "Q3?", "Q4?"]"#);
        let questions = generate_questions(&generator, &config(3)).await;
        assert_eq!(questions.len(), 3);
    }

    #[tokio::test]
    async fn test_short_array_falls_back() {
        let generator = CannedGenerator(r#"["only one question"]"#);
        let questions = generate_questions(&generator, &config(5)).await;
        assert_eq!(questions.len(), 5);
        // Fallback is seeded from the role
        assert!(questions[0].contains("Backend Engineer"));
    }

    #[tokio::test]
    async fn test_non_json_output_falls_back() {
        let generator = CannedGenerator("I'm sorry, I can't help with that.");
        let questions = generate_questions(&generator, &config(3)).await;
        assert_eq!(questions.len(), 3);
    }

    #[tokio::test]
    async fn test_failed_call_yields_exact_count_for_all_valid_counts() {
        for count in crate::models::interview::QUESTION_COUNTS {
            let questions = generate_questions(&FailingGenerator, &config(count)).await;
            assert_eq!(questions.len(), count as usize);
            assert!(questions.iter().all(|q| !q.is_empty()));
        }
    }

    #[tokio::test]
    async fn test_fallback_is_seeded_from_role_and_skills() {
        let questions = generate_questions(&FailingGenerator, &config(3)).await;
        assert!(questions[0].contains("Backend Engineer"));
        assert!(questions[1].contains("Go"));
        assert!(questions[2].contains("SQL"));
    }

    #[test]
    fn test_fallback_pool_covers_largest_count_with_one_skill() {
        let skills = vec!["Go".to_string()];
        let questions = fallback_questions("Backend Engineer", &skills, 10);
        assert_eq!(questions.len(), 10);
        assert!(questions.iter().all(|q| !q.is_empty()));
    }
}
