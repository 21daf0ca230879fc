// All LLM prompt constants for the interview module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for question generation. Callers append
/// `llm_client::prompts::JSON_ONLY_SYSTEM` to enforce JSON-array-only output.
pub const QUESTION_SYSTEM: &str = "You are an experienced technical interviewer \
    preparing questions for a mock interview. \
    Your output is a JSON array of question strings.";

/// Question generation prompt template.
/// Replace: {question_count}, {role}, {experience}, {skills}, {description}
pub const QUESTION_PROMPT_TEMPLATE: &str = r#"Generate exactly {question_count} interview questions for a {role} position.

Candidate profile:
- Years of experience: {experience}
- Key skills: {skills}

Job description:
{description}

Rules:
1. Return a JSON ARRAY of exactly {question_count} strings — one question per string
2. Mix technical questions (grounded in the listed skills) with behavioral questions
3. Calibrate difficulty to the stated years of experience
4. Each question must be self-contained and answerable verbally in 2-3 minutes
5. Do NOT number the questions inside the strings

Example shape:
["Question one?", "Question two?"]"#;

/// System prompt for feedback scoring. Callers append
/// `llm_client::prompts::JSON_ONLY_SYSTEM` to enforce JSON-object-only output.
pub const FEEDBACK_SYSTEM: &str = "You are an expert interview coach scoring a \
    completed mock interview. Be specific, constructive, and honest.";

/// Feedback generation prompt template.
/// Replace: {role}, {experience}, {skills}, {qa_pairs}
pub const FEEDBACK_PROMPT_TEMPLATE: &str = r#"Analyze this mock interview for a {role} position (candidate experience: {experience} years; key skills: {skills}).

TRANSCRIPT (question followed by the candidate's spoken answer; an empty answer means the candidate did not respond):
{qa_pairs}

Return a JSON object with this EXACT schema (no extra fields):
{
  "questionFeedback": [
    {
      "question": "the question text, verbatim",
      "answer": "the candidate's answer, verbatim",
      "feedback": "2-3 sentences of specific, actionable feedback",
      "score": 75
    }
  ],
  "overallFeedback": {
    "strengths": ["one strength per string"],
    "improvements": ["one improvement per string"],
    "overallScore": 75
  }
}

Rules:
1. One questionFeedback entry per transcript question, in order
2. All scores are integers from 0 to 100
3. Unanswered questions score low but still receive constructive feedback
4. overallScore reflects the whole performance, not an average"#;
