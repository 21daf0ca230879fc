//! Axum route handlers for the interview API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthedUser;
use crate::errors::AppError;
use crate::interview::feedback::{generate_feedback, FeedbackReport};
use crate::interview::persona::{Persona, PersonaProfile};
use crate::interview::questions::generate_questions;
use crate::interview::session::{Advance, InterviewSession, RecordingState, SessionState};
use crate::interview::store::{
    dashboard_summary, fetch_interview, list_interviews, save_interview, DashboardSummary,
    InterviewDraft,
};
use crate::models::interview::{ExperienceLevel, InterviewConfig, InterviewRow};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub role: String,
    #[serde(default)]
    pub description: String,
    pub experience: ExperienceLevel,
    /// Comma-separated, as the setup form collects it.
    pub skills: String,
    #[serde(rename = "questionCount")]
    pub question_count: u8,
    #[serde(default)]
    pub persona: Persona,
}

/// Current state of an active session, returned by every session endpoint
/// that leaves the session alive.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub role: String,
    pub persona: PersonaProfile,
    pub questions: Vec<String>,
    pub answers: Vec<String>,
    pub current_index: Option<usize>,
    pub current_question: Option<String>,
    pub recording: bool,
    pub complete: bool,
}

impl SessionSnapshot {
    fn of(session: &InterviewSession) -> Self {
        SessionSnapshot {
            session_id: session.id,
            role: session.config.role.clone(),
            persona: session.persona.profile(),
            questions: session.questions.clone(),
            answers: session.answers.clone(),
            current_index: session.current_index(),
            current_question: session.current_question().map(str::to_string),
            recording: session.recording == RecordingState::Recording,
            complete: session.state == SessionState::Complete,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StopRecordingRequest {
    pub transcript: String,
}

#[derive(Debug, Deserialize)]
pub struct AdvanceRequest {
    /// Optional inline transcript; used when the client advances without an
    /// explicit recording stop.
    #[serde(default)]
    pub transcript: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdvanceResponse {
    #[serde(rename_all = "camelCase")]
    InProgress {
        next_index: usize,
        next_question: String,
    },
    /// The session finished. When persistence failed, `saved` is false and
    /// the report is still returned so the client can render results locally.
    #[serde(rename_all = "camelCase")]
    Complete {
        saved: bool,
        interview_id: Option<Uuid>,
        feedback: FeedbackReport,
    },
}

#[derive(Debug, Deserialize)]
pub struct CreateInterviewRequest {
    pub role: String,
    #[serde(default)]
    pub description: String,
    pub experience: ExperienceLevel,
    #[serde(default)]
    pub skills: Vec<String>,
    pub questions: Vec<String>,
    #[serde(default)]
    pub answers: Vec<String>,
    pub feedback: FeedbackReport,
    #[serde(default)]
    pub persona: Persona,
    #[serde(default)]
    pub duration: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

// ────────────────────────────────────────────────────────────────────────────
// Personas
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/personas
pub async fn handle_list_personas() -> Json<Vec<PersonaProfile>> {
    Json(Persona::all().iter().map(Persona::profile).collect())
}

// ────────────────────────────────────────────────────────────────────────────
// Session endpoints
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interviews/sessions
///
/// Validates the setup, generates the question set (fallback on any model
/// failure), and registers the session. A prior active session for the same
/// user is abandoned.
pub async fn handle_start_session(
    State(state): State<AppState>,
    user: AuthedUser,
    Json(request): Json<StartSessionRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let config = InterviewConfig::new(
        &request.role,
        &request.description,
        request.experience,
        &request.skills,
        request.question_count,
    )
    .map_err(AppError::Validation)?;

    let questions = generate_questions(state.generator.as_ref(), &config).await;

    let session = InterviewSession::new(user.user_id, config, request.persona, questions);
    info!(
        "Started interview session {} for user {} ({} questions)",
        session.id,
        user.user_id,
        session.questions.len()
    );

    let snapshot = SessionSnapshot::of(&session);
    state.sessions.start(session).await;

    Ok(Json(snapshot))
}

/// GET /api/v1/interviews/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    user: AuthedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    state
        .sessions
        .with_session(id, user.user_id, |s| SessionSnapshot::of(s))
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

/// POST /api/v1/interviews/sessions/:id/recording/start
pub async fn handle_start_recording(
    State(state): State<AppState>,
    user: AuthedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    state
        .sessions
        .with_session(id, user.user_id, |s| {
            s.start_recording();
            SessionSnapshot::of(s)
        })
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

/// POST /api/v1/interviews/sessions/:id/recording/stop
///
/// Carries the speech-to-text transcript captured while recording; stopping
/// writes it into the answer slot for the active question.
pub async fn handle_stop_recording(
    State(state): State<AppState>,
    user: AuthedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<StopRecordingRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    state
        .sessions
        .with_session(id, user.user_id, |s| {
            s.stop_recording(&request.transcript);
            SessionSnapshot::of(s)
        })
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

/// POST /api/v1/interviews/sessions/:id/advance
///
/// Advances past the current question. On the final question this runs
/// feedback generation and persistence before responding; a persistence
/// failure degrades to `saved: false` with the report kept in the response.
pub async fn handle_advance(
    State(state): State<AppState>,
    user: AuthedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<AdvanceRequest>,
) -> Result<Json<AdvanceResponse>, AppError> {
    let outcome = state
        .sessions
        .with_session(id, user.user_id, |s| {
            s.advance(request.transcript.as_deref()).map(|adv| match adv {
                Advance::Next { index } => AdvanceOutcome::Next {
                    index,
                    question: s.questions[index].clone(),
                },
                Advance::Finished => AdvanceOutcome::Finished {
                    draft_seed: DraftSeed {
                        config: s.config.clone(),
                        persona: s.persona,
                        questions: s.questions.clone(),
                        answers: s.answers.clone(),
                        duration_minutes: s.duration_minutes(),
                    },
                },
            })
        })
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?
        .map_err(|e| AppError::Validation(e.to_string()))?;

    match outcome {
        AdvanceOutcome::Next { index, question } => Ok(Json(AdvanceResponse::InProgress {
            next_index: index,
            next_question: question,
        })),
        AdvanceOutcome::Finished { draft_seed } => {
            let feedback = generate_feedback(
                state.generator.as_ref(),
                &draft_seed.config,
                &draft_seed.questions,
                &draft_seed.answers,
            )
            .await;

            let draft = InterviewDraft {
                config: draft_seed.config,
                persona: draft_seed.persona,
                questions: draft_seed.questions,
                answers: draft_seed.answers,
                feedback: feedback.clone(),
                duration_minutes: draft_seed.duration_minutes,
            };

            let (saved, interview_id) = match save_interview(&state.db, user.user_id, &draft).await
            {
                Ok(id) => (true, Some(id)),
                Err(e) => {
                    // The session result is degraded but not lost: the report
                    // goes back to the client for local display.
                    warn!("Failed to save interview for user {}: {e}", user.user_id);
                    (false, None)
                }
            };

            // Completed sessions leave the registry either way.
            state.sessions.remove(id, user.user_id).await;

            Ok(Json(AdvanceResponse::Complete {
                saved,
                interview_id,
                feedback,
            }))
        }
    }
}

/// DELETE /api/v1/interviews/sessions/:id
///
/// Abandons an active session without persisting anything.
pub async fn handle_abandon_session(
    State(state): State<AppState>,
    user: AuthedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .sessions
        .remove(id, user.user_id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

/// Data lifted out of the registry lock for the completion path.
struct DraftSeed {
    config: InterviewConfig,
    persona: Persona,
    questions: Vec<String>,
    answers: Vec<String>,
    duration_minutes: i64,
}

enum AdvanceOutcome {
    Next { index: usize, question: String },
    Finished { draft_seed: DraftSeed },
}

// ────────────────────────────────────────────────────────────────────────────
// Interview record endpoints
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/interviews
pub async fn handle_list_interviews(
    State(state): State<AppState>,
    user: AuthedUser,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<InterviewRow>>, AppError> {
    let rows = list_interviews(&state.db, user.user_id, params.limit).await?;
    Ok(Json(rows))
}

/// GET /api/v1/interviews/summary
pub async fn handle_summary(
    State(state): State<AppState>,
    user: AuthedUser,
) -> Result<Json<DashboardSummary>, AppError> {
    let summary = dashboard_summary(&state.db, user.user_id).await?;
    Ok(Json(summary))
}

/// GET /api/v1/interviews/:id
pub async fn handle_get_interview(
    State(state): State<AppState>,
    user: AuthedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewRow>, AppError> {
    let row = fetch_interview(&state.db, id, user.user_id).await?;
    Ok(Json(row))
}

/// POST /api/v1/interviews
///
/// Direct create, mirroring the session completion payload. Partial records
/// (missing questions or feedback) are rejected before any write.
pub async fn handle_create_interview(
    State(state): State<AppState>,
    user: AuthedUser,
    Json(request): Json<CreateInterviewRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if request.role.trim().is_empty() {
        return Err(AppError::Validation("role is required".to_string()));
    }

    let question_count = request.questions.len().min(u8::MAX as usize) as u8;
    let draft = InterviewDraft {
        config: InterviewConfig {
            role: request.role.trim().to_string(),
            description: request.description.trim().to_string(),
            experience: request.experience,
            skills: request
                .skills
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            question_count,
        },
        persona: request.persona,
        questions: request.questions,
        answers: request.answers,
        feedback: request.feedback,
        duration_minutes: request.duration,
    };

    let id = save_interview(&state.db, user.user_id, &draft).await?;

    Ok(Json(json!({
        "success": true,
        "interviewId": id,
        "message": "Interview saved successfully"
    })))
}
