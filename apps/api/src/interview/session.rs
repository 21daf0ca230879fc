//! Session Controller — the linear interview wizard as a server-side state
//! machine, plus the in-memory registry of active sessions.
//!
//! States are `AwaitingAnswer(i)` for each question index and the terminal
//! `Complete`. Recording is a nested Idle ⇄ Recording toggle: starting while
//! recording and stopping while idle are no-ops, and stopping writes the
//! transcript buffer into the answer slot for the active question. No advance
//! is permitted while both the stored answer and the in-flight transcript for
//! the current index are empty.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::interview::persona::Persona;
use crate::models::interview::InterviewConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingAnswer(usize),
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    Idle,
    Recording,
}

/// Outcome of an advance request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the next question.
    Next { index: usize },
    /// The final answer was captured; the session is complete and ready for
    /// feedback generation.
    Finished,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("the session is already complete")]
    AlreadyComplete,

    #[error("question {0} has no recorded answer yet")]
    EmptyAnswer(usize),
}

/// One active interview session. Owned by the registry; all mutation happens
/// under the registry lock.
#[derive(Debug, Clone)]
pub struct InterviewSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub config: InterviewConfig,
    pub persona: Persona,
    pub questions: Vec<String>,
    /// Index-aligned with `questions`; empty string means unanswered.
    pub answers: Vec<String>,
    /// In-flight transcript buffer for the active question.
    transcript: String,
    pub recording: RecordingState,
    pub state: SessionState,
    pub started_at: DateTime<Utc>,
}

impl InterviewSession {
    pub fn new(
        user_id: Uuid,
        config: InterviewConfig,
        persona: Persona,
        questions: Vec<String>,
    ) -> Self {
        let answers = vec![String::new(); questions.len()];
        InterviewSession {
            id: Uuid::new_v4(),
            user_id,
            config,
            persona,
            questions,
            answers,
            transcript: String::new(),
            recording: RecordingState::Idle,
            state: SessionState::AwaitingAnswer(0),
            started_at: Utc::now(),
        }
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            SessionState::AwaitingAnswer(i) => Some(i),
            SessionState::Complete => None,
        }
    }

    pub fn current_question(&self) -> Option<&str> {
        self.current_index().map(|i| self.questions[i].as_str())
    }

    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Complete
    }

    /// Starts a recording pass. No-op while already recording or complete.
    pub fn start_recording(&mut self) {
        if self.recording == RecordingState::Recording || self.is_complete() {
            return;
        }
        self.recording = RecordingState::Recording;
        self.transcript.clear();
    }

    /// Stops recording and writes the captured transcript into the answer
    /// slot for the active question. No-op while idle.
    pub fn stop_recording(&mut self, transcript: &str) {
        if self.recording == RecordingState::Idle {
            return;
        }
        self.recording = RecordingState::Idle;
        self.transcript = transcript.trim().to_string();
        if let Some(i) = self.current_index() {
            if !self.transcript.is_empty() {
                self.answers[i] = self.transcript.clone();
            }
        }
    }

    /// Attempts to advance past the current question. The answer used is, in
    /// priority order: the transcript supplied with the request, the stored
    /// answer slot, the in-flight recording buffer.
    pub fn advance(&mut self, transcript: Option<&str>) -> Result<Advance, SessionError> {
        let i = self.current_index().ok_or(SessionError::AlreadyComplete)?;

        if let Some(t) = transcript.map(str::trim).filter(|t| !t.is_empty()) {
            self.answers[i] = t.to_string();
        } else if self.answers[i].trim().is_empty() && !self.transcript.trim().is_empty() {
            self.answers[i] = self.transcript.trim().to_string();
        }

        if self.answers[i].trim().is_empty() {
            return Err(SessionError::EmptyAnswer(i));
        }

        self.transcript.clear();
        self.recording = RecordingState::Idle;

        if i + 1 < self.questions.len() {
            self.state = SessionState::AwaitingAnswer(i + 1);
            Ok(Advance::Next { index: i + 1 })
        } else {
            self.state = SessionState::Complete;
            Ok(Advance::Finished)
        }
    }

    /// Whole minutes elapsed since the session started.
    pub fn duration_minutes(&self) -> i64 {
        (Utc::now() - self.started_at).num_minutes().max(0)
    }
}

/// In-memory registry of active sessions, keyed by session id. Exactly one
/// session may be active per user: starting a new one abandons the previous.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<Mutex<HashMap<Uuid, InterviewSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new session, dropping any prior session for the same user.
    pub async fn start(&self, session: InterviewSession) {
        let mut map = self.inner.lock().await;
        map.retain(|_, s| s.user_id != session.user_id);
        map.insert(session.id, session);
    }

    /// Runs `f` against the session if it exists and belongs to `user_id`.
    /// A session owned by someone else is indistinguishable from absent.
    pub async fn with_session<R>(
        &self,
        id: Uuid,
        user_id: Uuid,
        f: impl FnOnce(&mut InterviewSession) -> R,
    ) -> Option<R> {
        let mut map = self.inner.lock().await;
        map.get_mut(&id)
            .filter(|s| s.user_id == user_id)
            .map(f)
    }

    /// Removes and returns the session (abandon or completion teardown).
    pub async fn remove(&self, id: Uuid, user_id: Uuid) -> Option<InterviewSession> {
        let mut map = self.inner.lock().await;
        match map.get(&id) {
            Some(s) if s.user_id == user_id => map.remove(&id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::interview::ExperienceLevel;

    fn session(question_count: u8) -> InterviewSession {
        let config = InterviewConfig::new(
            "Backend Engineer",
            "",
            ExperienceLevel::Early,
            "Go,SQL",
            question_count,
        )
        .unwrap();
        let questions = (0..question_count)
            .map(|i| format!("Question {i}?"))
            .collect();
        InterviewSession::new(Uuid::new_v4(), config, Persona::Default, questions)
    }

    #[test]
    fn test_new_session_awaits_first_answer() {
        let s = session(3);
        assert_eq!(s.state, SessionState::AwaitingAnswer(0));
        assert_eq!(s.current_question(), Some("Question 0?"));
        assert_eq!(s.recording, RecordingState::Idle);
        assert_eq!(s.answers.len(), 3);
    }

    #[test]
    fn test_advance_without_answer_is_rejected() {
        let mut s = session(3);
        assert_eq!(s.advance(None), Err(SessionError::EmptyAnswer(0)));
        assert_eq!(s.state, SessionState::AwaitingAnswer(0));
    }

    #[test]
    fn test_whitespace_transcript_does_not_unlock_advance() {
        let mut s = session(3);
        assert_eq!(s.advance(Some("   ")), Err(SessionError::EmptyAnswer(0)));
    }

    #[test]
    fn test_advance_with_inline_transcript() {
        let mut s = session(3);
        assert_eq!(
            s.advance(Some("my answer")),
            Ok(Advance::Next { index: 1 })
        );
        assert_eq!(s.answers[0], "my answer");
        assert_eq!(s.state, SessionState::AwaitingAnswer(1));
    }

    #[test]
    fn test_recording_toggle_captures_answer() {
        let mut s = session(3);
        s.start_recording();
        assert_eq!(s.recording, RecordingState::Recording);
        s.stop_recording("spoken answer");
        assert_eq!(s.recording, RecordingState::Idle);
        assert_eq!(s.answers[0], "spoken answer");
        assert_eq!(s.advance(None), Ok(Advance::Next { index: 1 }));
    }

    #[test]
    fn test_start_while_recording_is_noop() {
        let mut s = session(3);
        s.start_recording();
        s.transcript = "partial".to_string();
        s.start_recording(); // must not clear the in-flight buffer
        assert_eq!(s.transcript, "partial");
    }

    #[test]
    fn test_stop_while_idle_is_noop() {
        let mut s = session(3);
        s.stop_recording("stray transcript");
        assert_eq!(s.answers[0], "");
    }

    #[test]
    fn test_live_buffer_unlocks_advance_without_stop() {
        let mut s = session(3);
        s.start_recording();
        s.transcript = "still talking".to_string();
        assert_eq!(s.advance(None), Ok(Advance::Next { index: 1 }));
        assert_eq!(s.answers[0], "still talking");
        assert_eq!(s.recording, RecordingState::Idle);
    }

    #[test]
    fn test_last_answer_completes_session() {
        let mut s = session(3);
        assert_eq!(s.advance(Some("a1")), Ok(Advance::Next { index: 1 }));
        assert_eq!(s.advance(Some("a2")), Ok(Advance::Next { index: 2 }));
        assert_eq!(s.advance(Some("a3")), Ok(Advance::Finished));
        assert!(s.is_complete());
        assert_eq!(s.answers, vec!["a1", "a2", "a3"]);
        assert_eq!(s.advance(Some("extra")), Err(SessionError::AlreadyComplete));
    }

    #[test]
    fn test_earlier_answer_survives_revisit_guard() {
        // Advancing stores the answer; the next question starts empty again.
        let mut s = session(2);
        s.advance(Some("a1")).unwrap();
        assert_eq!(s.advance(None), Err(SessionError::EmptyAnswer(1)));
    }

    #[tokio::test]
    async fn test_registry_scopes_sessions_by_owner() {
        let registry = SessionRegistry::new();
        let s = session(3);
        let (id, owner) = (s.id, s.user_id);
        registry.start(s).await;

        let other_user = Uuid::new_v4();
        assert!(registry
            .with_session(id, other_user, |_| ())
            .await
            .is_none());
        assert!(registry.remove(id, other_user).await.is_none());
        assert!(registry.with_session(id, owner, |_| ()).await.is_some());
    }

    #[tokio::test]
    async fn test_registry_allows_one_session_per_user() {
        let registry = SessionRegistry::new();
        let first = session(3);
        let user_id = first.user_id;
        let first_id = first.id;
        registry.start(first).await;

        let mut second = session(3);
        second.user_id = user_id;
        let second_id = second.id;
        registry.start(second).await;

        assert!(registry
            .with_session(first_id, user_id, |_| ())
            .await
            .is_none());
        assert!(registry
            .with_session(second_id, user_id, |_| ())
            .await
            .is_some());
    }

    #[tokio::test]
    async fn test_registry_remove_returns_session() {
        let registry = SessionRegistry::new();
        let s = session(3);
        let (id, owner) = (s.id, s.user_id);
        registry.start(s).await;

        let removed = registry.remove(id, owner).await.unwrap();
        assert_eq!(removed.id, id);
        assert!(registry.with_session(id, owner, |_| ()).await.is_none());
    }
}
