use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use super::domain::{SessionId, TurnAuthor, UserId};
use super::gate::{self, ProgressSummary, ReportGate};
use super::repository::{ContextProvider, RepositoryError, SessionRepository};
use super::scoring::{CoverageScorer, ProgressConfig, ScoringStrategy};
use super::session::{AssessmentSession, LockedSession};
use super::stage::AssessmentStage;

/// Service composing the scorer, state machine, gate policy, and collaborators.
///
/// Mutating operations are serialized per session id so two concurrent
/// messages cannot interleave their score/stage/lock updates; read-only
/// queries run unserialized against the latest committed state. Session
/// creation is serialized per user id to enforce the one-active-session
/// invariant.
pub struct AssessmentService<R, C> {
    repository: Arc<R>,
    contexts: Arc<C>,
    scorer: Arc<dyn ScoringStrategy>,
    config: ProgressConfig,
    // Guard maps are retained for the life of the process, matching session
    // retention: locked sessions still accept attendant turns, so their
    // mutations need serialization too.
    session_locks: Mutex<HashMap<SessionId, Arc<Mutex<()>>>>,
    user_locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("session-{id:06}"))
}

impl<R, C> AssessmentService<R, C>
where
    R: SessionRepository + 'static,
    C: ContextProvider + 'static,
{
    pub fn new(repository: Arc<R>, contexts: Arc<C>, config: ProgressConfig) -> Self {
        let scorer = Arc::new(CoverageScorer::new(config.clone()));
        Self::with_scorer(repository, contexts, config, scorer)
    }

    /// Inject an alternative scoring strategy (e.g. a model-backed scorer).
    pub fn with_scorer(
        repository: Arc<R>,
        contexts: Arc<C>,
        config: ProgressConfig,
        scorer: Arc<dyn ScoringStrategy>,
    ) -> Self {
        Self {
            repository,
            contexts,
            scorer,
            config,
            session_locks: Mutex::new(HashMap::new()),
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    fn session_guard(&self, id: &SessionId) -> Arc<Mutex<()>> {
        let mut locks = self.session_locks.lock().expect("session lock map poisoned");
        locks.entry(id.clone()).or_default().clone()
    }

    fn user_guard(&self, id: &UserId) -> Arc<Mutex<()>> {
        let mut locks = self.user_locks.lock().expect("user lock map poisoned");
        locks.entry(id.clone()).or_default().clone()
    }

    fn fetch_required(
        &self,
        id: &SessionId,
    ) -> Result<AssessmentSession, AssessmentServiceError> {
        self.repository
            .fetch(id)?
            .ok_or(AssessmentServiceError::SessionNotFound)
    }

    /// Start a fresh session for the user, superseding any prior active one
    /// in the same critical section.
    pub fn start_session(
        &self,
        user_id: UserId,
    ) -> Result<AssessmentSession, AssessmentServiceError> {
        let guard = self.user_guard(&user_id);
        let _serial = guard.lock().expect("user lock poisoned");

        let now = Utc::now();
        if let Some(prior) = self.repository.active_for_user(&user_id)? {
            // Supersession must serialize with in-flight appends on the
            // session being replaced, and re-fetch under that lock so a turn
            // committed in between is not overwritten.
            let prior_guard = self.session_guard(&prior.id);
            let _prior_serial = prior_guard.lock().expect("session lock poisoned");
            let mut prior = self.repository.fetch(&prior.id)?.unwrap_or(prior);
            prior.supersede(now);
            self.repository.update(prior)?;
        }

        let session = AssessmentSession::new(next_session_id(), user_id, now);
        let stored = self.repository.insert(session)?;
        info!(session = %stored.id, user = %stored.user_id, "assessment session started");
        Ok(stored)
    }

    /// Append a patient message. Fails with `SessionLocked` once the session
    /// has locked; the transcript is left unchanged in that case.
    pub fn append_patient_turn(
        &self,
        session_id: &SessionId,
        text: String,
    ) -> Result<TurnReceipt, AssessmentServiceError> {
        self.append_turn(session_id, TurnAuthor::Patient, text)
    }

    /// Append an attendant reply. Always accepted; still runs the transition
    /// so a closing (non-question) reply can latch the lock.
    pub fn append_attendant_turn(
        &self,
        session_id: &SessionId,
        text: String,
    ) -> Result<TurnReceipt, AssessmentServiceError> {
        self.append_turn(session_id, TurnAuthor::Attendant, text)
    }

    fn append_turn(
        &self,
        session_id: &SessionId,
        author: TurnAuthor,
        text: String,
    ) -> Result<TurnReceipt, AssessmentServiceError> {
        let guard = self.session_guard(session_id);
        let _serial = guard.lock().expect("session lock poisoned");

        let mut session = self.fetch_required(session_id)?;
        let was_locked = session.locked;
        let context = self.contexts.context_for(&session.user_id);
        let transition = session.record_turn(
            author,
            text,
            self.scorer.as_ref(),
            &context,
            Utc::now(),
        )?;
        self.repository.update(session)?;

        if transition.locked && !was_locked {
            info!(
                session = %session_id,
                score = transition.score,
                "assessment complete; session locked"
            );
        }

        Ok(TurnReceipt {
            accepted: true,
            score: transition.score,
            stage: transition.stage,
            locked: transition.locked,
        })
    }

    /// Read-only progress snapshot including both gate decisions.
    pub fn progress(
        &self,
        session_id: &SessionId,
    ) -> Result<ProgressSummary, AssessmentServiceError> {
        let session = self.fetch_required(session_id)?;
        let context = self.contexts.context_for(&session.user_id);
        let breakdown = self.scorer.score(&session.turns, &context);
        Ok(ProgressSummary::for_session(
            &session,
            breakdown.outstanding_topics,
            &self.config,
        ))
    }

    /// User-invoked early termination, bypassing the organic flow.
    ///
    /// Preconditions are checked in order: the session must not already be
    /// locked, the score must reach the manual floor, the attendant must not
    /// have an open question, and the conversation must carry minimal signal.
    pub fn request_manual_completion(
        &self,
        session_id: &SessionId,
    ) -> Result<CompletionReceipt, AssessmentServiceError> {
        let guard = self.session_guard(session_id);
        let _serial = guard.lock().expect("session lock poisoned");

        let mut session = self.fetch_required(session_id)?;
        if session.locked {
            return Err(AssessmentServiceError::SessionLocked);
        }
        if session.completion_score < self.config.manual_score_floor {
            return Err(AssessmentServiceError::InsufficientProgress {
                score: session.completion_score,
                required: self.config.manual_score_floor,
            });
        }
        if session.has_pending_question() {
            return Err(AssessmentServiceError::PendingQuestion);
        }
        if session.message_count() < self.config.manual_turn_floor {
            return Err(AssessmentServiceError::TooFewMessages {
                count: session.message_count(),
                required: self.config.manual_turn_floor,
            });
        }

        session.force_complete(&self.config, Utc::now());
        let receipt = CompletionReceipt {
            score: session.completion_score,
            stage: session.stage,
            locked: session.locked,
        };
        self.repository.update(session)?;
        info!(session = %session_id, score = receipt.score, "assessment finished manually");
        Ok(receipt)
    }

    /// Read-only report gate check, reporting the deficit to target when
    /// disallowed.
    pub fn report_gate(
        &self,
        session_id: &SessionId,
    ) -> Result<ReportGate, AssessmentServiceError> {
        let session = self.fetch_required(session_id)?;
        Ok(gate::report_gate(&session, &self.config))
    }
}

/// Acknowledgement returned for every accepted turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TurnReceipt {
    pub accepted: bool,
    pub score: u8,
    pub stage: AssessmentStage,
    pub locked: bool,
}

/// Acknowledgement returned when manual completion succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompletionReceipt {
    pub score: u8,
    pub stage: AssessmentStage,
    pub locked: bool,
}

/// Sanitized representation of a session for API responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub score: u8,
    pub stage: AssessmentStage,
    pub locked: bool,
    pub message_count: usize,
}

impl From<&AssessmentSession> for SessionView {
    fn from(session: &AssessmentSession) -> Self {
        Self {
            session_id: session.id.clone(),
            user_id: session.user_id.clone(),
            score: session.completion_score,
            stage: session.stage,
            locked: session.locked,
            message_count: session.message_count(),
        }
    }
}

/// Error raised by the assessment service. All variants are synchronous and
/// typed; nothing here is fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error("session is locked; start a new assessment to continue")]
    SessionLocked,
    #[error("insufficient completion: score {score} is below the required {required}")]
    InsufficientProgress { score: u8, required: u8 },
    #[error("the attendant has an open question; answer it before finishing")]
    PendingQuestion,
    #[error("at least {required} messages are needed before finishing (currently {count})")]
    TooFewMessages { count: usize, required: usize },
    #[error("assessment session not found")]
    SessionNotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AssessmentServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AssessmentServiceError::SessionLocked => StatusCode::CONFLICT,
            AssessmentServiceError::InsufficientProgress { .. }
            | AssessmentServiceError::PendingQuestion
            | AssessmentServiceError::TooFewMessages { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AssessmentServiceError::SessionNotFound => StatusCode::NOT_FOUND,
            AssessmentServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<LockedSession> for AssessmentServiceError {
    fn from(_: LockedSession) -> Self {
        Self::SessionLocked
    }
}
