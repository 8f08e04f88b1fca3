use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde_json::Value;

use crate::assessment::domain::{SessionId, TurnAuthor, UserContext, UserId};
use crate::assessment::repository::{ContextProvider, RepositoryError, SessionRepository};
use crate::assessment::scoring::{CoverageScorer, ProgressConfig};
use crate::assessment::service::AssessmentService;
use crate::assessment::session::AssessmentSession;
use crate::assessment::{assessment_router, AssessmentServiceError};

pub(super) fn config() -> ProgressConfig {
    ProgressConfig::default()
}

pub(super) fn scorer() -> CoverageScorer {
    CoverageScorer::new(config())
}

pub(super) fn unknown_context() -> UserContext {
    UserContext::default()
}

pub(super) fn returning_patient_context() -> UserContext {
    let mut prior_symptoms = BTreeSet::new();
    prior_symptoms.insert("tinnitus".to_string());
    UserContext {
        age: Some(54),
        gender: Some("female".to_string()),
        prior_symptoms,
        hearing_status: Some("mild loss, left ear".to_string()),
        prior_assessment_count: 2,
        last_assessment_date: chrono::NaiveDate::from_ymd_opt(2025, 11, 3),
    }
}

pub(super) fn blank_session(suffix: &str) -> AssessmentSession {
    AssessmentSession::new(
        SessionId(format!("session-{suffix}")),
        UserId("user-1".to_string()),
        Utc::now(),
    )
}

/// Drive a scripted exchange through the state machine directly.
pub(super) fn drive(session: &mut AssessmentSession, turns: &[(TurnAuthor, &str)]) {
    let scorer = scorer();
    let context = unknown_context();
    for (author, text) in turns {
        session
            .record_turn(*author, text.to_string(), &scorer, &context, Utc::now())
            .expect("turn accepted");
    }
}

/// Ten-turn exchange covering symptoms and history in detail plus every other
/// checklist topic. The final attendant turn (turn 9) is still an open
/// question, so the lock stays latched open until a closing reply arrives.
pub(super) fn rich_exchange() -> Vec<(TurnAuthor, &'static str)> {
    vec![
        (TurnAuthor::Attendant, "What brings you in today?"),
        (
            TurnAuthor::Patient,
            "I have a constant headache and sharp ear pain; I can describe the symptoms in detail.",
        ),
        (TurnAuthor::Attendant, "Any relevant medical history?"),
        (
            TurnAuthor::Patient,
            "I was diagnosed with an ear infection last year and had surgery; I'll be thorough about my treatment.",
        ),
        (TurnAuthor::Attendant, "Do you take any medication?"),
        (
            TurnAuthor::Patient,
            "No regular medication, and nothing like this runs in the family.",
        ),
        (TurnAuthor::Attendant, "How does this affect your daily life?"),
        (
            TurnAuthor::Patient,
            "The ringing interferes with sleep and conversation at work.",
        ),
        (
            TurnAuthor::Attendant,
            "Anything about noise exposure or smoking?",
        ),
        (
            TurnAuthor::Patient,
            "I work around loud noise exposure and I smoke occasionally.",
        ),
    ]
}

/// Six-turn exchange landing at score 65 (length 20, symptoms 25, history 20)
/// with no pending attendant question.
pub(super) fn midway_exchange() -> Vec<(TurnAuthor, &'static str)> {
    vec![
        (TurnAuthor::Attendant, "What brings you in today?"),
        (
            TurnAuthor::Patient,
            "I get sharp pain and headache symptoms; here is every detail.",
        ),
        (TurnAuthor::Attendant, "Any medical history I should know?"),
        (
            TurnAuthor::Patient,
            "I was diagnosed with a thyroid condition and had treatment; I will be thorough.",
        ),
        (TurnAuthor::Attendant, "Understood, thank you."),
        (TurnAuthor::Patient, "Thanks."),
    ]
}

/// Two-turn small talk exchange carrying no clinical signal.
pub(super) fn terse_exchange() -> Vec<(TurnAuthor, &'static str)> {
    vec![
        (TurnAuthor::Attendant, "Hello, how can I help you today?"),
        (TurnAuthor::Patient, "Hi."),
    ]
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) sessions: Arc<Mutex<HashMap<SessionId, AssessmentSession>>>,
}

impl SessionRepository for MemoryRepository {
    fn insert(&self, session: AssessmentSession) -> Result<AssessmentSession, RepositoryError> {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        if guard.contains_key(&session.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    fn update(&self, session: AssessmentSession) -> Result<(), RepositoryError> {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        guard.insert(session.id.clone(), session);
        Ok(())
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<AssessmentSession>, RepositoryError> {
        let guard = self.sessions.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn active_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<AssessmentSession>, RepositoryError> {
        let guard = self.sessions.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .find(|session| session.active && &session.user_id == user_id)
            .cloned())
    }
}

pub(super) struct UnavailableRepository;

impl SessionRepository for UnavailableRepository {
    fn insert(&self, _session: AssessmentSession) -> Result<AssessmentSession, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _session: AssessmentSession) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &SessionId) -> Result<Option<AssessmentSession>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn active_for_user(
        &self,
        _user_id: &UserId,
    ) -> Result<Option<AssessmentSession>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct StaticContexts {
    profiles: Arc<Mutex<HashMap<UserId, UserContext>>>,
}

impl StaticContexts {
    pub(super) fn with_profile(user_id: UserId, context: UserContext) -> Self {
        let provider = Self::default();
        provider
            .profiles
            .lock()
            .expect("context mutex poisoned")
            .insert(user_id, context);
        provider
    }
}

impl ContextProvider for StaticContexts {
    fn context_for(&self, user_id: &UserId) -> UserContext {
        self.profiles
            .lock()
            .expect("context mutex poisoned")
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }
}

pub(super) fn build_service() -> (
    AssessmentService<MemoryRepository, StaticContexts>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let contexts = Arc::new(StaticContexts::default());
    let service = AssessmentService::new(repository.clone(), contexts, config());
    (service, repository)
}

/// Feed an exchange through the service facade, returning the session id.
pub(super) fn run_exchange(
    service: &AssessmentService<MemoryRepository, StaticContexts>,
    turns: &[(TurnAuthor, &str)],
) -> SessionId {
    let session = service
        .start_session(UserId("user-1".to_string()))
        .expect("session starts");
    for (author, text) in turns {
        let result = match author {
            TurnAuthor::Patient => service.append_patient_turn(&session.id, text.to_string()),
            TurnAuthor::Attendant => service.append_attendant_turn(&session.id, text.to_string()),
        };
        result.expect("turn accepted");
    }
    session.id
}

pub(super) fn assessment_router_with_service(
    service: AssessmentService<MemoryRepository, StaticContexts>,
) -> axum::Router {
    assessment_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn expect_insufficient(result: Result<impl std::fmt::Debug, AssessmentServiceError>) {
    match result {
        Err(AssessmentServiceError::InsufficientProgress { .. }) => {}
        other => panic!("expected insufficient progress, got {other:?}"),
    }
}
