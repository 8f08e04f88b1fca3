use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use intake_ai::assessment::{
    AssessmentSession, ContextProvider, ProgressConfig, RepositoryError, SessionId,
    SessionRepository, UserContext, UserId,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemorySessionRepository {
    sessions: Arc<Mutex<HashMap<SessionId, AssessmentSession>>>,
}

impl SessionRepository for InMemorySessionRepository {
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
        if guard.contains_key(&session.id) {
            guard.insert(session.id.clone(), session);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
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

/// Profile snapshots keyed by user; unknown users fall back to a default
/// "nothing on file" context.
#[derive(Default, Clone)]
pub(crate) struct InMemoryContextProvider {
    profiles: Arc<Mutex<HashMap<UserId, UserContext>>>,
}

impl InMemoryContextProvider {
    pub(crate) fn seed(&self, user_id: UserId, context: UserContext) {
        self.profiles
            .lock()
            .expect("context mutex poisoned")
            .insert(user_id, context);
    }
}

impl ContextProvider for InMemoryContextProvider {
    fn context_for(&self, user_id: &UserId) -> UserContext {
        self.profiles
            .lock()
            .expect("context mutex poisoned")
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }
}

pub(crate) fn default_progress_config() -> ProgressConfig {
    ProgressConfig::default()
}
