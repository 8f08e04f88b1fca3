use super::domain::{SessionId, UserContext, UserId};
use super::session::AssessmentSession;

/// Storage abstraction so the service can be exercised in isolation. Backing
/// stores append turns durably through `update`; sessions have no deletion
/// path and are retained indefinitely once superseded.
pub trait SessionRepository: Send + Sync {
    fn insert(&self, session: AssessmentSession) -> Result<AssessmentSession, RepositoryError>;
    fn update(&self, session: AssessmentSession) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &SessionId) -> Result<Option<AssessmentSession>, RepositoryError>;
    fn active_for_user(&self, user_id: &UserId)
        -> Result<Option<AssessmentSession>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("session already exists")]
    Conflict,
    #[error("session not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Best-effort profile lookup. Unknown users yield a default snapshot rather
/// than an error so a context outage never blocks the interview.
pub trait ContextProvider: Send + Sync {
    fn context_for(&self, user_id: &UserId) -> UserContext;
}
