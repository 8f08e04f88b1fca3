//! Assessment conversation progress: scoring, staging, locking, and gating.
//!
//! Every inbound message runs the same pipeline: the turn is appended to the
//! session transcript, the completion scorer produces a fresh 0–100 score, the
//! stage classifier derives a coarse stage label, and the session state machine
//! applies its guarded transitions (stage never regresses, the lock latches
//! once). The gate policy is then re-evaluated and exposed to callers through
//! the service facade and HTTP router.

pub mod domain;
pub mod gate;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod session;
pub mod stage;

#[cfg(test)]
mod tests;

pub use domain::{SessionId, Turn, TurnAuthor, UserContext, UserId};
pub use gate::{can_generate_report, can_manually_complete, ProgressSummary, ReportGate};
pub use repository::{ContextProvider, RepositoryError, SessionRepository};
pub use router::assessment_router;
pub use scoring::{
    ClinicalTopic, CoverageDepth, CoverageScorer, ProgressConfig, ScoreBreakdown, ScoringStrategy,
    TopicCoverage,
};
pub use service::{
    AssessmentService, AssessmentServiceError, CompletionReceipt, SessionView, TurnReceipt,
};
pub use session::{AssessmentSession, LockedSession, TurnTransition};
pub use stage::AssessmentStage;
