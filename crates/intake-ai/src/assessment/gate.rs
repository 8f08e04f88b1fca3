use serde::Serialize;

use super::domain::SessionId;
use super::scoring::{ClinicalTopic, ProgressConfig};
use super::session::AssessmentSession;
use super::stage::AssessmentStage;

/// Report generation produces an artifact consumed as medical guidance, so it
/// demands a materially higher bar than merely being allowed to end the
/// conversation early.
pub fn can_generate_report(session: &AssessmentSession, config: &ProgressConfig) -> bool {
    session.completion_score >= config.report_score_floor
}

/// A user may choose to stop early once minimal signal exists, but never while
/// the attendant is mid-question.
pub fn can_manually_complete(session: &AssessmentSession, config: &ProgressConfig) -> bool {
    session.completion_score >= config.manual_score_floor && !session.has_pending_question()
}

/// Outcome of the report gate check. `deficit` is how far the score is from
/// the bar when disallowed, zero otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportGate {
    pub allowed: bool,
    pub deficit: u8,
}

pub fn report_gate(session: &AssessmentSession, config: &ProgressConfig) -> ReportGate {
    let allowed = can_generate_report(session, config);
    let deficit = if allowed {
        0
    } else {
        config.report_score_floor - session.completion_score
    };
    ReportGate { allowed, deficit }
}

/// Externally visible progress snapshot for one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSummary {
    pub session_id: SessionId,
    pub score: u8,
    pub stage: AssessmentStage,
    pub locked: bool,
    pub message_count: usize,
    pub can_generate_report: bool,
    pub can_manually_complete: bool,
    pub outstanding_topics: Vec<ClinicalTopic>,
}

impl ProgressSummary {
    pub fn for_session(
        session: &AssessmentSession,
        outstanding_topics: Vec<ClinicalTopic>,
        config: &ProgressConfig,
    ) -> Self {
        Self {
            session_id: session.id.clone(),
            score: session.completion_score,
            stage: session.stage,
            locked: session.locked,
            message_count: session.message_count(),
            can_generate_report: can_generate_report(session, config),
            can_manually_complete: can_manually_complete(session, config),
            outstanding_topics,
        }
    }
}
