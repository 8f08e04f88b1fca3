use serde::{Deserialize, Serialize};

/// Tuning knobs shared by the scorer, the state machine, and the gate policy.
///
/// The defaults are the contract: a report needs a score of 80, manual
/// completion needs 60 plus at least six messages, and a manually finished
/// interview is floored at 80 so early termination does not under-report the
/// progress that was actually made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Turn counts at which the length component steps up.
    pub deep_conversation_turns: usize,
    pub steady_conversation_turns: usize,
    pub opening_conversation_turns: usize,
    /// Upper bound on the content-coverage component.
    pub coverage_cap: u8,
    /// Minimum score before a report may be generated.
    pub report_score_floor: u8,
    /// Minimum score before manual completion may be attempted.
    pub manual_score_floor: u8,
    /// Minimum message count before manual completion may be attempted.
    pub manual_turn_floor: usize,
    /// Score a manually completed session is raised to.
    pub forced_completion_score: u8,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            deep_conversation_turns: 10,
            steady_conversation_turns: 6,
            opening_conversation_turns: 3,
            coverage_cap: 70,
            report_score_floor: 80,
            manual_score_floor: 60,
            manual_turn_floor: 6,
            forced_completion_score: 80,
        }
    }
}
