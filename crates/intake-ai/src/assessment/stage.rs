use serde::{Deserialize, Serialize};

/// Coarse progress label derived from the completion score alone.
///
/// The thresholds are deliberately loose: requiring a perfect score was found
/// to produce unbounded interrogation loops, so `Complete` is reached at 85.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStage {
    Initial,
    Gathering,
    ReadyForSummary,
    Complete,
}

const GATHERING_FLOOR: u8 = 50;
const SUMMARY_FLOOR: u8 = 75;
const COMPLETE_FLOOR: u8 = 85;

impl AssessmentStage {
    /// Highest stage whose inclusive lower bound the score reaches. Total over
    /// the whole 0–100 range.
    pub fn for_score(score: u8) -> Self {
        match score {
            s if s >= COMPLETE_FLOOR => Self::Complete,
            s if s >= SUMMARY_FLOOR => Self::ReadyForSummary,
            s if s >= GATHERING_FLOOR => Self::Gathering,
            _ => Self::Initial,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            AssessmentStage::Initial => "initial",
            AssessmentStage::Gathering => "gathering",
            AssessmentStage::ReadyForSummary => "ready_for_summary",
            AssessmentStage::Complete => "complete",
        }
    }
}
