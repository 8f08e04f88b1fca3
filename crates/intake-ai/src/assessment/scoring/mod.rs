mod config;
mod topics;

pub use config::ProgressConfig;
pub use topics::{ClinicalTopic, CoverageDepth, TopicCoverage};

use serde::{Deserialize, Serialize};

use super::domain::{Turn, TurnAuthor, UserContext};

const DEEP_LENGTH_POINTS: u8 = 30;
const STEADY_LENGTH_POINTS: u8 = 20;
const OPENING_LENGTH_POINTS: u8 = 10;

/// Strategy seam for the completion heuristic, so the shipped keyword scorer
/// can be swapped for a model-based classifier without touching the state
/// machine.
pub trait ScoringStrategy: Send + Sync {
    /// Deterministic, side-effect free: transcript + context in, score out.
    fn score(&self, turns: &[Turn], context: &UserContext) -> ScoreBreakdown;
}

/// Composite completion score with its per-topic audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub total: u8,
    pub length_points: u8,
    pub coverage_points: u8,
    pub topics: Vec<TopicCoverage>,
    /// Checklist topics still untouched, minus those already satisfied by
    /// what is on file for the patient. Consumed by prompting surfaces; never
    /// feeds back into the score.
    pub outstanding_topics: Vec<ClinicalTopic>,
}

/// Keyword/coverage heuristic scorer.
///
/// Total = min(100, length + coverage). The length component rewards sheer
/// conversation depth as a floor-raising gate before content is trusted; the
/// coverage component walks the clinical topic checklist over patient-authored
/// text only.
#[derive(Debug, Clone, Default)]
pub struct CoverageScorer {
    config: ProgressConfig,
}

impl CoverageScorer {
    pub fn new(config: ProgressConfig) -> Self {
        Self { config }
    }

    fn length_points(&self, turn_count: usize) -> u8 {
        if turn_count >= self.config.deep_conversation_turns {
            DEEP_LENGTH_POINTS
        } else if turn_count >= self.config.steady_conversation_turns {
            STEADY_LENGTH_POINTS
        } else if turn_count >= self.config.opening_conversation_turns {
            OPENING_LENGTH_POINTS
        } else {
            0
        }
    }
}

impl ScoringStrategy for CoverageScorer {
    fn score(&self, turns: &[Turn], context: &UserContext) -> ScoreBreakdown {
        let patient_texts: Vec<String> = turns
            .iter()
            .filter(|turn| matches!(turn.author, TurnAuthor::Patient))
            .map(|turn| turn.text.to_lowercase())
            .collect();

        let topics: Vec<TopicCoverage> = ClinicalTopic::ALL
            .iter()
            .map(|&topic| topics::assess_topic(topic, &patient_texts))
            .collect();

        let raw_coverage: u16 = topics.iter().map(|entry| u16::from(entry.points)).sum();
        let coverage_points = raw_coverage.min(u16::from(self.config.coverage_cap)) as u8;
        let length_points = self.length_points(turns.len());
        let total = (u16::from(length_points) + u16::from(coverage_points)).min(100) as u8;

        let outstanding_topics = topics
            .iter()
            .filter(|entry| entry.depth == CoverageDepth::Absent)
            .map(|entry| entry.topic)
            .filter(|topic| !satisfied_by_context(*topic, context))
            .collect();

        ScoreBreakdown {
            total,
            length_points,
            coverage_points,
            topics,
            outstanding_topics,
        }
    }
}

/// Pre-existing records reduce the questions still required without inflating
/// the score itself.
fn satisfied_by_context(topic: ClinicalTopic, context: &UserContext) -> bool {
    match topic {
        ClinicalTopic::SymptomDetail => !context.prior_symptoms.is_empty(),
        ClinicalTopic::HearingConcerns => context.hearing_status.is_some(),
        _ => false,
    }
}
