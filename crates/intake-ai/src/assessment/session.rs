use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{SessionId, Turn, TurnAuthor, UserContext, UserId};
use super::scoring::{ProgressConfig, ScoreBreakdown, ScoringStrategy};
use super::stage::AssessmentStage;

/// Write attempted against a session that has already locked. Recoverable by
/// starting a new assessment session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("session is locked; no further patient messages are accepted")]
pub struct LockedSession;

/// Result of applying one turn through the state machine.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnTransition {
    pub score: u8,
    pub stage: AssessmentStage,
    pub locked: bool,
    pub breakdown: ScoreBreakdown,
}

/// One bounded assessment conversation and its progress state.
///
/// All guarded transitions live here: the stored score and stage never move
/// backwards while unlocked, and `locked` latches true at most once for the
/// lifetime of the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSession {
    pub id: SessionId,
    pub user_id: UserId,
    pub turns: Vec<Turn>,
    pub completion_score: u8,
    pub stage: AssessmentStage,
    pub locked: bool,
    /// A user has at most one active session; superseded sessions are retained
    /// as read-only history.
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AssessmentSession {
    pub fn new(id: SessionId, user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            turns: Vec::new(),
            completion_score: 0,
            stage: AssessmentStage::Initial,
            locked: false,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn message_count(&self) -> usize {
        self.turns.len()
    }

    pub fn last_attendant_turn(&self) -> Option<&Turn> {
        self.turns
            .iter()
            .rev()
            .find(|turn| matches!(turn.author, TurnAuthor::Attendant))
    }

    /// True when the attendant's most recent turn is an unanswered question.
    /// The session must never lock mid-question: cutting off input would
    /// discard a promised exchange.
    pub fn has_pending_question(&self) -> bool {
        self.last_attendant_turn()
            .map(Turn::is_open_question)
            .unwrap_or(false)
    }

    /// Append a turn and run the score → stage → lock transition.
    ///
    /// Patient turns are rejected once the session is locked; attendant turns
    /// are always accepted (replies are produced externally and may still
    /// arrive after completion).
    pub fn record_turn(
        &mut self,
        author: TurnAuthor,
        text: String,
        scorer: &dyn ScoringStrategy,
        context: &UserContext,
        now: DateTime<Utc>,
    ) -> Result<TurnTransition, LockedSession> {
        if matches!(author, TurnAuthor::Patient) && self.locked {
            return Err(LockedSession);
        }

        let sequence = self.turns.len() as u32 + 1;
        self.turns.push(Turn {
            author,
            text,
            sequence,
            created_at: now,
        });

        let breakdown = scorer.score(&self.turns, context);
        // A single terse reply must not drag a session backwards after real
        // progress was made.
        self.completion_score = self.completion_score.max(breakdown.total);

        if !self.locked {
            let derived = AssessmentStage::for_score(self.completion_score);
            if derived > self.stage {
                self.stage = derived;
            }
            if self.stage == AssessmentStage::Complete && !self.has_pending_question() {
                self.locked = true;
            }
        }

        self.updated_at = now;

        Ok(TurnTransition {
            score: self.completion_score,
            stage: self.stage,
            locked: self.locked,
            breakdown,
        })
    }

    /// Manual completion path: floor the score so ending early does not
    /// under-report progress, jump straight to `Complete`, and lock.
    pub fn force_complete(&mut self, config: &ProgressConfig, now: DateTime<Utc>) {
        self.completion_score = self.completion_score.max(config.forced_completion_score);
        self.stage = AssessmentStage::Complete;
        self.locked = true;
        self.updated_at = now;
    }

    /// Called when a newer session becomes the user's active one. The old
    /// session stays readable but accepts no further patient turns.
    pub fn supersede(&mut self, now: DateTime<Utc>) {
        self.active = false;
        self.locked = true;
        self.updated_at = now;
    }
}
