use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for assessment sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for the patient being assessed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who authored a turn in the assessment conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnAuthor {
    Patient,
    Attendant,
}

impl TurnAuthor {
    pub const fn label(self) -> &'static str {
        match self {
            TurnAuthor::Patient => "patient",
            TurnAuthor::Attendant => "attendant",
        }
    }
}

/// One message in the conversation. Immutable once appended; ordered by
/// `sequence`, which is dense from 1 within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub author: TurnAuthor,
    pub text: String,
    pub sequence: u32,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    /// An attendant turn that ends in a question mark is an open question the
    /// patient has not yet answered.
    pub fn is_open_question(&self) -> bool {
        matches!(self.author, TurnAuthor::Attendant) && self.text.trim_end().ends_with('?')
    }
}

/// Best-effort snapshot of what is already on file for a patient. Assembled by
/// an external collaborator and consumed read-only; missing fields mean
/// "unknown" and never fail the scorer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    pub age: Option<u8>,
    pub gender: Option<String>,
    pub prior_symptoms: BTreeSet<String>,
    pub hearing_status: Option<String>,
    pub prior_assessment_count: u32,
    pub last_assessment_date: Option<NaiveDate>,
}
