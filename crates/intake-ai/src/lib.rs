//! Conversation-progress engine for guided hearing-health assessments.
//!
//! The [`assessment`] module owns the core logic: a completion scorer over the
//! transcript, a stage classifier, the per-session state machine, and the gate
//! policy consulted before a report may be generated or an interview finished
//! early. Persistence and user-profile lookup are traits so the engine can run
//! against in-memory adapters in tests and a durable store in production.

pub mod assessment;
pub mod config;
pub mod error;
pub mod telemetry;
