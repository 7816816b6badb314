//! Data models for test execution
//!
//! Unit references, per-unit outcome records and the run-wide aggregate.

mod aggregate;
mod outcome;
mod unit;

pub use aggregate::AggregateResult;
pub use outcome::{CaseOutcome, CaseStatus, Entry, OutcomeRecord};
pub use unit::UnitId;
