//! Outcome records for individual test units
//!
//! A unit runs one or more sub-cases. Each sub-case reports a [`CaseOutcome`],
//! and the worker folds them into a single [`OutcomeRecord`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::UnitId;

/// A labelled entry with free-form text
///
/// The text is a trace for failures and errors, and a reason for skips.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    pub label: String,
    pub text: String,
}

impl Entry {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// Status of a single sub-case
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaseStatus {
    Pass,
    Fail(String),
    Error(String),
    Skip(String),
    ExpectedFailure(String),
    UnexpectedSuccess,
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseStatus::Pass => write!(f, "ok"),
            CaseStatus::Fail(_) => write!(f, "FAIL"),
            CaseStatus::Error(_) => write!(f, "ERROR"),
            CaseStatus::Skip(reason) => write!(f, "skipped {reason:?}"),
            CaseStatus::ExpectedFailure(_) => write!(f, "expected failure"),
            CaseStatus::UnexpectedSuccess => write!(f, "unexpected success"),
        }
    }
}

/// Outcome of one sub-case inside a unit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseOutcome {
    pub label: String,
    pub status: CaseStatus,
}

impl CaseOutcome {
    pub fn pass(label: impl Into<String>) -> Self {
        Self::new(label, CaseStatus::Pass)
    }

    pub fn fail(label: impl Into<String>, trace: impl Into<String>) -> Self {
        Self::new(label, CaseStatus::Fail(trace.into()))
    }

    pub fn error(label: impl Into<String>, trace: impl Into<String>) -> Self {
        Self::new(label, CaseStatus::Error(trace.into()))
    }

    pub fn skip(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(label, CaseStatus::Skip(reason.into()))
    }

    pub fn expected_failure(label: impl Into<String>, trace: impl Into<String>) -> Self {
        Self::new(label, CaseStatus::ExpectedFailure(trace.into()))
    }

    pub fn unexpected_success(label: impl Into<String>) -> Self {
        Self::new(label, CaseStatus::UnexpectedSuccess)
    }

    fn new(label: impl Into<String>, status: CaseStatus) -> Self {
        Self {
            label: label.into(),
            status,
        }
    }
}

/// Result of executing one test unit
#[derive(Clone, Debug)]
pub struct OutcomeRecord {
    pub unit_id: UnitId,
    pub tests_run: usize,
    pub failures: Vec<Entry>,
    pub errors: Vec<Entry>,
    pub skipped: Vec<Entry>,
    pub expected_failures: Vec<Entry>,
    pub unexpected_successes: Vec<String>,
    /// Time spent executing the unit, not counting time spent queued
    pub duration: Duration,
}

impl OutcomeRecord {
    /// Empty record for a unit that has not run any sub-case yet
    pub fn new(unit_id: UnitId) -> Self {
        Self {
            unit_id,
            tests_run: 0,
            failures: Vec::new(),
            errors: Vec::new(),
            skipped: Vec::new(),
            expected_failures: Vec::new(),
            unexpected_successes: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    /// Fold sub-case outcomes into a record
    pub fn from_cases(
        unit_id: UnitId,
        cases: impl IntoIterator<Item = CaseOutcome>,
        duration: Duration,
    ) -> Self {
        let mut record = Self::new(unit_id).with_duration(duration);
        for case in cases {
            record.record_case(case);
        }
        record
    }

    /// Record holding a single error entry scoped to the unit itself
    ///
    /// Used when a unit can't be loaded or blows up outside of any sub-case.
    /// The unit counts as one test run.
    pub fn unit_error(unit_id: UnitId, trace: impl Into<String>) -> Self {
        let label = unit_id.to_string();
        let mut record = Self::new(unit_id);
        record.record_case(CaseOutcome::error(label, trace));
        record
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Add one sub-case to the record
    pub fn record_case(&mut self, case: CaseOutcome) {
        self.tests_run += 1;
        let CaseOutcome { label, status } = case;
        match status {
            CaseStatus::Pass => {}
            CaseStatus::Fail(trace) => self.failures.push(Entry::new(label, trace)),
            CaseStatus::Error(trace) => self.errors.push(Entry::new(label, trace)),
            CaseStatus::Skip(reason) => self.skipped.push(Entry::new(label, reason)),
            CaseStatus::ExpectedFailure(trace) => {
                self.expected_failures.push(Entry::new(label, trace))
            }
            CaseStatus::UnexpectedSuccess => self.unexpected_successes.push(label),
        }
    }

    /// True iff there are no failures and no errors
    pub fn was_successful(&self) -> bool {
        self.failures.is_empty() && self.errors.is_empty()
    }
}
