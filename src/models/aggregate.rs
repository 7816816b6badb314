//! Aggregate result for a whole run
//!
//! The aggregate is owned by the completion loop and grows one outcome record
//! at a time. Every count and entry list combines associatively and
//! commutatively, so the final totals do not depend on completion order.

use std::ops::{Add, AddAssign};
use std::time::{Duration, Instant};

use super::{Entry, OutcomeRecord};

/// Running totals over every outcome record merged so far
#[derive(Clone, Debug)]
pub struct AggregateResult {
    pub tests_run: usize,
    pub failures: Vec<Entry>,
    pub errors: Vec<Entry>,
    pub skipped: Vec<Entry>,
    pub expected_failures: Vec<Entry>,
    pub unexpected_successes: Vec<String>,
    /// Wall-clock time since the aggregate was created
    pub duration: Duration,
    /// Sum of the execution time of every merged unit
    pub collected_duration: Duration,
    started: Instant,
}

impl AggregateResult {
    /// Create an empty aggregate and start its wall clock
    pub fn new() -> Self {
        Self {
            tests_run: 0,
            failures: Vec::new(),
            errors: Vec::new(),
            skipped: Vec::new(),
            expected_failures: Vec::new(),
            unexpected_successes: Vec::new(),
            duration: Duration::ZERO,
            collected_duration: Duration::ZERO,
            started: Instant::now(),
        }
    }

    /// Fold one unit's outcome into the totals
    pub fn accrete(&mut self, record: &OutcomeRecord) {
        self.tests_run += record.tests_run;
        self.failures.extend_from_slice(&record.failures);
        self.errors.extend_from_slice(&record.errors);
        self.skipped.extend_from_slice(&record.skipped);
        self.expected_failures
            .extend_from_slice(&record.expected_failures);
        self.unexpected_successes
            .extend_from_slice(&record.unexpected_successes);
        self.collected_duration += record.duration;
        self.duration = self.started.elapsed();
    }

    /// Combine two whole aggregates into a fresh one
    ///
    /// The result's `collected_duration` is the sum of both inputs' wall-clock
    /// durations, and its own wall clock starts at zero.
    pub fn merge(&self, other: &AggregateResult) -> AggregateResult {
        let mut result = AggregateResult::new();
        result.tests_run = self.tests_run + other.tests_run;
        result.failures = concat(&self.failures, &other.failures);
        result.errors = concat(&self.errors, &other.errors);
        result.skipped = concat(&self.skipped, &other.skipped);
        result.expected_failures = concat(&self.expected_failures, &other.expected_failures);
        result.unexpected_successes =
            concat(&self.unexpected_successes, &other.unexpected_successes);
        result.collected_duration = self.duration + other.duration;
        result
    }

    /// Freeze the wall-clock duration at the end of the run
    pub fn stop_run(&mut self) {
        self.duration = self.started.elapsed();
    }

    /// True iff no failures and no errors were recorded
    pub fn was_successful(&self) -> bool {
        self.failures.is_empty() && self.errors.is_empty()
    }

    /// Time saved by running units in parallel
    ///
    /// Returns `None` unless the saving exceeds 10% of the wall-clock duration.
    pub fn parallel_savings(&self) -> Option<Duration> {
        let saved = self.collected_duration.checked_sub(self.duration)?;
        if saved.is_zero() || self.duration.is_zero() {
            return None;
        }
        (saved.as_nanos() * 10 > self.duration.as_nanos()).then_some(saved)
    }
}

impl Default for AggregateResult {
    fn default() -> Self {
        Self::new()
    }
}

impl AddAssign<&OutcomeRecord> for AggregateResult {
    fn add_assign(&mut self, record: &OutcomeRecord) {
        self.accrete(record);
    }
}

impl Add for &AggregateResult {
    type Output = AggregateResult;

    fn add(self, other: &AggregateResult) -> AggregateResult {
        self.merge(other)
    }
}

fn concat<T: Clone>(a: &[T], b: &[T]) -> Vec<T> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    out.extend_from_slice(a);
    out.extend_from_slice(b);
    out
}
