//! Streaming progress output
//!
//! One event per completed unit, rendered according to the run's verbosity.

use std::io::{self, Write};

use crate::config::Verbosity;
use crate::models::OutcomeRecord;
use crate::utils::format_duration;

/// Writes per-unit progress and the final report
pub struct ProgressReporter<W: Write> {
    writer: W,
    verbosity: Verbosity,
    completed: usize,
    total: usize,
}

impl<W: Write> ProgressReporter<W> {
    pub fn new(writer: W, verbosity: Verbosity, total: usize) -> Self {
        Self {
            writer,
            verbosity,
            completed: 0,
            total,
        }
    }

    /// Number of outcomes rendered so far
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Render one completed unit
    pub fn render(&mut self, record: &OutcomeRecord) -> io::Result<()> {
        self.completed += 1;
        match self.verbosity {
            Verbosity::Verbose => writeln!(
                self.writer,
                "[{}/{}] {} ... {} {}",
                self.completed,
                self.total,
                record.unit_id,
                if record.was_successful() { "OK" } else { "FAIL" },
                format_duration(record.duration)
            )?,
            Verbosity::Normal => write!(self.writer, "{}", progress_char(record))?,
            Verbosity::Quiet => return Ok(()),
        }
        self.writer.flush()
    }

    /// Write the final report, at every verbosity
    pub fn finish(&mut self, report: &str) -> io::Result<()> {
        writeln!(self.writer, "{report}")?;
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Single-character marker for a unit in normal verbosity
pub fn progress_char(record: &OutcomeRecord) -> char {
    if !record.errors.is_empty() {
        'E'
    } else if !record.failures.is_empty() {
        'F'
    } else if !record.expected_failures.is_empty() {
        'x'
    } else if !record.skipped.is_empty() {
        's'
    } else {
        '.'
    }
}
