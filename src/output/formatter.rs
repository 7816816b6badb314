//! Final report formats
//!
//! Text is the classic summary. JSON is a machine-readable report of the same
//! aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::summary::render_summary;
use crate::models::{AggregateResult, Entry};

/// Output format options
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "summary" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Serializable view of a finished run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub successful: bool,
    pub tests_run: usize,
    pub failures: Vec<Entry>,
    pub errors: Vec<Entry>,
    pub skipped: Vec<Entry>,
    pub expected_failures: Vec<Entry>,
    pub unexpected_successes: Vec<String>,
    pub duration_ns: u64,
    pub collected_duration_ns: u64,
    pub saved_ns: Option<u64>,
}

impl RunReport {
    pub fn new(
        result: &AggregateResult,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            started_at,
            finished_at,
            successful: result.was_successful(),
            tests_run: result.tests_run,
            failures: result.failures.clone(),
            errors: result.errors.clone(),
            skipped: result.skipped.clone(),
            expected_failures: result.expected_failures.clone(),
            unexpected_successes: result.unexpected_successes.clone(),
            duration_ns: result.duration.as_nanos() as u64,
            collected_duration_ns: result.collected_duration.as_nanos() as u64,
            saved_ns: result.parallel_savings().map(|d| d.as_nanos() as u64),
        }
    }
}

/// Result formatter
pub struct ResultFormatter {
    format: OutputFormat,
    collapse_repeats: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            collapse_repeats: false,
        }
    }

    /// Collapse identical failure entries, as stress runs do
    pub fn collapse_repeats(mut self, collapse: bool) -> Self {
        self.collapse_repeats = collapse;
        self
    }

    /// Format the final report for a finished run
    pub fn format(
        &self,
        result: &AggregateResult,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> serde_json::Result<String> {
        match self.format {
            OutputFormat::Text => Ok(render_summary(result, self.collapse_repeats)),
            OutputFormat::Json => {
                let report = RunReport::new(result, started_at, finished_at);
                serde_json::to_string_pretty(&report)
            }
        }
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Text)
    }
}

/// Write a formatted report to a file
pub fn write_report_to_file(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CaseOutcome, OutcomeRecord, UnitId};
    use std::time::Duration;

    fn sample() -> AggregateResult {
        let mut result = AggregateResult::new();
        result += &OutcomeRecord::from_cases(
            UnitId::from("a"),
            vec![CaseOutcome::fail("a", "boom"), CaseOutcome::skip("a.slow", "slow")],
            Duration::from_millis(3),
        );
        result.duration = Duration::from_millis(2);
        result
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("TEXT"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::from_str("unknown"), None);
    }

    #[test]
    fn test_json_report() {
        let now = Utc::now();
        let output = ResultFormatter::new(OutputFormat::Json)
            .format(&sample(), now, now)
            .unwrap();
        let report: RunReport = serde_json::from_str(&output).unwrap();
        assert!(!report.successful);
        assert_eq!(report.tests_run, 2);
        assert_eq!(report.failures, vec![Entry::new("a", "boom")]);
        assert_eq!(report.duration_ns, 2_000_000);
        assert_eq!(report.collected_duration_ns, 3_000_000);
        assert_eq!(report.saved_ns, Some(1_000_000));
    }

    #[test]
    fn test_text_report() {
        let now = Utc::now();
        let output = ResultFormatter::default().format(&sample(), now, now).unwrap();
        assert!(output.contains("FAIL: a"));
        assert!(output.ends_with("FAILED (failures=1, skipped=1)"));
    }

    #[test]
    fn test_write_report_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("run.json");
        write_report_to_file(&path, "{}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }
}
