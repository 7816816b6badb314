//! Final summary text
//!
//! ```text
//! ======================================================
//! FAIL: suite.unit (x10)
//! ------------------------------------------------------
//! assertion failed
//!
//! ------------------------------------------------------
//! Ran 50 tests in 1.204s (saved 3.112s)
//!
//! FAILED (failures=10)
//! ```

use std::collections::HashMap;

use crate::models::{AggregateResult, Entry};
use crate::utils::format_duration;

/// Rule width used when there is nothing to report
const DEFAULT_RULE_WIDTH: usize = 70;

struct Block {
    label: String,
    trace: String,
    count: usize,
}

/// Render the end-of-run summary for an aggregate
///
/// With `collapse_repeats` set, identical entries (same kind, label and trace)
/// are shown once with an `(xN)` suffix. Stress runs use this.
pub fn render_summary(result: &AggregateResult, collapse_repeats: bool) -> String {
    let blocks = collect_blocks(result, collapse_repeats);

    let labels: Vec<String> = blocks
        .iter()
        .map(|b| {
            if collapse_repeats {
                format!("{} (x{})", b.label, b.count)
            } else {
                b.label.clone()
            }
        })
        .collect();
    let width = labels
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(DEFAULT_RULE_WIDTH);

    let rendered: Vec<String> = blocks
        .iter()
        .zip(&labels)
        .map(|(block, label)| {
            let mut trace = block.trace.clone();
            if !trace.ends_with('\n') {
                trace.push('\n');
            }
            format!("{}\n{}\n{}\n{}", "=".repeat(width), label, "-".repeat(width), trace)
        })
        .collect();

    let mut msg = String::from("\n");
    msg.push_str(&rendered.join("\n"));
    msg.push_str(&"-".repeat(width));
    msg.push_str(&format!(
        "\nRan {} tests in {}",
        result.tests_run,
        format_duration(result.duration)
    ));
    if let Some(saved) = result.parallel_savings() {
        msg.push_str(&format!(" (saved {})", format_duration(saved)));
    }
    msg.push_str("\n\n");
    msg.push_str(&status_line(result));
    msg
}

/// `OK` or `FAILED`, followed by the nonzero counts
pub fn status_line(result: &AggregateResult) -> String {
    let mut line = if result.was_successful() {
        "OK".to_string()
    } else {
        "FAILED".to_string()
    };

    let mut parts = Vec::new();
    if !result.errors.is_empty() {
        parts.push(format!("errors={}", result.errors.len()));
    }
    if !result.failures.is_empty() {
        parts.push(format!("failures={}", result.failures.len()));
    }
    if !result.skipped.is_empty() {
        parts.push(format!("skipped={}", result.skipped.len()));
    }
    if !result.expected_failures.is_empty() {
        parts.push(format!("expected failures={}", result.expected_failures.len()));
    }

    if !parts.is_empty() {
        line.push_str(&format!(" ({})", parts.join(", ")));
    }
    line
}

fn collect_blocks(result: &AggregateResult, collapse_repeats: bool) -> Vec<Block> {
    let entries = result
        .errors
        .iter()
        .map(|e| ("ERROR", e))
        .chain(result.failures.iter().map(|e| ("FAIL", e)));

    let mut blocks: Vec<Block> = Vec::new();
    let mut index: HashMap<(String, &str), usize> = HashMap::new();

    for (kind, Entry { label, text }) in entries {
        let label = format!("{kind}: {label}");
        if collapse_repeats {
            if let Some(&i) = index.get(&(label.clone(), text.as_str())) {
                blocks[i].count += 1;
                continue;
            }
            index.insert((label.clone(), text.as_str()), blocks.len());
        }
        blocks.push(Block {
            label,
            trace: text.clone(),
            count: 1,
        });
    }
    blocks
}
