//! Output formatting module
//!
//! Streaming progress while a run is in flight, and the final report.

mod formatter;
mod progress;
mod summary;

pub use formatter::{write_report_to_file, OutputFormat, ResultFormatter, RunReport};
pub use progress::{progress_char, ProgressReporter};
pub use summary::{render_summary, status_line};
