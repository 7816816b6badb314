//! Test execution engine
//!
//! Orders the work, runs it on a bounded pool and folds the outcomes into one
//! aggregate.

mod dispatcher;
mod parallel;
mod runner;

pub use dispatcher::Dispatcher;
pub use parallel::{resolve_and_run, CompletionLoop, Submission, WorkerPool, POLL_INTERVAL};
pub use runner::{run, TestRunner};
