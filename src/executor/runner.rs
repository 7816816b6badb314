//! Test execution runner
//!
//! Drives one complete run: discovery, dispatch, parallel execution, streaming
//! progress and the final report.

use chrono::Utc;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, info};

use super::{CompletionLoop, Dispatcher, WorkerPool};
use crate::catalog::Catalog;
use crate::config::RunConfig;
use crate::error::RunError;
use crate::models::AggregateResult;
use crate::output::{write_report_to_file, ProgressReporter, ResultFormatter};

/// Test runner over a single catalog
pub struct TestRunner<C: Catalog + 'static> {
    catalog: C,
    config: RunConfig,
}

impl<C: Catalog + 'static> TestRunner<C> {
    pub fn new(catalog: C, config: RunConfig) -> Self {
        Self { catalog, config }
    }

    /// Run every unit reachable from `target`
    ///
    /// Progress and the final report go to `writer`. A discovery failure
    /// aborts before anything is dispatched or written.
    pub async fn run<W: Write>(
        mut self,
        target: &str,
        writer: W,
    ) -> Result<AggregateResult, RunError> {
        let units = self.catalog.discover(target)?;
        debug!("discovered {} units for target {:?}", units.len(), target);

        let queue = Dispatcher::new(&self.config).dispatch(units);
        let pool = WorkerPool::new(self.config.thread_count);
        info!(
            "running {} work items on {} workers",
            queue.len(),
            pool.thread_count()
        );

        let started_at = Utc::now();
        let mut aggregate = AggregateResult::new();
        let mut submission = pool.submit(Arc::new(self.catalog), queue);
        let mut reporter = ProgressReporter::new(writer, self.config.verbosity, submission.total());

        CompletionLoop::default()
            .drain(&mut submission, &mut aggregate, |record| reporter.render(record))
            .await;
        submission.finish().await;
        let finished_at = Utc::now();

        let report = ResultFormatter::new(self.config.format)
            .collapse_repeats(self.config.is_stress_run())
            .format(&aggregate, started_at, finished_at)?;
        reporter.finish(&report)?;

        if let Some(path) = &self.config.output {
            write_report_to_file(path, &report)?;
            info!("report written to {}", path.display());
        }

        Ok(aggregate)
    }
}

/// Run `target` from `catalog` with `config`, writing output to `writer`
pub async fn run<C, W>(
    catalog: C,
    target: &str,
    config: &RunConfig,
    writer: W,
) -> Result<AggregateResult, RunError>
where
    C: Catalog + 'static,
    W: Write,
{
    TestRunner::new(catalog, config.clone()).run(target, writer).await
}
