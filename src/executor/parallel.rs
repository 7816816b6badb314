//! Parallel unit execution
//!
//! A [`WorkerPool`] runs at most `thread_count` units at a time. A feeder task
//! walks the submission queue, waits for a free slot and starts the next unit
//! on the blocking thread pool, since units are free to sleep or block. Each
//! unit sends exactly one [`OutcomeRecord`] back over a channel.
//!
//! The [`CompletionLoop`] drains that channel in completion order and is the
//! only writer of the run's [`AggregateResult`].

use futures::future::join_all;
use std::any::Any;
use std::collections::{BTreeMap, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::error::ResolutionError;
use crate::models::{AggregateResult, OutcomeRecord, UnitId};
use crate::utils::Timer;

/// Default bounded wait between completion checks
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Resolve a unit through the catalog and execute it
///
/// The returned record is timed from the moment the unit starts running, so
/// queueing and loading are not included. A panic inside the unit is turned
/// into a single error entry.
pub fn resolve_and_run(
    catalog: &dyn Catalog,
    id: &UnitId,
) -> Result<OutcomeRecord, ResolutionError> {
    debug!("Loading unit {}", id);
    let runnable = catalog.resolve(id)?;

    debug!("Running unit {}", id);
    let timer = Timer::start(format!("Finished unit {id}"));
    let cases = panic::catch_unwind(AssertUnwindSafe(|| runnable.run()));
    let duration = timer.stop();

    let record = match cases {
        Ok(cases) => OutcomeRecord::from_cases(id.clone(), cases, duration),
        Err(payload) => OutcomeRecord::unit_error(
            id.clone(),
            format!("unit panicked: {}\n", panic_message(payload.as_ref())),
        )
        .with_duration(duration),
    };
    Ok(record)
}

/// Run one work item; never fails and never unwinds
fn run_work_item(catalog: &dyn Catalog, id: UnitId) -> OutcomeRecord {
    match panic::catch_unwind(AssertUnwindSafe(|| resolve_and_run(catalog, &id))) {
        Ok(Ok(record)) => record,
        Ok(Err(e)) => {
            debug!("Could not resolve {}: {}", id, e);
            OutcomeRecord::unit_error(id, format!("{e}\n"))
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!("loading {} panicked: {}", id, message);
            OutcomeRecord::unit_error(id, format!("unit panicked while loading: {message}\n"))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}

/// Fixed-size pool of execution slots
#[derive(Clone, Debug)]
pub struct WorkerPool {
    thread_count: usize,
}

impl WorkerPool {
    pub fn new(thread_count: usize) -> Self {
        Self {
            thread_count: thread_count.max(1),
        }
    }

    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    /// Hand the whole submission queue to the pool
    ///
    /// Must be called from within a tokio runtime. Units start in queue order
    /// as slots free up.
    pub fn submit(&self, catalog: Arc<dyn Catalog>, queue: VecDeque<UnitId>) -> Submission {
        let total = queue.len();
        let mut pending: BTreeMap<UnitId, usize> = BTreeMap::new();
        for id in &queue {
            *pending.entry(id.clone()).or_default() += 1;
        }
        let (tx, rx) = unbounded_channel();
        let semaphore = Arc::new(Semaphore::new(self.thread_count));

        debug!(
            "submitting {} units to {} workers",
            total, self.thread_count
        );

        let feeder = tokio::spawn(async move {
            let mut handles = Vec::with_capacity(total);

            for id in queue {
                let permit = match semaphore.clone().acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        warn!("worker slots closed, {} units not started", total - handles.len());
                        break;
                    }
                };
                let catalog = catalog.clone();
                let tx = tx.clone();

                handles.push(tokio::task::spawn_blocking(move || {
                    let record = run_work_item(catalog.as_ref(), id);
                    if tx.send(record).is_err() {
                        debug!("completion loop is gone, dropping outcome");
                    }
                    drop(permit);
                }));
            }

            handles
        });

        Submission {
            receiver: rx,
            feeder,
            total,
            pending,
        }
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(crate::config::default_thread_count())
    }
}

/// Work handed to the pool, with the channel its outcomes arrive on
pub struct Submission {
    receiver: UnboundedReceiver<OutcomeRecord>,
    feeder: JoinHandle<Vec<JoinHandle<()>>>,
    total: usize,
    /// Replicas of each unit still owed a record
    pending: BTreeMap<UnitId, usize>,
}

impl Submission {
    /// Number of submitted work items
    pub fn total(&self) -> usize {
        self.total
    }

    fn settle(&mut self, id: &UnitId) {
        if let Some(count) = self.pending.get_mut(id) {
            *count -= 1;
            if *count == 0 {
                self.pending.remove(id);
            }
        }
    }

    /// Wait for every worker to wind down
    pub async fn finish(self) {
        let handles = match self.feeder.await {
            Ok(handles) => handles,
            Err(e) => {
                warn!("feeder task failed: {}", e);
                return;
            }
        };

        for result in join_all(handles).await {
            if let Err(e) = result {
                warn!("worker task failed: {}", e);
            }
        }
    }
}

/// Drains worker output as it becomes available
#[derive(Clone, Debug)]
pub struct CompletionLoop {
    poll_interval: Duration,
}

impl CompletionLoop {
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    /// Merge every outcome into `aggregate` and pass it to `on_outcome`
    ///
    /// Returns once every submitted unit has reported. Outcomes arrive in
    /// completion order. If the channel closes early, each replica still owed
    /// a record is merged as an error entry, so a lost unit always fails the
    /// run. A failing `on_outcome` is logged and does not stop the loop.
    pub async fn drain<F>(
        &self,
        submission: &mut Submission,
        aggregate: &mut AggregateResult,
        mut on_outcome: F,
    ) -> usize
    where
        F: FnMut(&OutcomeRecord) -> std::io::Result<()>,
    {
        let total = submission.total;
        let mut completed = 0;
        let mut merge = |record: &OutcomeRecord, aggregate: &mut AggregateResult| {
            aggregate.accrete(record);
            if let Err(e) = on_outcome(record) {
                warn!("failed to report {}: {}", record.unit_id, e);
            }
        };

        while completed < total {
            match tokio::time::timeout(self.poll_interval, submission.receiver.recv()).await {
                Ok(Some(record)) => {
                    completed += 1;
                    submission.settle(&record.unit_id);
                    merge(&record, &mut *aggregate);
                }
                Ok(None) => {
                    warn!(
                        "outcome channel closed with {} of {} units outstanding",
                        total - completed,
                        total
                    );
                    for (id, missing) in std::mem::take(&mut submission.pending) {
                        for _ in 0..missing {
                            let record = OutcomeRecord::unit_error(
                                id.clone(),
                                "worker exited without reporting an outcome\n",
                            );
                            completed += 1;
                            merge(&record, &mut *aggregate);
                        }
                    }
                    break;
                }
                Err(_) => debug!("waiting on {} of {} units", total - completed, total),
            }
        }

        aggregate.stop_run();
        completed
    }
}

impl Default for CompletionLoop {
    fn default() -> Self {
        Self::new(POLL_INTERVAL)
    }
}
