//! Bounded worker pool shared by every pipeline stage

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// What happened to the units submitted to a [`WorkerPool`]
#[derive(Debug)]
pub struct PoolOutcome<T> {
    /// Outputs of units that ran to completion, in completion order
    pub results: Vec<T>,

    /// Units that panicked
    pub failed: usize,

    /// Units cancelled because the join deadline passed
    pub cancelled: usize,

    /// Whether the join deadline was hit
    pub timed_out: bool,
}

impl<T> PoolOutcome<T> {
    fn new(capacity: usize) -> Self {
        Self {
            results: Vec::with_capacity(capacity),
            failed: 0,
            cancelled: 0,
            timed_out: false,
        }
    }
}

/// Fixed-size pool: at most `size` submitted units run at once.
///
/// Units are spawned eagerly onto the runtime and wait on a semaphore permit
/// before doing any work. Dropping the pool aborts whatever is still pending.
pub struct WorkerPool<T> {
    name: &'static str,
    size: usize,
    permits: Arc<Semaphore>,
    tasks: JoinSet<T>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Create a pool; a size of zero is treated as one
    pub fn new(name: &'static str, size: usize) -> Self {
        let size = size.max(1);
        Self {
            name,
            size,
            permits: Arc::new(Semaphore::new(size)),
            tasks: JoinSet::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Units submitted and not yet joined
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Queue a unit of work
    pub fn submit<F>(&mut self, unit: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        self.tasks.spawn(async move {
            // The semaphore is never closed, so acquiring only fails if that changes.
            let _permit = permits.acquire_owned().await.ok();
            unit.await
        });
    }

    /// Wait for every submitted unit
    pub async fn join(mut self) -> PoolOutcome<T> {
        let mut outcome = PoolOutcome::new(self.tasks.len());

        while let Some(joined) = self.tasks.join_next().await {
            Self::record(&mut outcome, joined, self.name);
        }

        outcome
    }

    /// Wait for submitted units until `timeout` elapses, then abort the rest.
    ///
    /// Results of units that finished before the deadline are kept.
    pub async fn join_with_timeout(mut self, timeout: Duration) -> PoolOutcome<T> {
        let mut outcome = PoolOutcome::new(self.tasks.len());
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            match tokio::time::timeout_at(deadline, self.tasks.join_next()).await {
                Ok(Some(joined)) => Self::record(&mut outcome, joined, self.name),
                Ok(None) => break,
                Err(_) => {
                    outcome.timed_out = true;
                    warn!(
                        pool = self.name,
                        outstanding = self.tasks.len(),
                        timeout_secs = timeout.as_secs_f64(),
                        "Pool join timed out, cancelling outstanding work"
                    );
                    self.tasks.abort_all();
                    break;
                }
            }
        }

        // Drain aborted units; anything that finished in the meantime still counts.
        while let Some(joined) = self.tasks.join_next().await {
            Self::record(&mut outcome, joined, self.name);
        }

        outcome
    }

    fn record(
        outcome: &mut PoolOutcome<T>,
        joined: Result<T, tokio::task::JoinError>,
        name: &'static str,
    ) {
        match joined {
            Ok(value) => outcome.results.push(value),
            Err(e) if e.is_cancelled() => outcome.cancelled += 1,
            Err(e) => {
                outcome.failed += 1;
                warn!(pool = name, error = %e, "Pool unit panicked");
            }
        }
        debug!(pool = name, completed = outcome.results.len(), "Pool unit joined");
    }
}

/// Writer pool size: `max` bounded by the machine's available parallelism
pub fn bounded_by_parallelism(max: usize) -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    max.min(cpus).max(1)
}
