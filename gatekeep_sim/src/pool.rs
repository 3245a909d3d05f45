//! Worker pool for independent gatekeeper repetitions.

use crate::error::{GatekeepError, GatekeepResult};
use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinSet;
use tracing::debug;

/// A fixed-size pool running blocking jobs to completion.
///
/// Jobs share nothing; results come back in completion order, which is
/// unrelated to submission order.
pub struct WorkerPool {
    runtime: Runtime,
    workers: usize,
}

impl WorkerPool {
    /// Creates a pool with `workers` threads.
    pub fn new(workers: usize) -> GatekeepResult<Self> {
        if workers == 0 {
            return Err(GatekeepError::config("worker pool needs at least one worker"));
        }

        let runtime = Builder::new_multi_thread()
            .worker_threads(workers)
            .max_blocking_threads(workers)
            .thread_name("gatekeep-worker")
            .enable_all()
            .build()
            .map_err(GatekeepError::worker)?;

        debug!(workers, "Worker pool started");
        Ok(Self { runtime, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs every job and collects the results, unordered.
    ///
    /// The first failure (an error returned by a job, or a panic) aborts the
    /// jobs that have not started yet and is returned.
    pub fn run_all<T, F>(&self, jobs: Vec<F>) -> GatekeepResult<Vec<T>>
    where
        F: FnOnce() -> GatekeepResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.runtime.block_on(async move {
            let mut set = JoinSet::new();
            for job in jobs {
                set.spawn_blocking(job);
            }

            let mut results = Vec::with_capacity(set.len());
            while let Some(joined) = set.join_next().await {
                match joined {
                    Ok(Ok(value)) => results.push(value),
                    Ok(Err(err)) => {
                        set.abort_all();
                        return Err(err);
                    }
                    Err(join_err) => {
                        set.abort_all();
                        return Err(GatekeepError::worker(join_err));
                    }
                }
            }
            Ok(results)
        })
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool").field("workers", &self.workers).finish()
    }
}
