//! Shared worker pool for chunk execution
//!
//! The pool does not distinguish between data chunks and synthetic
//! whole-operation chunks; everything submitted shares the same admission
//! budget, so a flood of small metadata operations cannot bypass the
//! concurrency limit that governs data transfers.

use crate::chunk::ChunkUnit;
use cirruscp_config::Config;
use cirruscp_types::WorkerCount;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::debug;

/// Configuration for the worker pool
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of units that may execute concurrently
    pub workers: WorkerCount,
}

impl PoolConfig {
    /// Create pool config from the main configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            workers: config.engine.workers,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: WorkerCount::clamped(num_cpus::get()),
        }
    }
}

/// Shared, semaphore-gated executor for chunk units.
///
/// `schedule` hands the unit to the runtime immediately; execution begins
/// once one of the pool's permits is free. The pool is shared by every
/// transfer in the job.
#[derive(Debug)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    in_flight: Arc<AtomicUsize>,
    workers: usize,
}

impl WorkerPool {
    /// Create a new worker pool
    pub fn new(config: PoolConfig) -> Self {
        let workers = config.workers.get();
        Self {
            semaphore: Arc::new(Semaphore::new(workers)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            workers,
        }
    }

    /// Submit one unit for execution on the pool
    pub fn schedule(&self, unit: ChunkUnit) {
        let semaphore = Arc::clone(&self.semaphore);
        let in_flight = Arc::clone(&self.in_flight);
        let id = unit.id();

        in_flight.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(async move {
            match semaphore.acquire_owned().await {
                Ok(_permit) => {
                    debug!("executing chunk {}", id);
                    unit.run().await;
                }
                Err(_) => {
                    // Pool closed while the unit waited for admission.
                    debug!("pool closed, dropping chunk {}", id);
                }
            }
            in_flight.fetch_sub(1, Ordering::SeqCst);
        });
    }

    /// Number of units scheduled but not yet finished
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Concurrency limit of the pool
    pub fn worker_count(&self) -> usize {
        self.workers
    }

    /// Wait until every scheduled unit has finished
    pub async fn drain(&self) {
        let mut interval = tokio::time::interval(Duration::from_millis(10));
        loop {
            interval.tick().await;
            if self.in_flight() == 0 {
                return;
            }
        }
    }

    /// Close the pool; units still waiting for admission are dropped
    pub fn close(&self) {
        self.semaphore.close();
    }
}
