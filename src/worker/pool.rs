//! Worker pool for pipelined salt mining.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::unbounded;
use tracing::{debug, info, warn};

use crate::error::{DeployError, DeployResult};
use crate::matcher::{Address, PrefixPattern};
use crate::oracle::AddressOracle;

use super::cpu::{CpuWorker, SearchState, WorkerEvent, WorkerStats};
use super::miner::{validate_bound, MiningOutcome};

/// Salts claimed by a worker at a time.
pub const DEFAULT_CHUNK_SIZE: u64 = 64;

/// Keeps several oracle queries in flight across worker threads.
///
/// The selected salt is always the one a sequential [`super::SaltMiner`]
/// would return: the lowest salt that either matches or fails. Matches and
/// failures above that salt are discarded.
pub struct WorkerPool<O> {
    num_workers: usize,
    chunk_size: u64,
    oracle: O,
    stop_flag: Arc<AtomicBool>,
    stats: Arc<WorkerStats>,
}

impl<O: AddressOracle + Sync> WorkerPool<O> {
    pub fn new(num_workers: usize, oracle: O) -> Self {
        Self::with_stop_flag(num_workers, oracle, Arc::new(AtomicBool::new(false)))
    }

    pub fn with_stop_flag(num_workers: usize, oracle: O, stop_flag: Arc<AtomicBool>) -> Self {
        Self {
            num_workers: num_workers.max(1),
            chunk_size: DEFAULT_CHUNK_SIZE,
            oracle,
            stop_flag,
            stats: Arc::new(WorkerStats::new()),
        }
    }

    /// Overrides how many consecutive salts a worker claims at once.
    pub fn chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Searches `[0, max_salt)` with `num_workers` threads.
    ///
    /// Worker 0 runs on the calling thread, so the search proceeds even when
    /// no extra thread can be spawned.
    pub fn mine(
        &self,
        owner: &Address,
        target: &Address,
        prefix: &PrefixPattern,
        max_salt: u64,
    ) -> DeployResult<MiningOutcome> {
        validate_bound(max_salt)?;
        debug!(
            %owner, %target, %prefix, max_salt,
            workers = self.num_workers,
            "mining salt"
        );

        let state = SearchState {
            owner,
            target,
            prefix,
            cursor: AtomicU64::new(0),
            horizon: AtomicU64::new(max_salt),
            chunk_size: self.chunk_size,
            stop_flag: &self.stop_flag,
            stats: &self.stats,
        };
        let (event_tx, event_rx) = unbounded();

        thread::scope(|scope| {
            for id in 1..self.num_workers {
                let worker = CpuWorker::new(id, &self.oracle, &state, event_tx.clone());
                let spawned = thread::Builder::new()
                    .name(format!("hook-miner-worker-{}", id))
                    .spawn_scoped(scope, move || worker.run());
                if let Err(err) = spawned {
                    warn!(worker = id, %err, "failed to spawn worker");
                }
            }
            CpuWorker::new(0, &self.oracle, &state, event_tx.clone()).run();
        });
        drop(event_tx);

        if self.is_stopped() {
            warn!("mining cancelled");
            return Err(DeployError::Cancelled);
        }

        match event_rx.try_iter().min_by_key(WorkerEvent::salt) {
            Some(WorkerEvent::Hit(m)) => {
                info!(salt = %m.salt, address = %m.address, "matching salt found");
                Ok(MiningOutcome::Found(m))
            }
            Some(WorkerEvent::Failed(salt, err)) => {
                warn!(%salt, %err, "oracle query failed");
                Err(err)
            }
            None => {
                info!(max_salt, "salt domain exhausted");
                Ok(MiningOutcome::NotFound { max_salt })
            }
        }
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    pub fn stats(&self) -> &WorkerStats {
        &self.stats
    }
    pub fn total_salts(&self) -> u64 {
        self.stats.total_salts()
    }
    pub fn is_stopped(&self) -> bool {
        self.stop_flag.load(Ordering::Relaxed)
    }
}
