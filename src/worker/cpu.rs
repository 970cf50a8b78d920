//! Per-thread worker for pipelined salt mining.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crossbeam_channel::Sender;
use tracing::trace;

use crate::error::DeployError;
use crate::matcher::{Address, PrefixPattern};
use crate::oracle::AddressOracle;
use crate::salt::Salt;

use super::SaltMatch;

#[derive(Debug, Default)]
pub struct WorkerStats {
    pub salts_tried: AtomicU64,
    pub matches_found: AtomicU64,
}

impl WorkerStats {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn total_salts(&self) -> u64 {
        self.salts_tried.load(Ordering::Relaxed)
    }
    pub fn total_matches(&self) -> u64 {
        self.matches_found.load(Ordering::Relaxed)
    }
}

/// Decisive result for a single salt. The pool keeps the lowest one.
#[derive(Debug)]
pub(crate) enum WorkerEvent {
    Hit(SaltMatch),
    Failed(Salt, DeployError),
}

impl WorkerEvent {
    pub(crate) fn salt(&self) -> Salt {
        match self {
            WorkerEvent::Hit(m) => m.salt,
            WorkerEvent::Failed(salt, _) => *salt,
        }
    }
}

/// State shared by every worker of one search.
#[derive(Debug)]
pub(crate) struct SearchState<'a> {
    pub(crate) owner: &'a Address,
    pub(crate) target: &'a Address,
    pub(crate) prefix: &'a PrefixPattern,
    /// Next unclaimed salt.
    pub(crate) cursor: AtomicU64,
    /// Lowest salt with a decisive result so far; starts at `max_salt`.
    pub(crate) horizon: AtomicU64,
    pub(crate) chunk_size: u64,
    pub(crate) stop_flag: &'a AtomicBool,
    pub(crate) stats: &'a WorkerStats,
}

impl SearchState<'_> {
    /// Claims the next chunk, or `None` once the cursor passed the horizon.
    fn claim(&self) -> Option<(u64, u64)> {
        let start = self
            .cursor
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |c| {
                Some(c.saturating_add(self.chunk_size))
            })
            .unwrap_or_else(|c| c);
        let horizon = self.horizon.load(Ordering::SeqCst);
        if start >= horizon {
            return None;
        }
        Some((start, start.saturating_add(self.chunk_size).min(horizon)))
    }
}

pub(crate) struct CpuWorker<'a, O> {
    id: usize,
    oracle: &'a O,
    state: &'a SearchState<'a>,
    events: Sender<WorkerEvent>,
}

impl<'a, O: AddressOracle> CpuWorker<'a, O> {
    pub(crate) fn new(
        id: usize,
        oracle: &'a O,
        state: &'a SearchState<'a>,
        events: Sender<WorkerEvent>,
    ) -> Self {
        Self {
            id,
            oracle,
            state,
            events,
        }
    }

    /// Claims chunks of salts until the horizon is reached or the run is stopped.
    ///
    /// A chunk is abandoned at its first decisive salt, since everything
    /// above it can no longer be the minimum.
    pub(crate) fn run(&self) {
        let state = self.state;
        while let Some((start, end)) = state.claim() {
            trace!(worker = self.id, start, end, "claimed chunk");
            let mut tried = 0;
            for value in start..end {
                if state.stop_flag.load(Ordering::Relaxed) {
                    state.stats.salts_tried.fetch_add(tried, Ordering::Relaxed);
                    return;
                }
                if value >= state.horizon.load(Ordering::SeqCst) {
                    break;
                }

                let salt = Salt::new(value);
                let event = match self.oracle.precompute(state.owner, state.target, salt) {
                    Ok(address) => {
                        tried += 1;
                        if !state.prefix.matches(&address) {
                            continue;
                        }
                        state.stats.matches_found.fetch_add(1, Ordering::Relaxed);
                        WorkerEvent::Hit(SaltMatch { salt, address })
                    }
                    Err(err) => WorkerEvent::Failed(salt, err),
                };

                state.horizon.fetch_min(value, Ordering::SeqCst);
                // receiver outlives every worker
                let _ = self.events.send(event);
                break;
            }
            state.stats.salts_tried.fetch_add(tried, Ordering::Relaxed);
        }
    }
}
