//! Sequential salt search.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use crate::error::{DeployError, DeployResult};
use crate::matcher::{Address, PrefixPattern};
use crate::oracle::AddressOracle;
use crate::salt::Salt;

use super::cpu::WorkerStats;

/// A salt together with the address it derives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaltMatch {
    pub salt: Salt,
    pub address: Address,
}

/// Terminal state of a completed search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiningOutcome {
    /// Smallest matching salt in the domain.
    Found(SaltMatch),
    /// Every salt in `[0, max_salt)` was checked without a hit.
    NotFound { max_salt: u64 },
}

impl MiningOutcome {
    pub fn found(&self) -> Option<&SaltMatch> {
        match self {
            MiningOutcome::Found(m) => Some(m),
            MiningOutcome::NotFound { .. } => None,
        }
    }

    /// Turns `NotFound` into the terminal error.
    pub fn into_result(self) -> DeployResult<SaltMatch> {
        match self {
            MiningOutcome::Found(m) => Ok(m),
            MiningOutcome::NotFound { max_salt } => Err(DeployError::NotFound { max_salt }),
        }
    }
}

/// Rejects an empty search domain.
pub(crate) fn validate_bound(max_salt: u64) -> DeployResult<()> {
    if max_salt == 0 {
        return Err(DeployError::InvalidConfiguration(
            "max_salt must be positive".into(),
        ));
    }
    Ok(())
}

/// Walks salts `0, 1, 2, ...` one oracle round-trip at a time and stops at
/// the first match.
#[derive(Debug)]
pub struct SaltMiner<O> {
    oracle: O,
    stop_flag: Arc<AtomicBool>,
    stats: Arc<WorkerStats>,
}

impl<O: AddressOracle> SaltMiner<O> {
    pub fn new(oracle: O) -> Self {
        Self::with_stop_flag(oracle, Arc::new(AtomicBool::new(false)))
    }

    /// Miner that aborts once `stop_flag` is raised.
    pub fn with_stop_flag(oracle: O, stop_flag: Arc<AtomicBool>) -> Self {
        Self {
            oracle,
            stop_flag,
            stats: Arc::new(WorkerStats::new()),
        }
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn stats(&self) -> &WorkerStats {
        &self.stats
    }

    pub fn stop_flag_clone(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Searches `[0, max_salt)` in increasing order.
    ///
    /// Oracle failures abort the run; a candidate is never skipped.
    pub fn mine(
        &self,
        owner: &Address,
        target: &Address,
        prefix: &PrefixPattern,
        max_salt: u64,
    ) -> DeployResult<MiningOutcome> {
        validate_bound(max_salt)?;
        debug!(%owner, %target, %prefix, max_salt, "mining salt");

        for value in 0..max_salt {
            if self.stop_flag.load(Ordering::Relaxed) {
                warn!(salt = value, "mining cancelled");
                return Err(DeployError::Cancelled);
            }

            let salt = Salt::new(value);
            let address = self.oracle.precompute(owner, target, salt)?;
            self.stats.salts_tried.fetch_add(1, Ordering::Relaxed);
            trace!(%salt, %address, "candidate");

            if prefix.matches(&address) {
                self.stats.matches_found.fetch_add(1, Ordering::Relaxed);
                info!(%salt, %address, "matching salt found");
                return Ok(MiningOutcome::Found(SaltMatch { salt, address }));
            }
        }

        info!(max_salt, "salt domain exhausted");
        Ok(MiningOutcome::NotFound { max_salt })
    }
}
