//! Test doubles for the oracle and committer.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::crypto::keccak256;
use crate::error::{DeployError, DeployResult};
use crate::matcher::{Address, PrefixPattern};
use crate::oracle::{AddressOracle, DeployCommitter};
use crate::salt::Salt;

/// `keccak256(owner || target || salt_be) mod 2^160`, counting every call.
#[derive(Debug, Default)]
pub(crate) struct HashOracle {
    calls: AtomicUsize,
    fail_at: Option<u64>,
    stop_at: Option<(u64, Arc<AtomicBool>)>,
}

impl HashOracle {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Oracle that reports an outage when asked about `salt`.
    pub(crate) fn failing_at(salt: u64) -> Self {
        Self {
            fail_at: Some(salt),
            ..Self::default()
        }
    }

    /// Oracle that raises `flag` once it has answered for `salt`, like a
    /// Ctrl-C arriving mid-run.
    pub(crate) fn stopping_at(salt: u64, flag: Arc<AtomicBool>) -> Self {
        Self {
            stop_at: Some((salt, flag)),
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn derive(owner: &Address, target: &Address, salt: Salt) -> Address {
        let mut preimage = [0u8; 48];
        preimage[..20].copy_from_slice(owner.as_bytes());
        preimage[20..40].copy_from_slice(target.as_bytes());
        preimage[40..].copy_from_slice(&salt.value().to_be_bytes());
        let hash = keccak256(&preimage);
        let mut addr = [0u8; 20];
        addr.copy_from_slice(&hash[12..]);
        Address::from_bytes(addr)
    }
}

impl AddressOracle for HashOracle {
    fn precompute(&self, owner: &Address, target: &Address, salt: Salt) -> DeployResult<Address> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some((at, ref flag)) = self.stop_at {
            if at == salt.value() {
                flag.store(true, Ordering::SeqCst);
            }
        }
        if self.fail_at == Some(salt.value()) {
            return Err(DeployError::TransientInfrastructure(format!(
                "rpc unreachable at salt {salt}"
            )));
        }
        Ok(Self::derive(owner, target, salt))
    }
}

/// Committer over [`HashOracle`] addresses that remembers what it deployed.
#[derive(Debug, Default)]
pub(crate) struct RecordingCommitter {
    pub(crate) commits: Vec<Salt>,
    deployed: HashSet<Address>,
    offline: bool,
}

impl RecordingCommitter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }
}

impl DeployCommitter for RecordingCommitter {
    fn commit(&mut self, owner: &Address, target: &Address, salt: Salt) -> DeployResult<Address> {
        self.commits.push(salt);
        if self.offline {
            return Err(DeployError::TransientInfrastructure("rpc unreachable".into()));
        }
        let address = HashOracle::derive(owner, target, salt);
        if !self.deployed.insert(address) {
            return Err(DeployError::AlreadyDeployed { address, salt });
        }
        Ok(address)
    }
}

/// Smallest matching salt below `max_salt`, found independently of the miner.
pub(crate) fn brute_force(
    owner: &Address,
    target: &Address,
    prefix: &PrefixPattern,
    max_salt: u64,
) -> Option<u64> {
    (0..max_salt).find(|&s| prefix.matches(&HashOracle::derive(owner, target, Salt::new(s))))
}

pub(crate) fn owner() -> Address {
    "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap()
}

pub(crate) fn target() -> Address {
    "0xDc64a140Aa3E981100a9becA4E685f962f0cF6C9".parse().unwrap()
}
