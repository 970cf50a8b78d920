//! Mine a salt, then commit exactly one deployment with it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{DeployError, DeployResult};
use crate::matcher::{Address, PrefixPattern};
use crate::networks::NetworkConfig;
use crate::oracle::{AddressOracle, DeployCommitter};
use crate::salt::Salt;
use crate::worker::{MiningOutcome, SaltMatch, SaltMiner, WorkerPool};

/// Default exclusive bound on the salt domain.
pub const DEFAULT_MAX_SALT: u64 = 1000;

/// Search and commit settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MiningConfig {
    /// Exclusive upper bound used by [`MiningCoordinator::deploy_network`].
    pub max_salt: u64,
    /// Oracle queries kept in flight. `1` queries strictly one salt at a time.
    pub workers: usize,
    /// Re-derive the winning address right before committing.
    pub verify_before_commit: bool,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            max_salt: DEFAULT_MAX_SALT,
            workers: 1,
            verify_before_commit: false,
        }
    }
}

/// A committed deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deployment {
    pub salt: Salt,
    /// Salt exactly as the committer submitted it.
    pub salt_bytes: [u8; 32],
    pub address: Address,
}

/// How one pre-selected salt fares on an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetCheck {
    pub salt: Salt,
    pub address: Address,
    pub matches: bool,
}

/// Runs the search, then hands the winning salt to the committer.
///
/// Owns its committer, so commits through one coordinator never overlap.
#[derive(Debug)]
pub struct MiningCoordinator<O, C> {
    oracle: O,
    committer: C,
    config: MiningConfig,
    stop_flag: Arc<AtomicBool>,
}

impl<O: AddressOracle + Sync, C: DeployCommitter> MiningCoordinator<O, C> {
    pub fn new(oracle: O, committer: C, config: MiningConfig) -> Self {
        Self {
            oracle,
            committer,
            config,
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shares a stop flag with the caller (e.g. a Ctrl-C handler).
    pub fn with_stop_flag(mut self, stop_flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = stop_flag;
        self
    }

    pub fn config(&self) -> &MiningConfig {
        &self.config
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn committer(&self) -> &C {
        &self.committer
    }

    pub fn stop_flag_clone(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Searches `[0, max_salt)` without committing.
    pub fn mine(
        &self,
        owner: &Address,
        target: &Address,
        prefix: &PrefixPattern,
        max_salt: u64,
    ) -> DeployResult<MiningOutcome> {
        if self.config.workers > 1 {
            WorkerPool::with_stop_flag(self.config.workers, &self.oracle, self.stop_flag.clone())
                .mine(owner, target, prefix, max_salt)
        } else {
            SaltMiner::with_stop_flag(&self.oracle, self.stop_flag.clone())
                .mine(owner, target, prefix, max_salt)
        }
    }

    /// Finds the smallest matching salt below `max_salt` and deploys with it.
    ///
    /// `NotFound` ends the run without a commit. Nothing is retried; widen
    /// `max_salt` and call again to search further.
    pub fn mine_and_deploy(
        &mut self,
        owner: &Address,
        target: &Address,
        prefix: &PrefixPattern,
        max_salt: u64,
    ) -> DeployResult<Deployment> {
        let mined = self.mine(owner, target, prefix, max_salt)?.into_result()?;
        self.commit(owner, target, mined)
    }

    /// [`Self::mine_and_deploy`] against an environment's target with the configured bound.
    pub fn deploy_network(
        &mut self,
        owner: &Address,
        network: &NetworkConfig,
        prefix: &PrefixPattern,
    ) -> DeployResult<Deployment> {
        info!(network = %network.name, target = %network.target, "deploying to network");
        let max_salt = self.config.max_salt;
        self.mine_and_deploy(owner, &network.target, prefix, max_salt)
    }

    /// Evaluates an environment's pre-selected salts without committing.
    pub fn check_presets(
        &self,
        owner: &Address,
        network: &NetworkConfig,
        prefix: &PrefixPattern,
    ) -> DeployResult<Vec<PresetCheck>> {
        network
            .salts
            .iter()
            .map(|&salt| -> DeployResult<PresetCheck> {
                let address = self.oracle.precompute(owner, &network.target, salt)?;
                Ok(PresetCheck {
                    salt,
                    address,
                    matches: prefix.matches(&address),
                })
            })
            .collect()
    }

    fn commit(
        &mut self,
        owner: &Address,
        target: &Address,
        mined: SaltMatch,
    ) -> DeployResult<Deployment> {
        if self.stop_flag.load(Ordering::Relaxed) {
            return Err(DeployError::Cancelled);
        }

        if self.config.verify_before_commit {
            let current = self.oracle.precompute(owner, target, mined.salt)?;
            if current != mined.address {
                warn!(expected = %mined.address, actual = %current, "address changed since mining");
                return Err(DeployError::AddressMismatch {
                    expected: mined.address,
                    actual: current,
                });
            }
        }

        debug!(salt = %mined.salt, address = %mined.address, "committing deployment");
        let realized = self.committer.commit(owner, target, mined.salt)?;
        if realized != mined.address {
            warn!(expected = %mined.address, actual = %realized, "deployment landed elsewhere");
            return Err(DeployError::AddressMismatch {
                expected: mined.address,
                actual: realized,
            });
        }

        info!(salt = %mined.salt, address = %realized, "deployment committed");
        Ok(Deployment {
            salt: mined.salt,
            salt_bytes: self.committer.encode_salt(mined.salt),
            address: realized,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{LocalDeployer, LocalFactory};
    use crate::salt::SaltEncoding;
    use crate::testing::{brute_force, owner, target, HashOracle, RecordingCommitter};

    fn coordinator(config: MiningConfig) -> MiningCoordinator<HashOracle, RecordingCommitter> {
        MiningCoordinator::new(HashOracle::new(), RecordingCommitter::new(), config)
    }

    #[test]
    fn test_end_to_end_selects_smallest_salt() {
        let prefix = PrefixPattern::from_hex("0xA8").unwrap();
        assert_eq!(brute_force(&owner(), &target(), &prefix, 1000), Some(230));
        let mut c = coordinator(MiningConfig::default());

        let deployment = c.mine_and_deploy(&owner(), &target(), &prefix, 1000).unwrap();
        assert_eq!(deployment.salt, Salt::new(230));
        assert_eq!(
            deployment.address,
            HashOracle::derive(&owner(), &target(), deployment.salt)
        );
        assert_eq!(deployment.address.as_bytes()[0], 0xa8);
        assert_eq!(
            deployment.salt_bytes,
            Salt::new(230).to_bytes32(SaltEncoding::DecimalString)
        );
        assert_eq!(&deployment.salt_bytes[..4], b"230\0");
        assert_eq!(c.committer().commits, vec![deployment.salt]);
        assert_eq!(c.oracle().calls(), 231);
    }

    #[test]
    fn test_deployment_reports_committed_salt_bytes() {
        let factory = LocalFactory::new(Address::zero(), vec![0x00], SaltEncoding::Uint256);
        let prefix = PrefixPattern::from_hex("0x5").unwrap();
        let mut c = MiningCoordinator::new(
            factory.clone(),
            LocalDeployer::new(factory),
            MiningConfig::default(),
        );
        let deployment = c.mine_and_deploy(&owner(), &target(), &prefix, 4000).unwrap();
        assert_eq!(
            deployment.salt_bytes,
            deployment.salt.to_bytes32(SaltEncoding::Uint256)
        );
        assert_eq!(
            deployment.salt_bytes[24..],
            deployment.salt.value().to_be_bytes()
        );
    }

    #[test]
    fn test_pipelined_end_to_end_matches_sequential() {
        let prefix = PrefixPattern::from_hex("0xA8").unwrap();
        let mut sequential = coordinator(MiningConfig::default());
        let mut pipelined = coordinator(MiningConfig {
            workers: 4,
            ..MiningConfig::default()
        });
        assert_eq!(
            sequential.mine_and_deploy(&owner(), &target(), &prefix, 1000),
            pipelined.mine_and_deploy(&owner(), &target(), &prefix, 1000)
        );
    }

    #[test]
    fn test_not_found_never_commits() {
        let prefix = PrefixPattern::exact(&[0xa8; 20]).unwrap();
        let mut c = coordinator(MiningConfig::default());
        assert_eq!(
            c.mine_and_deploy(&owner(), &target(), &prefix, 100),
            Err(DeployError::NotFound { max_salt: 100 })
        );
        assert!(c.committer().commits.is_empty());
    }

    #[test]
    fn test_invalid_bound_skips_oracle_and_commit() {
        let prefix = PrefixPattern::from_hex("0xA8").unwrap();
        let mut c = coordinator(MiningConfig::default());
        let err = c.mine_and_deploy(&owner(), &target(), &prefix, 0).unwrap_err();
        assert!(matches!(err, DeployError::InvalidConfiguration(_)));
        assert_eq!(c.oracle().calls(), 0);
        assert!(c.committer().commits.is_empty());
    }

    #[test]
    fn test_second_run_reports_already_deployed() {
        let prefix = PrefixPattern::from_hex("0x1").unwrap();
        let mut c = coordinator(MiningConfig::default());
        let first = c.mine_and_deploy(&owner(), &target(), &prefix, 4000).unwrap();
        assert_eq!(
            c.mine_and_deploy(&owner(), &target(), &prefix, 4000),
            Err(DeployError::AlreadyDeployed {
                address: first.address,
                salt: first.salt,
            })
        );
        assert_eq!(c.committer().commits, vec![first.salt, first.salt]);
    }

    #[test]
    fn test_commit_failure_is_transient() {
        let prefix = PrefixPattern::from_hex("0x2").unwrap();
        let mut c = MiningCoordinator::new(
            HashOracle::new(),
            RecordingCommitter::offline(),
            MiningConfig::default(),
        );
        let err = c.mine_and_deploy(&owner(), &target(), &prefix, 4000).unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(c.committer().commits.len(), 1);
    }

    #[test]
    fn test_oracle_failure_never_commits() {
        let prefix = PrefixPattern::exact(&[0xa8; 20]).unwrap();
        let mut c = MiningCoordinator::new(
            HashOracle::failing_at(10),
            RecordingCommitter::new(),
            MiningConfig::default(),
        );
        assert!(matches!(
            c.mine_and_deploy(&owner(), &target(), &prefix, 1000),
            Err(DeployError::TransientInfrastructure(_))
        ));
        assert!(c.committer().commits.is_empty());
    }

    #[test]
    fn test_verify_before_commit_rederives() {
        let prefix = PrefixPattern::from_hex("0x3").unwrap();
        let mut c = coordinator(MiningConfig {
            verify_before_commit: true,
            ..MiningConfig::default()
        });
        let deployment = c.mine_and_deploy(&owner(), &target(), &prefix, 4000).unwrap();
        // one extra oracle call for the re-derivation
        assert_eq!(c.oracle().calls() as u64, deployment.salt.value() + 2);
    }

    #[test]
    fn test_mismatched_commit_is_reported() {
        // committer derives CREATE2 addresses while the oracle hashes directly
        let prefix = PrefixPattern::from_hex("0x4").unwrap();
        let factory = LocalFactory::new(Address::zero(), vec![0x00], SaltEncoding::DecimalString);
        let mut c = MiningCoordinator::new(
            HashOracle::new(),
            LocalDeployer::new(factory),
            MiningConfig::default(),
        );
        assert!(matches!(
            c.mine_and_deploy(&owner(), &target(), &prefix, 4000),
            Err(DeployError::AddressMismatch { .. })
        ));
    }

    #[test]
    fn test_cancelled_run_never_commits() {
        let prefix = PrefixPattern::from_hex("0xA8").unwrap();
        let mut c = coordinator(MiningConfig::default());
        c.stop_flag_clone().store(true, Ordering::Relaxed);
        assert_eq!(
            c.mine_and_deploy(&owner(), &target(), &prefix, 1000),
            Err(DeployError::Cancelled)
        );
        assert!(c.committer().commits.is_empty());
    }

    #[test]
    fn test_local_factory_round_trip_across_networks() {
        let factory = LocalFactory::new(
            "0x5FbDB2315678afecb367f032d93F642f64180aa3".parse().unwrap(),
            vec![0x60, 0x80, 0x60, 0x40, 0x52, 0x34, 0x80, 0x15],
            SaltEncoding::DecimalString,
        );
        let prefix = PrefixPattern::from_hex("0xA8").unwrap();

        for network in NetworkConfig::builtin() {
            let mut c = MiningCoordinator::new(
                factory.clone(),
                LocalDeployer::new(factory.clone()),
                MiningConfig::default(),
            );
            match c.deploy_network(&owner(), &network, &prefix) {
                Ok(deployment) => {
                    assert!(prefix.matches(&deployment.address));
                    assert_eq!(
                        factory.derive(&owner(), &network.target, deployment.salt),
                        deployment.address
                    );
                    assert_eq!(
                        c.committer().deployed_salt(&deployment.address),
                        Some(deployment.salt)
                    );
                }
                Err(err) => assert_eq!(err, DeployError::NotFound { max_salt: 1000 }),
            }
        }
    }

    #[test]
    fn test_check_presets_reports_each_salt() {
        let network = NetworkConfig::find("uniswap").unwrap();
        let prefix = PrefixPattern::from_hex("0xA8").unwrap();
        let c = coordinator(MiningConfig::default());
        let checks = c.check_presets(&owner(), &network, &prefix).unwrap();
        assert_eq!(checks.len(), network.salts.len());
        for check in checks {
            let address = HashOracle::derive(&owner(), &network.target, check.salt);
            assert_eq!(check.address, address);
            assert_eq!(check.matches, prefix.matches(&address));
        }
        assert!(c.committer().commits.is_empty());
    }
}
