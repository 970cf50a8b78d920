//! In-process CREATE2 hooks factory.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::{AddressOracle, DeployCommitter};
use crate::crypto::{create2_address, hook_init_code_hash};
use crate::error::{DeployError, DeployResult};
use crate::matcher::Address;
use crate::salt::{Salt, SaltEncoding};

/// Offline equivalent of a hooks factory's precompute call.
#[derive(Debug, Clone)]
pub struct LocalFactory {
    factory: Address,
    creation_code: Vec<u8>,
    encoding: SaltEncoding,
}

impl LocalFactory {
    pub fn new(factory: Address, creation_code: impl Into<Vec<u8>>, encoding: SaltEncoding) -> Self {
        Self {
            factory,
            creation_code: creation_code.into(),
            encoding,
        }
    }

    pub fn factory(&self) -> &Address {
        &self.factory
    }

    pub fn encoding(&self) -> SaltEncoding {
        self.encoding
    }

    /// Derives the address without the `Result` wrapper; never fails locally.
    pub fn derive(&self, owner: &Address, target: &Address, salt: Salt) -> Address {
        let init_code_hash = hook_init_code_hash(&self.creation_code, owner, target);
        create2_address(&self.factory, &salt.to_bytes32(self.encoding), &init_code_hash)
    }
}

impl AddressOracle for LocalFactory {
    fn precompute(&self, owner: &Address, target: &Address, salt: Salt) -> DeployResult<Address> {
        Ok(self.derive(owner, target, salt))
    }
}

/// Records deployments made through a [`LocalFactory`] in memory.
///
/// Stands in for the chain as the system of record: the second deployment to
/// the same address is rejected.
#[derive(Debug)]
pub struct LocalDeployer {
    factory: LocalFactory,
    deployed: HashMap<Address, Salt>,
}

impl LocalDeployer {
    pub fn new(factory: LocalFactory) -> Self {
        Self {
            factory,
            deployed: HashMap::new(),
        }
    }

    /// Salt recorded for an occupied address.
    pub fn deployed_salt(&self, address: &Address) -> Option<Salt> {
        self.deployed.get(address).copied()
    }

    pub fn deployment_count(&self) -> usize {
        self.deployed.len()
    }
}

impl DeployCommitter for LocalDeployer {
    fn commit(&mut self, owner: &Address, target: &Address, salt: Salt) -> DeployResult<Address> {
        let address = self.factory.derive(owner, target, salt);
        if self.deployed.contains_key(&address) {
            warn!(%address, %salt, "deployment rejected, address occupied");
            return Err(DeployError::AlreadyDeployed { address, salt });
        }
        self.deployed.insert(address, salt);
        debug!(%address, %salt, "deployment recorded");
        Ok(address)
    }

    fn encode_salt(&self, salt: Salt) -> [u8; 32] {
        salt.to_bytes32(self.factory.encoding())
    }
}
