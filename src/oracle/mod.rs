//! Address derivation and deployment capabilities consumed by the miner.
//!
//! Both are external collaborators. `local` provides an in-process CREATE2
//! factory that computes the same addresses a deployed factory would.

mod local;

pub use local::{LocalDeployer, LocalFactory};

use std::sync::Arc;

use crate::error::DeployResult;
use crate::matcher::Address;
use crate::salt::{Salt, SaltEncoding};

/// Read-only address derivation.
///
/// Implementations must return the same address for the same inputs and
/// report connectivity problems as `TransientInfrastructure`.
pub trait AddressOracle {
    /// Address the artifact would occupy if deployed now with `salt`.
    fn precompute(&self, owner: &Address, target: &Address, salt: Salt) -> DeployResult<Address>;
}

/// One-shot deployment.
///
/// Taking `&mut self` gives the caller exclusive access for the duration of
/// the call, so at most one commit per committer is ever in flight.
pub trait DeployCommitter {
    /// Deploys with `salt`, blocking until accepted, and returns the realized address.
    fn commit(&mut self, owner: &Address, target: &Address, salt: Salt) -> DeployResult<Address>;

    /// The `bytes32` this committer submits for `salt`.
    fn encode_salt(&self, salt: Salt) -> [u8; 32] {
        salt.to_bytes32(SaltEncoding::default())
    }
}

impl<T: AddressOracle + ?Sized> AddressOracle for &T {
    fn precompute(&self, owner: &Address, target: &Address, salt: Salt) -> DeployResult<Address> {
        (**self).precompute(owner, target, salt)
    }
}

impl<T: AddressOracle + ?Sized> AddressOracle for Arc<T> {
    fn precompute(&self, owner: &Address, target: &Address, salt: Salt) -> DeployResult<Address> {
        (**self).precompute(owner, target, salt)
    }
}

impl<T: DeployCommitter + ?Sized> DeployCommitter for &mut T {
    fn commit(&mut self, owner: &Address, target: &Address, salt: Salt) -> DeployResult<Address> {
        (**self).commit(owner, target, salt)
    }

    fn encode_salt(&self, salt: Salt) -> [u8; 32] {
        (**self).encode_salt(salt)
    }
}

impl<T: DeployCommitter + ?Sized> DeployCommitter for Box<T> {
    fn commit(&mut self, owner: &Address, target: &Address, salt: Salt) -> DeployResult<Address> {
        (**self).commit(owner, target, salt)
    }

    fn encode_salt(&self, salt: Salt) -> [u8; 32] {
        (**self).encode_salt(salt)
    }
}
