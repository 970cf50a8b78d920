//! # hook_miner
//!
//! Mines the salt a CREATE2 hooks factory needs so that the deployed hook
//! lands at an address whose leading byte(s) match a required prefix, then
//! commits exactly one deployment with that salt.
//!
//! ## Architecture
//!
//! - `matcher`: Addresses and prefix patterns
//! - `oracle`: Address derivation and deployment capabilities
//! - `worker`: Sequential and pipelined salt search
//! - `coordinator`: Mine-then-commit orchestration
//! - `config`, `networks`: Runtime and per-environment configuration
//!
//! The accepted salt is always the smallest matching one in `[0, max_salt)`,
//! so the same inputs select the same salt on every run and every environment.

pub mod config;
pub mod coordinator;
pub mod crypto;
pub mod error;
pub mod matcher;
pub mod networks;
pub mod oracle;
pub mod salt;
pub mod worker;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use coordinator::{Deployment, MiningConfig, MiningCoordinator, PresetCheck};
pub use error::{DeployError, DeployResult};
pub use matcher::{Address, PrefixPattern};
pub use networks::NetworkConfig;
pub use oracle::{AddressOracle, DeployCommitter, LocalDeployer, LocalFactory};
pub use salt::{Salt, SaltEncoding};
pub use worker::{MiningOutcome, SaltMatch, SaltMiner, WorkerPool};
