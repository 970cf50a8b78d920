//! Failure kinds surfaced by mining and deployment.

use crate::matcher::Address;
use crate::salt::Salt;

/// Every way a mine-and-deploy run can end without a realized address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeployError {
    /// Malformed search bound or prefix. Raised before any oracle call.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Oracle or commit round-trip failed. The affected step may be retried.
    #[error("Infrastructure failure: {0}")]
    TransientInfrastructure(String),

    /// No salt in `[0, max_salt)` produced a matching address.
    #[error("No matching salt below {max_salt}")]
    NotFound {
        /// Exclusive upper bound that was searched.
        max_salt: u64,
    },

    /// An artifact already exists for this owner, target and salt.
    #[error("Already deployed at {address} (salt {salt})")]
    AlreadyDeployed {
        /// Occupied address.
        address: Address,
        /// Salt that was rejected.
        salt: Salt,
    },

    /// The address re-derived or realized at commit differs from the mined one.
    #[error("Address mismatch: mined {expected}, got {actual}")]
    AddressMismatch {
        /// Address reported by the miner.
        expected: Address,
        /// Address seen at commit time.
        actual: Address,
    },

    /// The run was stopped between oracle queries.
    #[error("Mining cancelled")]
    Cancelled,
}

impl DeployError {
    /// Whether repeating the same step can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DeployError::TransientInfrastructure(_))
    }
}

impl From<crate::config::ConfigError> for DeployError {
    fn from(err: crate::config::ConfigError) -> Self {
        DeployError::InvalidConfiguration(err.to_string())
    }
}

/// Result alias for mining and deployment.
pub type DeployResult<T> = Result<T, DeployError>;
