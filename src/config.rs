//! Runtime configuration for hook salt mining.

use std::path::PathBuf;

use clap::Parser;

use crate::coordinator::{MiningConfig, DEFAULT_MAX_SALT};
use crate::matcher::{Address, PrefixPattern};
use crate::networks::NetworkConfig;
use crate::oracle::LocalFactory;
use crate::salt::SaltEncoding;

/// Hook Salt Miner
///
/// Finds the smallest salt for which a CREATE2 hooks factory deploys the hook
/// at an address starting with the given prefix.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Account that will own the hook (20 bytes hex)
    #[arg(short, long)]
    pub owner: String,

    /// Target the hook is bound to, e.g. a pool manager (20 bytes hex)
    #[arg(short, long, conflicts_with = "network")]
    pub target: Option<String>,

    /// Built-in environment supplying the target (uniswap, scroll)
    #[arg(short = 'N', long)]
    pub network: Option<String>,

    /// Required leading bytes, hex (e.g. 0xA8)
    #[arg(short, long, default_value = "0xA8")]
    pub prefix: String,

    /// Optional mask over the prefix bytes, same width
    #[arg(short, long)]
    pub mask: Option<String>,

    /// Exclusive upper bound on the salts searched
    #[arg(short = 'x', long, default_value_t = DEFAULT_MAX_SALT)]
    pub max_salt: u64,

    /// Hooks factory address (20 bytes hex)
    #[arg(short, long)]
    pub factory: String,

    /// Hook creation code, hex
    #[arg(long, conflicts_with = "creation_code_file")]
    pub creation_code: Option<String>,

    /// File holding the hook creation code as hex
    #[arg(long)]
    pub creation_code_file: Option<PathBuf>,

    /// How integer salts become bytes32: decimal or uint256
    #[arg(short = 'e', long, default_value = "decimal")]
    pub salt_encoding: SaltEncoding,

    /// Oracle queries in flight (0 = one per CPU core)
    #[arg(short = 'w', long, default_value = "1")]
    pub workers: usize,

    /// Evaluate the network's pre-selected salts instead of mining
    #[arg(long)]
    pub check_presets: bool,

    /// Commit the mined salt to an in-memory ledger
    #[arg(long)]
    pub simulate_deploy: bool,

    /// Re-derive the address before committing
    #[arg(long)]
    pub verify: bool,

    /// Increase logging verbosity (-v = warn, -vv = info, -vvv = debug, -vvvv = trace)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Config {
    /// Returns the number of workers, defaulting to CPU count for 0.
    pub fn worker_count(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get()
        } else {
            self.workers
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_salt == 0 {
            return Err(ConfigError::InvalidConfig("max-salt must be positive".into()));
        }
        self.prefix_pattern()?;
        self.owner_address()?;
        self.factory_address()?;
        self.networks()?;

        if self.target.is_none() && self.network.is_none() && !self.check_presets {
            return Err(ConfigError::InvalidConfig(
                "one of --target or --network is required".into(),
            ));
        }
        if self.creation_code.is_none() && self.creation_code_file.is_none() {
            return Err(ConfigError::InvalidConfig(
                "one of --creation-code or --creation-code-file is required".into(),
            ));
        }
        if self.check_presets && self.simulate_deploy {
            return Err(ConfigError::InvalidConfig(
                "--check-presets does not deploy".into(),
            ));
        }
        if self.verify && !self.simulate_deploy {
            return Err(ConfigError::InvalidConfig(
                "--verify only applies with --simulate-deploy".into(),
            ));
        }
        Ok(())
    }

    pub fn prefix_pattern(&self) -> Result<PrefixPattern, ConfigError> {
        let pattern = match self.mask {
            Some(ref mask) => PrefixPattern::from_hex_masked(&self.prefix, mask),
            None => PrefixPattern::from_hex(&self.prefix),
        };
        pattern.map_err(|e| ConfigError::InvalidPattern(e.to_string()))
    }

    pub fn owner_address(&self) -> Result<Address, ConfigError> {
        parse_address("owner", &self.owner)
    }

    pub fn factory_address(&self) -> Result<Address, ConfigError> {
        parse_address("factory", &self.factory)
    }

    /// Environments to work on: the explicit target, one named network, or
    /// every built-in network when only presets are checked.
    pub fn networks(&self) -> Result<Vec<NetworkConfig>, ConfigError> {
        if let Some(ref target) = self.target {
            let target = parse_address("target", target)?;
            return Ok(vec![NetworkConfig::new("custom", target, [])]);
        }
        match self.network {
            Some(ref name) => NetworkConfig::find(name)
                .map(|n| vec![n])
                .map_err(|_| {
                    ConfigError::InvalidConfig(format!(
                        "unknown network {name} (known: {})",
                        NetworkConfig::names().join(", ")
                    ))
                }),
            None => Ok(NetworkConfig::builtin()),
        }
    }

    /// Hook creation code bytes, read from the flag or the file.
    pub fn creation_code_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        let text = match (&self.creation_code, &self.creation_code_file) {
            (Some(code), _) => code.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)?,
            (None, None) => {
                return Err(ConfigError::InvalidConfig("creation code missing".into()));
            }
        };
        let trimmed = text.trim();
        let h = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        hex::decode(h)
            .map_err(|e| ConfigError::InvalidConfig(format!("creation code is not hex: {e}")))
    }

    /// Offline oracle built from the factory settings.
    pub fn local_factory(&self) -> Result<LocalFactory, ConfigError> {
        Ok(LocalFactory::new(
            self.factory_address()?,
            self.creation_code_bytes()?,
            self.salt_encoding,
        ))
    }

    pub fn mining_config(&self) -> MiningConfig {
        MiningConfig {
            max_salt: self.max_salt,
            workers: self.worker_count(),
            verify_before_commit: self.verify,
        }
    }
}

fn parse_address(what: &str, value: &str) -> Result<Address, ConfigError> {
    value
        .parse()
        .map_err(|e| ConfigError::InvalidConfig(format!("{what}: {e}")))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Cannot read creation code: {0}")]
    Io(#[from] std::io::Error),
}
