//! Per-environment deployment targets.

use crate::error::{DeployError, DeployResult};
use crate::matcher::Address;
use crate::salt::Salt;

/// Pool manager on the Uniswap v4 hook sandbox.
pub const UNISWAP_POOL_MANAGER: Address =
    Address::from_bytes(hex_literal("dc64a140aa3e981100a9beca4e685f962f0cf6c9"));

/// Pool manager on Scroll.
pub const SCROLL_POOL_MANAGER: Address =
    Address::from_bytes(hex_literal("6b18e29a6c6931af9f8087dbe12e21e495855ada"));

/// Salts mined once and replayed on every environment.
pub const PRESET_SALTS: [u64; 3] = [274, 636, 715];

/// Target identity and pre-selected salts for one environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub name: String,
    /// Registry the hook is bound to (the pool manager).
    pub target: Address,
    pub salts: Vec<Salt>,
}

impl NetworkConfig {
    pub fn new(
        name: impl Into<String>,
        target: Address,
        salts: impl IntoIterator<Item = u64>,
    ) -> Self {
        Self {
            name: name.into(),
            target,
            salts: salts.into_iter().map(Salt::new).collect(),
        }
    }

    /// Environments known out of the box.
    pub fn builtin() -> Vec<NetworkConfig> {
        vec![
            NetworkConfig::new("uniswap", UNISWAP_POOL_MANAGER, PRESET_SALTS),
            NetworkConfig::new("scroll", SCROLL_POOL_MANAGER, PRESET_SALTS),
        ]
    }

    /// Looks up a built-in environment by name, case-insensitively.
    pub fn find(name: &str) -> DeployResult<NetworkConfig> {
        Self::builtin()
            .into_iter()
            .find(|n| n.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| DeployError::InvalidConfiguration(format!("unknown network: {name}")))
    }

    pub fn names() -> Vec<String> {
        Self::builtin().into_iter().map(|n| n.name).collect()
    }
}

const fn hex_literal(s: &str) -> [u8; 20] {
    const fn nibble(c: u8) -> u8 {
        match c {
            b'0'..=b'9' => c - b'0',
            b'a'..=b'f' => c - b'a' + 10,
            _ => panic!("non-hex character in address literal"),
        }
    }
    let bytes = s.as_bytes();
    let mut out = [0u8; 20];
    let mut i = 0;
    while i < 20 {
        out[i] = (nibble(bytes[i * 2]) << 4) | nibble(bytes[i * 2 + 1]);
        i += 1;
    }
    out
}
