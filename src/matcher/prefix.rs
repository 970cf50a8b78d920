//! Leading-byte patterns over 20-byte addresses.

use std::fmt;

use super::address::{Address, ADDRESS_LEN};
use crate::error::{DeployError, DeployResult};

/// Required value of an address's most-significant bytes.
///
/// Holds `len` leading bytes and a mask of the same width. An exact pattern
/// has an all-ones mask, so matching reduces to comparing the top `len` bytes
/// of the big-endian address with the prefix.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrefixPattern {
    value: [u8; ADDRESS_LEN],
    mask: [u8; ADDRESS_LEN],
    len: usize,
}

impl PrefixPattern {
    /// Pattern requiring the leading bytes to equal `prefix` exactly.
    pub fn exact(prefix: &[u8]) -> DeployResult<Self> {
        Self::masked(prefix, &vec![0xff; prefix.len()])
    }

    /// Pattern requiring `address[i] & mask[i] == prefix[i]` for each leading byte.
    pub fn masked(prefix: &[u8], mask: &[u8]) -> DeployResult<Self> {
        if prefix.is_empty() {
            return Err(DeployError::InvalidConfiguration(
                "prefix cannot be empty".into(),
            ));
        }
        if prefix.len() > ADDRESS_LEN {
            return Err(DeployError::InvalidConfiguration(format!(
                "prefix cannot be longer than {ADDRESS_LEN} bytes"
            )));
        }
        if mask.len() != prefix.len() {
            return Err(DeployError::InvalidConfiguration(format!(
                "mask is {} bytes but prefix is {}",
                mask.len(),
                prefix.len()
            )));
        }
        if prefix.iter().zip(mask).any(|(p, m)| p & !m != 0) {
            return Err(DeployError::InvalidConfiguration(
                "prefix sets bits outside the mask and can never match".into(),
            ));
        }

        let mut value = [0u8; ADDRESS_LEN];
        let mut full_mask = [0u8; ADDRESS_LEN];
        value[..prefix.len()].copy_from_slice(prefix);
        full_mask[..mask.len()].copy_from_slice(mask);
        Ok(Self {
            value,
            mask: full_mask,
            len: prefix.len(),
        })
    }

    /// Parses a hex prefix such as `0xA8`. Odd-length input gets a leading zero nibble.
    pub fn from_hex(prefix: &str) -> DeployResult<Self> {
        Self::exact(&parse_hex_bytes(prefix)?)
    }

    /// Parses a hex prefix and a hex mask of the same width.
    pub fn from_hex_masked(prefix: &str, mask: &str) -> DeployResult<Self> {
        Self::masked(&parse_hex_bytes(prefix)?, &parse_hex_bytes(mask)?)
    }

    /// Leading bytes the pattern constrains.
    pub fn prefix(&self) -> &[u8] {
        &self.value[..self.len]
    }

    /// Mask over the leading bytes.
    pub fn mask(&self) -> &[u8] {
        &self.mask[..self.len]
    }

    /// Number of leading bytes compared.
    pub fn width(&self) -> usize {
        self.len
    }

    /// Whether every constrained bit is compared.
    pub fn is_exact(&self) -> bool {
        self.mask().iter().all(|&m| m == 0xff)
    }

    /// Does `address` satisfy the pattern.
    #[inline]
    pub fn matches(&self, address: &Address) -> bool {
        let bytes = address.as_bytes();
        (0..self.len).all(|i| bytes[i] & self.mask[i] == self.value[i])
    }

    /// Number of constrained bits.
    pub fn constrained_bits(&self) -> u32 {
        self.mask().iter().map(|m| m.count_ones()).sum()
    }

    /// Mean number of salts tried before a hit, `2^bits`.
    pub fn expected_attempts(&self) -> u64 {
        1u64.checked_shl(self.constrained_bits()).unwrap_or(u64::MAX)
    }

    pub fn difficulty_description(&self) -> String {
        match self.expected_attempts() {
            0..=1_000 => "Very Easy (< 1 second)".into(),
            1_001..=100_000 => "Easy (seconds)".into(),
            100_001..=10_000_000 => "Medium (minutes)".into(),
            10_000_001..=1_000_000_000 => "Hard (hours)".into(),
            _ => "Very Hard (days or more)".into(),
        }
    }
}

fn parse_hex_bytes(input: &str) -> DeployResult<Vec<u8>> {
    let h = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    if h.is_empty() {
        return Err(DeployError::InvalidConfiguration(
            "prefix cannot be empty".into(),
        ));
    }
    let padded = if h.len() % 2 == 1 {
        format!("0{h}")
    } else {
        h.to_string()
    };
    hex::decode(&padded)
        .map_err(|e| DeployError::InvalidConfiguration(format!("invalid hex {input}: {e}")))
}

impl fmt::Debug for PrefixPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrefixPattern({self})")
    }
}

impl fmt::Display for PrefixPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.prefix()))?;
        if !self.is_exact() {
            write!(f, "/0x{}", hex::encode(self.mask()))?;
        }
        Ok(())
    }
}
