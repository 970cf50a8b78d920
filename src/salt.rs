//! Integer salts and their `bytes32` encodings.

use std::fmt;
use std::str::FromStr;

/// A candidate salt from the dense domain `[0, max_salt)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Salt(u64);

impl Salt {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    /// Encodes the salt as the `bytes32` passed to the factory.
    pub fn to_bytes32(self, encoding: SaltEncoding) -> [u8; 32] {
        let mut out = [0u8; 32];
        match encoding {
            SaltEncoding::DecimalString => {
                // u64::MAX has 20 digits, always fits
                let digits = self.0.to_string();
                out[..digits.len()].copy_from_slice(digits.as_bytes());
            }
            SaltEncoding::Uint256 => {
                out[24..].copy_from_slice(&self.0.to_be_bytes());
            }
        }
        out
    }
}

impl From<u64> for Salt {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salt({})", self.0)
    }
}

impl fmt::Display for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How an integer salt becomes the 32-byte CREATE2 salt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaltEncoding {
    /// Decimal digits as UTF-8, left-aligned and zero-padded
    /// (ethers `encodeBytes32String(salt.toString())`).
    #[default]
    DecimalString,
    /// Big-endian `uint256`.
    Uint256,
}

impl FromStr for SaltEncoding {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "decimal" | "string" | "bytes32-string" => Ok(SaltEncoding::DecimalString),
            "uint" | "uint256" | "number" => Ok(SaltEncoding::Uint256),
            _ => Err(format!("Unknown salt encoding: {}", s)),
        }
    }
}

impl fmt::Display for SaltEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaltEncoding::DecimalString => write!(f, "decimal"),
            SaltEncoding::Uint256 => write!(f, "uint256"),
        }
    }
}
