//! CREATE2 address computation.
//!
//! - init_code = creationCode || abi.encode(owner, target)
//! - address = keccak256(0xff || factory || salt || keccak256(init_code))[12..32]

pub mod create2;

pub use create2::{create2_address, hook_init_code_hash};
use tiny_keccak::{Hasher, Keccak};

/// Keccak-256 of arbitrary bytes (output 32 bytes).
pub fn keccak256(input: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(input);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}
