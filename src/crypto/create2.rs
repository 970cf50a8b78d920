//! Hook CREATE2 address computation.
//!
//! Matches a factory deploying `new Hook{salt: salt}(owner, target)`:
//!   init_code_hash = keccak256(creationCode || abi.encode(owner, target))
//!   address = CREATE2(factory, salt, init_code_hash)[12:32]

use tiny_keccak::{Hasher, Keccak};

use crate::crypto::keccak256;
use crate::matcher::Address;

/// Hash of the hook's creation code with its two constructor arguments appended.
pub fn hook_init_code_hash(creation_code: &[u8], owner: &Address, target: &Address) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(creation_code);
    hasher.update(&owner.to_word());
    hasher.update(&target.to_word());
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// Computes the CREATE2 address.
/// Preimage: 0xff (1) || factory (20) || salt (32) || init_code_hash (32) = 85 bytes.
/// Address = keccak256(preimage)[12..32].
pub fn create2_address(factory: &Address, salt: &[u8; 32], init_code_hash: &[u8; 32]) -> Address {
    let mut preimage = [0u8; 85];
    preimage[0] = 0xff;
    preimage[1..21].copy_from_slice(factory.as_bytes());
    preimage[21..53].copy_from_slice(salt);
    preimage[53..85].copy_from_slice(init_code_hash);

    let hash = keccak256(&preimage);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash[12..32]);
    Address::from_bytes(addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h32(s: &str) -> [u8; 32] {
        hex::decode(s).unwrap().try_into().unwrap()
    }

    /// EIP-1014 example 0: zero deployer, zero salt, init code 0x00.
    #[test]
    fn test_eip1014_vector_zero() {
        let init_code_hash = keccak256(&[0x00]);
        let addr = create2_address(&Address::zero(), &[0u8; 32], &init_code_hash);
        assert_eq!(addr.to_checksum(), "0x4D1A2e2bB4F88F0250f26Ffff098B0b30B26BF38");
    }

    /// EIP-1014 example 1: deployer 0xdeadbeef00..., zero salt, init code 0x00.
    #[test]
    fn test_eip1014_vector_deployer() {
        let factory: Address = "0xdeadbeef00000000000000000000000000000000".parse().unwrap();
        let init_code_hash = keccak256(&[0x00]);
        let addr = create2_address(&factory, &[0u8; 32], &init_code_hash);
        assert_eq!(addr.to_checksum(), "0xB928f69Bb1D91Cd65274e3c79d8986362984fDA3");
    }

    /// EIP-1014 example 3: deployer 0xdeadbeef, salt 0x..cafebabe, init code 0xdeadbeef.
    #[test]
    fn test_eip1014_vector_salt() {
        let factory: Address = "0x00000000000000000000000000000000deadbeef".parse().unwrap();
        let salt = h32("00000000000000000000000000000000000000000000000000000000cafebabe");
        let init_code_hash = keccak256(&[0xde, 0xad, 0xbe, 0xef]);
        let addr = create2_address(&factory, &salt, &init_code_hash);
        assert_eq!(addr.to_checksum(), "0x60f3f640a8508fC6a86d45DF051962668E1e8AC7");
    }

    #[test]
    fn test_init_code_hash_appends_constructor_args() {
        let owner = Address::from_bytes([1u8; 20]);
        let target = Address::from_bytes([2u8; 20]);
        let code = [0x60, 0x80, 0x60, 0x40];

        let mut init_code = code.to_vec();
        init_code.extend_from_slice(&owner.to_word());
        init_code.extend_from_slice(&target.to_word());

        assert_eq!(hook_init_code_hash(&code, &owner, &target), keccak256(&init_code));
        assert_ne!(
            hook_init_code_hash(&code, &owner, &target),
            hook_init_code_hash(&code, &target, &owner)
        );
    }
}
