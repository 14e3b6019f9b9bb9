//! Hash primitives: double-SHA256, HASH160 and display-order conversion

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::constants::{HASH_SIZE, PUBKEY_HASH_SIZE};
use crate::error::{Result, WireError};
use crate::types::Hash;

/// DoubleSHA256: 𝔹* → ℍ
///
/// SHA256(SHA256(data)), returned in wire order.
#[inline]
pub fn double_sha256(data: &[u8]) -> Hash {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut result = [0u8; 32];
    result.copy_from_slice(&second);
    result
}

/// HASH160: RIPEMD160(SHA256(data)), used for P2PKH public key hashes
pub fn hash160(data: &[u8]) -> [u8; PUBKEY_HASH_SIZE] {
    let sha = Sha256::digest(data);
    let ripe = Ripemd160::digest(sha);
    let mut result = [0u8; PUBKEY_HASH_SIZE];
    result.copy_from_slice(&ripe);
    result
}

/// Reverse a hash between wire order and display order
pub fn reverse_hash(hash: &Hash) -> Hash {
    let mut out = *hash;
    out.reverse();
    out
}

/// Hex string of a wire-order hash in display order
pub fn hash_to_display_hex(hash: &Hash) -> String {
    hex::encode(reverse_hash(hash))
}

/// Parse a display-order hex hash into wire order
pub fn hash_from_display_hex(display_hex: &str) -> Result<Hash> {
    let bytes = hex::decode(display_hex)?;
    if bytes.len() != HASH_SIZE {
        return Err(WireError::InvalidLength {
            field: "hash",
            expected: HASH_SIZE,
            actual: bytes.len(),
        });
    }
    let mut hash = [0u8; HASH_SIZE];
    hash.copy_from_slice(&bytes);
    hash.reverse();
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_sha256_empty() {
        // SHA256d("") is a well-known constant
        let expected = hex::decode("5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456").unwrap();
        assert_eq!(double_sha256(b"").to_vec(), expected);
    }

    #[test]
    fn test_hash160_known_vector() {
        // RIPEMD160(SHA256(""))
        let expected = hex::decode("b472a266d0bd89c13706a4132ccfb16f7c3b9fcb").unwrap();
        assert_eq!(hash160(b"").to_vec(), expected);
    }

    #[test]
    fn test_display_hex_round_trip() {
        let display = "000033abb09b45e09ef5e3a2b92185b7503a074565ef5706904167c60b37d6f4";
        let wire = hash_from_display_hex(display).unwrap();
        assert_eq!(wire[0], 0xf4);
        assert_eq!(wire[31], 0x00);
        assert_eq!(hash_to_display_hex(&wire), display);
    }

    #[test]
    fn test_hash_from_display_hex_wrong_length() {
        let result = hash_from_display_hex("abcd");
        assert!(matches!(result, Err(WireError::InvalidLength { expected: 32, actual: 2, .. })));
    }

    #[test]
    fn test_hash_from_display_hex_bad_hex() {
        assert!(matches!(hash_from_display_hex("zz"), Err(WireError::InvalidHex(_))));
    }
}
