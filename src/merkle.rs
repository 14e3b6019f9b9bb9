//! Merkle root computation over transaction hashes

use crate::error::{Result, WireError};
use crate::hash::double_sha256;
use crate::transaction::serialize_for_merkle;
use crate::types::*;

/// MerkleRoot: ℍ* → ℍ
///
/// 1. A single leaf is the root, unhashed
/// 2. An odd level duplicates its last element
/// 3. Each parent is DoubleSHA256(left || right)
/// 4. Repeat until one element remains
pub fn merkle_root(leaves: &[Hash]) -> Result<Hash> {
    if leaves.is_empty() {
        return Err(WireError::EmptyMerkleTree);
    }

    let mut level = leaves.to_vec();
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            let last = level[level.len() - 1];
            level.push(last);
        }

        level = level
            .chunks(2)
            .map(|pair| {
                let mut combined = [0u8; 64];
                combined[..32].copy_from_slice(&pair[0]);
                combined[32..].copy_from_slice(&pair[1]);
                double_sha256(&combined)
            })
            .collect();
    }

    Ok(level[0])
}

/// Leaf hash of a transaction: DoubleSHA256 of its merkle form
pub fn transaction_leaf(tx: &Transaction) -> Hash {
    double_sha256(&serialize_for_merkle(tx))
}

/// HashMerkleRoot: coinbase leaf first, then native transactions in body order
pub fn hash_merkle_root(coinbase: &Transaction, transactions: &[Transaction]) -> Result<Hash> {
    let leaves: Vec<Hash> = std::iter::once(coinbase)
        .chain(transactions.iter())
        .map(transaction_leaf)
        .collect();
    merkle_root(&leaves)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_leaves_rejected() {
        assert!(matches!(merkle_root(&[]), Err(WireError::EmptyMerkleTree)));
    }

    #[test]
    fn test_four_leaves() {
        let (a, b, c, d) = ([1u8; 32], [2u8; 32], [3u8; 32], [4u8; 32]);
        let ab = double_sha256(&[a, b].concat());
        let cd = double_sha256(&[c, d].concat());
        let expected = double_sha256(&[ab, cd].concat());
        assert_eq!(merkle_root(&[a, b, c, d]).unwrap(), expected);
    }

    #[test]
    fn test_order_matters() {
        let (a, b) = ([1u8; 32], [2u8; 32]);
        assert_ne!(merkle_root(&[a, b]).unwrap(), merkle_root(&[b, a]).unwrap());
    }

    #[test]
    fn test_coinbase_only_root_is_its_leaf() {
        let coinbase = Transaction::native(vec![], vec![]);
        assert_eq!(hash_merkle_root(&coinbase, &[]).unwrap(), transaction_leaf(&coinbase));
    }
}
