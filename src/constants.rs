//! Wire-format constants for the DAG block and transaction encoding

use crate::types::SubnetworkId;

/// Native subnetwork id: twenty zero bytes
pub const NATIVE_SUBNETWORK_ID: SubnetworkId = [0u8; 20];

/// Coinbase subnetwork id: nineteen zero bytes followed by 0x01
pub const COINBASE_SUBNETWORK_ID: SubnetworkId = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01,
];

/// Transaction version produced by the builders
pub const TX_VERSION: u32 = 1;

/// Default sequence for new inputs
pub const MAX_SEQUENCE: u64 = u64::MAX;

/// Hash length in bytes
pub const HASH_SIZE: usize = 32;

/// Subnetwork id length in bytes
pub const SUBNETWORK_ID_SIZE: usize = 20;

/// Public key hash length used by P2PKH scripts
pub const PUBKEY_HASH_SIZE: usize = 20;

/// Largest data push representable with a single length byte
pub const MAX_SCRIPT_PUSH: usize = 255;

/// Largest parent count representable in the header
pub const MAX_PARENT_HASHES: usize = 255;

/// Header bytes excluding parent hashes:
/// version(4) + parentCount(1) + 3 roots(96) + timestamp(8) + bits(4) + nonce(8)
pub const HEADER_FIXED_SIZE: usize = 4 + 1 + 3 * HASH_SIZE + 8 + 4 + 8;

/// Devnet genesis block hash (display hex)
pub const DEVNET_GENESIS_HASH: &str =
    "000033abb09b45e09ef5e3a2b92185b7503a074565ef5706904167c60b37d6f4";

/// Default maximum target (2^255 - 1), big-endian hex
pub const DEFAULT_MAX_TARGET_HEX: &str =
    "7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff";

/// Default iteration budget for a single nonce search
pub const DEFAULT_MAX_ATTEMPTS: u64 = 50_000_000;
