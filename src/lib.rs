//! # Kaspa-Wire
//!
//! Binary wire codec for a DAG blockchain's blocks, transactions and scripts,
//! with the integrity primitives built on it: merkle roots, transaction ids
//! and a compact-target proof-of-work nonce search for mining test blocks.
//!
//! ## Architecture
//!
//! Components, leaf-first:
//! - VarInt codec
//! - Script assembler (P2PKH lock/unlock scripts)
//! - Transaction codec (native and subnetwork transactions)
//! - Block codec (header + tx-count prefixed body)
//! - Merkle engine and hash/id engine
//! - Proof-of-work search and block-template mining
//!
//! ## Design Principles
//!
//! 1. **One logical value per field**: bytes are produced on demand, never cached
//! 2. **Explicit failures**: truncated input and unencodable pushes are errors
//! 3. **Logger-free codec**: only the mining layer emits `tracing` events
//!
//! ## Usage
//!
//! ```rust
//! use kaspa_wire::WireCodec;
//! use kaspa_wire::types::*;
//!
//! let codec = WireCodec::new();
//! let tx = Transaction::native(vec![], vec![TransactionOutput {
//!     value: 1000,
//!     script_pub_key: vec![0x51],
//! }]);
//! let bytes = codec.serialize_transaction(&tx);
//! assert_eq!(codec.parse_transaction(&bytes).unwrap(), tx);
//! ```

pub mod types;
pub mod constants;
pub mod error;
pub mod varint;
pub mod hash;
pub mod script;
pub mod transaction;
pub mod merkle;
pub mod block;
pub mod pow;
pub mod signing;
pub mod config;
pub mod mining;

// Re-export commonly used types
pub use types::*;
pub use constants::*;
pub use error::{Result, WireError};
pub use primitive_types::U256;

use config::MinerConfig;
use mining::{BlockTemplate, MinedBlock};

/// Entry point bundling the codec, hashing and mining operations
///
/// # Examples
///
/// ```
/// use kaspa_wire::WireCodec;
///
/// let codec = WireCodec::new();
/// let target = codec.target_from_bits(0x207fffff).unwrap();
/// assert!(!target.is_zero());
/// ```
#[derive(Debug, Clone, Default)]
pub struct WireCodec {
    miner: MinerConfig,
}

impl WireCodec {
    /// Create a codec with the default miner configuration
    ///
    /// # Examples
    ///
    /// ```
    /// use kaspa_wire::WireCodec;
    ///
    /// let codec = WireCodec::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_miner_config(miner: MinerConfig) -> Self {
        Self { miner }
    }

    pub fn miner_config(&self) -> &MinerConfig {
        &self.miner
    }

    /// Parse a single transaction
    pub fn parse_transaction(&self, bytes: &[u8]) -> Result<Transaction> {
        transaction::transaction_from_bytes(bytes)
    }

    pub fn serialize_transaction(&self, tx: &Transaction) -> ByteString {
        transaction::serialize_transaction(tx)
    }

    /// Transaction id in display order
    ///
    /// # Examples
    ///
    /// ```
    /// use kaspa_wire::WireCodec;
    /// use kaspa_wire::types::*;
    ///
    /// let codec = WireCodec::new();
    /// let tx = Transaction::native(vec![], vec![]);
    /// let id = codec.compute_txid(&tx, false);
    /// assert_eq!(id.len(), 32);
    /// ```
    pub fn compute_txid(&self, tx: &Transaction, coinbase: bool) -> Hash {
        transaction::compute_txid(tx, coinbase)
    }

    /// Parse a single block
    pub fn parse_block(&self, bytes: &[u8]) -> Result<Block> {
        block::block_from_bytes(bytes)
    }

    pub fn serialize_block(&self, block: &Block) -> Result<ByteString> {
        block::serialize_block(block)
    }

    pub fn header_hash(&self, header: &BlockHeader) -> Result<U256> {
        block::header_hash(header)
    }

    pub fn merkle_root(&self, leaves: &[Hash]) -> Result<Hash> {
        merkle::merkle_root(leaves)
    }

    pub fn target_from_bits(&self, bits: u32) -> Result<U256> {
        pow::target_from_bits(bits)
    }

    /// Assemble and mine a block from a node template
    pub fn mine_template(&self, template: &BlockTemplate, native_txs: Vec<Transaction>) -> Result<MinedBlock> {
        mining::mine_template(template, native_txs, &self.miner)
    }
}
