//! Block assembly from a node's block template and nonce mining

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::block::{block_hash_hex, block_to_hex};
use crate::config::MinerConfig;
use crate::error::{Result, WireError};
use crate::hash::hash_from_display_hex;
use crate::pow::{capped_target, search_nonce, FoundNonce};
use crate::transaction::transaction_from_hex;
use crate::types::*;

/// Block template as returned by the node's getBlockTemplate call.
///
/// Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTemplate {
    pub version: u32,
    pub parent_hashes: Vec<String>,
    pub accepted_id_merkle_root: String,
    pub utxo_commitment: String,
    pub bits: String,
    pub transactions: Vec<TemplateTransaction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateTransaction {
    pub data: String,
}

impl BlockTemplate {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The template's hex coinbase, always the first transaction
    pub fn coinbase_hex(&self) -> Result<&str> {
        self.transactions
            .first()
            .map(|tx| tx.data.as_str())
            .ok_or_else(|| WireError::Template("Template has no coinbase transaction".to_string()))
    }
}

/// Finished block ready for submission
#[derive(Debug, Clone)]
pub struct MinedBlock {
    pub block: Block,
    /// Serialized block, hex
    pub block_hex: String,
    /// Header hash in display order, hex
    pub hash_hex: String,
    pub attempts: u64,
}

/// Compact bits from template hex (display order) to the header's value
pub fn bits_from_hex(bits_hex: &str) -> Result<u32> {
    let bytes = hex::decode(bits_hex)?;
    let display: [u8; 4] = bytes.as_slice().try_into().map_err(|_| WireError::InvalidLength {
        field: "bits",
        expected: 4,
        actual: bytes.len(),
    })?;
    Ok(u32::from_be_bytes(display))
}

/// BuildBlock: 𝒯ℳ × 𝒯𝒳* × ℕ → ℬ
///
/// 1. version, parents, id merkle root, utxo commitment and bits from the template
/// 2. coinbase from `transactions[0].data`, then the native transactions
/// 3. hash merkle root over the body
/// 4. nonce left at zero for the search
pub fn build_block_from_template(
    template: &BlockTemplate,
    native_transactions: Vec<Transaction>,
    timestamp_ms: u64,
) -> Result<Block> {
    let coinbase = transaction_from_hex(template.coinbase_hex()?)?;

    let mut header = BlockHeader {
        version: template.version,
        parent_hashes: Vec::new(),
        hash_merkle_root: [0u8; 32],
        id_merkle_root: hash_from_display_hex(&template.accepted_id_merkle_root)?,
        utxo_commitment: hash_from_display_hex(&template.utxo_commitment)?,
        timestamp: timestamp_ms,
        bits: bits_from_hex(&template.bits)?,
        nonce: 0,
    };
    header.set_parents_from_display_hex(template.parent_hashes.as_slice())?;

    let mut block = Block { header, coinbase, transactions: Vec::new() };
    for tx in native_transactions {
        block.append_native_transaction(tx);
    }
    block.refresh_hash_merkle_root()?;

    debug!(
        parents = block.header.parent_hashes.len(),
        txs = block.tx_count(),
        bits = %format!("{:08x}", block.header.bits),
        "assembled block from template"
    );
    Ok(block)
}

/// Search a nonce for `block` and install it
pub fn mine_block(block: &mut Block, config: &MinerConfig) -> Result<FoundNonce> {
    let target = capped_target(block.header.bits, config.max_target()?)?;
    let limits = config.limits();

    #[cfg(feature = "parallel")]
    let found = if config.workers > 1 {
        crate::pow::search_nonce_parallel(&block.header, target, &limits, config.workers, None)?
    } else {
        search_nonce(&block.header, target, &limits, None)?
    };
    #[cfg(not(feature = "parallel"))]
    let found = search_nonce(&block.header, target, &limits, None)?;

    block.header.nonce = found.nonce;
    Ok(found)
}

/// Template to submittable block: assemble, stamp with the current time, mine, encode
pub fn mine_template(
    template: &BlockTemplate,
    native_transactions: Vec<Transaction>,
    config: &MinerConfig,
) -> Result<MinedBlock> {
    let mut block = build_block_from_template(template, native_transactions, current_timestamp_ms()?)?;
    let found = mine_block(&mut block, config)?;

    let block_hex = block_to_hex(&block)?;
    let hash_hex = block_hash_hex(&block.header)?;
    info!(hash = %hash_hex, nonce = found.nonce, attempts = found.attempts, "mined block");

    Ok(MinedBlock { block, block_hex, hash_hex, attempts: found.attempts })
}

/// Current time in unix milliseconds; a clock before the epoch is an error
pub fn current_timestamp_ms() -> Result<u64> {
    millis_since_epoch(SystemTime::now())
}

fn millis_since_epoch(now: SystemTime) -> Result<u64> {
    let elapsed = now
        .duration_since(UNIX_EPOCH)
        .map_err(|e| WireError::Clock(format!("System time before unix epoch: {}", e)))?;
    u64::try_from(elapsed.as_millis())
        .map_err(|_| WireError::Clock("Timestamp overflows u64 milliseconds".to_string()))
}
