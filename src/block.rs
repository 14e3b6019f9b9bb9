//! Block codec: fixed-layout header, tx-count prefixed body, header hashing

use std::io::{Cursor, Read};

use primitive_types::U256;

use crate::constants::*;
use crate::error::{Result, WireError};
use crate::hash::{double_sha256, hash_from_display_hex, hash_to_display_hex};
use crate::merkle::hash_merkle_root;
use crate::transaction::{ensure_consumed, parse_transaction, serialize_transaction};
use crate::types::*;
use crate::varint::{encode_varint_into, read_array, read_hash, read_u32, read_u64, read_u8, read_varint};

impl BlockHeader {
    /// Serialized header size for `parent_count` parents
    pub fn size_for(parent_count: usize) -> usize {
        HEADER_FIXED_SIZE + HASH_SIZE * parent_count
    }

    /// Replace the parents with display-order hex hashes
    pub fn set_parents_from_display_hex<S: AsRef<str>>(&mut self, parents: &[S]) -> Result<()> {
        if parents.len() > MAX_PARENT_HASHES {
            return Err(WireError::TooManyParents(parents.len()));
        }
        self.parent_hashes = parents
            .iter()
            .map(|p| hash_from_display_hex(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(())
    }

    /// Point the header at the devnet genesis block as its only parent
    pub fn point_to_genesis(&mut self) -> Result<()> {
        self.set_parents_from_display_hex(&[DEVNET_GENESIS_HASH])
    }
}

impl Block {
    /// Wire tx count: coinbase plus native transactions
    pub fn tx_count(&self) -> u64 {
        1 + self.transactions.len() as u64
    }

    /// Append a native transaction; the tx count follows automatically
    pub fn append_native_transaction(&mut self, tx: Transaction) {
        self.transactions.push(tx);
    }

    /// Recompute the header's hash merkle root from the body
    pub fn refresh_hash_merkle_root(&mut self) -> Result<Hash> {
        let root = hash_merkle_root(&self.coinbase, &self.transactions)?;
        self.header.hash_merkle_root = root;
        Ok(root)
    }
}

// ============================================================================
// PARSING
// ============================================================================

/// ParseHeader: 𝕊 → ℋ
pub fn parse_header<R: Read>(reader: &mut R) -> Result<BlockHeader> {
    let version = read_u32(reader, "block version")?;
    let parent_count = read_u8(reader, "parent count")? as usize;

    let mut parent_hashes = Vec::with_capacity(parent_count);
    for _ in 0..parent_count {
        parent_hashes.push(read_hash(reader, "parent hash")?);
    }

    let hash_merkle_root = read_hash(reader, "hash merkle root")?;
    let id_merkle_root = read_hash(reader, "id merkle root")?;
    let utxo_commitment = read_hash(reader, "utxo commitment")?;
    let timestamp = read_u64(reader, "timestamp")?;
    let bits = u32::from_le_bytes(read_array(reader, "bits")?);
    let nonce = read_u64(reader, "nonce")?;

    Ok(BlockHeader {
        version,
        parent_hashes,
        hash_merkle_root,
        id_merkle_root,
        utxo_commitment,
        timestamp,
        bits,
        nonce,
    })
}

/// ParseBody: 𝕊 → 𝒯𝒳 × 𝒯𝒳*
///
/// VarInt tx count, one coinbase, then `count - 1` native transactions.
pub fn parse_body<R: Read>(reader: &mut R) -> Result<(Transaction, Vec<Transaction>)> {
    let (tx_count, _) = read_varint(reader)?;
    if tx_count == 0 {
        return Err(WireError::InvalidLength { field: "tx count", expected: 1, actual: 0 });
    }

    let coinbase = parse_transaction(reader)?;
    let mut transactions = Vec::new();
    for _ in 1..tx_count {
        transactions.push(parse_transaction(reader)?);
    }
    Ok((coinbase, transactions))
}

pub fn parse_block<R: Read>(reader: &mut R) -> Result<Block> {
    let header = parse_header(reader)?;
    let (coinbase, transactions) = parse_body(reader)?;
    Ok(Block { header, coinbase, transactions })
}

/// Parse exactly one block, rejecting trailing bytes
pub fn block_from_bytes(bytes: &[u8]) -> Result<Block> {
    let mut cursor = Cursor::new(bytes);
    let block = parse_block(&mut cursor)?;
    ensure_consumed(&cursor, "block")?;
    Ok(block)
}

pub fn block_from_hex(block_hex: &str) -> Result<Block> {
    block_from_bytes(&hex::decode(block_hex)?)
}

// ============================================================================
// SERIALIZATION
// ============================================================================

/// Header bytes up to and including `bits`; the nonce is appended by callers
pub fn header_prefix(header: &BlockHeader) -> Result<ByteString> {
    if header.parent_hashes.len() > MAX_PARENT_HASHES {
        return Err(WireError::TooManyParents(header.parent_hashes.len()));
    }

    let mut out = Vec::with_capacity(BlockHeader::size_for(header.parent_hashes.len()));
    out.extend_from_slice(&header.version.to_le_bytes());
    out.push(header.parent_hashes.len() as u8);
    for parent in &header.parent_hashes {
        out.extend_from_slice(parent);
    }
    out.extend_from_slice(&header.hash_merkle_root);
    out.extend_from_slice(&header.id_merkle_root);
    out.extend_from_slice(&header.utxo_commitment);
    out.extend_from_slice(&header.timestamp.to_le_bytes());
    out.extend_from_slice(&header.bits.to_le_bytes());
    Ok(out)
}

/// HeaderBytes: ℋ → 𝔹*, all fields in declaration order
pub fn header_bytes(header: &BlockHeader) -> Result<ByteString> {
    let mut out = header_prefix(header)?;
    out.extend_from_slice(&header.nonce.to_le_bytes());
    Ok(out)
}

pub fn serialize_body(block: &Block) -> ByteString {
    let mut out = Vec::new();
    encode_varint_into(block.tx_count(), &mut out);
    out.extend_from_slice(&serialize_transaction(&block.coinbase));
    for tx in &block.transactions {
        out.extend_from_slice(&serialize_transaction(tx));
    }
    out
}

pub fn serialize_block(block: &Block) -> Result<ByteString> {
    let mut out = header_bytes(&block.header)?;
    out.extend_from_slice(&serialize_body(block));
    Ok(out)
}

pub fn block_to_hex(block: &Block) -> Result<String> {
    Ok(hex::encode(serialize_block(block)?))
}

// ============================================================================
// HEADER HASH
// ============================================================================

/// DoubleSHA256 of the header in wire order
pub fn block_hash(header: &BlockHeader) -> Result<Hash> {
    Ok(double_sha256(&header_bytes(header)?))
}

/// HeaderHash: ℋ → ℕ
///
/// The digest read as a little-endian 256-bit integer, compared directly
/// against the target.
pub fn header_hash(header: &BlockHeader) -> Result<U256> {
    Ok(hash_to_u256(&block_hash(header)?))
}

/// Block hash in display order, as submitted over RPC
pub fn block_hash_hex(header: &BlockHeader) -> Result<String> {
    Ok(hash_to_display_hex(&block_hash(header)?))
}

pub(crate) fn hash_to_u256(hash: &Hash) -> U256 {
    U256::from_little_endian(hash)
}
