//! Core block and transaction types for the DAG wire format

use serde::{Deserialize, Serialize};

use crate::constants::{HASH_SIZE, NATIVE_SUBNETWORK_ID, SUBNETWORK_ID_SIZE};
use crate::error::{Result, WireError};

/// Hash type: 256-bit hash, stored in wire (internal) byte order
pub type Hash = [u8; HASH_SIZE];

/// Byte string type
pub type ByteString = Vec<u8>;

/// Subnetwork id: 20 opaque bytes
pub type SubnetworkId = [u8; SUBNETWORK_ID_SIZE];

/// Transaction Input
///
/// `previous_tx_id` is in wire order, i.e. reversed relative to display hex.
/// `signature_script` is kept as raw bytes so arbitrary coinbase scripts
/// survive a parse/serialize cycle untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub previous_tx_id: Hash,
    pub previous_output_index: u32,
    pub signature_script: ByteString,
    pub sequence: u64,
}

/// Transaction Output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub value: u64,
    pub script_pub_key: ByteString,
}

/// Fields carried only by non-native transactions.
///
/// The id can never equal the native sentinel; construction enforces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSubnetworkData")]
pub struct SubnetworkData {
    id: SubnetworkId,
    pub gas: u64,
    pub payload_hash: Hash,
    pub payload: ByteString,
}

impl SubnetworkData {
    pub fn new(id: SubnetworkId, gas: u64, payload_hash: Hash, payload: ByteString) -> Result<Self> {
        if id == NATIVE_SUBNETWORK_ID {
            return Err(WireError::NativeSubnetworkData);
        }
        Ok(Self { id, gas, payload_hash, payload })
    }

    pub fn id(&self) -> &SubnetworkId {
        &self.id
    }
}

#[derive(Deserialize)]
struct RawSubnetworkData {
    id: SubnetworkId,
    gas: u64,
    payload_hash: Hash,
    payload: ByteString,
}

impl TryFrom<RawSubnetworkData> for SubnetworkData {
    type Error = WireError;

    fn try_from(raw: RawSubnetworkData) -> Result<Self> {
        SubnetworkData::new(raw.id, raw.gas, raw.payload_hash, raw.payload)
    }
}

/// Subnetwork tag of a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subnetwork {
    Native,
    Other(SubnetworkData),
}

impl Subnetwork {
    pub fn id(&self) -> &SubnetworkId {
        match self {
            Subnetwork::Native => &NATIVE_SUBNETWORK_ID,
            Subnetwork::Other(data) => data.id(),
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Subnetwork::Native)
    }
}

/// Transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub lock_time: u64,
    pub subnetwork: Subnetwork,
}

/// Block Header
///
/// Hash fields are in wire order. `bits` is the compact target as read
/// little-endian from its four wire bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub version: u32,
    pub parent_hashes: Vec<Hash>,
    pub hash_merkle_root: Hash,
    pub id_merkle_root: Hash,
    pub utxo_commitment: Hash,
    pub timestamp: u64,
    pub bits: u32,
    pub nonce: u64,
}

/// Block: header, exactly one coinbase, then native transactions.
///
/// The wire tx count is always `1 + transactions.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub coinbase: Transaction,
    pub transactions: Vec<Transaction>,
}

/// Coinbase payload: `[blueScore] scriptPubKeyLength scriptPubKey extraData`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxPayload {
    pub blue_score: Option<u64>,
    pub script_pub_key: ByteString,
    pub extra_data: ByteString,
}
