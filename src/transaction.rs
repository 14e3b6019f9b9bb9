//! Transaction codec: inputs, outputs, subnetwork fields and transaction ids

use std::io::{Cursor, Read};

use crate::constants::*;
use crate::error::{Result, WireError};
use crate::hash::{double_sha256, hash_from_display_hex, reverse_hash};
use crate::script::TxScript;
use crate::types::*;
use crate::varint::{
    encode_varint_into, read_array, read_hash, read_u32, read_u64, read_var_bytes, read_varint,
    write_var_bytes,
};

/// Upper bound on pre-allocated list capacity while parsing
const PARSE_PREALLOC_LIMIT: usize = 1024;

impl TransactionInput {
    /// Unsigned input with an empty signature script and final sequence
    pub fn unsigned(previous_tx_id: Hash, previous_output_index: u32) -> Self {
        Self {
            previous_tx_id,
            previous_output_index,
            signature_script: Vec::new(),
            sequence: MAX_SEQUENCE,
        }
    }

    /// Build an input from a display-order previous txid
    pub fn from_display_txid(
        previous_txid_hex: &str,
        previous_output_index: u32,
        signature_script: ByteString,
        sequence: u64,
    ) -> Result<Self> {
        Ok(Self {
            previous_tx_id: hash_from_display_hex(previous_txid_hex)?,
            previous_output_index,
            signature_script,
            sequence,
        })
    }

    /// Tokenized view of the signature script
    pub fn script(&self) -> Result<TxScript> {
        TxScript::parse(&self.signature_script)
    }
}

impl TransactionOutput {
    pub fn new(value: u64, script: &TxScript) -> Result<Self> {
        Ok(Self { value, script_pub_key: script.to_bytes()? })
    }

    /// Tokenized view of the locking script
    pub fn script(&self) -> Result<TxScript> {
        TxScript::parse(&self.script_pub_key)
    }
}

impl Transaction {
    /// Native-subnetwork transaction at the builder version with zero lock time
    pub fn native(inputs: Vec<TransactionInput>, outputs: Vec<TransactionOutput>) -> Self {
        Self {
            version: TX_VERSION,
            inputs,
            outputs,
            lock_time: 0,
            subnetwork: Subnetwork::Native,
        }
    }

    pub fn subnetwork_id(&self) -> &SubnetworkId {
        self.subnetwork.id()
    }

    /// Coinbase transactions live on the coinbase subnetwork
    pub fn is_coinbase(&self) -> bool {
        *self.subnetwork_id() == COINBASE_SUBNETWORK_ID
    }

    /// Payload bytes, empty for native transactions
    pub fn payload(&self) -> &[u8] {
        match &self.subnetwork {
            Subnetwork::Native => &[],
            Subnetwork::Other(data) => &data.payload,
        }
    }

    /// Decode the payload as a coinbase payload
    pub fn coinbase_payload(&self, with_blue_score: bool) -> Result<TxPayload> {
        TxPayload::parse(self.payload(), with_blue_score)
    }
}

// ============================================================================
// PARSING
// ============================================================================

/// ParseTransaction: 𝕊 → 𝒯𝒳
///
/// 1. version, VarInt input count, inputs
/// 2. VarInt output count, outputs
/// 3. lock time, subnetwork id
/// 4. If the id is not native: gas, payload hash, VarInt payload length, payload
pub fn parse_transaction<R: Read>(reader: &mut R) -> Result<Transaction> {
    let version = read_u32(reader, "tx version")?;

    let (input_count, _) = read_varint(reader)?;
    let mut inputs = Vec::with_capacity(prealloc(input_count));
    for _ in 0..input_count {
        inputs.push(parse_input(reader)?);
    }

    let (output_count, _) = read_varint(reader)?;
    let mut outputs = Vec::with_capacity(prealloc(output_count));
    for _ in 0..output_count {
        outputs.push(parse_output(reader)?);
    }

    let lock_time = read_u64(reader, "tx lock time")?;
    let id: SubnetworkId = read_array(reader, "subnetwork id")?;

    let subnetwork = if id == NATIVE_SUBNETWORK_ID {
        Subnetwork::Native
    } else {
        let gas = read_u64(reader, "gas")?;
        let payload_hash = read_hash(reader, "payload hash")?;
        let payload = read_var_bytes(reader, "payload")?;
        Subnetwork::Other(SubnetworkData::new(id, gas, payload_hash, payload)?)
    };

    Ok(Transaction { version, inputs, outputs, lock_time, subnetwork })
}

/// Parse exactly one transaction, rejecting trailing bytes
pub fn transaction_from_bytes(bytes: &[u8]) -> Result<Transaction> {
    let mut cursor = Cursor::new(bytes);
    let tx = parse_transaction(&mut cursor)?;
    ensure_consumed(&cursor, "transaction")?;
    Ok(tx)
}

/// Parse a hex-encoded transaction (e.g. `transactions[0].data` of a template)
pub fn transaction_from_hex(tx_hex: &str) -> Result<Transaction> {
    transaction_from_bytes(&hex::decode(tx_hex)?)
}

pub fn parse_input<R: Read>(reader: &mut R) -> Result<TransactionInput> {
    let previous_tx_id = read_hash(reader, "previous tx id")?;
    let previous_output_index = read_u32(reader, "previous output index")?;
    let signature_script = read_var_bytes(reader, "signature script")?;
    let sequence = read_u64(reader, "sequence")?;
    Ok(TransactionInput { previous_tx_id, previous_output_index, signature_script, sequence })
}

pub fn parse_output<R: Read>(reader: &mut R) -> Result<TransactionOutput> {
    let value = read_u64(reader, "output value")?;
    let script_pub_key = read_var_bytes(reader, "script pub key")?;
    Ok(TransactionOutput { value, script_pub_key })
}

// ============================================================================
// SERIALIZATION
// ============================================================================

/// Which form of the transaction is being written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    /// Full wire form
    Full,
    /// Merkle leaf form: payload replaced by a single zero byte
    Merkle,
    /// Txid form: input scripts cleared unless coinbase, payload as for merkle unless coinbase
    Id { coinbase: bool },
}

/// SerializeTransaction: 𝒯𝒳 → 𝔹*
pub fn serialize_transaction(tx: &Transaction) -> ByteString {
    let mut out = Vec::new();
    write_transaction(tx, Encoding::Full, &mut out);
    out
}

/// Merkle leaf form.
///
/// Identical to the full form for native transactions; non-native ones keep
/// gas and payload hash but write a single 0x00 in place of the payload.
pub fn serialize_for_merkle(tx: &Transaction) -> ByteString {
    let mut out = Vec::new();
    write_transaction(tx, Encoding::Merkle, &mut out);
    out
}

pub fn serialize_input_into(input: &TransactionInput, out: &mut Vec<u8>) {
    write_input(input, &input.signature_script, out);
}

pub fn serialize_output_into(output: &TransactionOutput, out: &mut Vec<u8>) {
    out.extend_from_slice(&output.value.to_le_bytes());
    write_var_bytes(&output.script_pub_key, out);
}

fn write_input(input: &TransactionInput, script: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(&input.previous_tx_id);
    out.extend_from_slice(&input.previous_output_index.to_le_bytes());
    write_var_bytes(script, out);
    out.extend_from_slice(&input.sequence.to_le_bytes());
}

fn write_transaction(tx: &Transaction, encoding: Encoding, out: &mut Vec<u8>) {
    out.extend_from_slice(&tx.version.to_le_bytes());

    encode_varint_into(tx.inputs.len() as u64, out);
    for input in &tx.inputs {
        match encoding {
            Encoding::Id { coinbase: false } => write_input(input, &[], out),
            _ => serialize_input_into(input, out),
        }
    }

    encode_varint_into(tx.outputs.len() as u64, out);
    for output in &tx.outputs {
        serialize_output_into(output, out);
    }

    out.extend_from_slice(&tx.lock_time.to_le_bytes());
    out.extend_from_slice(tx.subnetwork_id());

    if let Subnetwork::Other(data) = &tx.subnetwork {
        out.extend_from_slice(&data.gas.to_le_bytes());
        out.extend_from_slice(&data.payload_hash);
        match encoding {
            Encoding::Full | Encoding::Id { coinbase: true } => write_var_bytes(&data.payload, out),
            Encoding::Merkle | Encoding::Id { coinbase: false } => out.push(0x00),
        }
    }
}

// ============================================================================
// TRANSACTION IDS
// ============================================================================

/// ComputeTxId: 𝒯𝒳 × {coinbase} → ℍ
///
/// 1. Non-coinbase inputs are hashed with an empty signature script
/// 2. Non-native payload is hashed in full only for coinbase
/// 3. Return double-SHA256 reversed into display order
pub fn compute_txid(tx: &Transaction, coinbase: bool) -> Hash {
    let mut out = Vec::new();
    write_transaction(tx, Encoding::Id { coinbase }, &mut out);
    reverse_hash(&double_sha256(&out))
}

/// Display hex of `compute_txid`, inferring the coinbase flag from the subnetwork
pub fn txid_hex(tx: &Transaction) -> String {
    hex::encode(compute_txid(tx, tx.is_coinbase()))
}

// ============================================================================
// COINBASE PAYLOAD
// ============================================================================

impl TxPayload {
    /// Parse `[blueScore(8)] VarInt len | scriptPubKey | extraData`
    pub fn parse(bytes: &[u8], with_blue_score: bool) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);
        let blue_score = if with_blue_score {
            Some(read_u64(&mut cursor, "blue score")?)
        } else {
            None
        };
        let script_pub_key = read_var_bytes(&mut cursor, "payload script pub key")?;
        let mut extra_data = Vec::new();
        cursor.read_to_end(&mut extra_data)?;
        Ok(Self { blue_score, script_pub_key, extra_data })
    }

    pub fn to_bytes(&self) -> ByteString {
        let mut out = Vec::new();
        if let Some(score) = self.blue_score {
            out.extend_from_slice(&score.to_le_bytes());
        }
        write_var_bytes(&self.script_pub_key, &mut out);
        out.extend_from_slice(&self.extra_data);
        out
    }
}

// ============================================================================
// OUTPUT BUILDERS
// ============================================================================

/// Split `total_value` evenly over P2PKH outputs, remainder to the last one
pub fn p2pkh_outputs(
    total_value: u64,
    pubkey_hashes: &[[u8; PUBKEY_HASH_SIZE]],
) -> Result<Vec<TransactionOutput>> {
    if pubkey_hashes.is_empty() {
        return Ok(Vec::new());
    }

    let count = pubkey_hashes.len() as u64;
    let each = total_value / count;
    let last = total_value - each * (count - 1);

    pubkey_hashes
        .iter()
        .enumerate()
        .map(|(i, hash)| {
            let value = if i + 1 == pubkey_hashes.len() { last } else { each };
            TransactionOutput::new(value, &TxScript::p2pkh(hash))
        })
        .collect()
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn prealloc(count: u64) -> usize {
    usize::try_from(count).unwrap_or(usize::MAX).min(PARSE_PREALLOC_LIMIT)
}

pub(crate) fn ensure_consumed(cursor: &Cursor<&[u8]>, field: &'static str) -> Result<()> {
    let total = cursor.get_ref().len();
    let used = cursor.position() as usize;
    if used != total {
        return Err(WireError::InvalidLength { field, expected: used, actual: total });
    }
    Ok(())
}
