//! Script assembler: opcode table, token streams and standard script builders

use std::fmt;

use crate::constants::{MAX_SCRIPT_PUSH, PUBKEY_HASH_SIZE};
use crate::error::{Result, WireError};
use crate::hash::hash160;
use crate::types::ByteString;

// ============================================================================
// OPCODES
// ============================================================================

pub const OP_0: u8 = 0x00;
pub const OP_FALSE: u8 = OP_0;
pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_PUSHDATA2: u8 = 0x4d;
pub const OP_PUSHDATA4: u8 = 0x4e;
pub const OP_1: u8 = 0x51;
pub const OP_TRUE: u8 = OP_1;
pub const OP_RETURN: u8 = 0x6a;
pub const OP_DUP: u8 = 0x76;
pub const OP_EQUAL: u8 = 0x87;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_CHECKSIG: u8 = 0xac;

/// Every single-byte opcode the tokenizer recognises, by canonical name.
///
/// Aliases (OP_FALSE, OP_TRUE) share a byte with the first entry and are
/// not listed; byte lookups resolve to the canonical name.
const OPCODE_TABLE: &[(&str, u8)] = &[
    // constants
    ("OP_0", 0x00),
    ("OP_PUSHDATA1", 0x4c),
    ("OP_PUSHDATA2", 0x4d),
    ("OP_PUSHDATA4", 0x4e),
    ("OP_1NEGATE", 0x4f),
    ("OP_1", 0x51),
    ("OP_2", 0x52),
    ("OP_3", 0x53),
    ("OP_4", 0x54),
    ("OP_5", 0x55),
    ("OP_6", 0x56),
    ("OP_7", 0x57),
    ("OP_8", 0x58),
    ("OP_9", 0x59),
    ("OP_10", 0x5a),
    ("OP_11", 0x5b),
    ("OP_12", 0x5c),
    ("OP_13", 0x5d),
    ("OP_14", 0x5e),
    ("OP_15", 0x5f),
    ("OP_16", 0x60),
    // flow control
    ("OP_NOP", 0x61),
    ("OP_IF", 0x63),
    ("OP_NOTIF", 0x64),
    ("OP_ELSE", 0x67),
    ("OP_ENDIF", 0x68),
    ("OP_VERIFY", 0x69),
    ("OP_RETURN", 0x6a),
    // stack
    ("OP_TOALTSTACK", 0x6b),
    ("OP_FROMALTSTACK", 0x6c),
    ("OP_2DROP", 0x6d),
    ("OP_2DUP", 0x6e),
    ("OP_3DUP", 0x6f),
    ("OP_2OVER", 0x70),
    ("OP_2ROT", 0x71),
    ("OP_2SWAP", 0x72),
    ("OP_IFDUP", 0x73),
    ("OP_DEPTH", 0x74),
    ("OP_DROP", 0x75),
    ("OP_DUP", 0x76),
    ("OP_NIP", 0x77),
    ("OP_OVER", 0x78),
    ("OP_PICK", 0x79),
    ("OP_ROLL", 0x7a),
    ("OP_ROT", 0x7b),
    ("OP_SWAP", 0x7c),
    ("OP_TUCK", 0x7d),
    // splice
    ("OP_SIZE", 0x82),
    // bitwise logic
    ("OP_EQUAL", 0x87),
    ("OP_EQUALVERIFY", 0x88),
    // arithmetic
    ("OP_1ADD", 0x8b),
    ("OP_1SUB", 0x8c),
    ("OP_NEGATE", 0x8f),
    ("OP_ABS", 0x90),
    ("OP_NOT", 0x91),
    ("OP_0NOTEQUAL", 0x92),
    ("OP_ADD", 0x93),
    ("OP_SUB", 0x94),
    ("OP_BOOLAND", 0x9a),
    ("OP_BOOLOR", 0x9b),
    ("OP_NUMEQUAL", 0x9c),
    ("OP_NUMEQUALVERIFY", 0x9d),
    ("OP_NUMNOTEQUAL", 0x9e),
    ("OP_LESSTHAN", 0x9f),
    ("OP_GREATERTHAN", 0xa0),
    ("OP_LESSTHANOREQUAL", 0xa1),
    ("OP_GREATERTHANOREQUAL", 0xa2),
    ("OP_MIN", 0xa3),
    ("OP_MAX", 0xa4),
    ("OP_WITHIN", 0xa5),
    // crypto
    ("OP_RIPEMD160", 0xa6),
    ("OP_SHA1", 0xa7),
    ("OP_SHA256", 0xa8),
    ("OP_HASH160", 0xa9),
    ("OP_HASH256", 0xaa),
    ("OP_CODESEPARATOR", 0xab),
    ("OP_CHECKSIG", 0xac),
    ("OP_CHECKSIGVERIFY", 0xad),
    ("OP_CHECKMULTISIG", 0xae),
    ("OP_CHECKMULTISIGVERIFY", 0xaf),
    // locktime
    ("OP_CHECKLOCKTIMEVERIFY", 0xb1),
    ("OP_CHECKSEQUENCEVERIFY", 0xb2),
    // pseudo-words and reserved
    ("OP_RESERVED", 0x50),
    ("OP_VER", 0x62),
    ("OP_VERIF", 0x65),
    ("OP_VERNOTIF", 0x66),
    ("OP_RESERVED1", 0x89),
    ("OP_RESERVED2", 0x8a),
    ("OP_NOP1", 0xb0),
    ("OP_NOP4", 0xb3),
    ("OP_NOP5", 0xb4),
    ("OP_NOP6", 0xb5),
    ("OP_NOP7", 0xb6),
    ("OP_NOP8", 0xb7),
    ("OP_NOP9", 0xb8),
    ("OP_NOP10", 0xb9),
];

/// A recognised single-byte opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Opcode(u8);

impl Opcode {
    /// Look up a byte in the opcode table
    pub fn from_byte(byte: u8) -> Option<Self> {
        OPCODE_TABLE
            .iter()
            .any(|&(_, b)| b == byte)
            .then_some(Opcode(byte))
    }

    /// Look up an opcode by name, accepting the OP_FALSE/OP_TRUE aliases
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "OP_FALSE" => return Some(Opcode(OP_FALSE)),
            "OP_TRUE" => return Some(Opcode(OP_TRUE)),
            _ => {}
        }
        OPCODE_TABLE
            .iter()
            .find(|&&(n, _)| n == name)
            .map(|&(_, b)| Opcode(b))
    }

    pub fn byte(self) -> u8 {
        self.0
    }

    pub fn name(self) -> &'static str {
        OPCODE_TABLE
            .iter()
            .find(|&&(_, b)| b == self.0)
            .map(|&(n, _)| n)
            .unwrap_or("OP_UNKNOWN")
    }
}

// ============================================================================
// SIGNATURE HASH TYPES
// ============================================================================

/// Signature hash type appended to every signature push
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SigHashType {
    All = 0x01,
    None = 0x02,
    Single = 0x03,
    AnyoneCanPay = 0x04,
}

impl SigHashType {
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Four-byte little-endian form appended to the signing message
    pub fn to_le_bytes(self) -> [u8; 4] {
        (self as u32).to_le_bytes()
    }
}

// ============================================================================
// TOKENS AND SCRIPTS
// ============================================================================

/// One element of a script: an opcode or a length-prefixed data push
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptToken {
    Op(Opcode),
    Push(ByteString),
}

/// Ordered token stream
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TxScript {
    tokens: Vec<ScriptToken>,
}

impl TxScript {
    /// Script with no tokens; serializes to zero bytes
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_tokens(tokens: Vec<ScriptToken>) -> Self {
        Self { tokens }
    }

    /// Tokenize raw script bytes.
    ///
    /// A byte found in the opcode table becomes an opcode token; any other
    /// byte `n` introduces a push of the following `n` bytes.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let mut tokens = Vec::new();
        let mut pos = 0;

        while pos < raw.len() {
            let byte = raw[pos];
            pos += 1;

            if let Some(op) = Opcode::from_byte(byte) {
                tokens.push(ScriptToken::Op(op));
                continue;
            }

            let len = byte as usize;
            let end = pos + len;
            if end > raw.len() {
                return Err(WireError::TruncatedInput { needed: len, field: "script push" });
            }
            tokens.push(ScriptToken::Push(raw[pos..end].to_vec()));
            pos = end;
        }

        Ok(Self { tokens })
    }

    /// P2PKH lock script: OP_DUP OP_HASH160 <hash> OP_EQUALVERIFY OP_CHECKSIG
    pub fn p2pkh(pubkey_hash: &[u8; PUBKEY_HASH_SIZE]) -> Self {
        Self {
            tokens: vec![
                ScriptToken::Op(Opcode(OP_DUP)),
                ScriptToken::Op(Opcode(OP_HASH160)),
                ScriptToken::Push(pubkey_hash.to_vec()),
                ScriptToken::Op(Opcode(OP_EQUALVERIFY)),
                ScriptToken::Op(Opcode(OP_CHECKSIG)),
            ],
        }
    }

    /// P2PKH lock script paying to the HASH160 of `pubkey`
    pub fn p2pkh_for_pubkey(pubkey: &[u8]) -> Self {
        Self::p2pkh(&hash160(pubkey))
    }

    /// Unlock script: <signature || sighash byte> <pubkey>
    pub fn signature_script(signature: &[u8], sighash: SigHashType, pubkey: &[u8]) -> Self {
        let mut sig = Vec::with_capacity(signature.len() + 1);
        sig.extend_from_slice(signature);
        sig.push(sighash.as_byte());
        Self {
            tokens: vec![ScriptToken::Push(sig), ScriptToken::Push(pubkey.to_vec())],
        }
    }

    pub fn push_opcode(&mut self, op: Opcode) -> &mut Self {
        self.tokens.push(ScriptToken::Op(op));
        self
    }

    pub fn push_data(&mut self, data: &[u8]) -> &mut Self {
        self.tokens.push(ScriptToken::Push(data.to_vec()));
        self
    }

    pub fn tokens(&self) -> &[ScriptToken] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Data pushed immediately after the first OP_HASH160, if any
    pub fn pubkey_hash(&self) -> Option<&[u8]> {
        self.tokens.windows(2).find_map(|pair| match pair {
            [ScriptToken::Op(op), ScriptToken::Push(data)] if op.byte() == OP_HASH160 => Some(data.as_slice()),
            _ => None,
        })
    }

    /// Matches the exact P2PKH template with a 20-byte hash
    pub fn is_p2pkh(&self) -> bool {
        matches!(
            self.tokens.as_slice(),
            [
                ScriptToken::Op(a),
                ScriptToken::Op(b),
                ScriptToken::Push(hash),
                ScriptToken::Op(c),
                ScriptToken::Op(d),
            ] if a.byte() == OP_DUP
                && b.byte() == OP_HASH160
                && hash.len() == PUBKEY_HASH_SIZE
                && c.byte() == OP_EQUALVERIFY
                && d.byte() == OP_CHECKSIG
        )
    }

    /// Serialize: opcode byte, or one length byte followed by the data
    pub fn to_bytes(&self) -> Result<ByteString> {
        let mut out = Vec::new();
        for token in &self.tokens {
            match token {
                ScriptToken::Op(op) => out.push(op.byte()),
                ScriptToken::Push(data) => {
                    if data.len() > MAX_SCRIPT_PUSH {
                        return Err(WireError::ScriptEncoding(data.len()));
                    }
                    out.push(data.len() as u8);
                    out.extend_from_slice(data);
                }
            }
        }
        Ok(out)
    }
}

impl fmt::Display for TxScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            match token {
                ScriptToken::Op(op) => write!(f, "{}", op.name())?,
                ScriptToken::Push(data) => write!(f, "<{}>", hex::encode(data))?,
            }
        }
        Ok(())
    }
}
