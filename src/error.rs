//! Error types for wire encoding, hashing and mining

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WireError {
    #[error("Truncated input: {field} needs {needed} byte(s)")]
    TruncatedInput { needed: usize, field: &'static str },

    #[error("Script encoding error: push of {0} bytes exceeds the single-byte length form")]
    ScriptEncoding(usize),

    #[error("Target unreachable after {attempts} attempt(s)")]
    TargetUnreachable { attempts: u64 },

    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("Invalid length for {field}: expected {expected}, got {actual}")]
    InvalidLength { field: &'static str, expected: usize, actual: usize },

    #[error("Too many parent hashes: {0} (at most 255)")]
    TooManyParents(usize),

    #[error("Subnetwork data cannot use the native subnetwork id")]
    NativeSubnetworkData,

    #[error("Cannot calculate merkle root for empty leaf list")]
    EmptyMerkleTree,

    #[error("Invalid compact target bits: {0:#010x}")]
    InvalidBits(u32),

    #[error("Block template error: {0}")]
    Template(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("System clock error: {0}")]
    Clock(String),
}

pub type Result<T> = std::result::Result<T, WireError>;

impl From<serde_json::Error> for WireError {
    fn from(err: serde_json::Error) -> Self {
        WireError::Template(err.to_string())
    }
}

impl From<toml::de::Error> for WireError {
    fn from(err: toml::de::Error) -> Self {
        WireError::Config(err.to_string())
    }
}
