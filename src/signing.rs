//! Input signing: signature hash construction and signature script assembly
//!
//! The key material lives behind [`InputSigner`]; [`SchnorrSigner`] is the
//! secp256k1 implementation used for test transactions.

use secp256k1::{All, Keypair, Message, PublicKey, Secp256k1, SecretKey};
use tracing::debug;

use crate::constants::PUBKEY_HASH_SIZE;
use crate::error::{Result, WireError};
use crate::hash::{double_sha256, hash160};
use crate::script::{SigHashType, TxScript};
use crate::transaction::serialize_transaction;
use crate::types::*;

/// Produces a signature and the matching public key for a 32-byte digest
pub trait InputSigner {
    fn sign_digest(&self, digest: &Hash) -> Result<(ByteString, ByteString)>;
}

/// Schnorr signer over secp256k1 with a compressed public key
pub struct SchnorrSigner {
    secp: Secp256k1<All>,
    keypair: Keypair,
}

impl SchnorrSigner {
    pub fn from_secret_bytes(secret: &[u8]) -> Result<Self> {
        let secp = Secp256k1::new();
        let secret_key = SecretKey::from_slice(secret)
            .map_err(|e| WireError::Signing(format!("Invalid secret key: {}", e)))?;
        let keypair = Keypair::from_secret_key(&secp, &secret_key);
        Ok(Self { secp, keypair })
    }

    /// Compressed SEC1 public key
    pub fn public_key(&self) -> [u8; 33] {
        PublicKey::from_keypair(&self.keypair).serialize()
    }

    pub fn pubkey_hash(&self) -> [u8; PUBKEY_HASH_SIZE] {
        hash160(&self.public_key())
    }

    /// P2PKH lock script paying to this key
    pub fn lock_script(&self) -> TxScript {
        TxScript::p2pkh(&self.pubkey_hash())
    }
}

impl InputSigner for SchnorrSigner {
    fn sign_digest(&self, digest: &Hash) -> Result<(ByteString, ByteString)> {
        let message = Message::from_digest_slice(digest)
            .map_err(|e| WireError::Signing(format!("Invalid digest: {}", e)))?;
        let signature = self.secp.sign_schnorr_no_aux_rand(&message, &self.keypair);
        Ok((signature.as_ref().to_vec(), self.public_key().to_vec()))
    }
}

/// SignatureHash: 𝒯𝒳 × ℕ × 𝕊 × 𝒮ℋ → ℍ
///
/// 1. Copy the transaction with every signature script emptied
/// 2. Put `lock_script` into input `index`
/// 3. Append the sighash type as 4 little-endian bytes
/// 4. Return DoubleSHA256 of the result
pub fn signature_hash(
    tx: &Transaction,
    index: usize,
    lock_script: &[u8],
    sighash: SigHashType,
) -> Result<Hash> {
    if index >= tx.inputs.len() {
        return Err(WireError::Signing(format!(
            "Input index {} out of range ({} inputs)",
            index,
            tx.inputs.len()
        )));
    }

    let mut signing_tx = tx.clone();
    for (i, input) in signing_tx.inputs.iter_mut().enumerate() {
        input.signature_script = if i == index { lock_script.to_vec() } else { Vec::new() };
    }

    let mut message = serialize_transaction(&signing_tx);
    message.extend_from_slice(&sighash.to_le_bytes());
    Ok(double_sha256(&message))
}

/// Signature script for one input, without installing it
pub fn sign_input(
    tx: &Transaction,
    index: usize,
    lock_script: &[u8],
    signer: &dyn InputSigner,
) -> Result<ByteString> {
    let digest = signature_hash(tx, index, lock_script, SigHashType::All)?;
    let (signature, pubkey) = signer.sign_digest(&digest)?;
    debug!(index, sig_len = signature.len(), "signed input");
    TxScript::signature_script(&signature, SigHashType::All, &pubkey).to_bytes()
}

/// Sign every input with SIGHASH_ALL.
///
/// `lock_scripts[i]` is the locking script of the output spent by input `i`.
/// All digests are taken before any script is installed.
pub fn sign_transaction(
    tx: &mut Transaction,
    lock_scripts: &[ByteString],
    signers: &[&dyn InputSigner],
) -> Result<()> {
    if lock_scripts.len() != tx.inputs.len() || signers.len() != tx.inputs.len() {
        return Err(WireError::Signing(format!(
            "Need one lock script and one signer per input: {} inputs, {} scripts, {} signers",
            tx.inputs.len(),
            lock_scripts.len(),
            signers.len()
        )));
    }

    let scripts = (0..tx.inputs.len())
        .map(|i| sign_input(tx, i, &lock_scripts[i], signers[i]))
        .collect::<Result<Vec<_>>>()?;

    for (input, script) in tx.inputs.iter_mut().zip(scripts) {
        input.signature_script = script;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spend_tx(inputs: usize) -> Transaction {
        let inputs = (0..inputs)
            .map(|i| TransactionInput {
                previous_tx_id: [i as u8; 32],
                previous_output_index: 0,
                signature_script: vec![0xde, 0xad],
                sequence: u64::MAX,
            })
            .collect();
        Transaction::native(inputs, vec![TransactionOutput { value: 1, script_pub_key: vec![0x51] }])
    }

    #[test]
    fn test_signature_hash_ignores_existing_scripts() {
        let tx = spend_tx(2);
        let mut other = tx.clone();
        other.inputs[1].signature_script = vec![1, 2, 3];
        let lock = vec![0x76];
        assert_eq!(
            signature_hash(&tx, 0, &lock, SigHashType::All).unwrap(),
            signature_hash(&other, 0, &lock, SigHashType::All).unwrap()
        );
    }

    #[test]
    fn test_signature_hash_depends_on_index() {
        let tx = spend_tx(2);
        let lock = vec![0x76];
        assert_ne!(
            signature_hash(&tx, 0, &lock, SigHashType::All).unwrap(),
            signature_hash(&tx, 1, &lock, SigHashType::All).unwrap()
        );
    }

    #[test]
    fn test_signature_hash_index_out_of_range() {
        let tx = spend_tx(1);
        assert!(matches!(signature_hash(&tx, 1, &[], SigHashType::All), Err(WireError::Signing(_))));
    }

    #[test]
    fn test_invalid_secret_rejected() {
        assert!(SchnorrSigner::from_secret_bytes(&[0u8; 32]).is_err());
    }
}
