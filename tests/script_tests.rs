//! Tests for the script assembler

use kaspa_wire::hash::hash160;
use kaspa_wire::script::*;
use kaspa_wire::WireError;

#[test]
fn test_empty_script_serializes_to_nothing() {
    let script = TxScript::empty();
    assert!(script.is_empty());
    assert_eq!(script.to_bytes().unwrap(), Vec::<u8>::new());
}

#[test]
fn test_parse_p2pkh_bytes() {
    let mut raw = vec![0x76, 0xa9, 0x14];
    raw.extend_from_slice(&[0x5a; 20]);
    raw.extend_from_slice(&[0x88, 0xac]);

    let script = TxScript::parse(&raw).unwrap();
    assert_eq!(script.tokens().len(), 5);
    assert!(script.is_p2pkh());
    assert_eq!(script.pubkey_hash(), Some(&[0x5a; 20][..]));
    assert_eq!(script.to_bytes().unwrap(), raw);
}

#[test]
fn test_parse_unknown_byte_is_push_length() {
    // 0x02 is not an opcode: push the next two bytes
    let script = TxScript::parse(&[0x02, 0xaa, 0xbb, 0x87]).unwrap();
    assert_eq!(
        script.tokens(),
        &[
            ScriptToken::Push(vec![0xaa, 0xbb]),
            ScriptToken::Op(Opcode::from_byte(OP_EQUAL).unwrap()),
        ]
    );
}

#[test]
fn test_parse_truncated_push() {
    let result = TxScript::parse(&[0x05, 0x01, 0x02]);
    assert!(matches!(result, Err(WireError::TruncatedInput { needed: 5, .. })));
}

#[test]
fn test_no_pubkey_hash_without_hash160() {
    let script = TxScript::parse(&[0x02, 0xaa, 0xbb]).unwrap();
    assert_eq!(script.pubkey_hash(), None);
}

#[test]
fn test_signature_script_layout() {
    let signature = [0x33u8; 64];
    let pubkey = [0x02u8; 33];
    let script = TxScript::signature_script(&signature, SigHashType::All, &pubkey);
    let bytes = script.to_bytes().unwrap();

    assert_eq!(bytes.len(), 1 + 65 + 1 + 33);
    assert_eq!(bytes[0], 65);
    assert_eq!(bytes[65], SigHashType::All.as_byte());
    assert_eq!(bytes[66], 33);
    assert_eq!(&bytes[67..], &pubkey);
}

#[test]
fn test_p2pkh_for_pubkey_uses_hash160() {
    let pubkey = [0x03u8; 33];
    let script = TxScript::p2pkh_for_pubkey(&pubkey);
    assert_eq!(script.pubkey_hash(), Some(&hash160(&pubkey)[..]));
}

#[test]
fn test_push_limit() {
    let mut ok = TxScript::empty();
    ok.push_data(&[0u8; 255]);
    assert_eq!(ok.to_bytes().unwrap().len(), 256);

    let mut too_long = TxScript::empty();
    too_long.push_data(&[0u8; 300]);
    assert!(matches!(too_long.to_bytes(), Err(WireError::ScriptEncoding(300))));
}

#[test]
fn test_builder_chaining() {
    let mut script = TxScript::empty();
    script
        .push_opcode(Opcode::from_name("OP_RETURN").unwrap())
        .push_data(b"tag");
    assert_eq!(script.to_bytes().unwrap(), vec![OP_RETURN, 3, b't', b'a', b'g']);
}

#[test]
fn test_sighash_values() {
    assert_eq!(SigHashType::All.as_byte(), 1);
    assert_eq!(SigHashType::None.as_byte(), 2);
    assert_eq!(SigHashType::Single.as_byte(), 3);
    assert_eq!(SigHashType::AnyoneCanPay.as_byte(), 4);
    assert_eq!(SigHashType::All.to_le_bytes(), [1, 0, 0, 0]);
}

#[test]
fn test_opcode_names_round_trip() {
    for name in ["OP_DUP", "OP_HASH160", "OP_CHECKSIG", "OP_CHECKSEQUENCEVERIFY", "OP_NOP10"] {
        let op = Opcode::from_name(name).unwrap();
        assert_eq!(op.name(), name);
        assert_eq!(Opcode::from_byte(op.byte()), Some(op));
    }
}

#[test]
fn test_display_disassembly() {
    let script = TxScript::p2pkh(&[0x5a; 20]);
    assert_eq!(
        script.to_string(),
        format!("OP_DUP OP_HASH160 <{}> OP_EQUALVERIFY OP_CHECKSIG", "5a".repeat(20))
    );
}
