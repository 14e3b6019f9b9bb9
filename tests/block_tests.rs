//! Tests for the block codec and header hashing

use kaspa_wire::block::*;
use kaspa_wire::hash::{double_sha256, hash_from_display_hex};
use kaspa_wire::merkle::hash_merkle_root;
use kaspa_wire::*;

fn coinbase() -> Transaction {
    let mut tx = Transaction::native(vec![], vec![TransactionOutput { value: 50, script_pub_key: vec![0x51] }]);
    tx.subnetwork = Subnetwork::Other(
        SubnetworkData::new(COINBASE_SUBNETWORK_ID, 0, [0; 32], vec![0xca, 0xfe]).unwrap(),
    );
    tx
}

fn spend(tag: u8) -> Transaction {
    Transaction::native(
        vec![TransactionInput {
            previous_tx_id: [tag; 32],
            previous_output_index: 0,
            signature_script: vec![tag],
            sequence: u64::MAX,
        }],
        vec![TransactionOutput { value: tag as u64, script_pub_key: vec![] }],
    )
}

fn sample_block(parents: usize) -> Block {
    Block {
        header: BlockHeader {
            version: 1,
            parent_hashes: (0..parents).map(|i| [i as u8; 32]).collect(),
            hash_merkle_root: [0xaa; 32],
            id_merkle_root: [0xbb; 32],
            utxo_commitment: [0xcc; 32],
            timestamp: 1_700_000_000_000,
            bits: 0x207fffff,
            nonce: 0x0102030405060708,
        },
        coinbase: coinbase(),
        transactions: vec![spend(1), spend(2)],
    }
}

#[test]
fn test_header_size() {
    for parents in [0usize, 1, 3, 10] {
        let header = sample_block(parents).header;
        assert_eq!(header_bytes(&header).unwrap().len(), BlockHeader::size_for(parents));
        assert_eq!(BlockHeader::size_for(parents), 121 + 32 * parents);
    }
}

#[test]
fn test_header_field_layout() {
    let header = sample_block(1).header;
    let bytes = header_bytes(&header).unwrap();

    assert_eq!(&bytes[0..4], &[1, 0, 0, 0]);
    assert_eq!(bytes[4], 1);
    assert_eq!(&bytes[5..37], &[0u8; 32]);
    assert_eq!(&bytes[37..69], &[0xaa; 32]);
    assert_eq!(&bytes[101..133], &[0xcc; 32]);
    assert_eq!(&bytes[141..145], &[0xff, 0xff, 0x7f, 0x20]);
    assert_eq!(&bytes[145..153], &[8, 7, 6, 5, 4, 3, 2, 1]);
}

#[test]
fn test_block_round_trip() {
    let block = sample_block(2);
    let bytes = serialize_block(&block).unwrap();
    let parsed = block_from_bytes(&bytes).unwrap();
    assert_eq!(parsed, block);
    assert_eq!(serialize_block(&parsed).unwrap(), bytes);

    let hex_form = block_to_hex(&block).unwrap();
    assert_eq!(block_from_hex(&hex_form).unwrap(), block);
}

#[test]
fn test_tx_count_prefix_follows_body() {
    let mut block = sample_block(1);
    assert_eq!(block.tx_count(), 3);
    let header_len = BlockHeader::size_for(1);
    assert_eq!(serialize_block(&block).unwrap()[header_len], 3);

    block.append_native_transaction(spend(3));
    assert_eq!(block.tx_count(), 4);
    let bytes = serialize_block(&block).unwrap();
    assert_eq!(bytes[header_len], 4);
    assert_eq!(block_from_bytes(&bytes).unwrap().transactions.len(), 3);
}

#[test]
fn test_zero_tx_count_rejected() {
    let mut bytes = header_bytes(&sample_block(0).header).unwrap();
    bytes.push(0x00);
    assert!(matches!(
        block_from_bytes(&bytes),
        Err(WireError::InvalidLength { field: "tx count", .. })
    ));
}

#[test]
fn test_truncated_header() {
    let bytes = header_bytes(&sample_block(2).header).unwrap();
    assert!(matches!(
        block_from_bytes(&bytes[..bytes.len() - 3]),
        Err(WireError::TruncatedInput { field: "nonce", .. })
    ));
}

#[test]
fn test_trailing_bytes_rejected() {
    let mut bytes = serialize_block(&sample_block(1)).unwrap();
    bytes.push(0);
    assert!(matches!(block_from_bytes(&bytes), Err(WireError::InvalidLength { .. })));
}

#[test]
fn test_too_many_parents() {
    let block = sample_block(256);
    assert!(matches!(serialize_block(&block), Err(WireError::TooManyParents(256))));
}

#[test]
fn test_header_hash_is_little_endian_digest() {
    let header = sample_block(1).header;
    let digest = double_sha256(&header_bytes(&header).unwrap());
    assert_eq!(block_hash(&header).unwrap(), digest);
    assert_eq!(header_hash(&header).unwrap(), U256::from_little_endian(&digest));

    let mut display = digest;
    display.reverse();
    assert_eq!(block_hash_hex(&header).unwrap(), hex::encode(display));
}

#[test]
fn test_header_hash_changes_with_nonce() {
    let mut header = sample_block(1).header;
    let before = header_hash(&header).unwrap();
    header.nonce += 1;
    assert_ne!(header_hash(&header).unwrap(), before);
}

#[test]
fn test_refresh_hash_merkle_root() {
    let mut block = sample_block(1);
    let root = block.refresh_hash_merkle_root().unwrap();
    assert_eq!(root, hash_merkle_root(&block.coinbase, &block.transactions).unwrap());
    assert_eq!(block.header.hash_merkle_root, root);
}

#[test]
fn test_parents_from_display_hex() {
    let mut header = sample_block(0).header;
    let parent = format!("{}{}", "ab", "00".repeat(31));
    header.set_parents_from_display_hex(&[parent.as_str()]).unwrap();
    assert_eq!(header.parent_hashes.len(), 1);
    assert_eq!(header.parent_hashes[0][31], 0xab);

    header.point_to_genesis().unwrap();
    assert_eq!(header.parent_hashes, vec![hash_from_display_hex(DEVNET_GENESIS_HASH).unwrap()]);
}
