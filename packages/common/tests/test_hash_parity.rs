//! Cross-chain hash parity tests
//!
//! These vectors are shared with the EVM contracts and the operator. A change
//! to any of them means deposits on one chain can no longer be matched by
//! withdrawals on another.

use xchain_common::address_codec::{
    decode_bech32_address, encode, parse_evm_address, CHAIN_TYPE_COSMOS, CHAIN_TYPE_EVM,
};
use xchain_common::hash::{
    address_to_bytes32, bytes32_to_hex, compute_transfer_hash, encode_token_identifier,
};

const EVM_CHAIN: [u8; 4] = [0, 0, 0, 1];
const TERRA_CHAIN: [u8; 4] = [0, 0, 0, 2];
const BSC_CHAIN: [u8; 4] = [0, 0, 0, 56];

const EVM_DEPLOYER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
const EVM_USER: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
const EVM_TOKEN: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
const EVM_TOKEN_2: &str = "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512";
const TERRA_USER: &str = "terra1x46rqay4d3cssq8gxxvqz8xt6nwlz4td20k38v";

fn evm_padded(addr: &str) -> [u8; 32] {
    address_to_bytes32(&parse_evm_address(addr).unwrap()).unwrap()
}

fn terra_padded(addr: &str) -> [u8; 32] {
    address_to_bytes32(&decode_bech32_address(addr).unwrap()).unwrap()
}

#[test]
fn test_evm_to_evm_vector() {
    let hash = compute_transfer_hash(
        &EVM_CHAIN,
        &BSC_CHAIN,
        &evm_padded(EVM_DEPLOYER),
        &evm_padded(EVM_USER),
        &evm_padded(EVM_TOKEN),
        1_000_000_000_000_000_000,
        42,
    );
    assert_eq!(
        bytes32_to_hex(&hash),
        "0x11c90f88a3d48e75a39bc219d261069075a136436ae06b2b571b66a9a600aa54"
    );
}

#[test]
fn test_evm_to_terra_native_vector() {
    let hash = compute_transfer_hash(
        &EVM_CHAIN,
        &TERRA_CHAIN,
        &evm_padded(EVM_DEPLOYER),
        &terra_padded(TERRA_USER),
        &encode_token_identifier("uluna"),
        995_000,
        1,
    );
    assert_eq!(
        bytes32_to_hex(&hash),
        "0x92b16cdec59cb405996f66a9153c364ed635f40f922b518885aa76e5e9c23453"
    );
}

#[test]
fn test_evm_to_terra_cw20_vector() {
    let hash = compute_transfer_hash(
        &EVM_CHAIN,
        &TERRA_CHAIN,
        &evm_padded(EVM_DEPLOYER),
        &terra_padded(TERRA_USER),
        &terra_padded(TERRA_USER),
        1_000_000,
        5,
    );
    assert_eq!(
        bytes32_to_hex(&hash),
        "0x1ec7d94b0f068682032903f83c88fd643d03969e04875ec7ea70f02d1a74db7b"
    );
}

#[test]
fn test_terra_to_evm_vectors() {
    let first = compute_transfer_hash(
        &TERRA_CHAIN,
        &EVM_CHAIN,
        &terra_padded(TERRA_USER),
        &evm_padded(EVM_DEPLOYER),
        &evm_padded(EVM_TOKEN),
        500_000,
        3,
    );
    assert_eq!(
        bytes32_to_hex(&first),
        "0x076a0951bf01eaaf385807d46f1bdfaa4e3f88d7ba77aae03c65871f525a7438"
    );

    let second = compute_transfer_hash(
        &TERRA_CHAIN,
        &EVM_CHAIN,
        &terra_padded(TERRA_USER),
        &evm_padded(EVM_USER),
        &evm_padded(EVM_TOKEN_2),
        2_500_000,
        7,
    );
    assert_eq!(
        bytes32_to_hex(&second),
        "0xf1ab14494f74acdd3a622cd214e6d0ebde29121309203a6bd7509bf3025c22ab"
    );
}

#[test]
fn test_universal_address_vector() {
    let src = encode(CHAIN_TYPE_EVM, parse_evm_address(EVM_DEPLOYER).unwrap()).unwrap();
    let dest = encode(CHAIN_TYPE_COSMOS, decode_bech32_address(TERRA_USER).unwrap()).unwrap();
    let hash = compute_transfer_hash(
        &EVM_CHAIN,
        &TERRA_CHAIN,
        &src,
        &dest,
        &encode_token_identifier("uluna"),
        995_000,
        1,
    );
    assert_eq!(
        bytes32_to_hex(&hash),
        "0xbfa6ec3b80c0f508985fc3a72b2c2e915e3d9eb4babbfa28ad856785ebd1cbce"
    );
}

#[test]
fn test_deposit_and_withdraw_sides_agree() {
    // Both sides supply the same seven values, so they must land on one hash
    let src = encode(CHAIN_TYPE_COSMOS, decode_bech32_address(TERRA_USER).unwrap()).unwrap();
    let dest = encode(CHAIN_TYPE_EVM, parse_evm_address(EVM_USER).unwrap()).unwrap();
    let token = evm_padded(EVM_TOKEN);

    let deposit_side = compute_transfer_hash(&TERRA_CHAIN, &BSC_CHAIN, &src, &dest, &token, 10, 99);
    let withdraw_side = compute_transfer_hash(&TERRA_CHAIN, &BSC_CHAIN, &src, &dest, &token, 10, 99);
    assert_eq!(deposit_side, withdraw_side);
}
