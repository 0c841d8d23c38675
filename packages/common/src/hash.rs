//! Transfer hash computation
//!
//! Both halves of a transfer (the deposit on the source chain and the
//! withdrawal on the destination chain) derive the same 32-byte hash. It is
//! the sole identity the destination side uses to match a withdrawal against
//! its deposit.
//!
//! # Byte Layout (224 bytes total, seven 32-byte words)
//! - Bytes 0-31:    srcChain (4-byte chain id, left-aligned, zero tail)
//! - Bytes 32-63:   destChain (4-byte chain id, left-aligned, zero tail)
//! - Bytes 64-95:   srcAccount (universal address)
//! - Bytes 96-127:  destAccount (universal address)
//! - Bytes 128-159: token (the token on the DESTINATION chain)
//! - Bytes 160-191: amount (uint256, big-endian, left-padded)
//! - Bytes 192-223: nonce (uint256, big-endian, left-padded)
//!
//! The buffer is hashed with keccak256.

use tiny_keccak::{Hasher, Keccak};

/// Hash format a stored or observed transfer id was produced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashVersion {
    /// 6-field format keyed by 32-byte chain keys. See [`legacy`].
    V1Legacy,
    /// 7-field format keyed by 4-byte chain ids. The only format new deposits use.
    V2Unified,
}

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Compute the canonical 7-field transfer hash.
///
/// `token` must be the token's encoding on the destination chain, on both the
/// deposit side and the withdrawal side.
pub fn compute_transfer_hash(
    src_chain: &[u8; 4],
    dest_chain: &[u8; 4],
    src_account: &[u8; 32],
    dest_account: &[u8; 32],
    token: &[u8; 32],
    amount: u128,
    nonce: u64,
) -> [u8; 32] {
    let mut data = [0u8; 224];

    data[0..4].copy_from_slice(src_chain);
    data[32..36].copy_from_slice(dest_chain);
    data[64..96].copy_from_slice(src_account);
    data[96..128].copy_from_slice(dest_account);
    data[128..160].copy_from_slice(token);

    // u128 occupies the low 16 bytes of its word
    data[160 + 16..192].copy_from_slice(&amount.to_be_bytes());
    // u64 occupies the low 8 bytes of its word
    data[192 + 24..224].copy_from_slice(&nonce.to_be_bytes());

    keccak256(&data)
}

/// Encode a local token identifier (native denom or contract address) as 32 bytes.
pub fn encode_token_identifier(identifier: &str) -> [u8; 32] {
    keccak256(identifier.as_bytes())
}

/// Left-pad a raw address (at most 32 bytes) to a 32-byte word
pub fn address_to_bytes32(raw: &[u8]) -> Option<[u8; 32]> {
    if raw.len() > 32 {
        return None;
    }
    let mut out = [0u8; 32];
    out[32 - raw.len()..].copy_from_slice(raw);
    Some(out)
}

pub fn bytes32_to_hex(bytes: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(bytes))
}

pub fn bytes4_to_hex(bytes: &[u8; 4]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse hex (with or without 0x prefix) into a 32-byte array
pub fn hex_to_bytes32(value: &str) -> Result<[u8; 32], &'static str> {
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    if stripped.len() != 64 {
        return Err("Invalid hex length: expected 64 characters");
    }
    let mut out = [0u8; 32];
    hex::decode_to_slice(stripped, &mut out).map_err(|_| "Invalid hex character")?;
    Ok(out)
}

/// Parse hex (with or without 0x prefix) into a 4-byte chain id
pub fn hex_to_bytes4(value: &str) -> Result<[u8; 4], &'static str> {
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    if stripped.len() != 8 {
        return Err("Invalid hex length: expected 8 characters");
    }
    let mut out = [0u8; 4];
    hex::decode_to_slice(stripped, &mut out).map_err(|_| "Invalid hex character")?;
    Ok(out)
}

/// Legacy 6-field transfer id.
///
/// Kept for reading transfers recorded before 4-byte chain ids existed. Never
/// mix it with [`compute_transfer_hash`] for the same transfer.
pub mod legacy {
    use super::keccak256;

    /// `keccak256(abi.encode(srcKey, destKey, destToken, destAccount, amount, nonce))`
    pub fn compute_transfer_id(
        src_chain_key: &[u8; 32],
        dest_chain_key: &[u8; 32],
        dest_token_address: &[u8; 32],
        dest_account: &[u8; 32],
        amount: u128,
        nonce: u64,
    ) -> [u8; 32] {
        let mut data = [0u8; 192];
        data[0..32].copy_from_slice(src_chain_key);
        data[32..64].copy_from_slice(dest_chain_key);
        data[64..96].copy_from_slice(dest_token_address);
        data[96..128].copy_from_slice(dest_account);
        data[128 + 16..160].copy_from_slice(&amount.to_be_bytes());
        data[160 + 24..192].copy_from_slice(&nonce.to_be_bytes());
        keccak256(&data)
    }

    /// `keccak256(abi.encode("EVM", bytes32(chainId)))`
    pub fn evm_chain_key(chain_id: u64) -> [u8; 32] {
        let mut raw_key = [0u8; 32];
        raw_key[24..].copy_from_slice(&chain_id.to_be_bytes());
        abi_encode_chain_key("EVM", &raw_key)
    }

    /// `keccak256(abi.encode("COSMW", keccak256(abi.encode(chainId))))`
    pub fn cosmos_chain_key(chain_id: &str) -> [u8; 32] {
        abi_encode_chain_key("COSMW", &abi_encode_string_hash(chain_id))
    }

    /// keccak256 of the ABI encoding of a single dynamic string
    fn abi_encode_string_hash(s: &str) -> [u8; 32] {
        let bytes = s.as_bytes();
        let padded_len = bytes.len().div_ceil(32) * 32;
        let mut data = vec![0u8; 64 + padded_len];
        // head: offset 0x20
        data[31] = 32;
        data[32 + 24..64].copy_from_slice(&(bytes.len() as u64).to_be_bytes());
        data[64..64 + bytes.len()].copy_from_slice(bytes);
        keccak256(&data)
    }

    /// keccak256 of the ABI encoding of `(string, bytes32)`
    fn abi_encode_chain_key(tag: &str, raw_key: &[u8; 32]) -> [u8; 32] {
        let bytes = tag.as_bytes();
        let padded_len = bytes.len().div_ceil(32) * 32;
        let mut data = vec![0u8; 96 + padded_len];
        // head: offset 0x40 to the string, then the bytes32
        data[31] = 64;
        data[32..64].copy_from_slice(raw_key);
        data[64 + 24..96].copy_from_slice(&(bytes.len() as u64).to_be_bytes());
        data[96..96 + bytes.len()].copy_from_slice(bytes);
        keccak256(&data)
    }
}
