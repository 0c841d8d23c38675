//! Universal Cross-Chain Address Encoding
//!
//! Every account or token that crosses the bridge is carried as 32 bytes:
//! ```text
//! | Chain Type (4 bytes, BE) | Raw Address (20 bytes) | Reserved (8 bytes) |
//! ```
//!
//! ## Chain Type Codes
//!
//! - `0x00000001`: EVM (Ethereum, BSC, Polygon, etc.)
//! - `0x00000002`: Cosmos (Terra Classic, Osmosis)
//! - `0x00000003`: Solana (reserved)
//! - `0x00000004`: Bitcoin (reserved)
//!
//! Codes are never reused. `0` is invalid everywhere.

use bech32::{FromBase32, ToBase32, Variant};
use thiserror::Error;

// ============================================================================
// Chain Type Constants
// ============================================================================

/// Chain type for EVM-compatible chains
pub const CHAIN_TYPE_EVM: u32 = 1;

/// Chain type for Cosmos chains
pub const CHAIN_TYPE_COSMOS: u32 = 2;

/// Chain type for Solana (reserved)
pub const CHAIN_TYPE_SOLANA: u32 = 3;

/// Chain type for Bitcoin (reserved)
pub const CHAIN_TYPE_BITCOIN: u32 = 4;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Invalid chain type: {0}")]
    InvalidChainType(u32),

    #[error("Non-zero reserved bytes")]
    NonZeroReservedBytes,

    #[error("Invalid EVM address: {0}")]
    InvalidEvmAddress(String),

    #[error("Invalid bech32 address: {0}")]
    InvalidBech32(String),

    #[error("Expected 20 raw address bytes, got {0}")]
    InvalidRawLength(usize),
}

// ============================================================================
// Universal Address Structure
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniversalAddress {
    /// Chain type code (4 bytes)
    pub chain_type: u32,
    /// Raw 20-byte address
    pub raw_address: [u8; 20],
    /// Reserved bytes for future use (8 bytes)
    pub reserved: [u8; 8],
}

impl UniversalAddress {
    pub fn new(chain_type: u32, raw_address: [u8; 20]) -> Result<Self, CodecError> {
        Self::new_with_reserved(chain_type, raw_address, [0u8; 8])
    }

    pub fn new_with_reserved(
        chain_type: u32,
        raw_address: [u8; 20],
        reserved: [u8; 8],
    ) -> Result<Self, CodecError> {
        if chain_type == 0 {
            return Err(CodecError::InvalidChainType(0));
        }
        Ok(Self {
            chain_type,
            raw_address,
            reserved,
        })
    }

    /// Create an EVM address from a 0x-prefixed hex string
    pub fn from_evm(addr: &str) -> Result<Self, CodecError> {
        Self::new(CHAIN_TYPE_EVM, parse_evm_address(addr)?)
    }

    /// Create a Cosmos address from a bech32 string (e.g. "terra1...")
    pub fn from_cosmos(addr: &str) -> Result<Self, CodecError> {
        Self::new(CHAIN_TYPE_COSMOS, decode_bech32_address(addr)?)
    }

    pub fn to_bytes32(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out[0..4].copy_from_slice(&self.chain_type.to_be_bytes());
        out[4..24].copy_from_slice(&self.raw_address);
        out[24..32].copy_from_slice(&self.reserved);
        out
    }

    pub fn to_evm_string(&self) -> Result<String, CodecError> {
        if self.chain_type != CHAIN_TYPE_EVM {
            return Err(CodecError::InvalidChainType(self.chain_type));
        }
        Ok(format!("0x{}", hex::encode(self.raw_address)))
    }

    /// Convert to a bech32 string with the given human readable prefix
    pub fn to_cosmos_string(&self, hrp: &str) -> Result<String, CodecError> {
        if self.chain_type != CHAIN_TYPE_COSMOS {
            return Err(CodecError::InvalidChainType(self.chain_type));
        }
        encode_bech32_address(&self.raw_address, hrp)
    }

    pub fn is_evm(&self) -> bool {
        self.chain_type == CHAIN_TYPE_EVM
    }

    pub fn is_cosmos(&self) -> bool {
        self.chain_type == CHAIN_TYPE_COSMOS
    }
}

// ============================================================================
// Byte-level encode / decode
// ============================================================================

/// Pack `chain_type ‖ raw ‖ 0^8`. Fails for chain type 0.
pub fn encode(chain_type: u32, raw_address: [u8; 20]) -> Result<[u8; 32], CodecError> {
    UniversalAddress::new(chain_type, raw_address).map(|a| a.to_bytes32())
}

pub fn encode_with_reserved(
    chain_type: u32,
    raw_address: [u8; 20],
    reserved: [u8; 8],
) -> Result<[u8; 32], CodecError> {
    UniversalAddress::new_with_reserved(chain_type, raw_address, reserved).map(|a| a.to_bytes32())
}

/// Split a 32-byte value into its three fields. Never fails.
pub fn decode(value: &[u8; 32]) -> UniversalAddress {
    let chain_type = u32::from_be_bytes([value[0], value[1], value[2], value[3]]);
    let mut raw_address = [0u8; 20];
    raw_address.copy_from_slice(&value[4..24]);
    let mut reserved = [0u8; 8];
    reserved.copy_from_slice(&value[24..32]);
    UniversalAddress {
        chain_type,
        raw_address,
        reserved,
    }
}

/// Decode requiring a non-zero chain type and zero reserved bytes.
pub fn decode_strict(value: &[u8; 32]) -> Result<UniversalAddress, CodecError> {
    let addr = decode(value);
    if addr.chain_type == 0 {
        return Err(CodecError::InvalidChainType(0));
    }
    if addr.reserved != [0u8; 8] {
        return Err(CodecError::NonZeroReservedBytes);
    }
    Ok(addr)
}

/// Strict decode that additionally pins the chain type.
pub fn decode_as_chain_type(
    value: &[u8; 32],
    expected: u32,
) -> Result<UniversalAddress, CodecError> {
    let addr = decode_strict(value)?;
    if addr.chain_type != expected {
        return Err(CodecError::InvalidChainType(addr.chain_type));
    }
    Ok(addr)
}

pub fn is_valid_chain_type(chain_type: u32) -> bool {
    matches!(
        chain_type,
        CHAIN_TYPE_EVM | CHAIN_TYPE_COSMOS | CHAIN_TYPE_SOLANA | CHAIN_TYPE_BITCOIN
    )
}

// ============================================================================
// Family-specific parsing
// ============================================================================

/// Parse a 0x-prefixed (or bare) 40 hex character EVM address
pub fn parse_evm_address(addr: &str) -> Result<[u8; 20], CodecError> {
    let stripped = addr.strip_prefix("0x").unwrap_or(addr);
    if stripped.len() != 40 {
        return Err(CodecError::InvalidEvmAddress(addr.to_string()));
    }
    let bytes =
        hex::decode(stripped).map_err(|_| CodecError::InvalidEvmAddress(addr.to_string()))?;
    let mut raw = [0u8; 20];
    raw.copy_from_slice(&bytes);
    Ok(raw)
}

/// Decode a bech32 account address into its 20 raw bytes
pub fn decode_bech32_address(addr: &str) -> Result<[u8; 20], CodecError> {
    let (_hrp, data, _variant) =
        bech32::decode(addr).map_err(|e| CodecError::InvalidBech32(e.to_string()))?;
    let bytes = Vec::<u8>::from_base32(&data).map_err(|e| CodecError::InvalidBech32(e.to_string()))?;
    if bytes.len() != 20 {
        return Err(CodecError::InvalidRawLength(bytes.len()));
    }
    let mut raw = [0u8; 20];
    raw.copy_from_slice(&bytes);
    Ok(raw)
}

pub fn encode_bech32_address(raw: &[u8; 20], hrp: &str) -> Result<String, CodecError> {
    bech32::encode(hrp, raw.to_base32(), Variant::Bech32)
        .map_err(|e| CodecError::InvalidBech32(e.to_string()))
}
