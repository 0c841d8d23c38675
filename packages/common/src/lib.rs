//! Shared primitives for the cross-chain bridge
//!
//! - `address_codec` - chain-tagged 32-byte universal addresses
//! - `hash` - the canonical 7-field transfer hash (plus the legacy 6-field id)
//! - `decimals` - amount rescaling between token precisions
//! - `window` - cancel window boundary rules

pub mod address_codec;
pub mod decimals;
pub mod hash;
pub mod window;

pub use crate::address_codec::{CodecError, UniversalAddress};
pub use crate::decimals::{normalize_decimals, DecimalsError};
pub use crate::hash::{compute_transfer_hash, keccak256, HashVersion};
