//! Verifier configuration

use eyre::{eyre, Result};
use std::env;
use xchain_common::window::{is_valid_cancel_window, DEFAULT_CANCEL_WINDOW};

/// Verifier configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    /// Registered 4-byte chain ID of the chain this verifier guards
    pub this_chain_id: [u8; 4],
    /// Cancel window configured on the bridge, in seconds
    pub cancel_window_secs: u64,
    /// Instance ID for multi-canceler deployments
    pub canceler_id: String,
}

impl VerifierConfig {
    /// Load configuration from environment
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded .env from {:?}", path);
        }

        let this_chain_id = env::var("VERIFIER_THIS_CHAIN_ID")
            .map_err(|_| eyre!("VERIFIER_THIS_CHAIN_ID required"))?;
        let cancel_window_secs = env::var("VERIFIER_CANCEL_WINDOW_SECS").ok();
        let canceler_id = env::var("VERIFIER_CANCELER_ID")
            .unwrap_or_else(|_| format!("verifier-{}", std::process::id()));

        Self::from_values(&this_chain_id, cancel_window_secs.as_deref(), canceler_id)
    }

    pub fn from_values(
        this_chain_id: &str,
        cancel_window_secs: Option<&str>,
        canceler_id: String,
    ) -> Result<Self> {
        let this_chain_id = parse_chain_id(this_chain_id)?;

        let cancel_window_secs = match cancel_window_secs {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| eyre!("Invalid VERIFIER_CANCEL_WINDOW_SECS: {}", value))?,
            None => DEFAULT_CANCEL_WINDOW,
        };
        if !is_valid_cancel_window(cancel_window_secs) {
            return Err(eyre!(
                "VERIFIER_CANCEL_WINDOW_SECS out of range: {}",
                cancel_window_secs
            ));
        }

        Ok(Self {
            this_chain_id,
            cancel_window_secs,
            canceler_id,
        })
    }
}

/// Parse a 4-byte chain ID, e.g. "0x00000002" or "2"
pub fn parse_chain_id(value: &str) -> Result<[u8; 4]> {
    let value = value.trim();
    let id = match value.strip_prefix("0x") {
        Some(hex_part) => u32::from_str_radix(hex_part, 16),
        None => value.parse::<u32>(),
    }
    .map_err(|_| eyre!("Invalid chain ID: {}", value))?;

    if id == 0 {
        return Err(eyre!("Chain ID must be non-zero"));
    }
    Ok(id.to_be_bytes())
}
