//! Cancel window arithmetic shared by the contract and off-chain reviewers.
//!
//! With `end = approved_at + window`:
//! - cancel / uncancel are allowed while `now < end`
//! - execution is allowed once `now >= end`
//!
//! At `now == end` the withdrawal is executable and no longer cancellable.

/// Default review window after approval, in seconds
pub const DEFAULT_CANCEL_WINDOW: u64 = 300;

/// Shortest configurable window, in seconds
pub const MIN_CANCEL_WINDOW: u64 = 15;

/// Longest configurable window (one day), in seconds
pub const MAX_CANCEL_WINDOW: u64 = 86_400;

pub fn cancel_window_end(approved_at: u64, window: u64) -> u64 {
    approved_at.saturating_add(window)
}

pub fn is_cancel_window_open(approved_at: u64, window: u64, now: u64) -> bool {
    now < cancel_window_end(approved_at, window)
}

pub fn is_valid_cancel_window(window: u64) -> bool {
    (MIN_CANCEL_WINDOW..=MAX_CANCEL_WINDOW).contains(&window)
}
