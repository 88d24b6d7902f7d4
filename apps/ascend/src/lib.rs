//! # Ascend
//!
//! Library half of the Ascend binary: the HTTP API, the CLI and the
//! configuration loader, exposed so integration tests can drive them.

pub mod api;
pub mod cli;
pub mod config;

use ascend_core::Timestamp;
use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time. The core never reads a clock itself.
pub fn now() -> Timestamp {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    Timestamp::from_unix_secs(secs)
}
