// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Tests for CoolWallet S keyring integration.
//!
//! Generic over [cws_proto::Transport] for reuse against the simulator or
//! a bridge. Each test accepts an `approve` callback, run alongside requests
//! that prompt on the device.

use cws_keyring::KeyringConfig;

pub mod vectors;

pub mod accounts;

pub mod pagination;

pub mod signing;

pub mod session;

/// Keyring configuration for tests, no settling delay and a bounded index scan
pub fn config() -> KeyringConfig {
    KeyringConfig {
        settle_delay_ms: 0,
        max_index: 32,
        request_timeout_ms: Some(10_000),
        ..Default::default()
    }
}
