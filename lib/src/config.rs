// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::time::Duration;

use serde::{Deserialize, Serialize};

use cws_keyring_core::{DEFAULT_MAX_INDEX, DEFAULT_PER_PAGE};
use cws_proto::DEFAULT_BRIDGE_URL;

/// Default delay between a fresh unlock and the following signing request
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 1000;

/// Keyring configuration
#[derive(Clone, PartialEq, Debug, clap::Args, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyringConfig {
    /// Bridge endpoint
    #[clap(long, default_value = DEFAULT_BRIDGE_URL)]
    pub bridge_url: String,

    /// Accounts per page
    #[clap(long, default_value_t = DEFAULT_PER_PAGE)]
    pub per_page: u32,

    /// Bound for address to index recovery
    #[clap(long, default_value_t = DEFAULT_MAX_INDEX)]
    pub max_index: u32,

    /// Delay after a fresh unlock before issuing a signing request (ms).
    ///
    /// The device drops requests that arrive while the unlock popup is closing.
    #[clap(long, default_value_t = DEFAULT_SETTLE_DELAY_MS)]
    pub settle_delay_ms: u64,

    /// Timeout for bridge requests (ms), unbounded when unset
    #[clap(long)]
    pub request_timeout_ms: Option<u64>,
}

impl Default for KeyringConfig {
    fn default() -> Self {
        Self {
            bridge_url: DEFAULT_BRIDGE_URL.to_string(),
            per_page: DEFAULT_PER_PAGE,
            max_index: DEFAULT_MAX_INDEX,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            request_timeout_ms: None,
        }
    }
}

impl KeyringConfig {
    /// Settling delay as a [Duration]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Request timeout as a [Duration]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}
