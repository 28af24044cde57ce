// Copyright (c) 2022-2023 The MobileCoin Foundation

//! CoolWallet S Ethereum keyring library (and CLI)
//!
//! Exposes a CoolWallet S hardware wallet, reached through an asynchronous message
//! bridge (see [cws_proto::Transport]), as a multi-account Ethereum keyring.
//!
//! The device only releases root public key material, accounts are derived locally
//! (see [cws_keyring_core]) and signing requests are routed to the device by
//! derivation index.
//!
//! ```no_run
//! # async fn run<T: cws_proto::Transport + 'static>(t: T) -> Result<(), cws_keyring::Error> {
//! use cws_keyring::{Keyring, KeyringConfig};
//!
//! let k = Keyring::new(t, KeyringConfig::default());
//!
//! // Fetch root keys from the device and derive the first page of accounts
//! let page = k.get_first_page().await?;
//!
//! // Track the first three accounts
//! k.set_account_to_unlock(0);
//! let accounts = k.add_accounts(3).await?;
//! # Ok(())
//! # }
//! ```

pub use cws_keyring_core::{self as core, Address, PageEntry, SignedTransaction, SigningRequest};
pub use cws_proto::{self as proto, Transport};

mod config;
pub use config::KeyringConfig;

mod connection;
pub use connection::{ConnectionState, Unlock};

mod correlator;
pub use correlator::Correlator;

mod error;
pub use error::Error;

mod keyring;
pub use keyring::{Keyring, KEYRING_TYPE};

mod pagination;

mod signing;

mod state;
pub use state::SerializedState;
