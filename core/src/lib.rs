// Copyright (c) 2022-2023 The MobileCoin Foundation

//! CoolWallet S keyring core
//!
//! Pure account logic shared by the keyring, the simulated device and the CLI.
//! Nothing in this crate performs I/O or holds private keys.
//!
//! ## Accounts
//!
//! The device releases a root public key and chain code ([RootKeyMaterial]) on unlock,
//! accounts are then derived locally using non-hardened BIP-32 child derivation with the
//! path `m/{index}` relative to the root (see [derive_account]). Addresses are the last
//! 20 bytes of the keccak256 digest of the uncompressed public key, displayed in
//! EIP-55 checksummed form.
//!
//! [ReverseAddressIndex] maps addresses back to derivation indices, so signing requests
//! for an address can be routed to the correct device key, and [PageCursor] computes
//! the index windows used when browsing accounts.
//!
//! ## Transactions
//!
//! [SigningRequest] describes a legacy (optionally EIP-155) transaction, and computes
//! the digest the device signs. [SignedTransaction] combines a request with the
//! device-provided `(v, r, s)` and supports signer recovery.

pub use alloy_primitives::{Address, Bytes, B256, U256};

mod error;
pub use error::Error;

mod derive;
pub use derive::{derive_account, DerivedAccount, RootKeyMaterial};

mod index;
pub use index::{ReverseAddressIndex, DEFAULT_MAX_INDEX};

mod page;
pub use page::{PageCursor, PageEntry, DEFAULT_PER_PAGE};

pub mod message;

pub mod tx;
pub use tx::{SignedTransaction, SigningRequest};
