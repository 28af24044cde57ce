// Copyright (c) 2022-2023 The MobileCoin Foundation

use cws_keyring_core::Address;
use cws_proto::Action;
use tokio::time::error::Elapsed;

/// CoolWallet S keyring error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport connect / send failure
    #[error("Transport error {0}")]
    Transport(anyhow::Error),

    /// Unlock failed (device rejection, malformed root or request failure)
    #[error("Unlock failed: {reason}")]
    Unlock { reason: String },

    /// No account within the scan bound derives this address
    #[error("Unknown address {0}")]
    UnknownAddress(Address),

    /// Address not tracked by this keyring
    #[error("Address {0} not found in this keyring")]
    AddressNotFound(Address),

    /// Bridge replied with `success: false`
    #[error("Request {action} failed: {error}")]
    RequestFailed { action: Action, error: String },

    /// Device rejected a signing request
    #[error("Device rejected request: {error}")]
    DeviceRejected { error: String },

    /// Recovered signer does not match the requested account,
    /// `actual` is `None` where no signer can be recovered
    #[error("Signature mismatch (expected: {expected}, actual: {actual:?})")]
    SignatureMismatch {
        expected: Address,
        actual: Option<Address>,
    },

    /// Operation not supported by this device / bridge
    #[error("{0} not supported on this device")]
    Unsupported(&'static str),

    /// Invalid root key material in persisted state
    #[error("Invalid root key material")]
    InvalidRoot,

    /// Request timeout
    #[error("Timeout waiting for device response")]
    RequestTimeout,

    /// Pending request cancelled
    #[error("Request cancelled")]
    Cancelled,

    /// Device forgotten while the operation was in flight
    #[error("Device forgotten while request pending")]
    ForgetWhilePending,

    /// Envelope / payload encoding failed
    #[error("Encoding failed: {0}")]
    Encoding(#[from] cws_proto::Error),

    /// Derivation / transaction error
    #[error("{0}")]
    Core(cws_keyring_core::Error),
}

impl From<cws_keyring_core::Error> for Error {
    fn from(e: cws_keyring_core::Error) -> Self {
        match e {
            cws_keyring_core::Error::UnknownAddress(a) => Error::UnknownAddress(a),
            _ => Error::Core(e),
        }
    }
}

impl From<Elapsed> for Error {
    fn from(_: Elapsed) -> Self {
        Error::RequestTimeout
    }
}
