// Copyright (c) 2022-2023 The MobileCoin Foundation

use alloy_primitives::Address;

/// Keyring core errors
#[derive(Clone, PartialEq, Debug, thiserror::Error)]
pub enum Error {
    /// Root key material is malformed
    #[error("invalid root key material")]
    InvalidRoot,

    /// Index outside the non-hardened range
    #[error("invalid derivation index {0}")]
    InvalidIndex(u32),

    /// No index within the scan bound derives this address
    #[error("unknown address {0}")]
    UnknownAddress(Address),

    /// Address already mapped to a different index
    #[error("address {address} already indexed at {existing} (new: {index})")]
    IndexConflict {
        address: Address,
        existing: u32,
        index: u32,
    },

    /// Transaction field could not be decoded
    #[error("invalid transaction field: {0}")]
    InvalidField(&'static str),

    /// RLP decoding failed
    #[error("RLP decode failed: {0}")]
    Rlp(alloy_rlp::Error),

    /// Signature malformed or not recoverable
    #[error("invalid signature")]
    InvalidSignature,
}

impl From<alloy_rlp::Error> for Error {
    fn from(e: alloy_rlp::Error) -> Self {
        Error::Rlp(e)
    }
}

impl From<k256::ecdsa::Error> for Error {
    fn from(_: k256::ecdsa::Error) -> Self {
        Error::InvalidSignature
    }
}
