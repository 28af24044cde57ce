// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Unlock messages, for fetching root public key material

use serde::{Deserialize, Serialize};

use super::{Action, ActionReq};
use crate::helpers::hex_array;

/// Unlock request.
///
/// Prompts the device to release the root (parent) public key and chain code,
/// along with the public key for the account at `addr_index`.
///
/// ```text
/// { "addrIndex": 0 }
/// ```
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockReq {
    /// Account index for the returned public key
    pub addr_index: u32,
}

impl ActionReq for UnlockReq {
    const ACTION: Action = Action::Unlock;
    type Resp = UnlockResp;
}

/// Unlock response.
///
/// Keys are encoded as bare (unprefixed) hex.
///
/// ```text
/// {
///   "parentPublicKey": "<33-byte compressed secp256k1 point>",
///   "parentChainCode": "<32-byte chain code>",
///   "publicKey": "<33-byte compressed public key for addrIndex>"
/// }
/// ```
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockResp {
    /// Root public key
    #[serde(with = "hex_array")]
    pub parent_public_key: [u8; 33],
    /// Root chain code
    #[serde(with = "hex_array")]
    pub parent_chain_code: [u8; 32],
    /// Public key for the requested account index
    #[serde(with = "hex_array")]
    pub public_key: [u8; 33],
}
