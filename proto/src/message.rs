// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Personal message signing messages

use serde::{Deserialize, Serialize};

use super::{Action, ActionReq};

/// Sign personal message request.
///
/// The message is forwarded as hex with any `0x` prefix stripped, the device
/// applies the EIP-191 prefix prior to signing.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignPersonalMessageReq {
    /// Account index of the signer
    pub addr_index: u32,
    /// Message hex (unprefixed)
    pub message: String,
}

impl ActionReq for SignPersonalMessageReq {
    const ACTION: Action = Action::SignPersonalMessage;
    type Resp = SignatureResp;
}

/// Opaque signature response, shared by message and typed data signing
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct SignatureResp {
    /// `0x`-prefixed `r || s || v` signature
    pub signature: String,
}
