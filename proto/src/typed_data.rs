// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Typed data (EIP-712) signing messages, only served by bridges that
//! report support via [Transport::supports_typed_data][crate::Transport::supports_typed_data]

use serde::{Deserialize, Serialize};

use super::{message::SignatureResp, Action, ActionReq};

/// Sign typed data request
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignTypedDataReq {
    /// Account index of the signer
    pub addr_index: u32,
    /// EIP-712 typed data object, forwarded as-is
    pub typed_data: serde_json::Value,
}

impl ActionReq for SignTypedDataReq {
    const ACTION: Action = Action::SignTypedData;
    type Resp = SignatureResp;
}
