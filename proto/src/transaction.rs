// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction signing messages

use serde::{Deserialize, Serialize};

use super::{Action, ActionReq, Error};
use crate::helpers::from_hex;

/// Legacy transaction fields as forwarded to the device.
///
/// Byte fields are even-length, lower-case, `0x`-prefixed hex
/// (see [to_hex][crate::to_hex]).
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxFields {
    pub to: String,
    pub value: String,
    pub data: String,
    pub chain_id: u64,
    pub nonce: String,
    pub gas_limit: String,
    pub gas_price: String,
}

/// Sign transaction request
///
/// ```text
/// { "tx": { "to": "0x..", "value": "0x..", ... }, "addrIndex": 2 }
/// ```
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignTxReq {
    /// Transaction to be signed
    pub tx: TxFields,
    /// Account index of the signer
    pub addr_index: u32,
}

impl ActionReq for SignTxReq {
    const ACTION: Action = Action::SignTransaction;
    type Resp = SignTxResp;
}

/// Sign transaction response, the RLP encoded signed transaction as hex
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignTxResp(pub String);

impl SignTxResp {
    /// Decode the signed transaction bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(from_hex(&self.0)?)
    }
}
