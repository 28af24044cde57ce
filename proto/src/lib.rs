// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Protocol / message definitions for CoolWallet S bridge communication
//!
//! The device is reached through a bridge (an embedded iframe page or a wireless link)
//! relaying JSON envelopes. Each [Request] carries an [Action] tag, a [CorrelationId] and
//! action-specific parameters, and each [Reply] carries the tag `{action}-reply`, a success
//! flag and a payload. Bridges that predate correlation ids omit the `id` field on replies,
//! in which case only the tag is available for matching.
//!
//! Message types are defined per-action in submodules, with each request implementing
//! [ActionReq] to bind the action tag and the expected response payload.
//!
//! ## Envelopes
//! ```text
//! request: { "target": "CWS-IFRAME", "id": 7, "action": "coolwallet-unlock", "params": { "addrIndex": 0 } }
//! reply:   { "id": 7, "action": "coolwallet-unlock-reply", "success": true, "payload": { ... } }
//! failure: { "id": 7, "action": "coolwallet-unlock-reply", "success": false, "payload": { "error": "..." } }
//! ```

use core::fmt::Debug;
use std::str::FromStr;

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize, Serializer};
use strum::{Display, EnumIter, EnumString, EnumVariantNames};

pub mod message;
pub mod transaction;
pub mod typed_data;
pub mod unlock;

mod helpers;
pub use helpers::{from_hex, to_hex};

mod transport;
pub use transport::Transport;

/// Envelope target expected by the bridge page
pub const BRIDGE_TARGET: &str = "CWS-IFRAME";

/// Default bridge endpoint
pub const DEFAULT_BRIDGE_URL: &str = "https://antoncoding.github.io";

/// Suffix applied to action tags on replies
pub const REPLY_SUFFIX: &str = "-reply";

/// Bridge actions
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter, EnumVariantNames,
)]
#[non_exhaustive]
pub enum Action {
    /// Fetch root public key / chain code (prompts for approval on the device)
    #[strum(serialize = "coolwallet-unlock")]
    Unlock,

    /// Sign a legacy transaction
    #[strum(serialize = "coolwallet-sign-transaction")]
    SignTransaction,

    /// Sign an EIP-191 personal message
    #[strum(serialize = "coolwallet-sign-personal-message")]
    SignPersonalMessage,

    /// Sign EIP-712 typed data (not implemented by every bridge)
    #[strum(serialize = "coolwallet-sign-typed-data")]
    SignTypedData,
}

impl Action {
    /// Tag used by the bridge for replies to this action
    pub fn reply_tag(&self) -> String {
        format!("{self}{REPLY_SUFFIX}")
    }

    /// Resolve the action a reply tag refers to
    pub fn from_reply_tag(tag: &str) -> Option<Self> {
        tag.strip_suffix(REPLY_SUFFIX)
            .and_then(|a| Action::from_str(a).ok())
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Action::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Identifier linking a request to its reply on the shared channel
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(pub u64);

impl core::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Request objects, binding an [Action] tag and response type
pub trait ActionReq: Serialize + DeserializeOwned + Debug {
    /// Action tag for this request
    const ACTION: Action;

    /// Payload type returned on success
    type Resp: Serialize + DeserializeOwned + Debug;
}

/// Request envelope, as posted to the bridge
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Bridge target marker
    pub target: String,
    /// Correlation id, echoed in the reply
    pub id: CorrelationId,
    /// Action tag
    pub action: Action,
    /// Action parameters
    pub params: serde_json::Value,
}

impl Request {
    /// Build a request envelope for the provided [ActionReq]
    pub fn new<R: ActionReq>(id: CorrelationId, req: &R) -> Result<Self, Error> {
        Ok(Self {
            target: BRIDGE_TARGET.to_string(),
            id,
            action: R::ACTION,
            params: serde_json::to_value(req)?,
        })
    }

    /// Decode request parameters, checking the action tag matches
    pub fn params<R: ActionReq>(&self) -> Result<R, Error> {
        if self.action != R::ACTION {
            return Err(Error::UnexpectedAction {
                actual: self.action.to_string(),
                expected: R::ACTION,
            });
        }

        Ok(serde_json::from_value(self.params.clone())?)
    }
}

/// Reply envelope, as emitted by the bridge
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    /// Correlation id of the originating request (absent on legacy bridges)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CorrelationId>,
    /// Reply tag, `{action}-reply`
    pub action: String,
    /// Whether the device completed the request
    pub success: bool,
    /// Response or [Failure] payload
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Reply {
    /// Build a success reply
    pub fn success<R: Serialize>(
        id: Option<CorrelationId>,
        action: Action,
        resp: &R,
    ) -> Result<Self, Error> {
        Ok(Self {
            id,
            action: action.reply_tag(),
            success: true,
            payload: serde_json::to_value(resp)?,
        })
    }

    /// Build a failure reply with the provided reason
    pub fn failure(id: Option<CorrelationId>, action: Action, error: impl Into<String>) -> Self {
        let failure = Failure {
            error: Some(error.into()),
        };

        Self {
            id,
            action: action.reply_tag(),
            success: false,
            payload: serde_json::to_value(failure).unwrap_or_default(),
        }
    }

    /// Action this reply refers to, if the tag is well formed
    pub fn reply_to(&self) -> Option<Action> {
        Action::from_reply_tag(&self.action)
    }

    /// Decode a success payload for the provided request type
    pub fn decode<R: ActionReq>(&self) -> Result<R::Resp, Error> {
        if self.reply_to() != Some(R::ACTION) {
            return Err(Error::UnexpectedAction {
                actual: self.action.clone(),
                expected: R::ACTION,
            });
        }

        Ok(serde_json::from_value(self.payload.clone())?)
    }

    /// Human readable failure reason for unsuccessful replies
    pub fn failure_reason(&self) -> String {
        match &self.payload {
            serde_json::Value::String(s) if !s.is_empty() => s.clone(),
            v => serde_json::from_value::<Failure>(v.clone())
                .ok()
                .and_then(|f| f.error)
                .unwrap_or_else(|| "Unknown error".to_string()),
        }
    }
}

/// Failure payload, `{ error }`
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Failure {
    #[serde(default)]
    pub error: Option<String>,
}

/// Protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// JSON encoding / decoding failed
    #[error("payload encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Reply or request tag did not match the expected action
    #[error("unexpected action (actual: {actual}, expected: {expected})")]
    UnexpectedAction { actual: String, expected: Action },

    /// Invalid hex field
    #[error("invalid hex field: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Field with unexpected length
    #[error("invalid field length (actual: {0}, expected: {1})")]
    InvalidLength(usize, usize),
}
