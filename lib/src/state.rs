// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Persisted keyring state

use log::debug;
use serde::{Deserialize, Serialize};

use cws_keyring_core::{Address, PageCursor, RootKeyMaterial};
use cws_proto::{from_hex, Transport, DEFAULT_BRIDGE_URL};

use crate::{Error, Keyring, KeyringConfig};

/// Serialized keyring state.
///
/// Root key material is public (parent public key and chain code), both fields
/// are present or both absent.
///
/// ```text
/// {
///   "accounts": ["0xF30952A1c534CDE7bC471380065726fa8686dfB3"],
///   "rootPublicKey": "024d90...",
///   "rootChainCode": "9452b5...",
///   "unlockedAccount": 0,
///   "page": 1,
///   "bridgeEndpoint": "https://antoncoding.github.io"
/// }
/// ```
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedState {
    /// Tracked accounts (checksummed)
    #[serde(default, with = "checksummed")]
    pub accounts: Vec<Address>,
    /// Root public key (hex)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_public_key: Option<String>,
    /// Root chain code (hex)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_chain_code: Option<String>,
    /// First index for account tracking
    #[serde(default)]
    pub unlocked_account: u32,
    /// Current page
    #[serde(default)]
    pub page: u32,
    /// Bridge endpoint
    #[serde(default = "default_bridge_endpoint")]
    pub bridge_endpoint: String,
}

impl Default for SerializedState {
    fn default() -> Self {
        Self {
            accounts: vec![],
            root_public_key: None,
            root_chain_code: None,
            unlocked_account: 0,
            page: 0,
            bridge_endpoint: default_bridge_endpoint(),
        }
    }
}

fn default_bridge_endpoint() -> String {
    DEFAULT_BRIDGE_URL.to_string()
}

impl SerializedState {
    /// Decode root key material, if present
    pub fn root(&self) -> Result<Option<RootKeyMaterial>, Error> {
        let (pk, cc) = match (&self.root_public_key, &self.root_chain_code) {
            (Some(pk), Some(cc)) => (pk, cc),
            (None, None) => return Ok(None),
            _ => return Err(Error::InvalidRoot),
        };

        let pk = from_hex(pk).map_err(|_| Error::InvalidRoot)?;
        let cc = from_hex(cc).map_err(|_| Error::InvalidRoot)?;

        RootKeyMaterial::from_slices(&pk, &cc)
            .map(Some)
            .map_err(|_| Error::InvalidRoot)
    }
}

impl<T: Transport + 'static> Keyring<T> {
    /// Create a keyring restoring persisted state
    pub fn from_state(
        transport: T,
        config: KeyringConfig,
        state: SerializedState,
    ) -> Result<Self, Error> {
        let k = Self::new(transport, config);
        k.deserialize(state)?;
        Ok(k)
    }

    /// Export keyring state for persistence
    pub fn serialize(&self) -> SerializedState {
        let root = self.conn.root();
        let s = self.session();

        SerializedState {
            accounts: s.accounts.clone(),
            root_public_key: root.map(|r| hex::encode(r.public_key)),
            root_chain_code: root.map(|r| hex::encode(r.chain_code)),
            unlocked_account: s.unlocked_account,
            page: s.cursor.page(),
            bridge_endpoint: s.bridge_url.clone(),
        }
    }

    /// Restore keyring state.
    ///
    /// Restored root key material unlocks the keyring without a device round-trip.
    pub fn deserialize(&self, state: SerializedState) -> Result<(), Error> {
        let root = state.root()?;

        debug!(
            "restoring {} accounts (root: {})",
            state.accounts.len(),
            root.is_some()
        );

        let per_page = self.config.per_page;
        self.reset_session(|s| {
            s.accounts = state.accounts;
            s.cursor = PageCursor::with_page(state.page, per_page);
            s.unlocked_account = state.unlocked_account;
            s.bridge_url = state.bridge_endpoint;
        });

        self.conn.restore(root);

        Ok(())
    }
}

/// Serde helpers for checksummed address lists
mod checksummed {
    use std::str::FromStr;

    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    use cws_keyring_core::Address;

    pub fn serialize<S: Serializer>(v: &[Address], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(v.iter().map(|a| a.to_checksum(None)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Address>, D::Error> {
        let v = Vec::<String>::deserialize(deserializer)?;

        v.iter()
            .map(|s| Address::from_str(s).map_err(D::Error::custom))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn state_json() {
        let s: SerializedState = serde_json::from_value(json!({
            "accounts": ["0xf30952a1c534cde7bc471380065726fa8686dfb3"],
            "rootPublicKey": "024d902e1a2fc7a8755ab5b694c575fce742c48d9ff192e63df5193e4c7afe1f9c",
            "rootChainCode": "9452b549be8cea3ecb7a84bec10dcfd94afe4d129ebfd3b3cb58eedf394ed271",
            "page": 2,
        }))
        .unwrap();

        assert_eq!(s.bridge_endpoint, DEFAULT_BRIDGE_URL);
        assert_eq!(s.unlocked_account, 0);
        assert!(s.root().unwrap().is_some());

        // Accounts are written checksummed
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(
            v["accounts"],
            json!(["0xF30952A1c534CDE7bC471380065726fa8686dfB3"])
        );
    }

    #[test]
    fn partial_root_rejected() {
        let s = SerializedState {
            root_public_key: Some(
                "024d902e1a2fc7a8755ab5b694c575fce742c48d9ff192e63df5193e4c7afe1f9c".to_string(),
            ),
            ..Default::default()
        };

        assert!(matches!(s.root(), Err(Error::InvalidRoot)));
    }

    #[test]
    fn empty_state() {
        let s: SerializedState = serde_json::from_str("{}").unwrap();
        assert_eq!(s, SerializedState::default());
        assert!(matches!(s.root(), Ok(None)));
    }
}
