// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Simulated device key store and request handling

use alloy_primitives::{keccak256, Address, U256};
use bip32::{ChildNumber, DerivationPath, XPrv};
use bip39::{Language, Mnemonic, Seed};
use k256::ecdsa::{RecoveryId, Signature};
use log::debug;
use serde_json::Value;

use cws_keyring_core::{
    message::{encode_signature, personal_message_hash},
    RootKeyMaterial, SignedTransaction, SigningRequest,
};
use cws_proto::{
    from_hex,
    message::{SignPersonalMessageReq, SignatureResp},
    to_hex,
    transaction::{SignTxReq, SignTxResp},
    typed_data::SignTypedDataReq,
    unlock::{UnlockReq, UnlockResp},
    Action, Request,
};

use crate::Error;

/// Path of the root (parent) key released on unlock, accounts are `{path}/{i}`
pub const ROOT_PATH: &str = "m/44'/60'/0'/0";

/// Simulated device, holding the root private key
#[derive(Clone)]
pub struct SimDevice {
    root: XPrv,
}

impl core::fmt::Debug for SimDevice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SimDevice")
            .field("root", &self.root_material())
            .finish()
    }
}

impl SimDevice {
    /// Create a device from a BIP-39 seed
    pub fn from_seed(seed: &[u8]) -> Result<Self, Error> {
        let path: DerivationPath = ROOT_PATH.parse()?;
        let root = XPrv::derive_from_path(seed, &path)?;

        Ok(Self { root })
    }

    /// Create a device from a BIP-39 mnemonic phrase (English, no password)
    pub fn from_mnemonic(phrase: &str) -> Result<Self, Error> {
        let m = Mnemonic::from_phrase(phrase, Language::English).map_err(Error::Mnemonic)?;
        let seed = Seed::new(&m, "");

        Self::from_seed(seed.as_bytes())
    }

    /// Public root key material, as released on unlock
    pub fn root_material(&self) -> RootKeyMaterial {
        let xpub = self.root.public_key();

        RootKeyMaterial {
            public_key: xpub.to_bytes(),
            chain_code: xpub.attrs().chain_code,
        }
    }

    /// Account key for the provided index
    pub fn account_key(&self, index: u32) -> Result<XPrv, Error> {
        let c = ChildNumber::new(index, false)?;
        Ok(self.root.derive_child(c)?)
    }

    /// Account address for the provided index
    pub fn address(&self, index: u32) -> Result<Address, Error> {
        let k = self.account_key(index)?;
        Ok(Address::from_public_key(k.private_key().verifying_key()))
    }

    /// Handle a request, returning the success payload.
    ///
    /// `key_offset` is applied to the requested account index when signing,
    /// simulating a device signing with the wrong key.
    pub fn handle(&self, req: &Request, key_offset: u32) -> Result<Value, Error> {
        debug!("device handling {} ({})", req.action, req.id);

        let v = match req.action {
            Action::Unlock => {
                let p: UnlockReq = req.params()?;
                let root = self.root_material();
                let account = self.account_key(p.addr_index)?;

                serde_json::to_value(UnlockResp {
                    parent_public_key: root.public_key,
                    parent_chain_code: root.chain_code,
                    public_key: account.public_key().to_bytes(),
                })?
            }
            Action::SignTransaction => {
                let p: SignTxReq = req.params()?;
                let tx = SigningRequest::from_fields(&p.tx)?;

                let index = p.addr_index.saturating_add(key_offset);
                let (sig, recid) = self.sign(index, tx.signing_hash().as_slice())?;
                let (r, s) = sig.split_bytes();

                let signed = SignedTransaction::new(
                    tx.clone(),
                    tx.signature_v(recid.is_y_odd()),
                    U256::from_be_slice(&r),
                    U256::from_be_slice(&s),
                );

                serde_json::to_value(SignTxResp(to_hex(&signed.rlp())))?
            }
            Action::SignPersonalMessage => {
                let p: SignPersonalMessageReq = req.params()?;
                let message = from_hex(&p.message)?;

                let hash = personal_message_hash(&message);
                let index = p.addr_index.saturating_add(key_offset);
                let (sig, recid) = self.sign(index, hash.as_slice())?;

                serde_json::to_value(SignatureResp {
                    signature: encode_signature(&sig, recid),
                })?
            }
            Action::SignTypedData => {
                let p: SignTypedDataReq = req.params()?;

                // Stand-in digest, the simulator does not implement EIP-712 hashing
                let hash = keccak256(serde_json::to_vec(&p.typed_data)?);
                let index = p.addr_index.saturating_add(key_offset);
                let (sig, recid) = self.sign(index, hash.as_slice())?;

                serde_json::to_value(SignatureResp {
                    signature: encode_signature(&sig, recid),
                })?
            }
            a => return Err(Error::UnsupportedAction(a)),
        };

        Ok(v)
    }

    fn sign(&self, index: u32, hash: &[u8]) -> Result<(Signature, RecoveryId), Error> {
        let k = self.account_key(index)?;
        Ok(k.private_key().sign_prehash_recoverable(hash)?)
    }
}
