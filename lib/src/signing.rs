// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Signing operations
//!
//! Each operation resolves the derivation index for the requested address,
//! ensures the device is unlocked, then issues the signing request. A fresh
//! unlock is followed by the configured settling delay before the signing
//! request is sent.

use log::{debug, info, warn};

use cws_keyring_core::{Address, SignedTransaction, SigningRequest};
use cws_proto::{
    message::SignPersonalMessageReq, transaction::SignTxReq, typed_data::SignTypedDataReq,
    Transport,
};

use crate::{connection::Unlock, Error, Keyring};

impl<T: Transport + 'static> Keyring<T> {
    /// Sign a legacy transaction with the account at `address`.
    ///
    /// The returned transaction is checked to recover to `address`.
    pub async fn sign_transaction(
        &self,
        address: &Address,
        request: SigningRequest,
    ) -> Result<SignedTransaction, Error> {
        let epoch = self.conn.epoch();
        let (addr_index, unlock) = self.resolve(address).await?;

        info!("signing transaction with {address} (m/{addr_index})");

        let req = SignTxReq {
            tx: request.fields(),
            addr_index,
        };

        let resp = self.issue(&req, &unlock, epoch).await?;

        let raw = resp.to_bytes()?;
        let signed = SignedTransaction::from_device(request, &raw)?;

        let actual = signed.recover_signer().ok();
        if actual.as_ref() != Some(address) {
            warn!("transaction signed by {actual:?}, expected {address}");
            return Err(Error::SignatureMismatch {
                expected: *address,
                actual,
            });
        }

        Ok(signed)
    }

    /// Sign a message, equivalent to [Keyring::sign_personal_message]
    pub async fn sign_message(&self, address: &Address, message: &[u8]) -> Result<String, Error> {
        self.sign_personal_message(address, message).await
    }

    /// Sign an EIP-191 personal message, returning the `0x`-prefixed signature
    pub async fn sign_personal_message(
        &self,
        address: &Address,
        message: &[u8],
    ) -> Result<String, Error> {
        let epoch = self.conn.epoch();
        let (addr_index, unlock) = self.resolve(address).await?;

        info!("signing personal message with {address} (m/{addr_index})");

        let req = SignPersonalMessageReq {
            addr_index,
            message: hex::encode(message),
        };

        let resp = self.issue(&req, &unlock, epoch).await?;

        Ok(resp.signature)
    }

    /// Sign EIP-712 typed data, where supported by the bridge
    pub async fn sign_typed_data(
        &self,
        address: &Address,
        typed_data: serde_json::Value,
    ) -> Result<String, Error> {
        if !self.transport().supports_typed_data() {
            return Err(Error::Unsupported("sign_typed_data"));
        }

        let epoch = self.conn.epoch();
        let (addr_index, unlock) = self.resolve(address).await?;

        info!("signing typed data with {address} (m/{addr_index})");

        let req = SignTypedDataReq {
            addr_index,
            typed_data,
        };

        let resp = self.issue(&req, &unlock, epoch).await?;

        Ok(resp.signature)
    }

    /// Private keys never leave the device
    pub async fn export_account(&self, _address: &Address) -> Result<String, Error> {
        Err(Error::Unsupported("export_account"))
    }

    /// Resolve the derivation index for an address, unlocking if required.
    ///
    /// Where root key material is present the index is resolved prior to
    /// any transport activity.
    async fn resolve(&self, address: &Address) -> Result<(u32, Unlock), Error> {
        let unlock = match self.conn.root() {
            Some(_) => Unlock::AlreadyUnlocked,
            None => self.conn.ensure_unlocked(None).await?,
        };

        let root = self.root()?;
        let index = self.session().index.index_of(&root, address)?;

        debug!("resolved {address} to m/{index}");

        Ok((index, unlock))
    }

    /// Issue a signing request, applying the settling delay after a fresh unlock
    async fn issue<R: cws_proto::ActionReq>(
        &self,
        req: &R,
        unlock: &Unlock,
        epoch: u64,
    ) -> Result<R::Resp, Error> {
        // Restored root key material requires the link to be opened
        self.conn.ensure_connected().await?;

        if let Unlock::Fresh(_) = unlock {
            debug!("awaiting settle delay ({:?})", self.config.settle_delay());
            tokio::time::sleep(self.config.settle_delay()).await;
        }

        self.conn.check_epoch(epoch)?;

        match self.conn.correlator().send(req).await {
            Ok(v) => Ok(v),
            Err(_) if self.conn.epoch() != epoch => Err(Error::ForgetWhilePending),
            Err(Error::RequestFailed { error, .. }) => Err(Error::DeviceRejected { error }),
            Err(e) => Err(e),
        }
    }
}
