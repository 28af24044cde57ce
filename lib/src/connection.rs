// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Bridge connection / unlock state machine

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, MutexGuard,
};

use log::{debug, info, warn};
use strum::Display;

use cws_keyring_core::{derive_account, DerivedAccount, RootKeyMaterial};
use cws_proto::{unlock::UnlockReq, Transport};

use crate::{Correlator, Error, KeyringConfig};

/// Connection state
#[derive(Copy, Clone, PartialEq, Debug, Display)]
pub enum ConnectionState {
    /// Transport not yet opened
    Disconnected,
    /// Transport connection in progress
    Connecting,
    /// Transport open, no root key material
    Locked,
    /// Transport open with root key material
    Unlocked(RootKeyMaterial),
    /// Root key material restored from persisted state, transport not yet opened
    Restored(RootKeyMaterial),
}

impl ConnectionState {
    /// Root key material, if available
    pub fn root(&self) -> Option<&RootKeyMaterial> {
        match self {
            Self::Unlocked(r) | Self::Restored(r) => Some(r),
            _ => None,
        }
    }
}

/// Result of an unlock request
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Unlock {
    /// Root key material was already available
    AlreadyUnlocked,
    /// Already unlocked, account derived locally
    Derived(DerivedAccount),
    /// Root key material fetched from the device
    Fresh(DerivedAccount),
}

impl Unlock {
    /// Derived account, where an index was requested or the device was unlocked
    pub fn account(&self) -> Option<&DerivedAccount> {
        match self {
            Self::Derived(a) | Self::Fresh(a) => Some(a),
            Self::AlreadyUnlocked => None,
        }
    }
}

/// Connection to a bridge, owning the root key material for a session
pub(crate) struct Connection<T: Transport> {
    correlator: Correlator<T>,
    state: Mutex<ConnectionState>,
    /// Serialises connect / unlock round-trips
    link: tokio::sync::Mutex<()>,
    /// Bumped on forget so in-flight operations can detect resets
    epoch: AtomicU64,
}

impl<T: Transport + 'static> Connection<T> {
    pub fn new(transport: Arc<T>, config: &KeyringConfig) -> Self {
        Self {
            correlator: Correlator::new(transport, config.request_timeout()),
            state: Mutex::new(ConnectionState::Disconnected),
            link: tokio::sync::Mutex::new(()),
            epoch: AtomicU64::new(0),
        }
    }

    pub fn correlator(&self) -> &Correlator<T> {
        &self.correlator
    }

    pub fn state(&self) -> ConnectionState {
        *self.lock()
    }

    pub fn root(&self) -> Option<RootKeyMaterial> {
        self.lock().root().copied()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Fail with [Error::ForgetWhilePending] if the device was forgotten since `epoch`
    pub fn check_epoch(&self, epoch: u64) -> Result<(), Error> {
        match self.epoch() == epoch {
            true => Ok(()),
            false => Err(Error::ForgetWhilePending),
        }
    }

    /// Open the transport if not already connected
    pub async fn ensure_connected(&self) -> Result<(), Error> {
        let _link = self.link.lock().await;
        self.connect().await
    }

    /// Ensure root key material is available, fetching it from the device if required
    pub async fn ensure_unlocked(&self, index: Option<u32>) -> Result<Unlock, Error> {
        if let Some(u) = self.unlocked(index)? {
            return Ok(u);
        }

        let epoch = self.epoch();
        let _link = self.link.lock().await;

        // Another caller may have completed the unlock while we waited
        if let Some(u) = self.unlocked(index)? {
            return Ok(u);
        }

        self.connect().await?;
        self.check_epoch(epoch)?;

        let addr_index = index.unwrap_or(0);
        info!("requesting unlock (index: {addr_index})");

        let resp = match self.correlator.send(&UnlockReq { addr_index }).await {
            Ok(v) => v,
            Err(_) if self.epoch() != epoch => return Err(Error::ForgetWhilePending),
            Err(Error::RequestFailed { error, .. }) => return Err(Error::Unlock { reason: error }),
            Err(e) => {
                return Err(Error::Unlock {
                    reason: e.to_string(),
                })
            }
        };

        let root = RootKeyMaterial::new(resp.parent_public_key, resp.parent_chain_code).map_err(
            |e| Error::Unlock {
                reason: e.to_string(),
            },
        )?;

        let account = derive_account(&root, addr_index)?;
        if account.public_key != resp.public_key {
            warn!("device account key does not match root derivation for m/{addr_index}");
            return Err(Error::Unlock {
                reason: "account key does not match root key material".to_string(),
            });
        }

        {
            // Forget and restore bump the epoch under this guard
            let mut s = self.lock();
            self.check_epoch(epoch)?;
            *s = ConnectionState::Unlocked(root);
        }

        info!("unlocked, m/{addr_index}: {}", account.address);

        Ok(Unlock::Fresh(account))
    }

    /// Reset session state, cancelling pending requests
    pub fn forget(&self) {
        {
            let mut s = self.lock();
            self.epoch.fetch_add(1, Ordering::SeqCst);
            *s = match *s {
                ConnectionState::Locked | ConnectionState::Unlocked(_) => ConnectionState::Locked,
                _ => ConnectionState::Disconnected,
            };
        }

        let n = self.correlator.cancel_all();

        debug!("forgot device ({n} pending requests cancelled)");
    }

    /// Install root key material loaded from persisted state.
    ///
    /// In-flight unlocks are invalidated so they cannot replace restored material.
    pub fn restore(&self, root: Option<RootKeyMaterial>) {
        let mut s = self.lock();
        self.epoch.fetch_add(1, Ordering::SeqCst);

        let connected = matches!(
            *s,
            ConnectionState::Locked | ConnectionState::Unlocked(_)
        );

        *s = match (root, connected) {
            (Some(r), true) => ConnectionState::Unlocked(r),
            (Some(r), false) => ConnectionState::Restored(r),
            (None, true) => ConnectionState::Locked,
            (None, false) => ConnectionState::Disconnected,
        };
    }

    /// Resolve an unlock request against existing root key material
    fn unlocked(&self, index: Option<u32>) -> Result<Option<Unlock>, Error> {
        let root = match self.root() {
            Some(r) => r,
            None => return Ok(None),
        };

        let u = match index {
            None => Unlock::AlreadyUnlocked,
            Some(i) => Unlock::Derived(derive_account(&root, i)?),
        };

        Ok(Some(u))
    }

    /// Open the transport, caller must hold the link lock
    async fn connect(&self) -> Result<(), Error> {
        let prev = {
            let mut s = self.lock();
            match *s {
                ConnectionState::Locked | ConnectionState::Unlocked(_) => return Ok(()),
                prev => {
                    *s = ConnectionState::Connecting;
                    prev
                }
            }
        };

        debug!("connecting to bridge");

        if let Err(e) = self.correlator.transport().connect().await {
            *self.lock() = prev;
            return Err(Error::Transport(anyhow::Error::new(e)));
        }

        let mut s = self.lock();
        *s = match (*s, prev) {
            (ConnectionState::Restored(r), _) => ConnectionState::Unlocked(r),
            (ConnectionState::Connecting, ConnectionState::Restored(r)) => {
                ConnectionState::Unlocked(r)
            }
            // Forgotten while connecting, link remains open
            _ => ConnectionState::Locked,
        };

        debug!("bridge connected ({})", *s);

        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, ConnectionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
