// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Keyring handle, tracks the session account set for a bridge

use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info};

use cws_keyring_core::{
    derive_account, Address, Error as CoreError, PageCursor, ReverseAddressIndex, RootKeyMaterial,
};
use cws_proto::Transport;

use crate::{
    connection::{Connection, ConnectionState, Unlock},
    Error, KeyringConfig,
};

/// Keyring type name
pub const KEYRING_TYPE: &str = "CoolWalletS";

/// First hardened child index
const HARDENED: u64 = 1 << 31;

/// CoolWallet S keyring.
///
/// This is generic over [Transport] types to support different bridges
/// (embedded pages, wireless links, the simulator).
pub struct Keyring<T: Transport> {
    pub(crate) config: KeyringConfig,
    transport: Arc<T>,
    pub(crate) conn: Connection<T>,
    session: Mutex<Session>,
}

/// Per-session account state, reset on forget
pub(crate) struct Session {
    /// Tracked accounts, in derivation order
    pub accounts: Vec<Address>,
    /// Page cursor for account browsing
    pub cursor: PageCursor,
    /// First index for [Keyring::add_accounts]
    pub unlocked_account: u32,
    /// Address to derivation index cache
    pub index: ReverseAddressIndex,
    /// Bridge endpoint
    pub bridge_url: String,
}

impl Session {
    fn new(config: &KeyringConfig) -> Self {
        Self {
            accounts: vec![],
            cursor: PageCursor::new(config.per_page),
            unlocked_account: 0,
            index: ReverseAddressIndex::new(config.max_index),
            bridge_url: config.bridge_url.clone(),
        }
    }
}

impl<T: Transport + 'static> Keyring<T> {
    /// Create a keyring over the provided transport
    pub fn new(transport: T, config: KeyringConfig) -> Self {
        Self::with_transport(Arc::new(transport), config)
    }

    /// Create a keyring over a shared transport
    pub fn with_transport(transport: Arc<T>, config: KeyringConfig) -> Self {
        Self {
            conn: Connection::new(transport.clone(), &config),
            session: Mutex::new(Session::new(&config)),
            transport,
            config,
        }
    }

    /// Keyring type name
    pub fn keyring_type(&self) -> &'static str {
        KEYRING_TYPE
    }

    /// Keyring configuration
    pub fn config(&self) -> &KeyringConfig {
        &self.config
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Current connection state
    pub fn connection_state(&self) -> ConnectionState {
        self.conn.state()
    }

    /// Bridge endpoint for this session
    pub fn bridge_url(&self) -> String {
        self.session().bridge_url.clone()
    }

    /// Open the bridge link if not already connected
    pub async fn connect(&self) -> Result<(), Error> {
        self.conn.ensure_connected().await
    }

    /// Check whether root key material is available
    pub fn is_unlocked(&self) -> bool {
        self.conn.root().is_some()
    }

    /// Fetch root key material from the device if required.
    ///
    /// When already unlocked no device round-trip occurs, and the account at
    /// `index` (if provided) is derived locally.
    pub async fn unlock(&self, index: Option<u32>) -> Result<Unlock, Error> {
        let epoch = self.conn.epoch();

        let u = self.conn.ensure_unlocked(index).await?;

        if let Some(a) = u.account() {
            let mut s = self.session();
            self.conn.check_epoch(epoch)?;
            s.index.insert(a)?;
        }

        Ok(u)
    }

    /// Set the first account index used by [Keyring::add_accounts]
    pub fn set_account_to_unlock(&self, index: u32) {
        debug!("set account to unlock: {index}");
        self.session().unlocked_account = index;
    }

    /// Replace the tracked accounts with `n` accounts derived from the
    /// index set via [Keyring::set_account_to_unlock]
    pub async fn add_accounts(&self, n: u32) -> Result<Vec<Address>, Error> {
        let epoch = self.conn.epoch();

        self.conn.ensure_unlocked(None).await?;
        let root = self.root()?;

        let mut s = self.session();
        self.conn.check_epoch(epoch)?;

        // Accounts are non-hardened children, `from + n` must not pass 2^31
        let from = s.unlocked_account;
        if u64::from(from) + u64::from(n) > HARDENED {
            return Err(CoreError::InvalidIndex(from.max(HARDENED as u32)).into());
        }
        let to = from + n;

        let mut accounts = vec![];
        for i in from..to {
            let a = derive_account(&root, i)?;
            s.index.insert(&a)?;
            accounts.push(a.address);
        }

        info!("tracking accounts {from}..{to}");

        s.accounts = accounts.clone();
        s.cursor.reset();

        Ok(accounts)
    }

    /// Tracked accounts
    pub fn get_accounts(&self) -> Vec<Address> {
        self.session().accounts.clone()
    }

    /// Stop tracking an account
    pub fn remove_account(&self, address: &Address) -> Result<(), Error> {
        let mut s = self.session();

        let n = s.accounts.len();
        s.accounts.retain(|a| a != address);

        if s.accounts.len() == n {
            return Err(Error::AddressNotFound(*address));
        }

        debug!("removed account {address}");

        Ok(())
    }

    /// Reset all session state, cancelling pending requests
    pub fn forget_device(&self) {
        self.conn.forget();
        *self.session() = Session::new(&self.config);

        info!("device forgotten");
    }

    /// Root key material, failing if forgotten mid-operation
    pub(crate) fn root(&self) -> Result<RootKeyMaterial, Error> {
        self.conn.root().ok_or(Error::ForgetWhilePending)
    }

    pub(crate) fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn reset_session(&self, f: impl FnOnce(&mut Session)) {
        let mut s = Session::new(&self.config);
        f(&mut s);
        *self.session() = s;
    }
}
