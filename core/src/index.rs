// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::collections::HashMap;

use alloy_primitives::Address;
use log::debug;

use crate::{derive_account, DerivedAccount, Error, RootKeyMaterial};

/// Default bound for brute-force index recovery
pub const DEFAULT_MAX_INDEX: u32 = 1000;

/// Reverse index mapping addresses to derivation indices.
///
/// Entries are populated as accounts are derived, lookups that miss the
/// cache fall back to scanning `0..max_index`.
#[derive(Clone, PartialEq, Debug)]
pub struct ReverseAddressIndex {
    entries: HashMap<Address, u32>,
    max_index: u32,
}

impl Default for ReverseAddressIndex {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_INDEX)
    }
}

impl ReverseAddressIndex {
    /// Create an empty index with the provided scan bound
    pub fn new(max_index: u32) -> Self {
        Self {
            entries: HashMap::new(),
            max_index,
        }
    }

    /// Scan bound for cache misses
    pub fn max_index(&self) -> u32 {
        self.max_index
    }

    /// Record a derived account
    pub fn insert(&mut self, account: &DerivedAccount) -> Result<(), Error> {
        match self.entries.get(&account.address) {
            Some(existing) if *existing != account.index => Err(Error::IndexConflict {
                address: account.address,
                existing: *existing,
                index: account.index,
            }),
            Some(_) => Ok(()),
            None => {
                self.entries.insert(account.address, account.index);
                Ok(())
            }
        }
    }

    /// Fetch a cached index without scanning
    pub fn get(&self, address: &Address) -> Option<u32> {
        self.entries.get(address).copied()
    }

    /// Resolve the derivation index for an address, scanning on a cache miss
    pub fn index_of(&mut self, root: &RootKeyMaterial, address: &Address) -> Result<u32, Error> {
        if let Some(i) = self.get(address) {
            return Ok(i);
        }

        debug!("index cache miss for {address}, scanning 0..{}", self.max_index);

        for i in 0..self.max_index {
            let a = derive_account(root, i)?;

            if &a.address == address {
                self.insert(&a)?;
                return Ok(i);
            }
        }

        Err(Error::UnknownAddress(*address))
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all cached entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
