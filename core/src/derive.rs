// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Account derivation from device root key material

use std::str::FromStr;

use alloy_primitives::Address;
use bip32::{ChildNumber, ExtendedKeyAttrs, XPub};
use k256::ecdsa::VerifyingKey;
use log::trace;

use crate::Error;

/// Root (parent) public key and chain code as released by the device
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct RootKeyMaterial {
    /// Compressed SEC1 secp256k1 public key
    pub public_key: [u8; 33],
    /// BIP-32 chain code
    pub chain_code: [u8; 32],
}

impl RootKeyMaterial {
    /// Create root key material, checking the public key is a valid curve point
    pub fn new(public_key: [u8; 33], chain_code: [u8; 32]) -> Result<Self, Error> {
        let r = Self {
            public_key,
            chain_code,
        };
        r.xpub()?;
        Ok(r)
    }

    /// Create root key material from variable length slices (as decoded from hex)
    pub fn from_slices(public_key: &[u8], chain_code: &[u8]) -> Result<Self, Error> {
        let public_key = public_key.try_into().map_err(|_| Error::InvalidRoot)?;
        let chain_code = chain_code.try_into().map_err(|_| Error::InvalidRoot)?;
        Self::new(public_key, chain_code)
    }

    /// Parse root key material from a base58 extended public key (`xpub...`)
    pub fn from_xpub(s: &str) -> Result<Self, Error> {
        let xpub = XPub::from_str(s).map_err(|_| Error::InvalidRoot)?;

        Ok(Self {
            public_key: xpub.to_bytes(),
            chain_code: xpub.attrs().chain_code,
        })
    }

    /// Build an extended public key for child derivation.
    ///
    /// Only the key and chain code participate in CKDpub, the remaining
    /// attributes are zeroed.
    fn xpub(&self) -> Result<XPub, Error> {
        let k = VerifyingKey::from_sec1_bytes(&self.public_key).map_err(|_| Error::InvalidRoot)?;

        Ok(XPub::new(
            k,
            ExtendedKeyAttrs {
                depth: 0,
                parent_fingerprint: [0u8; 4],
                child_number: ChildNumber(0),
                chain_code: self.chain_code,
            },
        ))
    }
}

/// Account derived from root key material
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct DerivedAccount {
    /// Derivation index (`m/{index}` relative to the root)
    pub index: u32,
    /// Account address (displays checksummed)
    pub address: Address,
    /// Compressed account public key
    pub public_key: [u8; 33],
}

/// Derive the account at `index` (path `m/{index}`) from the provided root
pub fn derive_account(root: &RootKeyMaterial, index: u32) -> Result<DerivedAccount, Error> {
    let child = ChildNumber::new(index, false).map_err(|_| Error::InvalidIndex(index))?;

    let xpub = root.xpub()?;
    // CKDpub only fails for invalid tweaks (probability ~2^-127)
    let k = xpub.derive_child(child).map_err(|_| Error::InvalidIndex(index))?;

    let address = Address::from_public_key(k.public_key());

    trace!("derived m/{index}: {address}");

    Ok(DerivedAccount {
        index,
        address,
        public_key: k.to_bytes(),
    })
}
