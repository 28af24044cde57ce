// Copyright (c) 2022-2023 The MobileCoin Foundation

//! EIP-191 personal message helpers

use alloy_primitives::{eip191_hash_message, Address, B256};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

use cws_proto::{from_hex, to_hex};

use crate::Error;

/// Digest for `personal_sign`,
/// `keccak256("\x19Ethereum Signed Message:\n" || len(message) || message)`
pub fn personal_message_hash(message: &[u8]) -> B256 {
    eip191_hash_message(message)
}

/// Encode a recoverable signature as `0x`-prefixed `r || s || v` hex, with `v` in {27, 28}
pub fn encode_signature(sig: &Signature, recid: RecoveryId) -> String {
    let mut b = sig.to_bytes().to_vec();
    b.push(27 + recid.to_byte());
    to_hex(&b)
}

/// Recover the signer of a personal message from an `r || s || v` signature
pub fn recover_personal_signer(message: &[u8], signature: &str) -> Result<Address, Error> {
    let b = from_hex(signature).map_err(|_| Error::InvalidSignature)?;
    if b.len() != 65 {
        return Err(Error::InvalidSignature);
    }

    let v = match b[64] {
        v @ (27 | 28) => v - 27,
        v @ (0 | 1) => v,
        _ => return Err(Error::InvalidSignature),
    };

    let sig = Signature::from_slice(&b[..64])?;
    let recid = RecoveryId::from_byte(v).ok_or(Error::InvalidSignature)?;

    let hash = personal_message_hash(message);
    let k = VerifyingKey::recover_from_prehash(hash.as_slice(), &sig, recid)?;

    Ok(Address::from_public_key(&k))
}
