// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Legacy transaction encoding and signer recovery
//!
//! Requests with `chain_id == 0` use the pre-EIP-155 six field signing payload,
//! others append `(chain_id, 0, 0)` per EIP-155.

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_rlp::{Encodable, Header};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use log::debug;

use cws_proto::{from_hex, to_hex, transaction::TxFields};

use crate::Error;

/// Unsigned legacy transaction
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct SigningRequest {
    pub nonce: u64,
    pub gas_price: U256,
    pub gas_limit: u64,
    /// Recipient, `None` for contract creation
    pub to: Option<Address>,
    pub value: U256,
    pub data: Bytes,
    /// Chain id, `0` for pre-EIP-155 signing
    pub chain_id: u64,
}

impl SigningRequest {
    /// Build the normalised hex fields forwarded to the device
    pub fn fields(&self) -> TxFields {
        TxFields {
            to: self
                .to
                .map(|a| to_hex(a.as_slice()))
                .unwrap_or_else(|| to_hex(&[])),
            value: to_hex(trim(&self.value.to_be_bytes::<32>())),
            data: to_hex(&self.data),
            chain_id: self.chain_id,
            nonce: to_hex(trim(&self.nonce.to_be_bytes())),
            gas_limit: to_hex(trim(&self.gas_limit.to_be_bytes())),
            gas_price: to_hex(trim(&self.gas_price.to_be_bytes::<32>())),
        }
    }

    /// Parse a request from device hex fields
    pub fn from_fields(f: &TxFields) -> Result<Self, Error> {
        let to = match decode_field(&f.to, "to")? {
            b if b.is_empty() => None,
            b if b.len() == 20 => Some(Address::from_slice(&b)),
            _ => return Err(Error::InvalidField("to")),
        };

        Ok(Self {
            nonce: be_u64(&decode_field(&f.nonce, "nonce")?, "nonce")?,
            gas_price: be_u256(&decode_field(&f.gas_price, "gasPrice")?, "gasPrice")?,
            gas_limit: be_u64(&decode_field(&f.gas_limit, "gasLimit")?, "gasLimit")?,
            to,
            value: be_u256(&decode_field(&f.value, "value")?, "value")?,
            data: decode_field(&f.data, "data")?.into(),
            chain_id: f.chain_id,
        })
    }

    /// RLP encoded signing payload
    pub fn signing_payload(&self) -> Vec<u8> {
        let (to, zero) = (self.to_field(), 0u8);

        let base: [&dyn Encodable; 6] = [
            &self.nonce,
            &self.gas_price,
            &self.gas_limit,
            &to,
            &self.value,
            &self.data,
        ];

        let mut fields = base.to_vec();
        if self.chain_id != 0 {
            fields.push(&self.chain_id);
            fields.push(&zero);
            fields.push(&zero);
        }

        rlp_list(&fields)
    }

    /// Digest signed by the device
    pub fn signing_hash(&self) -> B256 {
        keccak256(self.signing_payload())
    }

    /// Compute `v` for the provided recovery parity
    pub fn signature_v(&self, odd_y: bool) -> u64 {
        let parity = u64::from(odd_y);
        match self.chain_id {
            0 => 27 + parity,
            c => c.saturating_mul(2).saturating_add(35 + parity),
        }
    }

    fn to_field(&self) -> Bytes {
        self.to
            .map(|a| Bytes::copy_from_slice(a.as_slice()))
            .unwrap_or_default()
    }
}

/// Legacy transaction combined with the device-provided signature
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SignedTransaction {
    request: SigningRequest,
    v: u64,
    r: U256,
    s: U256,
}

impl SignedTransaction {
    /// Combine a request with signature components
    pub fn new(request: SigningRequest, v: u64, r: U256, s: U256) -> Self {
        Self { request, v, r, s }
    }

    /// Combine a request with the signature extracted from a device-encoded
    /// signed transaction (see [decode_signature])
    pub fn from_device(request: SigningRequest, raw: &[u8]) -> Result<Self, Error> {
        let (v, r, s) = decode_signature(raw)?;
        Ok(Self::new(request, v, r, s))
    }

    /// Originating request
    pub fn request(&self) -> &SigningRequest {
        &self.request
    }

    /// Signature components `(v, r, s)`
    pub fn signature(&self) -> (u64, U256, U256) {
        (self.v, self.r, self.s)
    }

    /// RLP encoded signed transaction
    pub fn rlp(&self) -> Vec<u8> {
        let q = &self.request;
        let to = q.to_field();

        let fields: [&dyn Encodable; 9] = [
            &q.nonce,
            &q.gas_price,
            &q.gas_limit,
            &to,
            &q.value,
            &q.data,
            &self.v,
            &self.r,
            &self.s,
        ];

        rlp_list(&fields)
    }

    /// Transaction hash
    pub fn hash(&self) -> B256 {
        keccak256(self.rlp())
    }

    /// Recover the signing address
    pub fn recover_signer(&self) -> Result<Address, Error> {
        let recid = self.recovery_id()?;

        let sig = Signature::from_scalars(self.r.to_be_bytes::<32>(), self.s.to_be_bytes::<32>())?;
        let hash = self.request.signing_hash();

        let k = VerifyingKey::recover_from_prehash(hash.as_slice(), &sig, recid)?;

        Ok(Address::from_public_key(&k))
    }

    /// Resolve the recovery id from `v`, accepting 27/28 and EIP-155 values
    fn recovery_id(&self) -> Result<RecoveryId, Error> {
        let eip155_base = self
            .request
            .chain_id
            .checked_mul(2)
            .and_then(|c| c.checked_add(35));

        let parity = match (self.v, eip155_base) {
            (27 | 28, _) => self.v - 27,
            (v, Some(b)) if self.request.chain_id != 0 && matches!(v.checked_sub(b), Some(0 | 1)) => {
                v - b
            }
            _ => {
                debug!("unexpected v {} for chain id {}", self.v, self.request.chain_id);
                return Err(Error::InvalidSignature);
            }
        };

        RecoveryId::from_byte(parity as u8).ok_or(Error::InvalidSignature)
    }
}

/// Extract `(v, r, s)` from an RLP encoded signed legacy transaction
/// (list items 6, 7 and 8)
pub fn decode_signature(raw: &[u8]) -> Result<(u64, U256, U256), Error> {
    let mut buf = raw;
    let mut payload = Header::decode_bytes(&mut buf, true)?;

    let mut items = Vec::with_capacity(9);
    while !payload.is_empty() {
        items.push(Header::decode_bytes(&mut payload, false)?);
    }

    if items.len() != 9 {
        return Err(Error::InvalidField("signature"));
    }

    Ok((
        be_u64(items[6], "v")?,
        be_u256(items[7], "r")?,
        be_u256(items[8], "s")?,
    ))
}

fn rlp_list(fields: &[&dyn Encodable]) -> Vec<u8> {
    let payload_length = fields.iter().map(|f| f.length()).sum();

    let mut out = Vec::with_capacity(payload_length + 9);
    Header {
        list: true,
        payload_length,
    }
    .encode(&mut out);

    for f in fields {
        f.encode(&mut out);
    }

    out
}

/// Strip leading zero bytes
fn trim(b: &[u8]) -> &[u8] {
    let n = b.iter().take_while(|v| **v == 0).count();
    &b[n..]
}

fn decode_field(s: &str, field: &'static str) -> Result<Vec<u8>, Error> {
    from_hex(s).map_err(|_| Error::InvalidField(field))
}

fn be_u64(b: &[u8], field: &'static str) -> Result<u64, Error> {
    if b.len() > 8 {
        return Err(Error::InvalidField(field));
    }

    let mut buff = [0u8; 8];
    buff[8 - b.len()..].copy_from_slice(b);
    Ok(u64::from_be_bytes(buff))
}

fn be_u256(b: &[u8], field: &'static str) -> Result<U256, Error> {
    U256::try_from_be_slice(b).ok_or(Error::InvalidField(field))
}
