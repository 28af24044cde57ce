// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction and message signing tests

use std::future::Future;

use log::info;
use rand::random;

use cws_keyring::{
    core::{message::recover_personal_signer, Bytes, U256},
    Address, Error, Keyring, SigningRequest, Transport,
};

/// Example transfer request
pub fn transfer(chain_id: u64) -> SigningRequest {
    SigningRequest {
        nonce: 9,
        gas_price: U256::from(20_000_000_000u64),
        gas_limit: 21000,
        to: Some(Address::repeat_byte(0x35)),
        value: U256::from(1_000_000_000_000_000_000u64),
        data: Bytes::new(),
        chain_id,
    }
}

/// Sign transactions and messages, checking signers against `expected`
/// (at least 4 entries)
pub async fn test<T, F>(t: T, approve: impl Fn() -> F, expected: &[Address]) -> anyhow::Result<()>
where
    T: Transport + 'static,
    F: Future<Output = ()>,
{
    let k = Keyring::new(t, crate::config());

    // EIP-155 transaction, unlocking on first use
    let (signed, _) = tokio::join!(k.sign_transaction(&expected[1], transfer(1)), approve());
    let signed = signed?;

    info!("signed transaction: {}", hex::encode(signed.rlp()));
    assert_eq!(signed.recover_signer()?, expected[1]);
    assert_eq!(signed.request(), &transfer(1));

    let (v, _, _) = signed.signature();
    assert!(v == 37 || v == 38);

    // Pre-EIP-155 transaction
    let signed = k.sign_transaction(&expected[2], transfer(0)).await?;
    assert_eq!(signed.recover_signer()?, expected[2]);

    let (v, _, _) = signed.signature();
    assert!(v == 27 || v == 28);

    // Personal messages
    let m = b"hello";
    let sig = k.sign_personal_message(&expected[3], m).await?;
    info!("message signature: {sig}");
    assert_eq!(recover_personal_signer(m, &sig)?, expected[3]);

    let sig = k.sign_message(&expected[0], m).await?;
    assert_eq!(recover_personal_signer(m, &sig)?, expected[0]);

    // Concurrent requests resolve independently
    let (a, b) = tokio::join!(
        k.sign_personal_message(&expected[0], b"first"),
        k.sign_personal_message(&expected[1], b"second"),
    );
    assert_eq!(recover_personal_signer(b"first", &a?)?, expected[0]);
    assert_eq!(recover_personal_signer(b"second", &b?)?, expected[1]);

    // Addresses not belonging to the device are rejected
    let unknown = Address::from(random::<[u8; 20]>());
    match k.sign_personal_message(&unknown, m).await {
        Err(Error::UnknownAddress(a)) => assert_eq!(a, unknown),
        r => return Err(anyhow::anyhow!("unexpected sign result: {r:?}")),
    }

    // Typed data depends on bridge support
    let typed_data = serde_json::json!({ "primaryType": "Mail", "message": {} });
    match k.sign_typed_data(&expected[0], typed_data).await {
        Err(Error::Unsupported(_)) => assert!(!k.transport().supports_typed_data()),
        Ok(sig) => {
            assert!(k.transport().supports_typed_data());
            assert_eq!(sig.len(), 2 + 65 * 2);
        }
        Err(e) => return Err(e.into()),
    }

    // Private keys are never exported
    assert!(matches!(
        k.export_account(&expected[0]).await,
        Err(Error::Unsupported(_))
    ));

    Ok(())
}
