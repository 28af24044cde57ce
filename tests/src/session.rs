// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Session persistence / reset tests

use std::future::Future;

use log::info;

use cws_keyring::{
    core::message::recover_personal_signer, Address, ConnectionState, Keyring, Transport,
};

/// Serialize, forget and restore keyring state, checking against `expected`
/// (at least 3 entries)
pub async fn test<T, F>(t: T, approve: impl Fn() -> F, expected: &[Address]) -> anyhow::Result<()>
where
    T: Transport + 'static,
    F: Future<Output = ()>,
{
    let k = Keyring::new(t, crate::config());

    let (a, _) = tokio::join!(k.add_accounts(3), approve());
    assert_eq!(&a?, &expected[..3]);

    k.get_first_page().await?;
    k.get_next_page().await?;

    // Export state
    let state = k.serialize();
    info!("state: {}", serde_json::to_string(&state)?);

    assert_eq!(&state.accounts, &expected[..3]);
    assert_eq!(state.page, 2);
    assert!(state.root_public_key.is_some());
    assert!(state.root_chain_code.is_some());

    // Forget resets all session state
    k.forget_device();

    assert!(!k.is_unlocked());
    assert!(k.get_accounts().is_empty());
    assert!(matches!(
        k.connection_state(),
        ConnectionState::Locked | ConnectionState::Disconnected
    ));

    let cleared = k.serialize();
    assert!(cleared.accounts.is_empty());
    assert_eq!(cleared.page, 0);
    assert_eq!(cleared.root_public_key, None);

    // Restore without a device round-trip
    k.deserialize(state.clone())?;

    assert!(k.is_unlocked());
    assert_eq!(k.get_accounts(), state.accounts);
    assert_eq!(k.serialize(), state);

    // Restored keyrings sign once connected
    let sig = k.sign_personal_message(&expected[1], b"restored").await?;
    assert_eq!(recover_personal_signer(b"restored", &sig)?, expected[1]);

    Ok(())
}
