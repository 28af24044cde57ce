// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Account unlock / tracking tests

use std::future::Future;

use log::info;

use cws_keyring::{Address, Error, Keyring, Transport, Unlock};

/// Unlock the device and track accounts, checking against `expected`
/// (accounts `m/0..` for the device mnemonic, at least 4 entries).
pub async fn test<T, F>(t: T, approve: impl Fn() -> F, expected: &[Address]) -> anyhow::Result<()>
where
    T: Transport + 'static,
    F: Future<Output = ()>,
{
    let k = Keyring::new(t, crate::config());

    assert!(!k.is_unlocked());
    assert!(k.get_accounts().is_empty());

    // Unlock fetches root key material from the device
    let (u, _) = tokio::join!(k.unlock(Some(0)), approve());
    let a = match u? {
        Unlock::Fresh(a) => a,
        u => return Err(anyhow::anyhow!("unexpected unlock result: {u:?}")),
    };

    info!("unlocked with account: {}", a.address);
    assert_eq!(a.address, expected[0]);
    assert!(k.is_unlocked());

    // Subsequent unlocks derive locally
    match k.unlock(Some(1)).await? {
        Unlock::Derived(a) => assert_eq!(a.address, expected[1]),
        u => return Err(anyhow::anyhow!("unexpected unlock result: {u:?}")),
    }
    assert_eq!(k.unlock(None).await?, Unlock::AlreadyUnlocked);

    // Track accounts from index 0
    let accounts = k.add_accounts(3).await?;
    assert_eq!(&accounts, &expected[..3]);
    assert_eq!(k.get_accounts(), accounts);

    // Adding accounts replaces the tracked set
    k.set_account_to_unlock(2);
    let accounts = k.add_accounts(2).await?;
    assert_eq!(&accounts, &expected[2..4]);
    assert_eq!(k.get_accounts(), accounts);

    // Remove tracked accounts
    k.remove_account(&expected[2])?;
    assert_eq!(k.get_accounts(), vec![expected[3]]);

    match k.remove_account(&expected[2]) {
        Err(Error::AddressNotFound(a)) => assert_eq!(a, expected[2]),
        r => return Err(anyhow::anyhow!("unexpected remove result: {r:?}")),
    }

    Ok(())
}
