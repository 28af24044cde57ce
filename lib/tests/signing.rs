use std::time::Duration;

use cws_keyring::{
    core::U256,
    proto::{to_hex, transaction::SignTxResp, Action, Reply},
    Error, Keyring, KeyringConfig, SignedTransaction,
};
use cws_keyring_tests::signing::{self, transfer};
use cws_sim::Behaviour;

mod helpers;
use helpers::*;

#[tokio::test(flavor = "multi_thread")]
async fn cws_signing() -> anyhow::Result<()> {
    let t = setup(Behaviour::Approve);

    signing::test(t.clone(), || approve(&t), accounts()).await?;

    // Signing requests carry the resolved index
    let req = t
        .requests()
        .into_iter()
        .find(|r| r.action == Action::SignTransaction)
        .expect("no signing request");
    assert_eq!(req.params["addrIndex"], 1);
    assert_eq!(req.params["tx"]["chainId"], 1);
    assert_eq!(req.params["tx"]["nonce"], "0x09");

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn cws_signing_typed_data() -> anyhow::Result<()> {
    let t = setup(Behaviour::Approve).with_typed_data(true);

    signing::test(t.clone(), || approve(&t), accounts()).await?;

    assert_eq!(t.count(Action::SignTypedData), 1);

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn cws_signing_on_approval() -> anyhow::Result<()> {
    let t = setup(Behaviour::Hold);

    signing::test(t.clone(), || approve(&t), accounts()).await?;

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn cws_signing_rejected() -> anyhow::Result<()> {
    let t = setup(Behaviour::Approve);
    let k = keyring(&t);

    k.unlock(None).await?;

    t.set_behaviour(Behaviour::Reject);

    match k.sign_transaction(&accounts()[0], transfer(1)).await {
        Err(Error::DeviceRejected { error }) => assert_eq!(error, "User rejected"),
        r => panic!("unexpected sign result: {r:?}"),
    }

    match k.sign_personal_message(&accounts()[0], b"hello").await {
        Err(Error::DeviceRejected { .. }) => (),
        r => panic!("unexpected sign result: {r:?}"),
    }

    // Rejections leave the keyring unlocked
    assert!(k.is_unlocked());

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn cws_signing_wrong_key() -> anyhow::Result<()> {
    let t = setup(Behaviour::Approve);
    let k = keyring(&t);

    k.unlock(None).await?;

    t.set_behaviour(Behaviour::WrongKey);

    match k.sign_transaction(&accounts()[2], transfer(1)).await {
        Err(Error::SignatureMismatch { expected, actual }) => {
            assert_eq!(expected, accounts()[2]);
            assert_eq!(actual, Some(accounts()[3]));
        }
        r => panic!("unexpected sign result: {r:?}"),
    }

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn cws_signing_unrecoverable() -> anyhow::Result<()> {
    let t = setup(Behaviour::Approve);
    let k = keyring(&t);

    k.unlock(None).await?;

    t.set_behaviour(Behaviour::Hold);

    // Reply with a signed transaction carrying an invalid `v`
    let (r, _) = tokio::join!(k.sign_transaction(&accounts()[0], transfer(1)), async {
        wait_held(&t, 1).await;

        let req = t.requests().pop().expect("no signing request");
        let signed = SignedTransaction::new(transfer(1), 99, U256::from(1), U256::from(1));
        let resp = SignTxResp(to_hex(&signed.rlp()));

        t.inject(Reply::success(Some(req.id), Action::SignTransaction, &resp).unwrap());
    });

    match r {
        Err(Error::SignatureMismatch { expected, actual }) => {
            assert_eq!(expected, accounts()[0]);
            assert_eq!(actual, None);
        }
        r => panic!("unexpected sign result: {r:?}"),
    }

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn cws_signing_timeout() -> anyhow::Result<()> {
    let t = setup(Behaviour::Approve);

    let k = Keyring::new(
        t.clone(),
        KeyringConfig {
            request_timeout_ms: Some(100),
            ..cws_keyring_tests::config()
        },
    );

    k.unlock(None).await?;

    // Device never responds
    t.set_behaviour(Behaviour::Hold);

    match k.sign_personal_message(&accounts()[0], b"hello").await {
        Err(Error::RequestTimeout) => (),
        r => panic!("unexpected sign result: {r:?}"),
    }

    // Late replies are dropped
    assert_eq!(t.release(), 1);
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Subsequent requests are unaffected
    t.set_behaviour(Behaviour::Approve);
    k.sign_personal_message(&accounts()[0], b"hello").await?;

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn cws_signing_settle_delay() -> anyhow::Result<()> {
    let t = setup(Behaviour::Approve);

    let k = Keyring::new(
        t.clone(),
        KeyringConfig {
            settle_delay_ms: 200,
            ..cws_keyring_tests::config()
        },
    );

    // Fresh unlock is followed by the settling delay
    let now = std::time::Instant::now();
    k.sign_personal_message(&accounts()[1], b"hello").await?;
    assert!(now.elapsed() >= Duration::from_millis(200));

    // Already unlocked, no delay applied
    let now = std::time::Instant::now();
    k.sign_personal_message(&accounts()[1], b"hello").await?;
    assert!(now.elapsed() < Duration::from_millis(200));

    Ok(())
}
