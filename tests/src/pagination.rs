// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Account pagination tests

use std::future::Future;

use log::info;

use cws_keyring::{Address, Keyring, PageEntry, Transport};

/// Page through accounts, checking against `expected` (at least 10 entries)
pub async fn test<T, F>(t: T, approve: impl Fn() -> F, expected: &[Address]) -> anyhow::Result<()>
where
    T: Transport + 'static,
    F: Future<Output = ()>,
{
    let k = Keyring::new(t, crate::config());
    let per_page = k.config().per_page as usize;

    // First page unlocks where required
    let (p, _) = tokio::join!(k.get_first_page(), approve());
    check_page(&p?, &expected[..per_page], 0);

    // Step forward
    let p = k.get_next_page().await?;
    check_page(&p, &expected[per_page..per_page * 2], per_page);

    // Step back
    let p = k.get_previous_page().await?;
    check_page(&p, &expected[..per_page], 0);

    // Previous from the first page stays on the first page
    let p = k.get_previous_page().await?;
    check_page(&p, &expected[..per_page], 0);

    let p = k.get_next_page().await?;
    info!("page 2: {:?}", p.iter().map(|e| e.address).collect::<Vec<_>>());
    check_page(&p, &expected[per_page..per_page * 2], per_page);

    // First page resets the cursor
    let p = k.get_first_page().await?;
    check_page(&p, &expected[..per_page], 0);

    Ok(())
}

fn check_page(page: &[PageEntry], expected: &[Address], offset: usize) {
    assert_eq!(page.len(), expected.len());

    for (i, (e, a)) in page.iter().zip(expected).enumerate() {
        assert_eq!(&e.address, a);
        assert_eq!(e.index as usize, offset + i);
        assert_eq!(e.balance, None);
    }
}
