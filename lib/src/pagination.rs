// Copyright (c) 2022-2023 The MobileCoin Foundation

use log::debug;

use cws_keyring_core::{derive_account, PageEntry};
use cws_proto::Transport;

use crate::{Error, Keyring};

#[derive(Copy, Clone, PartialEq, Debug)]
enum Step {
    First,
    Next,
    Previous,
}

impl<T: Transport + 'static> Keyring<T> {
    /// Reset the page cursor and fetch the first page of accounts
    pub async fn get_first_page(&self) -> Result<Vec<PageEntry>, Error> {
        self.page(Step::First).await
    }

    /// Advance one page
    pub async fn get_next_page(&self) -> Result<Vec<PageEntry>, Error> {
        self.page(Step::Next).await
    }

    /// Go back one page (clamped to the first page)
    pub async fn get_previous_page(&self) -> Result<Vec<PageEntry>, Error> {
        self.page(Step::Previous).await
    }

    async fn page(&self, step: Step) -> Result<Vec<PageEntry>, Error> {
        let epoch = self.conn.epoch();

        self.conn.ensure_unlocked(None).await?;
        let root = self.root()?;

        let mut s = self.session();
        self.conn.check_epoch(epoch)?;

        // Cursor only moves once unlocked
        let mut cursor = s.cursor;
        let range = match step {
            Step::First => cursor.first(),
            Step::Next => cursor.next(),
            Step::Previous => cursor.previous(),
        };

        debug!("fetching page {} ({range:?})", cursor.page());

        let mut entries = Vec::with_capacity(range.len());
        for i in range {
            let a = derive_account(&root, i)?;
            s.index.insert(&a)?;

            entries.push(PageEntry {
                address: a.address,
                index: i,
                balance: None,
            });
        }

        s.cursor = cursor;

        Ok(entries)
    }
}
