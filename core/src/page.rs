// Copyright (c) 2022-2023 The MobileCoin Foundation

use core::ops::Range;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Default accounts per page
pub const DEFAULT_PER_PAGE: u32 = 5;

/// Page cursor over the derivation index space.
///
/// Pages are 1-based once browsing has started, a fresh cursor sits at page 0.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct PageCursor {
    page: u32,
    per_page: u32,
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::new(DEFAULT_PER_PAGE)
    }
}

impl PageCursor {
    /// Create a cursor at page 0, `per_page` is clamped to at least 1
    pub fn new(per_page: u32) -> Self {
        Self {
            page: 0,
            per_page: per_page.max(1),
        }
    }

    /// Restore a cursor at a specific page
    pub fn with_page(page: u32, per_page: u32) -> Self {
        Self {
            page,
            ..Self::new(per_page)
        }
    }

    /// Current page
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Accounts per page
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Reset to page 0
    pub fn reset(&mut self) {
        self.page = 0;
    }

    /// Reset then advance to page 1
    pub fn first(&mut self) -> Range<u32> {
        self.reset();
        self.step(1)
    }

    /// Advance one page
    pub fn next(&mut self) -> Range<u32> {
        self.step(1)
    }

    /// Go back one page, clamping at page 1
    pub fn previous(&mut self) -> Range<u32> {
        self.step(-1)
    }

    /// Adjust the page by `inc`, clamping to at least 1, returning the index window
    pub fn step(&mut self, inc: i32) -> Range<u32> {
        let p = i64::from(self.page) + i64::from(inc);
        self.page = p.clamp(1, i64::from(u32::MAX)) as u32;

        self.range()
    }

    /// Index window for the current page, empty at page 0
    pub fn range(&self) -> Range<u32> {
        let from = self.page.saturating_sub(1).saturating_mul(self.per_page);
        let to = match self.page {
            0 => from,
            _ => from.saturating_add(self.per_page),
        };
        from..to
    }
}

/// Account entry for a rendered page
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct PageEntry {
    /// Account address
    pub address: Address,
    /// Derivation index
    pub index: u32,
    /// Balance, populated by the consumer when available
    #[serde(default)]
    pub balance: Option<U256>,
}
