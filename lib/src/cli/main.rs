// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Command line utility for inspecting CoolWallet S keyring accounts
//!
//! All operations run offline from root key material (as released by the device
//! on unlock) or from persisted keyring state.

use std::str::FromStr;

use clap::Parser;
use log::{debug, info, LevelFilter};
use serde::Serialize;

use cws_keyring::{
    core::{derive_account, PageCursor, PageEntry, ReverseAddressIndex, RootKeyMaterial},
    Address, KeyringConfig, SerializedState, KEYRING_TYPE,
};

mod helpers;
use helpers::*;

/// CoolWallet S keyring command line utility
#[derive(Clone, PartialEq, Debug, Parser)]
struct Options {
    /// Subcommand to execute
    #[clap(subcommand)]
    cmd: Actions,

    #[clap(flatten)]
    config: KeyringConfig,

    /// Enable verbose logging
    #[clap(long, default_value = "info")]
    log_level: LevelFilter,
}

#[derive(Clone, PartialEq, Debug, Parser)]
#[non_exhaustive]
enum Actions {
    /// Derive a range of accounts
    Derive {
        #[clap(flatten)]
        root: RootArgs,

        /// First account index
        #[clap(long, default_value = "0")]
        from: u32,

        /// Number of accounts
        #[clap(long, default_value = "5")]
        count: u32,

        /// Write derived accounts to a JSON file
        #[clap(long)]
        output: Option<String>,
    },

    /// Resolve the derivation index for an address
    IndexOf {
        #[clap(flatten)]
        root: RootArgs,

        /// Account address
        address: String,
    },

    /// Render a page of accounts
    Page {
        #[clap(flatten)]
        root: RootArgs,

        /// Page number (1-based)
        #[clap(long, default_value = "1")]
        page: u32,

        /// Write page entries to a JSON file
        #[clap(long)]
        output: Option<String>,
    },

    /// Inspect persisted keyring state
    Inspect {
        /// Serialized keyring state (JSON)
        file: String,
    },
}

/// Derived account output
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountInfo {
    index: u32,
    address: String,
    public_key: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Options::parse();

    // Setup logging
    simplelog::SimpleLogger::init(args.log_level, simplelog::Config::default())?;

    debug!("Using config: {:?}", args.config);

    // Execute command
    execute(args.cmd, &args.config).await?;

    Ok(())
}

/// Execute a command with the provided configuration
async fn execute(cmd: Actions, config: &KeyringConfig) -> anyhow::Result<()> {
    debug!("Executing command: {:?}", cmd);

    match cmd {
        Actions::Derive {
            root,
            from,
            count,
            output,
        } => {
            let root = root.root()?;

            let mut accounts = Vec::with_capacity(count as usize);
            for i in from..from.saturating_add(count) {
                let a = derive_account(&root, i)?;

                info!("m/{}: {} ({})", i, a.address, hex::encode(a.public_key));

                accounts.push(AccountInfo {
                    index: i,
                    address: a.address.to_string(),
                    public_key: hex::encode(a.public_key),
                });
            }

            if let Some(o) = output {
                write_output(&o, &accounts).await?;
            }
        }
        Actions::IndexOf { root, address } => {
            let root = root.root()?;
            let address = Address::from_str(&address)
                .map_err(|e| anyhow::anyhow!("invalid address '{}': {}", address, e))?;

            let mut index = ReverseAddressIndex::new(config.max_index);
            let i = index.index_of(&root, &address)?;

            info!("{}: m/{}", address, i);
        }
        Actions::Page { root, page, output } => {
            let root = root.root()?;

            let entries = page_entries(&root, PageCursor::with_page(page.max(1), config.per_page))?;
            for e in &entries {
                info!("{:4}: {}", e.index, e.address);
            }

            if let Some(o) = output {
                write_output(&o, &entries).await?;
            }
        }
        Actions::Inspect { file } => {
            let state: SerializedState = read_input(&file).await?;

            info!("type: {}", KEYRING_TYPE);
            info!("bridge: {}", state.bridge_endpoint);
            info!("page: {}", state.page);
            info!("unlocked account: {}", state.unlocked_account);

            let root = state.root()?;
            let mut index = ReverseAddressIndex::new(config.max_index);

            info!("accounts:");
            for a in &state.accounts {
                match &root {
                    Some(r) => match index.index_of(r, a) {
                        Ok(i) => info!("  {} (m/{})", a, i),
                        Err(e) => info!("  {} ({})", a, e),
                    },
                    None => info!("  {}", a),
                }
            }

            if root.is_none() {
                info!("no root key material, keyring locked");
            }
        }
    }

    Ok(())
}

fn page_entries(root: &RootKeyMaterial, cursor: PageCursor) -> anyhow::Result<Vec<PageEntry>> {
    let mut entries = vec![];

    for i in cursor.range() {
        let a = derive_account(root, i)?;
        entries.push(PageEntry {
            address: a.address,
            index: i,
            balance: None,
        });
    }

    Ok(entries)
}
