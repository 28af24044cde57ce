// Copyright (c) 2022-2023 The MobileCoin Foundation

use clap::Parser;
use log::{debug, info, LevelFilter};
use strum::{Display, EnumString, EnumVariantNames};

use cws_keyring::Address;
use cws_sim::{Behaviour, SimTransport};

/// Test CLI arguments
#[derive(Clone, Debug, Parser)]
pub struct Opts {
    #[clap(subcommand)]
    pub test: Tests,

    /// bip39 Mnemonic for the simulated device
    #[clap(long, env, default_value = cws_keyring_tests::vectors::MNEMONIC)]
    pub mnemonic: String,

    /// Simulated device behaviour
    #[clap(long, default_value = "approve")]
    pub behaviour: Behaviour,

    /// Serve typed data signing requests
    #[clap(long)]
    pub typed_data: bool,

    /// Log level
    #[clap(long, default_value = "debug", env)]
    pub log_level: LevelFilter,

    /// Enable logging for the simulator
    #[clap(long)]
    pub log_sim: bool,
}

/// Test modes
#[derive(Clone, PartialEq, Debug, Parser, Display, EnumString, EnumVariantNames)]
pub enum Tests {
    /// Test unlock and account tracking
    Accounts,
    /// Test account pagination
    Pagination,
    /// Test transaction and message signing
    Signing,
    /// Test session persistence and reset
    Session,
}

/// Number of accounts derived for test expectations
const EXPECTED_ACCOUNTS: u32 = 12;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load command line options
    let opts = Opts::parse();

    // Setup logging
    let mut c = simplelog::ConfigBuilder::new();
    if !opts.log_sim {
        c.add_filter_ignore_str("cws_sim");
    }

    let _ = simplelog::SimpleLogger::init(opts.log_level, c.build());

    debug!("options: {:?}", opts);

    info!("Running test '{}' via simulator ({})", opts.test, opts.behaviour);

    let t = SimTransport::from_mnemonic(&opts.mnemonic)?.with_typed_data(opts.typed_data);
    t.set_behaviour(opts.behaviour);

    execute(t, opts).await?;

    log::info!("Test OK!");

    Ok(())
}

/// Execute a test against the simulated bridge
async fn execute(t: SimTransport, opts: Opts) -> anyhow::Result<()> {
    use cws_keyring_tests::*;

    // Expected accounts from the simulated device
    let expected = (0..EXPECTED_ACCOUNTS)
        .map(|i| t.device().address(i))
        .collect::<Result<Vec<Address>, _>>()?;

    // Approve held requests where the simulator is holding for approval
    let h = t.clone();
    let approve = move || {
        let h = h.clone();
        async move {
            if h.behaviour() != Behaviour::Hold {
                return;
            }
            while h.held() == 0 {
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            }
            h.set_behaviour(Behaviour::Approve);
            h.release();
        }
    };

    match opts.test {
        Tests::Accounts => accounts::test(t, approve, &expected).await?,
        Tests::Pagination => pagination::test(t, approve, &expected).await?,
        Tests::Signing => signing::test(t, approve, &expected).await?,
        Tests::Session => session::test(t, approve, &expected).await?,
    }

    Ok(())
}
