// Copyright (c) 2022-2023 The MobileCoin Foundation

use clap::Parser;
use log::{debug, info, warn, LevelFilter};
use tokio::io::{AsyncBufReadExt, BufReader};

use cws_proto::{Request, Transport};
use cws_sim::*;

/// Simulated CoolWallet S bridge
///
/// Reads request envelopes (one JSON object per line) from stdin and
/// writes reply envelopes to stdout.
#[derive(Clone, Debug, PartialEq, Parser)]
pub struct Args {
    /// BIP-39 mnemonic for the simulated device
    #[clap(long, env = "MNEMONIC")]
    mnemonic: String,

    /// Device behaviour
    #[clap(long, default_value = "approve")]
    behaviour: Behaviour,

    /// Serve typed data signing requests
    #[clap(long)]
    typed_data: bool,

    /// Log level
    #[clap(long, default_value = "info")]
    log_level: LevelFilter,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging (stderr, stdout carries replies)
    let _ = simplelog::WriteLogger::init(
        args.log_level,
        simplelog::Config::default(),
        std::io::stderr(),
    );

    let t = SimTransport::from_mnemonic(&args.mnemonic)?.with_typed_data(args.typed_data);
    t.set_behaviour(args.behaviour);
    t.connect().await?;

    let root = t.device().root_material();
    info!(
        "Simulating device (root: {}, chain code: {})",
        hex::encode(root.public_key),
        hex::encode(root.chain_code)
    );

    // Forward replies to stdout
    let mut rx = t.subscribe();
    tokio::spawn(async move {
        while let Ok(r) = rx.recv().await {
            match serde_json::to_string(&r) {
                Ok(s) => println!("{s}"),
                Err(e) => warn!("Failed to encode reply: {e}"),
            }
        }
    });

    // Read requests from stdin until closed or exit signal
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select!(
            l = lines.next_line() => {
                let l = match l? {
                    Some(l) if l.trim().is_empty() => continue,
                    Some(l) => l,
                    None => break,
                };

                match serde_json::from_str::<Request>(&l) {
                    Ok(req) => t.send(req).await?,
                    Err(e) => warn!("Invalid request: {e}"),
                }
            }
            // Exit on ctrl + c
            _ = tokio::signal::ctrl_c() => {
                debug!("Exit!");
                break;
            },
        );
    }

    Ok(())
}
