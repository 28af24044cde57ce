// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::path::Path;

use log::debug;
use serde::{de::DeserializeOwned, Serialize};

use cws_keyring::core::RootKeyMaterial;

#[derive(Clone, PartialEq, Debug)]
pub struct HexData<const N: usize = 32>(pub [u8; N]);

impl<const N: usize> std::str::FromStr for HexData<N> {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut b = [0u8; N];

        hex::decode_to_slice(s.trim_start_matches("0x"), &mut b)?;

        Ok(HexData(b))
    }
}

impl<const N: usize> AsRef<[u8; N]> for HexData<N> {
    fn as_ref(&self) -> &[u8; N] {
        &self.0
    }
}

/// Root key material source
#[derive(Clone, PartialEq, Debug, clap::Args)]
pub struct RootArgs {
    /// Extended public key (`xpub...`)
    #[clap(long, conflicts_with_all = [ "public_key", "chain_code" ])]
    pub xpub: Option<String>,

    /// Root public key (compressed, hex)
    #[clap(long, requires = "chain_code")]
    pub public_key: Option<HexData<33>>,

    /// Root chain code (hex)
    #[clap(long, requires = "public_key")]
    pub chain_code: Option<HexData<32>>,
}

impl RootArgs {
    /// Resolve root key material from arguments
    pub fn root(&self) -> anyhow::Result<RootKeyMaterial> {
        let r = match (&self.xpub, &self.public_key, &self.chain_code) {
            (Some(x), _, _) => RootKeyMaterial::from_xpub(x)?,
            (None, Some(pk), Some(cc)) => RootKeyMaterial::new(pk.0, cc.0)?,
            _ => return Err(anyhow::anyhow!("--xpub or --public-key and --chain-code required")),
        };

        Ok(r)
    }
}

/// Helper to read input files where required
pub async fn read_input<T: DeserializeOwned>(file_name: &str) -> anyhow::Result<T> {
    debug!("Reading input from '{}'", file_name);

    let s = tokio::fs::read_to_string(file_name).await?;

    // Determine format from file name
    let p = Path::new(file_name);

    // Decode based on input extension
    let v = match p.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&s)?,
        _ => return Err(anyhow::anyhow!("unsupported input file format")),
    };

    Ok(v)
}

/// Helper to write output files if `--output` argument is provided
pub async fn write_output(file_name: &str, value: &impl Serialize) -> anyhow::Result<()> {
    debug!("Writing output to '{}'", file_name);

    // Determine format from file name
    let p = Path::new(file_name);
    match p.extension().and_then(|e| e.to_str()) {
        Some("json") => {
            let s = serde_json::to_string_pretty(value)?;
            tokio::fs::write(p, s).await?;
        }
        _ => return Err(anyhow::anyhow!("unsupported output file format")),
    }

    Ok(())
}
