// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Known accounts for the test mnemonic

use std::str::FromStr;

use lazy_static::lazy_static;

use cws_keyring::Address;

/// Test mnemonic (BIP-39 test vector)
pub const MNEMONIC: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

/// Root public key for [MNEMONIC] at `m/44'/60'/0'/0`
pub const ROOT_PUBLIC_KEY: &str =
    "02ccf96184b4d342c523936910e0222be7131654842db75bb1a5cbc772fe21b2d6";

/// Root chain code for [MNEMONIC] at `m/44'/60'/0'/0`
pub const ROOT_CHAIN_CODE: &str =
    "c879d136f02003dc804811e42390714ea06448aeaee158c62d65f12a421d988f";

const ADDRESSES: &[&str] = &[
    "0x9858EfFD232B4033E47d90003D41EC34EcaEda94",
    "0x6Fac4D18c912343BF86fa7049364Dd4E424Ab9C0",
    "0xb6716976A3ebe8D39aCEB04372f22Ff8e6802D7A",
    "0xF3f50213C1d2e255e4B2bAD430F8A38EEF8D718E",
    "0x51cA8ff9f1C0a99f88E86B8112eA3237F55374cA",
    "0xA40cFBFc8534FFC84E20a7d8bBC3729B26a35F6f",
    "0xB191a13bfE648B61002F2e2135867015B71816a6",
    "0x593814d3309e2dF31D112824F0bb5aa7Cb0D7d47",
    "0xB14c391e2bf19E5a26941617ab546FA620A4f163",
    "0x4C1C56443AbFe6dD33de31dAaF0a6E929DBc4971",
    "0xEf4ba16373841C53a9Ba168873fC3967118C1d37",
    "0xa251F9b1F365bF1be54b6bDa3bbEAD414f1Af763",
];

lazy_static! {
    /// Accounts `m/44'/60'/0'/0/{i}` for [MNEMONIC]
    pub static ref ACCOUNTS: Vec<Address> = ADDRESSES
        .iter()
        .filter_map(|a| Address::from_str(a).ok())
        .collect();
}

#[cfg(test)]
mod test {
    use cws_keyring::core::derive_account;
    use cws_sim::SimDevice;

    use super::*;

    #[test]
    fn vectors_match_device() {
        let d = SimDevice::from_mnemonic(MNEMONIC).unwrap();
        let root = d.root_material();

        assert_eq!(hex::encode(root.public_key), ROOT_PUBLIC_KEY);
        assert_eq!(hex::encode(root.chain_code), ROOT_CHAIN_CODE);

        assert_eq!(ACCOUNTS.len(), ADDRESSES.len());
        for (i, a) in ACCOUNTS.iter().enumerate() {
            assert_eq!(&derive_account(&root, i as u32).unwrap().address, a);
            assert_eq!(a.to_checksum(None), ADDRESSES[i]);
        }
    }
}
