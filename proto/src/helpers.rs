// Copyright (c) 2022-2023 The MobileCoin Foundation

/// Encode bytes as even-length, lower-case, `0x`-prefixed hex
pub fn to_hex(b: &[u8]) -> String {
    format!("0x{}", hex::encode(b))
}

/// Decode hex with or without a `0x` prefix, left-padding odd-length values
pub fn from_hex(s: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let s = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);

    match s.len() % 2 {
        0 => hex::decode(s),
        _ => hex::decode(format!("0{s}")),
    }
}

/// serde helper module for fixed-length byte arrays encoded as bare hex
pub(crate) mod hex_array {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer, const N: usize>(
        v: &[u8; N],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(v))
    }

    pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(
        deserializer: D,
    ) -> Result<[u8; N], D::Error> {
        let s = String::deserialize(deserializer)?;
        let b = super::from_hex(&s).map_err(D::Error::custom)?;

        b.as_slice().try_into().map_err(|_| {
            D::Error::custom(crate::Error::InvalidLength(b.len(), N))
        })
    }
}
