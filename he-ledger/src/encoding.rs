//! Base64 helpers shared by the key envelope and the persisted report format.

use crate::errors::LedgerError;

use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;

/// Unpadded standard base64 of `src`, written into a buffer sized up front.
pub fn encode_unpadded(src: &[u8]) -> Result<Vec<u8>, LedgerError> {
    let len = base64::encoded_len(src.len(), false).ok_or_else(|| {
        LedgerError::EncodeError(format!("{} bytes overflow the base64 length", src.len()))
    })?;

    let mut dst = vec![0u8; len];
    let written = encode_into(src, &mut dst)?;
    dst.truncate(written);

    Ok(dst)
}

fn encode_into(src: &[u8], dst: &mut [u8]) -> Result<usize, LedgerError> {
    STANDARD_NO_PAD
        .encode_slice(src, dst)
        .map_err(|e| LedgerError::EncodeError(format!("Base64 encoding failed: {}", e)))
}

/// Inverse of [`encode_unpadded`].
pub fn decode_unpadded(src: &[u8]) -> Result<Vec<u8>, LedgerError> {
    let mut dst = vec![0u8; base64::decoded_len_estimate(src.len())];
    let written = STANDARD_NO_PAD
        .decode_slice(src, &mut dst)
        .map_err(|e| LedgerError::DecodeError(format!("Base64 decoding failed: {}", e)))?;
    dst.truncate(written);

    Ok(dst)
}

/// `#[serde(with = ...)]` adapter storing bytes as padded standard base64 strings.
pub mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

/// Same as [`base64_bytes`] for a map of byte values.
pub mod base64_map {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serializer};

    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<String, Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut out = serializer.serialize_map(Some(map.len()))?;
        for (key, value) in map {
            out.serialize_entry(key, &STANDARD.encode(value))?;
        }
        out.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, Vec<u8>>, D::Error> {
        let encoded = BTreeMap::<String, String>::deserialize(deserializer)?;
        encoded
            .into_iter()
            .map(|(key, value)| {
                STANDARD
                    .decode(value.as_bytes())
                    .map(|bytes| (key, bytes))
                    .map_err(serde::de::Error::custom)
            })
            .collect()
    }
}
