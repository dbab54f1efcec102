use crate::encoding::{base64_bytes, decode_unpadded, encode_unpadded};
use crate::errors::LedgerError;

use serde::{Deserialize, Serialize};

/// Transport form of a key: the profile it was generated under and its raw bytes.
///
/// On the wire this is the JSON object `{"param": ..., "key": ...}` wrapped in
/// unpadded standard base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEnvelope {
    pub param: String,
    #[serde(with = "base64_bytes")]
    pub key: Vec<u8>,
}

impl KeyEnvelope {
    pub fn new(param: impl Into<String>, key: Vec<u8>) -> Self {
        Self {
            param: param.into(),
            key,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, LedgerError> {
        let json = serde_json::to_vec(self)?;
        encode_unpadded(&json)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, LedgerError> {
        let json = decode_unpadded(bytes.trim_ascii())?;
        let envelope: KeyEnvelope = serde_json::from_slice(&json)
            .map_err(|e| LedgerError::DecodeError(format!("Malformed key envelope: {}", e)))?;

        if envelope.key.is_empty() {
            return Err(LedgerError::DecodeError(format!(
                "Key envelope for {} carries no key material",
                envelope.param
            )));
        }

        Ok(envelope)
    }
}
