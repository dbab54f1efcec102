//! Per-subject reports and the manager that drives their lifecycle.
//!
//! ```text
//!        report
//!  ------------------
//! | subject: October |
//!  ------------------
//! | GitHub   | ct(-1000)
//! | VoneChain| ct(2000)
//!  ------------------
//! |  sum: ct(1000)   |
//!  ------------------
//! ```

pub mod manager;

use crate::encoding::base64_map;
use crate::errors::LedgerError;

use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;

/// Aggregation record for one subject.
///
/// Contributions are keyed by contributor id; iteration is in ascending id order.
/// The public key travels with the in-memory value only and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub subject: String,
    /// Name of the profile every contribution was encrypted under.
    pub profile: String,
    #[serde(rename = "data", with = "base64_map", default)]
    pub contributions: BTreeMap<String, Vec<u8>>,
    #[serde(skip)]
    pub pubkey: Vec<u8>,
}

impl Report {
    pub fn new(subject: impl Into<String>, profile: impl Into<String>, pubkey: Vec<u8>) -> Self {
        Self {
            subject: subject.into(),
            profile: profile.into(),
            contributions: BTreeMap::new(),
            pubkey,
        }
    }

    /// Stores `ciphertext` for `contributor`, returning the submission it replaced.
    pub fn upsert(&mut self, contributor: impl Into<String>, ciphertext: Vec<u8>) -> Option<Vec<u8>> {
        self.contributions.insert(contributor.into(), ciphertext)
    }

    pub fn contributors(&self) -> impl Iterator<Item = &str> {
        self.contributions.keys().map(String::as_str)
    }

    pub fn to_json(&self) -> Result<Vec<u8>, LedgerError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, LedgerError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
