//! Deployment configuration: which parameter profile the ledger runs under.

use crate::errors::LedgerError;
use crate::preset::{DEFAULT_PROFILE, ParameterProfile, resolve};

use serde::{Deserialize, Serialize};

use std::path::Path;
use std::sync::Arc;

/// Environment variable overriding the configured profile name.
pub const PROFILE_ENV: &str = "HE_LEDGER_PROFILE";

/// Immutable ledger configuration, resolved once by [`crate::dispatch::Ledger::init`].
///
/// ```toml
/// profile = "PN13QP218"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    pub profile: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            profile: DEFAULT_PROFILE.to_string(),
        }
    }
}

impl LedgerConfig {
    pub fn with_profile(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
        }
    }

    pub fn from_toml_str(source: &str) -> Result<Self, LedgerError> {
        toml::from_str(source).map_err(|e| LedgerError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&source)
    }

    /// Applies [`PROFILE_ENV`] when it is set to a non-empty value.
    pub fn with_env_override(self) -> Self {
        self.with_profile_override(std::env::var(PROFILE_ENV).ok())
    }

    pub fn with_profile_override(mut self, profile: Option<String>) -> Self {
        if let Some(profile) = profile.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()) {
            log::debug!("Profile overridden: {} -> {}", self.profile, profile);
            self.profile = profile;
        }
        self
    }

    pub fn resolve_profile(&self) -> Result<Arc<ParameterProfile>, LedgerError> {
        resolve(&self.profile)
    }
}
