use crate::codec::CiphertextCodec;
use crate::errors::LedgerError;
use crate::keypair::envelope::KeyEnvelope;
use crate::preset::{ParameterProfile, resolve};

use fhe::bfv::{self, Encoding, Plaintext};
use fhe_traits::{
    DeserializeParametrized, FheDecoder, FheDecrypter, FheEncoder, FheEncrypter,
    Serialize as FheSerialize,
};
use rand::{CryptoRng, RngCore};

use std::fmt;
use std::sync::Arc;

/// Secret half of a key pair, held exclusively by the decrypting party.
pub struct SecretKey {
    profile: Arc<ParameterProfile>,
    inner: bfv::SecretKey,
}

/// Public half of a key pair, shared with every submitter of a report.
pub struct PublicKey {
    profile: Arc<ParameterProfile>,
    inner: bfv::PublicKey,
}

/// A secret/public key pair generated together under one profile.
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    pub fn generate(profile: Arc<ParameterProfile>) -> Result<Self, LedgerError> {
        Self::generate_with_rng(profile, &mut rand::rng())
    }

    /// Same as [`KeyPair::generate`] with an explicit randomness source.
    pub fn generate_with_rng<R: RngCore + CryptoRng>(
        profile: Arc<ParameterProfile>,
        rng: &mut R,
    ) -> Result<Self, LedgerError> {
        let degree = profile.params().degree();
        if degree != profile.degree() {
            return Err(LedgerError::ParameterError(format!(
                "Profile {} declares degree {} but its parameters use {}",
                profile.name(),
                profile.degree(),
                degree
            )));
        }

        let secret_key = SecretKey {
            profile: profile.clone(),
            inner: bfv::SecretKey::random(profile.params(), rng),
        };

        let inner = bfv::PublicKey::new(&secret_key.inner, rng);
        let public_key = PublicKey { profile, inner };

        log::info!("Generated key pair under profile {}", public_key.profile.name());

        Ok(Self {
            secret_key,
            public_key,
        })
    }
}

impl SecretKey {
    pub fn profile(&self) -> &Arc<ParameterProfile> {
        &self.profile
    }

    pub fn to_raw_bytes(&self) -> Vec<u8> {
        self.inner.to_bytes()
    }

    fn from_raw_bytes(profile: Arc<ParameterProfile>, raw: &[u8]) -> Result<Self, LedgerError> {
        let inner = bfv::SecretKey::from_bytes(raw, profile.params()).map_err(|e| {
            LedgerError::DecodeError(format!(
                "Secret key does not decode under profile {}: {}",
                profile.name(),
                e
            ))
        })?;

        Ok(Self { profile, inner })
    }

    pub fn encode(&self) -> Result<Vec<u8>, LedgerError> {
        KeyEnvelope::new(self.profile.name(), self.to_raw_bytes()).encode()
    }

    /// Decodes a key produced by [`SecretKey::encode`], resolving the profile it names.
    pub fn decode(bytes: &[u8]) -> Result<Self, LedgerError> {
        let envelope = KeyEnvelope::decode(bytes)?;
        let profile = resolve(&envelope.param)?;
        Self::from_raw_bytes(profile, &envelope.key)
    }

    /// Decodes a key that must belong to `profile`.
    pub fn decode_for(profile: Arc<ParameterProfile>, bytes: &[u8]) -> Result<Self, LedgerError> {
        let envelope = KeyEnvelope::decode(bytes)?;
        check_profile(&profile, &envelope)?;
        Self::from_raw_bytes(profile, &envelope.key)
    }

    /// Decrypts a marshalled ciphertext to its centered signed value, in the form
    /// [`ParameterProfile::reduce`] produces.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<i64, LedgerError> {
        let ciphertext = CiphertextCodec::new(self.profile.clone()).unmarshal(ciphertext)?;

        let plaintext = self
            .inner
            .try_decrypt(&ciphertext)
            .map_err(|e| LedgerError::DecodeError(format!("Decryption failed: {}", e)))?;

        let values = Vec::<i64>::try_decode(&plaintext, Encoding::poly())
            .map_err(|e| LedgerError::DecodeError(format!("Plaintext decoding failed: {}", e)))?;

        let value = values
            .first()
            .copied()
            .ok_or_else(|| LedgerError::DecodeError("Plaintext has no coefficients".to_string()))?;

        Ok(self.profile.reduce(value as i128))
    }
}

impl PublicKey {
    pub fn profile(&self) -> &Arc<ParameterProfile> {
        &self.profile
    }

    pub fn to_raw_bytes(&self) -> Vec<u8> {
        self.inner.to_bytes()
    }

    fn from_raw_bytes(profile: Arc<ParameterProfile>, raw: &[u8]) -> Result<Self, LedgerError> {
        let inner = bfv::PublicKey::from_bytes(raw, profile.params()).map_err(|e| {
            LedgerError::DecodeError(format!(
                "Public key does not decode under profile {}: {}",
                profile.name(),
                e
            ))
        })?;

        Ok(Self { profile, inner })
    }

    pub fn encode(&self) -> Result<Vec<u8>, LedgerError> {
        KeyEnvelope::new(self.profile.name(), self.to_raw_bytes()).encode()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, LedgerError> {
        let envelope = KeyEnvelope::decode(bytes)?;
        let profile = resolve(&envelope.param)?;
        Self::from_raw_bytes(profile, &envelope.key)
    }

    pub fn decode_for(profile: Arc<ParameterProfile>, bytes: &[u8]) -> Result<Self, LedgerError> {
        let envelope = KeyEnvelope::decode(bytes)?;
        check_profile(&profile, &envelope)?;
        Self::from_raw_bytes(profile, &envelope.key)
    }

    /// Encrypts `value` and returns the marshalled ciphertext.
    pub fn encrypt(&self, value: i64) -> Result<Vec<u8>, LedgerError> {
        self.encrypt_with_rng(value, &mut rand::rng())
    }

    pub fn encrypt_with_rng<R: RngCore + CryptoRng>(
        &self,
        value: i64,
        rng: &mut R,
    ) -> Result<Vec<u8>, LedgerError> {
        if !self.profile.contains(value) {
            return Err(LedgerError::Encryption(format!(
                "{} is outside [{}, {}] for profile {}",
                value,
                self.profile.min_value(),
                self.profile.max_value(),
                self.profile.name()
            )));
        }

        let plaintext = Plaintext::try_encode(&[value], Encoding::poly(), self.profile.params())
            .map_err(|e| LedgerError::Encryption(format!("Plaintext encoding failed: {}", e)))?;

        let ciphertext: bfv::Ciphertext = self
            .inner
            .try_encrypt(&plaintext, rng)
            .map_err(|e| LedgerError::Encryption(e.to_string()))?;

        Ok(ciphertext.to_bytes())
    }
}

fn check_profile(profile: &ParameterProfile, envelope: &KeyEnvelope) -> Result<(), LedgerError> {
    if envelope.param != profile.name() {
        return Err(LedgerError::ProfileMismatch {
            expected: profile.name().to_string(),
            actual: envelope.param.clone(),
        });
    }
    Ok(())
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.profile == other.profile && self.to_raw_bytes() == other.to_raw_bytes()
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.profile == other.profile && self.to_raw_bytes() == other.to_raw_bytes()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("profile", &self.profile.name())
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("profile", &self.profile.name())
            .finish_non_exhaustive()
    }
}
