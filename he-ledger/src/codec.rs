//! Binary (de)serialization of ciphertexts bound to one parameter profile, plus the two
//! algebraic operations the ledger needs: the identity element and homomorphic addition.

use crate::errors::LedgerError;
use crate::preset::ParameterProfile;

use fhe::bfv::Ciphertext;
use fhe_math::rq::{Poly, Representation};
use fhe_traits::{DeserializeParametrized, Serialize as FheSerialize};

use std::sync::Arc;

/// Number of polynomials in a fresh (non-relinearized) ciphertext.
const FRESH_CIPHERTEXT_PARTS: usize = 2;

#[derive(Debug, Clone)]
pub struct CiphertextCodec {
    profile: Arc<ParameterProfile>,
}

impl CiphertextCodec {
    pub fn new(profile: Arc<ParameterProfile>) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &Arc<ParameterProfile> {
        &self.profile
    }

    pub fn marshal(&self, ciphertext: &Ciphertext) -> Vec<u8> {
        ciphertext.to_bytes()
    }

    /// Decodes `bytes` as a ciphertext under the bound profile.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::DecodeError` on empty input, a corrupt encoding, bytes whose
    /// structure (degree, modulus chain) does not belong to the bound profile, or a ciphertext
    /// that is not fresh (switched down a level or the product of a multiplication).
    pub fn unmarshal(&self, bytes: &[u8]) -> Result<Ciphertext, LedgerError> {
        if bytes.is_empty() {
            return Err(LedgerError::DecodeError(format!(
                "empty ciphertext for profile {}",
                self.profile.name()
            )));
        }

        let ciphertext = Ciphertext::from_bytes(bytes, self.profile.params()).map_err(|e| {
            LedgerError::DecodeError(format!(
                "ciphertext does not decode under profile {}: {}",
                self.profile.name(),
                e
            ))
        })?;

        // Only fresh ciphertexts add cleanly onto the identity.
        if ciphertext.level() != 0 || ciphertext.len() != FRESH_CIPHERTEXT_PARTS {
            return Err(LedgerError::DecodeError(format!(
                "ciphertext has {} parts at level {}, expected {} at level 0",
                ciphertext.len(),
                ciphertext.level(),
                FRESH_CIPHERTEXT_PARTS
            )));
        }

        Ok(ciphertext)
    }

    /// The trivial encryption of zero, `(0, 0)`. Decrypts to 0 under every secret key
    /// of the profile, so it seeds the aggregation fold.
    pub fn identity(&self) -> Result<Ciphertext, LedgerError> {
        let params = self.profile.params();
        let ctx = params
            .context_at_level(0)
            .map_err(|e| LedgerError::ParameterError(e.to_string()))?;

        let parts = (0..FRESH_CIPHERTEXT_PARTS)
            .map(|_| Poly::zero(ctx, Representation::Ntt))
            .collect();

        Ciphertext::new(parts, params).map_err(|e| LedgerError::ParameterError(e.to_string()))
    }

    /// Homomorphic addition: `acc <- acc + operand`.
    pub fn combine(&self, acc: &mut Ciphertext, operand: &Ciphertext) {
        *acc += operand;
    }

    /// Folds `ciphertexts` into a single sum, starting from [`Self::identity`].
    pub fn sum<'a, I>(&self, ciphertexts: I) -> Result<Ciphertext, LedgerError>
    where
        I: IntoIterator<Item = &'a Ciphertext>,
    {
        let mut acc = self.identity()?;
        for ciphertext in ciphertexts {
            self.combine(&mut acc, ciphertext);
        }
        Ok(acc)
    }
}
