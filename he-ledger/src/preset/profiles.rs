use crate::errors::LedgerError;

use fhe::bfv::{BfvParameters, BfvParametersBuilder};
use lazy_static::lazy_static;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Profile used when nothing else is configured.
pub const DEFAULT_PROFILE: &str = "PN13QP218";

/// Plaintext modulus shared by every enumerated profile (prime, `t ≡ 1 mod 2^16`).
pub const PLAINTEXT_MODULUS: u64 = 0x3ee0001;

/// Raw description of a parameter set, before the scheme validates and builds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileLiteral {
    pub name: String,
    /// Degree of the polynomial ring, a power of two.
    pub degree: usize,
    /// Bit sizes of the ciphertext modulus chain.
    pub moduli_sizes: Vec<usize>,
    pub plaintext_modulus: u64,
}

lazy_static! {
    /// The enumerated (security, performance) tradeoffs a deployment can pick from.
    static ref PROFILE_LITERALS: BTreeMap<&'static str, ProfileLiteral> = {
        let mut map = BTreeMap::new();

        let table: [(&'static str, usize, &[usize]); 3] = [
            ("PN12QP109", 4096, &[54, 55]),
            ("PN13QP218", 8192, &[54, 54, 55, 55]),
            ("PN14QP438", 16384, &[54, 54, 54, 54, 54, 55, 55, 58]),
        ];

        for (name, degree, moduli_sizes) in table {
            map.insert(
                name,
                ProfileLiteral {
                    name: name.to_string(),
                    degree,
                    moduli_sizes: moduli_sizes.to_vec(),
                    plaintext_modulus: PLAINTEXT_MODULUS,
                },
            );
        }

        map
    };
}

/// A validated parameter set together with the scheme parameters built from it.
#[derive(Clone)]
pub struct ParameterProfile {
    literal: ProfileLiteral,
    params: Arc<BfvParameters>,
}

impl ParameterProfile {
    /// Builds the scheme parameters described by `literal`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::ParameterError` if the literal is rejected by the scheme
    /// (degree not a power of two, empty or oversized modulus chain, bad plaintext modulus).
    pub fn try_from_literal(literal: ProfileLiteral) -> Result<Self, LedgerError> {
        if literal.name.is_empty() {
            return Err(LedgerError::ParameterError(
                "Profile name must not be empty".to_string(),
            ));
        }

        if literal.moduli_sizes.is_empty() {
            return Err(LedgerError::ParameterError(format!(
                "{}: modulus chain must not be empty",
                literal.name
            )));
        }

        if literal.plaintext_modulus < 2 {
            return Err(LedgerError::ParameterError(format!(
                "{}: plaintext modulus must be > 1, got {}",
                literal.name, literal.plaintext_modulus
            )));
        }

        let params = BfvParametersBuilder::new()
            .set_degree(literal.degree)
            .set_plaintext_modulus(literal.plaintext_modulus)
            .set_moduli_sizes(&literal.moduli_sizes)
            .build_arc()
            .map_err(|e| LedgerError::ParameterError(format!("{}: {}", literal.name, e)))?;

        Ok(Self { literal, params })
    }

    pub fn name(&self) -> &str {
        &self.literal.name
    }

    pub fn degree(&self) -> usize {
        self.literal.degree
    }

    pub fn moduli_sizes(&self) -> &[usize] {
        &self.literal.moduli_sizes
    }

    pub fn plaintext_modulus(&self) -> u64 {
        self.literal.plaintext_modulus
    }

    pub fn literal(&self) -> &ProfileLiteral {
        &self.literal
    }

    /// Scheme parameters handed to fhe.rs.
    pub fn params(&self) -> &Arc<BfvParameters> {
        &self.params
    }

    /// Largest value accepted for encryption. Kept one below `(t - 1) / 2` so the bound never
    /// lands on the centering boundary of the decoder.
    ///
    /// The range is narrower than what [`Self::reduce`] can produce: a wrapped sum may decrypt
    /// to `±(t - 1) / 2`, which cannot itself be encrypted.
    pub fn max_value(&self) -> i64 {
        self.half_modulus() - 1
    }

    pub fn min_value(&self) -> i64 {
        -self.max_value()
    }

    fn half_modulus(&self) -> i64 {
        ((self.literal.plaintext_modulus - 1) / 2) as i64
    }

    pub fn contains(&self, value: i64) -> bool {
        (self.min_value()..=self.max_value()).contains(&value)
    }

    /// Maps `value` onto its centered representative modulo the plaintext modulus.
    ///
    /// # Example
    ///
    /// ```
    /// # use he_ledger::preset::resolve;
    /// let profile = resolve("PN12QP109").unwrap();
    /// let t = profile.plaintext_modulus() as i128;
    /// assert_eq!(profile.reduce(1000), 1000);
    /// assert_eq!(profile.reduce(-1000), -1000);
    /// assert_eq!(profile.reduce(t + 5), 5);
    /// assert_eq!(profile.reduce(t - 5), -5);
    /// ```
    pub fn reduce(&self, value: i128) -> i64 {
        let t = self.literal.plaintext_modulus as i128;

        let mut rem = value.rem_euclid(t);
        if rem > self.half_modulus() as i128 {
            rem -= t;
        }

        rem as i64
    }
}

impl PartialEq for ParameterProfile {
    fn eq(&self, other: &Self) -> bool {
        self.literal == other.literal
    }
}

impl Eq for ParameterProfile {}

impl fmt::Debug for ParameterProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterProfile")
            .field("name", &self.literal.name)
            .field("degree", &self.literal.degree)
            .field("moduli_sizes", &self.literal.moduli_sizes)
            .field("plaintext_modulus", &self.literal.plaintext_modulus)
            .finish()
    }
}

impl fmt::Display for ParameterProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal.name)
    }
}

/// Names of the enumerated profiles, in lexicographic order.
pub fn names() -> Vec<&'static str> {
    PROFILE_LITERALS.keys().copied().collect()
}

/// Resolves an enumerated profile by name.
///
/// # Errors
///
/// Returns `LedgerError::UnknownProfile` if `name` is not enumerated and
/// `LedgerError::ParameterError` if its parameters fail to build.
pub fn resolve(name: &str) -> Result<Arc<ParameterProfile>, LedgerError> {
    let literal = PROFILE_LITERALS
        .get(name)
        .cloned()
        .ok_or_else(|| LedgerError::UnknownProfile(name.to_string()))?;

    log::debug!(
        "Resolving profile {} (degree {}, moduli {:?})",
        literal.name,
        literal.degree,
        literal.moduli_sizes
    );

    ParameterProfile::try_from_literal(literal).map(Arc::new)
}
