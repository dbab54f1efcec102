use crate::codec::CiphertextCodec;
use crate::errors::LedgerError;
use crate::keypair::PublicKey;
use crate::preset::ParameterProfile;
use crate::report::Report;
use crate::store::{ReportStore, StoreError};

use itertools::Itertools;

use std::sync::Arc;

/// Drives the report lifecycle on top of a [`ReportStore`].
///
/// The manager holds no durable state of its own: it is bound to one parameter profile and
/// every operation is a single read and/or conditional write against the store. Ciphertexts
/// are combined, never decrypted.
#[derive(Debug, Clone)]
pub struct ReportManager {
    codec: CiphertextCodec,
}

impl ReportManager {
    pub fn new(profile: Arc<ParameterProfile>) -> Self {
        Self {
            codec: CiphertextCodec::new(profile),
        }
    }

    pub fn profile(&self) -> &Arc<ParameterProfile> {
        self.codec.profile()
    }

    /// Opens an empty report for `subject`.
    ///
    /// # Errors
    ///
    /// * `DuplicateSubject` if a report already exists (use [`Self::replace_report`] to reset one).
    /// * `DecodeError` / `ProfileMismatch` if `pubkey` is not an encoded public key of the
    ///   active profile.
    /// * `Conflict` if another writer created the subject concurrently.
    pub fn create_report<S: ReportStore + ?Sized>(
        &self,
        store: &mut S,
        subject: &str,
        pubkey: &[u8],
    ) -> Result<(), LedgerError> {
        let report = self.new_report(subject, pubkey)?;

        if self.load(store, subject)?.is_some() {
            return Err(LedgerError::DuplicateSubject(subject.to_string()));
        }

        self.persist(store, subject, &report, None)?;
        log::info!("Created report {} under profile {}", subject, self.profile().name());

        Ok(())
    }

    /// Opens an empty report for `subject`, discarding any report already stored for it.
    pub fn replace_report<S: ReportStore + ?Sized>(
        &self,
        store: &mut S,
        subject: &str,
        pubkey: &[u8],
    ) -> Result<(), LedgerError> {
        let report = self.new_report(subject, pubkey)?;

        let previous = self.load(store, subject)?;
        let version = previous.as_ref().map(|(_, version)| *version);
        self.persist(store, subject, &report, version)?;

        match previous {
            Some((old, _)) => log::warn!(
                "Replaced report {} and dropped {} contribution(s)",
                subject,
                old.contributions.len()
            ),
            None => log::info!("Created report {} under profile {}", subject, self.profile().name()),
        }

        Ok(())
    }

    /// Records `ciphertext` as the contribution of `contributor_id`, replacing any earlier
    /// submission from the same contributor.
    ///
    /// # Errors
    ///
    /// * `NotFound` if `subject` has no report.
    /// * `ProfileMismatch` if the report was opened under another profile.
    /// * `DecodeError` if `ciphertext` does not decode under the active profile.
    /// * `Conflict` if the report changed between the read and the write; nothing is written.
    pub fn submit_data<S: ReportStore + ?Sized>(
        &self,
        store: &mut S,
        subject: &str,
        contributor_id: &str,
        ciphertext: &[u8],
    ) -> Result<(), LedgerError> {
        let (mut report, version) = self
            .load(store, subject)?
            .ok_or_else(|| LedgerError::NotFound(subject.to_string()))?;
        self.check_profile(&report)?;

        self.codec.unmarshal(ciphertext)?;

        let replaced = report.upsert(contributor_id, ciphertext.to_vec()).is_some();
        self.persist(store, subject, &report, Some(version))?;

        log::debug!(
            "{} contribution from {} on {} ({} total)",
            if replaced { "Replaced" } else { "Recorded" },
            contributor_id,
            subject,
            report.contributions.len()
        );

        Ok(())
    }

    /// Returns the marshalled homomorphic sum of every contribution to `subject`.
    ///
    /// Contributions are folded in ascending contributor-id order starting from the
    /// encryption of zero, so an empty report yields a ciphertext of 0.
    pub fn query_data<S: ReportStore + ?Sized>(
        &self,
        store: &S,
        subject: &str,
    ) -> Result<Vec<u8>, LedgerError> {
        let (report, _) = self
            .load(store, subject)?
            .ok_or_else(|| LedgerError::NotFound(subject.to_string()))?;
        self.check_profile(&report)?;

        let ciphertexts = report
            .contributions
            .iter()
            .map(|(contributor, bytes)| {
                self.codec.unmarshal(bytes).map_err(|e| {
                    LedgerError::DecodeError(format!(
                        "stored contribution of {} on {}: {}",
                        contributor, subject, e
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let sum = self.codec.sum(&ciphertexts)?;

        log::debug!(
            "Aggregated {} contribution(s) on {}: [{}]",
            ciphertexts.len(),
            subject,
            report.contributors().join(", ")
        );

        Ok(self.codec.marshal(&sum))
    }

    /// Reads the stored report for `subject`, if any.
    pub fn report<S: ReportStore + ?Sized>(
        &self,
        store: &S,
        subject: &str,
    ) -> Result<Option<Report>, LedgerError> {
        Ok(self.load(store, subject)?.map(|(report, _)| report))
    }

    fn new_report(&self, subject: &str, pubkey: &[u8]) -> Result<Report, LedgerError> {
        PublicKey::decode_for(self.profile().clone(), pubkey)?;
        Ok(Report::new(subject, self.profile().name(), pubkey.to_vec()))
    }

    fn check_profile(&self, report: &Report) -> Result<(), LedgerError> {
        if report.profile != self.profile().name() {
            return Err(LedgerError::ProfileMismatch {
                expected: self.profile().name().to_string(),
                actual: report.profile.clone(),
            });
        }
        Ok(())
    }

    fn load<S: ReportStore + ?Sized>(
        &self,
        store: &S,
        subject: &str,
    ) -> Result<Option<(Report, u64)>, LedgerError> {
        let Some(entry) = store
            .get_state(subject)
            .map_err(|e| store_error(subject, e))?
        else {
            return Ok(None);
        };

        let report = Report::from_json(&entry.value)?;
        Ok(Some((report, entry.version)))
    }

    fn persist<S: ReportStore + ?Sized>(
        &self,
        store: &mut S,
        subject: &str,
        report: &Report,
        expected_version: Option<u64>,
    ) -> Result<u64, LedgerError> {
        let value = report.to_json()?;
        store
            .put_state(subject, value, expected_version)
            .map_err(|e| store_error(subject, e))
    }
}

fn store_error(subject: &str, err: StoreError) -> LedgerError {
    match err {
        StoreError::VersionMismatch {
            expected, actual, ..
        } => LedgerError::Conflict {
            subject: subject.to_string(),
            expected,
            actual,
        },
        StoreError::Backend(message) => LedgerError::Store(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypair::KeyPair;
    use crate::preset::resolve;
    use crate::store::{MemoryStore, StateEntry};

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn setup() -> Result<(ReportManager, KeyPair, Vec<u8>), LedgerError> {
        let profile = resolve("PN12QP109")?;
        let keys = KeyPair::generate_with_rng(profile.clone(), &mut StdRng::seed_from_u64(11))?;
        let pubkey = keys.public_key.encode()?;
        Ok((ReportManager::new(profile), keys, pubkey))
    }

    /// Store whose contents move on between every read and the following write.
    struct RacingStore {
        inner: MemoryStore,
    }

    impl ReportStore for RacingStore {
        fn get_state(&self, key: &str) -> Result<Option<StateEntry>, StoreError> {
            self.inner.get_state(key)
        }

        fn put_state(
            &mut self,
            key: &str,
            value: Vec<u8>,
            expected_version: Option<u64>,
        ) -> Result<u64, StoreError> {
            if let Some(current) = self.inner.get_state(key)? {
                self.inner
                    .put_state(key, current.value, Some(current.version))?;
            }
            self.inner.put_state(key, value, expected_version)
        }
    }

    /// Store in which another writer creates every key just before our first write to it.
    struct CreatingStore {
        inner: MemoryStore,
        rival: Vec<u8>,
    }

    impl ReportStore for CreatingStore {
        fn get_state(&self, key: &str) -> Result<Option<StateEntry>, StoreError> {
            self.inner.get_state(key)
        }

        fn put_state(
            &mut self,
            key: &str,
            value: Vec<u8>,
            expected_version: Option<u64>,
        ) -> Result<u64, StoreError> {
            if self.inner.get_state(key)?.is_none() {
                self.inner.put_state(key, self.rival.clone(), None)?;
            }
            self.inner.put_state(key, value, expected_version)
        }
    }

    #[test]
    fn test_concurrent_create_is_a_conflict() -> Result<(), LedgerError> {
        let (manager, _, pubkey) = setup()?;
        let rival = Report::new("October", "PN12QP109", vec![]).to_json()?;
        let mut store = CreatingStore {
            inner: MemoryStore::new(),
            rival: rival.clone(),
        };

        let err = manager
            .create_report(&mut store, "October", &pubkey)
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Conflict { ref subject, expected: None, actual: Some(1) } if subject == "October"
        ));

        let entry = store.inner.get_state("October").map_err(|e| store_error("October", e))?;
        assert_eq!(entry, Some(StateEntry { value: rival, version: 1 }));
        Ok(())
    }

    #[test]
    fn test_non_fresh_ciphertext_is_rejected() -> Result<(), LedgerError> {
        let (manager, keys, pubkey) = setup()?;
        let mut store = MemoryStore::new();
        manager.create_report(&mut store, "October", &pubkey)?;
        let before = store.get_state("October").map_err(|e| store_error("October", e))?;

        let fresh = manager.codec.unmarshal(&keys.public_key.encrypt(2)?)?;
        let mut lowered = fresh.clone();
        lowered
            .switch_down()
            .map_err(|e| LedgerError::ParameterError(e.to_string()))?;
        let product = &fresh * &fresh;

        for bad in [manager.codec.marshal(&lowered), manager.codec.marshal(&product)] {
            assert!(matches!(
                manager.submit_data(&mut store, "October", "GitHub", &bad),
                Err(LedgerError::DecodeError(_))
            ));
        }

        let after = store.get_state("October").map_err(|e| store_error("October", e))?;
        assert_eq!(before, after);

        let sum = manager.query_data(&store, "October")?;
        assert_eq!(keys.secret_key.decrypt(&sum)?, 0);
        Ok(())
    }

    #[test]
    fn test_create_rejects_foreign_pubkey() -> Result<(), LedgerError> {
        let (manager, _, _) = setup()?;
        let mut store = MemoryStore::new();

        let other = resolve("PN13QP218")?;
        let foreign = KeyPair::generate_with_rng(other, &mut StdRng::seed_from_u64(12))?;
        let err = manager
            .create_report(&mut store, "October", &foreign.public_key.encode()?)
            .unwrap_err();
        assert!(matches!(err, LedgerError::ProfileMismatch { .. }));

        let err = manager
            .create_report(&mut store, "October", b"raw bytes")
            .unwrap_err();
        assert!(matches!(err, LedgerError::DecodeError(_)));
        assert!(store.is_empty());
        Ok(())
    }

    #[test]
    fn test_bad_ciphertext_leaves_report_untouched() -> Result<(), LedgerError> {
        let (manager, keys, pubkey) = setup()?;
        let mut store = MemoryStore::new();
        manager.create_report(&mut store, "October", &pubkey)?;
        manager.submit_data(&mut store, "October", "GitHub", &keys.public_key.encrypt(5)?)?;
        let before = store.get_state("October").map_err(|e| store_error("October", e))?;

        let err = manager
            .submit_data(&mut store, "October", "GitHub", b"garbage")
            .unwrap_err();
        assert!(matches!(err, LedgerError::DecodeError(_)));

        let after = store.get_state("October").map_err(|e| store_error("October", e))?;
        assert_eq!(before, after);
        Ok(())
    }

    #[test]
    fn test_concurrent_submit_is_a_conflict() -> Result<(), LedgerError> {
        let (manager, keys, pubkey) = setup()?;
        let mut store = RacingStore {
            inner: MemoryStore::new(),
        };
        store
            .inner
            .put_state("October", Report::new("October", "PN12QP109", vec![]).to_json()?, None)
            .map_err(|e| store_error("October", e))?;

        let err = manager
            .submit_data(&mut store, "October", "GitHub", &keys.public_key.encrypt(1)?)
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Conflict { ref subject, expected: Some(1), actual: Some(2) } if subject == "October"
        ));

        let report = manager.report(&store.inner, "October")?;
        assert!(report.is_some_and(|r| r.contributions.is_empty()));

        // Fresh subjects have nothing to race against.
        manager.create_report(&mut store, "November", &pubkey)?;
        Ok(())
    }

    #[test]
    fn test_report_from_other_profile() -> Result<(), LedgerError> {
        let (manager, keys, _) = setup()?;
        let mut store = MemoryStore::new();
        store
            .put_state("October", Report::new("October", "PN13QP218", vec![]).to_json()?, None)
            .map_err(|e| store_error("October", e))?;

        let err = manager
            .submit_data(&mut store, "October", "GitHub", &keys.public_key.encrypt(1)?)
            .unwrap_err();
        assert!(matches!(err, LedgerError::ProfileMismatch { .. }));
        assert!(matches!(
            manager.query_data(&store, "October"),
            Err(LedgerError::ProfileMismatch { .. })
        ));
        Ok(())
    }
}
