//! Doctor → specialty resolution.
//!
//! The backend has no direct doctor → specialty query, so the resolver
//! joins client-side: clinics × specialties × doctors-by-specialty, first
//! match wins, and every doctor is resolved at most once per session.

mod cache;

pub use cache::*;

use std::collections::{BTreeSet, HashMap};

use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::backend::SpecialtyDirectory;
use crate::models::Clinic;

/// Label used when no clinic lists the doctor under any specialty.
pub const FALLBACK_SPECIALTY: &str = "Consulta";

/// Resolves doctor IDs to specialty names and memoizes the answers.
#[derive(Debug, Clone)]
pub struct SpecialtyResolver {
    cache: SpecialtyCache,
    /// Max doctors probed at once; 1 means strictly sequential.
    concurrency: usize,
}

impl Default for SpecialtyResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SpecialtyResolver {
    /// Create a sequential resolver with an empty cache.
    pub fn new() -> Self {
        Self {
            cache: SpecialtyCache::new(),
            concurrency: 1,
        }
    }

    /// Probe up to `limit` doctors concurrently. Probes for one doctor stay
    /// sequential. A limit of 0 is treated as 1.
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Resolve every doctor ID to a specialty name.
    ///
    /// Cached IDs cost no backend calls. Uncached IDs are probed across
    /// `clinics` in order; a doctor found nowhere gets [`FALLBACK_SPECIALTY`].
    /// Probe failures count as "no match" and are never returned.
    pub async fn resolve<D, I>(
        &mut self,
        directory: &D,
        doctor_ids: I,
        clinics: &[Clinic],
    ) -> HashMap<String, String>
    where
        D: SpecialtyDirectory + ?Sized,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let requested: BTreeSet<String> = doctor_ids
            .into_iter()
            .map(|id| id.as_ref().to_string())
            .collect();

        let pending: Vec<String> = requested
            .iter()
            .filter(|id| !self.cache.contains(id))
            .cloned()
            .collect();

        if !pending.is_empty() {
            debug!(
                "Resolving {} doctor specialties across {} clinics",
                pending.len(),
                clinics.len()
            );
        }

        if self.concurrency <= 1 {
            for doctor_id in pending {
                let found = probe_doctor(directory, &doctor_id, clinics).await;
                self.record(doctor_id, found);
            }
        } else {
            // Pending IDs are distinct, so each doctor is probed once; the
            // cache is written only here, after the join.
            let results: Vec<(String, Option<String>)> = stream::iter(pending)
                .map(|doctor_id| async move {
                    let found = probe_doctor(directory, &doctor_id, clinics).await;
                    (doctor_id, found)
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

            for (doctor_id, found) in results {
                self.record(doctor_id, found);
            }
        }

        requested
            .into_iter()
            .map(|id| {
                let name = self.specialty_for(&id).to_string();
                (id, name)
            })
            .collect()
    }

    /// Cached specialty for a doctor, or the fallback label.
    pub fn specialty_for(&self, doctor_id: &str) -> &str {
        self.cache.get(doctor_id).unwrap_or(FALLBACK_SPECIALTY)
    }

    pub fn cache(&self) -> &SpecialtyCache {
        &self.cache
    }

    /// Forget all resolutions (new screen session).
    pub fn reset(&mut self) {
        self.cache.clear();
    }

    fn record(&mut self, doctor_id: String, found: Option<String>) {
        let specialty = match found {
            Some(name) => name,
            None => {
                info!("No specialty found for doctor {}, using fallback", doctor_id);
                FALLBACK_SPECIALTY.to_string()
            }
        };
        self.cache.insert_if_absent(doctor_id, specialty);
    }
}

/// Walk clinics and their specialties until one lists the doctor.
async fn probe_doctor<D>(directory: &D, doctor_id: &str, clinics: &[Clinic]) -> Option<String>
where
    D: SpecialtyDirectory + ?Sized,
{
    for clinic in clinics {
        let specialties = match directory.specialties(clinic.id).await {
            Ok(list) => list,
            Err(e) => {
                warn!("Failed to list specialties for clinic {}: {}", clinic.id, e);
                continue;
            }
        };

        for specialty in &specialties {
            let doctors = match directory.doctors_by_specialty(clinic.id, specialty.id).await {
                Ok(list) => list,
                Err(e) => {
                    warn!(
                        "Failed to list doctors for clinic {} specialty {}: {}",
                        clinic.id, specialty.id, e
                    );
                    continue;
                }
            };

            if let Some(entry) = doctors.iter().find(|d| d.doctor_id == doctor_id) {
                debug!(
                    "Doctor {} matched specialty {} at clinic {}",
                    doctor_id, specialty.id, clinic.id
                );
                let name = if entry.specialty_name.trim().is_empty() {
                    specialty.name.clone()
                } else {
                    entry.specialty_name.clone()
                };
                return Some(name);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, BackendResult};
    use crate::models::{DoctorSpecialtyEntry, Specialty};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeDirectory {
        specialties: HashMap<i64, Vec<Specialty>>,
        doctors: HashMap<(i64, i64), Vec<DoctorSpecialtyEntry>>,
        failing_clinics: Vec<i64>,
        failing_pairs: Vec<(i64, i64)>,
        calls: AtomicUsize,
        log: Mutex<Vec<String>>,
    }

    impl FakeDirectory {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SpecialtyDirectory for FakeDirectory {
        async fn specialties(&self, clinic_id: i64) -> BackendResult<Vec<Specialty>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.log.lock().unwrap().push(format!("specialties:{}", clinic_id));
            if self.failing_clinics.contains(&clinic_id) {
                return Err(BackendError::Transport("timeout".into()));
            }
            Ok(self.specialties.get(&clinic_id).cloned().unwrap_or_default())
        }

        async fn doctors_by_specialty(
            &self,
            clinic_id: i64,
            specialty_id: i64,
        ) -> BackendResult<Vec<DoctorSpecialtyEntry>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.log
                .lock()
                .unwrap()
                .push(format!("doctors:{}:{}", clinic_id, specialty_id));
            if self.failing_pairs.contains(&(clinic_id, specialty_id)) {
                return Err(BackendError::NotFound("specialty".into()));
            }
            Ok(self
                .doctors
                .get(&(clinic_id, specialty_id))
                .cloned()
                .unwrap_or_default())
        }
    }

    fn two_clinic_directory() -> (FakeDirectory, Vec<Clinic>) {
        let mut dir = FakeDirectory::default();
        dir.specialties.insert(
            1,
            vec![Specialty::new(10, "Cardiología"), Specialty::new(11, "Dermatología")],
        );
        dir.specialties.insert(2, vec![Specialty::new(20, "Pediatría")]);
        dir.doctors.insert(
            (1, 11),
            vec![DoctorSpecialtyEntry::new("doc-B", "Dermatología")],
        );
        dir.doctors.insert(
            (2, 20),
            vec![
                DoctorSpecialtyEntry::new("doc-B", "Pediatría"),
                DoctorSpecialtyEntry::new("doc-C", "Pediatría"),
            ],
        );
        let clinics = vec![Clinic::new(1, "Central"), Clinic::new(2, "Norte")];
        (dir, clinics)
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        let (dir, clinics) = two_clinic_directory();
        let mut resolver = SpecialtyResolver::new();

        let result = resolver.resolve(&dir, ["doc-B"], &clinics).await;

        assert_eq!(result["doc-B"], "Dermatología");
        // Clinic 2 is never probed once clinic 1 matched.
        let log = dir.log.lock().unwrap().clone();
        assert_eq!(log, vec!["specialties:1", "doctors:1:10", "doctors:1:11"]);
    }

    #[tokio::test]
    async fn test_later_clinic_match() {
        let (dir, clinics) = two_clinic_directory();
        let mut resolver = SpecialtyResolver::new();

        let result = resolver.resolve(&dir, ["doc-C"], &clinics).await;
        assert_eq!(result["doc-C"], "Pediatría");
    }

    #[tokio::test]
    async fn test_cached_doctor_costs_nothing() {
        let (dir, clinics) = two_clinic_directory();
        let mut resolver = SpecialtyResolver::new();

        resolver.resolve(&dir, ["doc-C"], &clinics).await;
        let calls = dir.calls();
        let again = resolver.resolve(&dir, ["doc-C", "doc-C"], &clinics).await;

        assert_eq!(dir.calls(), calls);
        assert_eq!(again.len(), 1);
        assert_eq!(again["doc-C"], "Pediatría");
    }

    #[tokio::test]
    async fn test_unknown_doctor_falls_back() {
        let (dir, clinics) = two_clinic_directory();
        let mut resolver = SpecialtyResolver::new();

        let result = resolver.resolve(&dir, ["doc-Z"], &clinics).await;
        assert_eq!(result["doc-Z"], FALLBACK_SPECIALTY);
        assert_eq!(resolver.cache().get("doc-Z"), Some(FALLBACK_SPECIALTY));
    }

    #[tokio::test]
    async fn test_probe_failures_are_skipped() {
        let (mut dir, clinics) = two_clinic_directory();
        dir.failing_clinics.push(1);
        let mut resolver = SpecialtyResolver::new();

        // Clinic 1 fails entirely; the doctor is still found at clinic 2.
        let result = resolver.resolve(&dir, ["doc-B"], &clinics).await;
        assert_eq!(result["doc-B"], "Pediatría");
    }

    #[tokio::test]
    async fn test_failing_pair_does_not_stop_later_pairs() {
        let (mut dir, clinics) = two_clinic_directory();
        dir.failing_pairs.push((1, 10));
        let mut resolver = SpecialtyResolver::new();

        let result = resolver.resolve(&dir, ["doc-B"], &clinics).await;
        assert_eq!(result["doc-B"], "Dermatología");
    }

    #[tokio::test]
    async fn test_all_probes_fail_still_covers_every_id() {
        let (mut dir, clinics) = two_clinic_directory();
        dir.failing_clinics = vec![1, 2];
        let mut resolver = SpecialtyResolver::new();

        let result = resolver.resolve(&dir, ["doc-B", "doc-C", "doc-Z"], &clinics).await;
        assert_eq!(result.len(), 3);
        assert!(result.values().all(|v| v == FALLBACK_SPECIALTY));
    }

    #[tokio::test]
    async fn test_no_clinics() {
        let dir = FakeDirectory::default();
        let mut resolver = SpecialtyResolver::new();

        let result = resolver.resolve(&dir, ["doc-A"], &[]).await;
        assert_eq!(result["doc-A"], FALLBACK_SPECIALTY);
        assert_eq!(dir.calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_entry_name_uses_specialty_listing() {
        let mut dir = FakeDirectory::default();
        dir.specialties.insert(1, vec![Specialty::new(10, "Cardiología")]);
        dir.doctors
            .insert((1, 10), vec![DoctorSpecialtyEntry::new("doc-A", " ")]);
        let mut resolver = SpecialtyResolver::new();

        let result = resolver
            .resolve(&dir, ["doc-A"], &[Clinic::new(1, "Central")])
            .await;
        assert_eq!(result["doc-A"], "Cardiología");
    }

    #[tokio::test]
    async fn test_concurrent_matches_sequential() {
        let (dir, clinics) = two_clinic_directory();
        let ids = ["doc-B", "doc-C", "doc-Z"];

        let mut sequential = SpecialtyResolver::new();
        let expected = sequential.resolve(&dir, ids, &clinics).await;

        let mut concurrent = SpecialtyResolver::new().with_concurrency(4);
        let actual = concurrent.resolve(&dir, ids, &clinics).await;

        assert_eq!(actual, expected);
        assert_eq!(concurrent.cache().len(), 3);
    }

    #[test]
    fn test_zero_concurrency_is_sequential() {
        assert_eq!(SpecialtyResolver::new().with_concurrency(0).concurrency(), 1);
    }

    #[tokio::test]
    async fn test_reset_forces_new_probes() {
        let (dir, clinics) = two_clinic_directory();
        let mut resolver = SpecialtyResolver::new();

        resolver.resolve(&dir, ["doc-C"], &clinics).await;
        let calls = dir.calls();
        resolver.reset();
        resolver.resolve(&dir, ["doc-C"], &clinics).await;
        assert!(dir.calls() > calls);
    }
}
