//! Application/job aggregation and the caller-ownership guard.
//!
//! Read-time joins only: nothing here writes to the store, and the
//! enriched views are recomputed on every request.

use std::future::Future;

use tracing::warn;

use jobpilot_models::{Application, EnrichedApplication, Job, JobWithApplicationCount};
use jobpilot_store::{ApplicationRepository, FirestoreClient, JobRepository, StoreResult};

use crate::error::ApiError;

/// Read access to jobs, narrow enough for tests to fake.
pub trait JobDirectory {
    fn job_by_id(&self, job_id: &str) -> impl Future<Output = StoreResult<Option<Job>>> + Send;
}

/// Read access to applications, narrow enough for tests to fake.
pub trait ApplicationDirectory {
    fn applications_by_applicant(
        &self,
        email: &str,
    ) -> impl Future<Output = StoreResult<Vec<Application>>> + Send;

    fn count_for_job(&self, job_id: &str) -> impl Future<Output = StoreResult<u64>> + Send;
}

/// The repositories the aggregation endpoints read from.
pub struct StoreDirectory {
    pub jobs: JobRepository,
    pub applications: ApplicationRepository,
}

impl StoreDirectory {
    pub fn new(client: FirestoreClient) -> Self {
        Self {
            jobs: JobRepository::new(client.clone()),
            applications: ApplicationRepository::new(client),
        }
    }
}

impl JobDirectory for StoreDirectory {
    async fn job_by_id(&self, job_id: &str) -> StoreResult<Option<Job>> {
        self.jobs.get(job_id).await
    }
}

impl ApplicationDirectory for StoreDirectory {
    async fn applications_by_applicant(&self, email: &str) -> StoreResult<Vec<Application>> {
        self.applications.list_by_applicant(email).await
    }

    async fn count_for_job(&self, job_id: &str) -> StoreResult<u64> {
        self.applications.count_for_job(job_id).await
    }
}

/// Join each application with its referenced job.
///
/// The output has the same length and order as the input. An application
/// whose job is gone is returned unenriched rather than failing the whole
/// listing; store failures still fail the request.
///
/// One lookup per application. Acceptable at current data scale; a
/// batched join would have to keep the same ordering and per-item
/// semantics.
pub async fn enrich_applications<J: JobDirectory>(
    applications: Vec<Application>,
    jobs: &J,
) -> StoreResult<Vec<EnrichedApplication>> {
    let mut enriched = Vec::with_capacity(applications.len());

    for application in applications {
        let job = jobs.job_by_id(&application.job_id).await?;

        if job.is_none() {
            warn!(
                job_id = %application.job_id,
                "Application references a missing job, returning it unenriched"
            );
        }

        let (company, title, company_logo) = match job {
            Some(job) => (Some(job.company), Some(job.title), job.company_logo),
            None => (None, None, None),
        };

        enriched.push(EnrichedApplication {
            application,
            company,
            title,
            company_logo,
        });
    }

    Ok(enriched)
}

/// Annotate each job with its exact application count, zero included.
///
/// Same one-lookup-per-item pattern and ordering guarantee as
/// [`enrich_applications`]. Stored job documents are never mutated.
pub async fn count_applications_per_job<A: ApplicationDirectory>(
    jobs: Vec<Job>,
    applications: &A,
) -> StoreResult<Vec<JobWithApplicationCount>> {
    let mut annotated = Vec::with_capacity(jobs.len());

    for job in jobs {
        let application_count = match job.id.as_deref() {
            Some(id) => applications.count_for_job(id).await?,
            None => 0,
        };
        annotated.push(JobWithApplicationCount {
            job,
            application_count,
        });
    }

    Ok(annotated)
}

/// The ownership guard: the verified credential identity must match the
/// identity the request is about. Hard precondition, checked before any
/// store access. A credential without an email claim fails closed.
pub fn ensure_owner(claimed: Option<&str>, requested: &str) -> Result<(), ApiError> {
    match claimed {
        Some(claimed) if claimed == requested => Ok(()),
        _ => Err(ApiError::forbidden("forbidden access")),
    }
}

/// Caller-scoped application listing: guard, then fetch, then join.
pub async fn owned_applications<S>(
    claimed: Option<&str>,
    requested: &str,
    store: &S,
) -> Result<Vec<EnrichedApplication>, ApiError>
where
    S: JobDirectory + ApplicationDirectory,
{
    ensure_owner(claimed, requested)?;

    let applications = store.applications_by_applicant(requested).await?;
    Ok(enrich_applications(applications, store).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;
    use jobpilot_models::SalaryRange;
    use jobpilot_store::StoreError;

    #[derive(Default)]
    struct FakeStore {
        jobs: HashMap<String, Job>,
        applications: Vec<Application>,
        calls: AtomicUsize,
    }

    impl FakeStore {
        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl JobDirectory for FakeStore {
        async fn job_by_id(&self, job_id: &str) -> StoreResult<Option<Job>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if job_id == "unreachable" {
                return Err(StoreError::ServerError(503, "store down".into()));
            }
            Ok(self.jobs.get(job_id).cloned())
        }
    }

    impl ApplicationDirectory for FakeStore {
        async fn applications_by_applicant(&self, email: &str) -> StoreResult<Vec<Application>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .applications
                .iter()
                .filter(|a| a.applicant == email)
                .cloned()
                .collect())
        }

        async fn count_for_job(&self, job_id: &str) -> StoreResult<u64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .applications
                .iter()
                .filter(|a| a.job_id == job_id)
                .count() as u64)
        }
    }

    fn job(id: &str, company: &str) -> Job {
        Job {
            id: Some(id.to_string()),
            title: format!("{} engineer", company),
            company: company.to_string(),
            hr_email: "hr@x.com".to_string(),
            salary_range: SalaryRange {
                min: 1,
                max: 2,
                currency: None,
            },
            requirements: vec![],
            responsibilities: vec![],
            company_logo: Some(format!("https://cdn.example.com/{}.png", company)),
            company_logo_public_id: None,
            posted_at: Utc::now(),
        }
    }

    fn application(job_id: &str, applicant: &str) -> Application {
        serde_json::from_value(serde_json::json!({
            "jobId": job_id,
            "applicant": applicant,
        }))
        .unwrap()
    }

    fn store_with_jobs(ids: &[(&str, &str)]) -> FakeStore {
        FakeStore {
            jobs: ids
                .iter()
                .map(|(id, company)| ((*id).to_string(), job(id, company)))
                .collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn enrichment_preserves_length_and_order() {
        let store = store_with_jobs(&[("J1", "Acme"), ("J2", "Globex")]);
        let input = vec![
            application("J2", "a@x.com"),
            application("J1", "a@x.com"),
            application("J2", "a@x.com"),
        ];

        let enriched = enrich_applications(input, &store).await.unwrap();

        assert_eq!(enriched.len(), 3);
        let companies: Vec<_> = enriched
            .iter()
            .map(|e| e.company.as_deref().unwrap())
            .collect();
        assert_eq!(companies, vec!["Globex", "Acme", "Globex"]);
    }

    #[tokio::test]
    async fn missing_job_is_returned_unenriched() {
        let store = store_with_jobs(&[("J1", "Acme")]);
        let input = vec![application("J1", "a@x.com"), application("gone", "a@x.com")];

        let enriched = enrich_applications(input, &store).await.unwrap();

        assert_eq!(enriched.len(), 2);
        assert_eq!(enriched[0].company.as_deref(), Some("Acme"));
        assert!(enriched[0].company_logo.is_some());
        assert_eq!(enriched[1].company, None);
        assert_eq!(enriched[1].title, None);
        assert_eq!(enriched[1].company_logo, None);
        // The weak reference is preserved as stored
        assert_eq!(enriched[1].application.job_id, "gone");
    }

    #[tokio::test]
    async fn store_failure_fails_the_whole_join() {
        let store = store_with_jobs(&[("J1", "Acme")]);
        let input = vec![application("unreachable", "a@x.com")];
        let result = enrich_applications(input, &store).await;
        assert!(matches!(result, Err(StoreError::ServerError(_, _))));
    }

    #[tokio::test]
    async fn counts_are_exact_including_zero() {
        let mut store = store_with_jobs(&[("J1", "Acme"), ("J2", "Globex")]);
        store.applications = vec![
            application("J1", "a@x.com"),
            application("J1", "b@x.com"),
            application("J1", "c@x.com"),
        ];

        let annotated =
            count_applications_per_job(vec![job("J1", "Acme"), job("J2", "Globex")], &store)
                .await
                .unwrap();

        assert_eq!(annotated.len(), 2);
        assert_eq!(annotated[0].application_count, 3);
        assert_eq!(annotated[1].application_count, 0);
        assert_eq!(annotated[0].job.company, "Acme");
    }

    #[test]
    fn guard_accepts_matching_identity() {
        assert!(ensure_owner(Some("a@x.com"), "a@x.com").is_ok());
    }

    #[test]
    fn guard_rejects_mismatch_and_missing_claim() {
        assert!(matches!(
            ensure_owner(Some("a@x.com"), "b@x.com"),
            Err(ApiError::Forbidden(_))
        ));
        assert!(matches!(
            ensure_owner(None, "b@x.com"),
            Err(ApiError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn mismatched_identity_never_reaches_the_store() {
        let store = store_with_jobs(&[("J1", "Acme")]);

        let result = owned_applications(Some("mallory@x.com"), "a@x.com", &store).await;

        assert!(matches!(result, Err(ApiError::Forbidden(_))));
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn matching_identity_lists_enriched_applications() {
        let mut store = store_with_jobs(&[("J1", "Acme")]);
        store.applications = vec![
            application("J1", "a@x.com"),
            application("J1", "someone-else@x.com"),
        ];

        let result = owned_applications(Some("a@x.com"), "a@x.com", &store)
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].application.applicant, "a@x.com");
        assert_eq!(result[0].company.as_deref(), Some("Acme"));
        assert!(store.call_count() >= 2);
    }
}
