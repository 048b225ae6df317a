//! Typed repositories for Jobs, Applications and Blogs.

use std::collections::HashMap;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use jobpilot_models::{Application, ApplicationStatus, Blog, Job, SalaryRange};

use crate::client::FirestoreClient;
use crate::error::{StoreError, StoreResult};
use crate::query::{SortDirection, StructuredQuery};
use crate::types::{
    json_to_value, value_to_json, ArrayValue, Document, FromFirestoreValue, MapValue,
    ToFirestoreValue, Value,
};

const JOBS: &str = "jobs";
const APPLICATIONS: &str = "applications";
const BLOGS: &str = "blogs";

/// Result summary for a single-document update, mirrored to callers.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct UpdateSummary {
    #[serde(rename = "matchedCount")]
    pub matched: u64,
    #[serde(rename = "modifiedCount")]
    pub modified: u64,
}

fn new_doc_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn require_string(doc: &Document, name: &str) -> StoreResult<String> {
    doc.field(name)
        .and_then(String::from_firestore_value)
        .ok_or_else(|| {
            StoreError::invalid_response(format!("document missing string field '{}'", name))
        })
}

fn optional_string(doc: &Document, name: &str) -> Option<String> {
    doc.field(name).and_then(String::from_firestore_value)
}

// =============================================================================
// Jobs
// =============================================================================

/// Repository for job postings.
pub struct JobRepository {
    client: FirestoreClient,
}

impl JobRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Insert a new job. The store adapter assigns and returns the id.
    pub async fn create(&self, job: &Job) -> StoreResult<String> {
        let doc_id = new_doc_id();
        let fields = job_to_fields(job);
        self.client.create_document(JOBS, &doc_id, fields).await?;
        info!(job_id = %doc_id, company = %job.company, "Created job record");
        Ok(doc_id)
    }

    /// Get a job by id.
    pub async fn get(&self, job_id: &str) -> StoreResult<Option<Job>> {
        let doc = self
            .client
            .with_retry("get_job", || self.client.get_document(JOBS, job_id))
            .await?;
        doc.map(|d| document_to_job(&d)).transpose()
    }

    /// All jobs, newest first.
    pub async fn list_newest_first(&self) -> StoreResult<Vec<Job>> {
        let query = StructuredQuery::collection(JOBS).order_by("postedAt", SortDirection::Descending);
        let docs = self
            .client
            .with_retry("list_jobs", || self.client.run_query(query.clone()))
            .await?;
        docs.iter().map(document_to_job).collect()
    }

    /// Jobs owned by an HR email, newest first.
    pub async fn list_by_hr_email(&self, email: &str) -> StoreResult<Vec<Job>> {
        let query = StructuredQuery::collection(JOBS)
            .filter_eq("hr_email", email.to_firestore_value())
            .order_by("postedAt", SortDirection::Descending);
        let docs = self
            .client
            .with_retry("list_jobs_by_owner", || self.client.run_query(query.clone()))
            .await?;
        docs.iter().map(document_to_job).collect()
    }
}

fn job_to_fields(job: &Job) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("title".to_string(), job.title.to_firestore_value());
    fields.insert("company".to_string(), job.company.to_firestore_value());
    fields.insert("hr_email".to_string(), job.hr_email.to_firestore_value());
    fields.insert(
        "salaryRange".to_string(),
        salary_range_to_value(&job.salary_range),
    );
    fields.insert(
        "requirements".to_string(),
        job.requirements.to_firestore_value(),
    );
    fields.insert(
        "responsibilities".to_string(),
        job.responsibilities.to_firestore_value(),
    );
    // Absent logo fields are omitted entirely, matching the wire format
    if let Some(logo) = &job.company_logo {
        fields.insert("company_logo".to_string(), logo.to_firestore_value());
    }
    if let Some(public_id) = &job.company_logo_public_id {
        fields.insert(
            "company_logo_public_id".to_string(),
            public_id.to_firestore_value(),
        );
    }
    fields.insert("postedAt".to_string(), job.posted_at.to_firestore_value());
    fields
}

fn salary_range_to_value(range: &SalaryRange) -> Value {
    let mut fields = HashMap::new();
    fields.insert("min".to_string(), range.min.to_firestore_value());
    fields.insert("max".to_string(), range.max.to_firestore_value());
    if let Some(currency) = &range.currency {
        fields.insert("currency".to_string(), currency.to_firestore_value());
    }
    Value::MapValue(MapValue {
        fields: Some(fields),
    })
}

fn salary_range_from_value(value: &Value) -> Option<SalaryRange> {
    let Value::MapValue(map) = value else {
        return None;
    };
    let fields = map.fields.as_ref()?;
    Some(SalaryRange {
        min: fields.get("min").and_then(i64::from_firestore_value)?,
        max: fields.get("max").and_then(i64::from_firestore_value)?,
        currency: fields.get("currency").and_then(String::from_firestore_value),
    })
}

fn document_to_job(doc: &Document) -> StoreResult<Job> {
    Ok(Job {
        id: doc.doc_id().map(str::to_string),
        title: require_string(doc, "title")?,
        company: require_string(doc, "company")?,
        hr_email: require_string(doc, "hr_email")?,
        salary_range: doc
            .field("salaryRange")
            .and_then(salary_range_from_value)
            .ok_or_else(|| StoreError::invalid_response("job document missing salaryRange"))?,
        requirements: doc
            .field("requirements")
            .and_then(Vec::<String>::from_firestore_value)
            .unwrap_or_default(),
        responsibilities: doc
            .field("responsibilities")
            .and_then(Vec::<String>::from_firestore_value)
            .unwrap_or_default(),
        company_logo: optional_string(doc, "company_logo"),
        company_logo_public_id: optional_string(doc, "company_logo_public_id"),
        posted_at: doc
            .field("postedAt")
            .and_then(chrono::DateTime::from_firestore_value)
            .ok_or_else(|| StoreError::invalid_response("job document missing postedAt"))?,
    })
}

// =============================================================================
// Applications
// =============================================================================

/// Repository for job applications.
pub struct ApplicationRepository {
    client: FirestoreClient,
}

impl ApplicationRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Insert a new application. The store adapter assigns and returns the id.
    pub async fn create(&self, application: &Application) -> StoreResult<String> {
        let doc_id = new_doc_id();
        let fields = application_to_fields(application);
        self.client
            .create_document(APPLICATIONS, &doc_id, fields)
            .await?;
        info!(
            application_id = %doc_id,
            job_id = %application.job_id,
            "Created application record"
        );
        Ok(doc_id)
    }

    /// Get an application by id.
    pub async fn get(&self, application_id: &str) -> StoreResult<Option<Application>> {
        let doc = self
            .client
            .with_retry("get_application", || {
                self.client.get_document(APPLICATIONS, application_id)
            })
            .await?;
        doc.map(|d| document_to_application(&d)).transpose()
    }

    /// Applications referencing a job.
    pub async fn list_by_job(&self, job_id: &str) -> StoreResult<Vec<Application>> {
        let query = StructuredQuery::collection(APPLICATIONS)
            .filter_eq("jobId", job_id.to_firestore_value());
        let docs = self
            .client
            .with_retry("list_applications_by_job", || {
                self.client.run_query(query.clone())
            })
            .await?;
        docs.iter().map(document_to_application).collect()
    }

    /// Applications submitted by an applicant.
    pub async fn list_by_applicant(&self, email: &str) -> StoreResult<Vec<Application>> {
        let query = StructuredQuery::collection(APPLICATIONS)
            .filter_eq("applicant", email.to_firestore_value());
        let docs = self
            .client
            .with_retry("list_applications_by_applicant", || {
                self.client.run_query(query.clone())
            })
            .await?;
        docs.iter().map(document_to_application).collect()
    }

    /// Exact number of applications referencing a job.
    pub async fn count_for_job(&self, job_id: &str) -> StoreResult<u64> {
        let query = StructuredQuery::collection(APPLICATIONS)
            .filter_eq("jobId", job_id.to_firestore_value());
        self.client
            .with_retry("count_applications", || self.client.run_count(query.clone()))
            .await
    }

    /// Overwrite the status field, leaving every other field untouched.
    pub async fn update_status(
        &self,
        application_id: &str,
        status: ApplicationStatus,
    ) -> StoreResult<UpdateSummary> {
        let mut fields = HashMap::new();
        fields.insert("status".to_string(), status.as_str().to_firestore_value());

        self.client
            .update_document(
                APPLICATIONS,
                application_id,
                fields,
                Some(vec!["status".to_string()]),
            )
            .await?;

        Ok(UpdateSummary {
            matched: 1,
            modified: 1,
        })
    }
}

/// Fixed schema fields; everything else round-trips through `extra`.
const APPLICATION_FIELDS: &[&str] = &["jobId", "applicant", "status", "submittedAt"];

fn application_to_fields(application: &Application) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("jobId".to_string(), application.job_id.to_firestore_value());
    fields.insert(
        "applicant".to_string(),
        application.applicant.to_firestore_value(),
    );
    fields.insert(
        "status".to_string(),
        application.status.as_str().to_firestore_value(),
    );
    if let Some(submitted_at) = &application.submitted_at {
        fields.insert("submittedAt".to_string(), submitted_at.to_firestore_value());
    }
    for (key, value) in &application.extra {
        fields.insert(key.clone(), json_to_value(value));
    }
    fields
}

fn document_to_application(doc: &Document) -> StoreResult<Application> {
    let status = require_string(doc, "status")?;
    let status = ApplicationStatus::parse(&status).ok_or_else(|| {
        StoreError::invalid_response(format!("unknown application status '{}'", status))
    })?;

    let extra = doc
        .fields
        .as_ref()
        .map(|fields| {
            fields
                .iter()
                .filter(|(name, _)| !APPLICATION_FIELDS.contains(&name.as_str()))
                .map(|(name, value)| (name.clone(), value_to_json(value)))
                .collect()
        })
        .unwrap_or_default();

    Ok(Application {
        id: doc.doc_id().map(str::to_string),
        job_id: require_string(doc, "jobId")?,
        applicant: require_string(doc, "applicant")?,
        status,
        submitted_at: doc
            .field("submittedAt")
            .and_then(chrono::DateTime::from_firestore_value),
        extra,
    })
}

// =============================================================================
// Blogs
// =============================================================================

/// Repository for blog posts.
pub struct BlogRepository {
    client: FirestoreClient,
}

impl BlogRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Insert a new blog post. The store adapter assigns and returns the id.
    pub async fn create(&self, blog: &Blog) -> StoreResult<String> {
        let doc_id = new_doc_id();
        let fields = blog_to_fields(blog);
        self.client.create_document(BLOGS, &doc_id, fields).await?;
        info!(blog_id = %doc_id, "Created blog record");
        Ok(doc_id)
    }

    /// All blog posts, newest first.
    pub async fn list_newest_first(&self) -> StoreResult<Vec<Blog>> {
        let query =
            StructuredQuery::collection(BLOGS).order_by("createdAt", SortDirection::Descending);
        let docs = self
            .client
            .with_retry("list_blogs", || self.client.run_query(query.clone()))
            .await?;
        docs.iter().map(document_to_blog).collect()
    }
}

fn blog_to_fields(blog: &Blog) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("title".to_string(), blog.title.to_firestore_value());
    fields.insert("author".to_string(), blog.author.to_firestore_value());
    fields.insert(
        "publishedDate".to_string(),
        blog.published_date.to_firestore_value(),
    );
    fields.insert("readTime".to_string(), blog.read_time.to_firestore_value());
    fields.insert(
        "tags".to_string(),
        Value::ArrayValue(ArrayValue {
            values: Some(blog.tags.iter().map(|t| t.to_firestore_value()).collect()),
        }),
    );
    fields.insert(
        "shortDescription".to_string(),
        blog.short_description.to_firestore_value(),
    );
    fields.insert("content".to_string(), blog.content.to_firestore_value());
    if let Some(logo) = &blog.logo {
        fields.insert("logo".to_string(), logo.to_firestore_value());
    }
    if let Some(cover_image) = &blog.cover_image {
        fields.insert("coverImage".to_string(), cover_image.to_firestore_value());
    }
    if let Some(created_at) = &blog.created_at {
        fields.insert("createdAt".to_string(), created_at.to_firestore_value());
    }
    fields
}

fn document_to_blog(doc: &Document) -> StoreResult<Blog> {
    Ok(Blog {
        id: doc.doc_id().map(str::to_string),
        title: require_string(doc, "title")?,
        author: require_string(doc, "author")?,
        published_date: require_string(doc, "publishedDate")?,
        read_time: require_string(doc, "readTime")?,
        tags: doc
            .field("tags")
            .and_then(Vec::<String>::from_firestore_value)
            .unwrap_or_default(),
        short_description: require_string(doc, "shortDescription")?,
        content: require_string(doc, "content")?,
        logo: optional_string(doc, "logo"),
        cover_image: optional_string(doc, "coverImage"),
        created_at: doc
            .field("createdAt")
            .and_then(chrono::DateTime::from_firestore_value),
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn doc_named(collection: &str, id: &str, fields: HashMap<String, Value>) -> Document {
        Document {
            name: Some(format!(
                "projects/p/databases/(default)/documents/{}/{}",
                collection, id
            )),
            fields: Some(fields),
            create_time: None,
            update_time: None,
        }
    }

    fn sample_job() -> Job {
        Job {
            id: None,
            title: "Backend Engineer".to_string(),
            company: "Acme".to_string(),
            hr_email: "hr@acme.com".to_string(),
            salary_range: SalaryRange {
                min: 60_000,
                max: 90_000,
                currency: Some("usd".to_string()),
            },
            requirements: vec!["rust".to_string(), "tokio".to_string()],
            responsibilities: vec!["build".to_string()],
            company_logo: None,
            company_logo_public_id: None,
            posted_at: Utc::now(),
        }
    }

    #[test]
    fn job_mapping_round_trip() {
        let job = sample_job();
        let fields = job_to_fields(&job);
        let doc = doc_named(JOBS, "j1", fields);
        let back = document_to_job(&doc).unwrap();

        assert_eq!(back.id.as_deref(), Some("j1"));
        assert_eq!(back.title, job.title);
        assert_eq!(back.hr_email, job.hr_email);
        assert_eq!(back.salary_range, job.salary_range);
        assert_eq!(back.requirements, job.requirements);
        assert_eq!(
            back.posted_at.timestamp_millis(),
            job.posted_at.timestamp_millis()
        );
    }

    #[test]
    fn job_without_logo_stores_no_logo_field() {
        let fields = job_to_fields(&sample_job());
        assert!(!fields.contains_key("company_logo"));
        assert!(!fields.contains_key("company_logo_public_id"));
    }

    #[test]
    fn job_with_logo_round_trips_both_fields() {
        let mut job = sample_job();
        job.company_logo = Some("https://cdn.example.com/company_logos/a.png".to_string());
        job.company_logo_public_id = Some("company_logos/a.png".to_string());
        let doc = doc_named(JOBS, "j2", job_to_fields(&job));
        let back = document_to_job(&doc).unwrap();
        assert_eq!(back.company_logo, job.company_logo);
        assert_eq!(back.company_logo_public_id, job.company_logo_public_id);
    }

    #[test]
    fn document_missing_required_field_is_invalid() {
        let mut fields = job_to_fields(&sample_job());
        fields.remove("title");
        let doc = doc_named(JOBS, "j3", fields);
        assert!(matches!(
            document_to_job(&doc),
            Err(StoreError::InvalidResponse(_))
        ));
    }

    #[test]
    fn application_mapping_preserves_extra_fields() {
        let application: Application = serde_json::from_str(
            r#"{
                "jobId": "J1",
                "applicant": "a@x.com",
                "linkedin": "https://linkedin.com/in/a",
                "yearsOfExperience": 4
            }"#,
        )
        .unwrap();

        let doc = doc_named(APPLICATIONS, "a1", application_to_fields(&application));
        let back = document_to_application(&doc).unwrap();

        assert_eq!(back.id.as_deref(), Some("a1"));
        assert_eq!(back.job_id, "J1");
        assert_eq!(back.status, ApplicationStatus::Pending);
        assert_eq!(back.extra["linkedin"], "https://linkedin.com/in/a");
        assert_eq!(back.extra["yearsOfExperience"], 4);
    }

    #[test]
    fn application_with_unknown_status_is_invalid() {
        let application: Application =
            serde_json::from_str(r#"{"jobId":"J1","applicant":"a@x.com"}"#).unwrap();
        let mut fields = application_to_fields(&application);
        fields.insert(
            "status".to_string(),
            "shortlisted".to_firestore_value(),
        );
        let doc = doc_named(APPLICATIONS, "a2", fields);
        assert!(matches!(
            document_to_application(&doc),
            Err(StoreError::InvalidResponse(_))
        ));
    }

    #[test]
    fn blog_mapping_round_trip_with_partial_images() {
        let blog = Blog {
            id: None,
            title: "Hiring in 2026".to_string(),
            author: "Jane".to_string(),
            published_date: "2026-08-01".to_string(),
            read_time: "4 min".to_string(),
            tags: vec!["hiring".to_string()],
            short_description: "What changed".to_string(),
            content: "Long form...".to_string(),
            logo: Some("https://cdn.example.com/blog_images/x.png".to_string()),
            cover_image: None,
            created_at: Some(Utc::now()),
        };
        let doc = doc_named(BLOGS, "b1", blog_to_fields(&blog));
        let back = document_to_blog(&doc).unwrap();
        assert_eq!(back.id.as_deref(), Some("b1"));
        assert_eq!(back.logo, blog.logo);
        assert_eq!(back.cover_image, None);
        assert_eq!(back.tags, blog.tags);
    }

    #[test]
    fn update_summary_wire_names() {
        let summary = UpdateSummary {
            matched: 1,
            modified: 1,
        };
        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json["matchedCount"], 1);
        assert_eq!(json["modifiedCount"], 1);
    }
}
