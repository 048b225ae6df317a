//! Job posting models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Salary range attached to a job posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: i64,
    pub max: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// A job posting.
///
/// `id` is assigned by the store adapter at insert time and is absent on
/// not-yet-persisted records. `hr_email` identifies the sole owner for
/// dashboard queries; jobs are never updated or deleted after creation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Job {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub title: String,

    pub company: String,

    /// Owner identity for the HR dashboard.
    #[validate(email)]
    pub hr_email: String,

    #[serde(rename = "salaryRange")]
    pub salary_range: SalaryRange,

    /// Ordered as submitted.
    pub requirements: Vec<String>,

    /// Ordered as submitted.
    pub responsibilities: Vec<String>,

    /// Durable public URL of the uploaded company logo.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_logo: Option<String>,

    /// Object-storage key of the uploaded logo.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_logo_public_id: Option<String>,

    #[serde(rename = "postedAt")]
    pub posted_at: DateTime<Utc>,
}

/// A job annotated with its application count (HR dashboard view).
///
/// Derived at read time, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct JobWithApplicationCount {
    #[serde(flatten)]
    pub job: Job,
    pub application_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_job() -> Job {
        Job {
            id: Some("j1".to_string()),
            title: "Backend Engineer".to_string(),
            company: "Acme".to_string(),
            hr_email: "hr@acme.com".to_string(),
            salary_range: SalaryRange {
                min: 60_000,
                max: 90_000,
                currency: Some("usd".to_string()),
            },
            requirements: vec!["rust".to_string()],
            responsibilities: vec!["build services".to_string()],
            company_logo: None,
            company_logo_public_id: None,
            posted_at: Utc::now(),
        }
    }

    #[test]
    fn job_serializes_with_wire_field_names() {
        let json = serde_json::to_value(sample_job()).unwrap();
        assert!(json.get("salaryRange").is_some());
        assert!(json.get("postedAt").is_some());
        assert!(json.get("hr_email").is_some());
        // Absent logo fields are omitted entirely, not null
        assert!(json.get("company_logo").is_none());
    }

    #[test]
    fn job_with_count_flattens() {
        let annotated = JobWithApplicationCount {
            job: sample_job(),
            application_count: 3,
        };
        let json = serde_json::to_value(annotated).unwrap();
        assert_eq!(json["application_count"], 3);
        assert_eq!(json["title"], "Backend Engineer");
    }

    #[test]
    fn job_validates_hr_email() {
        let mut job = sample_job();
        job.hr_email = "not-an-email".to_string();
        assert!(job.validate().is_err());
    }

    #[test]
    fn salary_range_round_trips() {
        let parsed: SalaryRange = serde_json::from_str(r#"{"min":40000,"max":60000}"#).unwrap();
        assert_eq!(parsed.min, 40_000);
        assert_eq!(parsed.currency, None);
    }
}
