//! Job application models and status lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// Application review status.
///
/// Closed lifecycle: `pending` may move to any later state, `reviewed` may
/// only be resolved to `accepted` or `rejected`, and both resolutions are
/// terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Reviewed,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewed => "reviewed",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Parse a stored status string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "reviewed" => Some(Self::Reviewed),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Whether a status change is a legal lifecycle transition.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Reviewed)
                | (Self::Pending, Self::Accepted)
                | (Self::Pending, Self::Rejected)
                | (Self::Reviewed, Self::Accepted)
                | (Self::Reviewed, Self::Rejected)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A job application.
///
/// `job_id` is the string form of a Job identifier — a weak reference the
/// store does not enforce. Applicants submit arbitrary additional fields,
/// carried verbatim in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Application {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "jobId")]
    pub job_id: String,

    /// Owner identity for the caller-scoped listing.
    #[validate(email)]
    pub applicant: String,

    #[serde(default)]
    pub status: ApplicationStatus,

    #[serde(rename = "submittedAt", skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,

    /// Applicant-submitted fields outside the fixed schema.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// An application enriched with fields denormalized from its Job.
///
/// Derived at read time and never persisted; when the referenced Job is
/// missing the denormalized fields are omitted.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedApplication {
    #[serde(flatten)]
    pub application: Application,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_logo: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serde_round_trip() {
        for status in [
            ApplicationStatus::Pending,
            ApplicationStatus::Reviewed,
            ApplicationStatus::Accepted,
            ApplicationStatus::Rejected,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            let back: ApplicationStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(status, back);
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn status_rejects_unknown_values() {
        assert!(serde_json::from_str::<ApplicationStatus>("\"shortlisted\"").is_err());
        assert_eq!(ApplicationStatus::parse("shortlisted"), None);
    }

    #[test]
    fn pending_can_reach_every_later_state() {
        let pending = ApplicationStatus::Pending;
        assert!(pending.can_transition_to(ApplicationStatus::Reviewed));
        assert!(pending.can_transition_to(ApplicationStatus::Accepted));
        assert!(pending.can_transition_to(ApplicationStatus::Rejected));
    }

    #[test]
    fn terminal_states_cannot_move() {
        for terminal in [ApplicationStatus::Accepted, ApplicationStatus::Rejected] {
            assert!(terminal.is_terminal());
            for next in [
                ApplicationStatus::Pending,
                ApplicationStatus::Reviewed,
                ApplicationStatus::Accepted,
                ApplicationStatus::Rejected,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn self_transition_is_rejected() {
        assert!(!ApplicationStatus::Pending.can_transition_to(ApplicationStatus::Pending));
        assert!(!ApplicationStatus::Reviewed.can_transition_to(ApplicationStatus::Reviewed));
    }

    #[test]
    fn application_preserves_extra_fields() {
        let raw = r#"{
            "jobId": "J1",
            "applicant": "a@x.com",
            "linkedin": "https://linkedin.com/in/a",
            "coverLetter": "hello"
        }"#;
        let app: Application = serde_json::from_str(raw).unwrap();
        assert_eq!(app.status, ApplicationStatus::Pending);
        assert_eq!(app.extra["linkedin"], "https://linkedin.com/in/a");

        let json = serde_json::to_value(&app).unwrap();
        assert_eq!(json["coverLetter"], "hello");
        assert_eq!(json["jobId"], "J1");
    }

    #[test]
    fn enriched_application_flattens_and_omits_missing_join() {
        let app: Application =
            serde_json::from_str(r#"{"jobId":"J1","applicant":"a@x.com"}"#).unwrap();
        let enriched = EnrichedApplication {
            application: app,
            company: None,
            title: Some("Backend Engineer".to_string()),
            company_logo: None,
        };
        let json = serde_json::to_value(&enriched).unwrap();
        assert_eq!(json["title"], "Backend Engineer");
        assert_eq!(json["jobId"], "J1");
        assert!(json.get("company").is_none());
    }
}
