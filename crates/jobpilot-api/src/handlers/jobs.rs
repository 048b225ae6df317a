//! Job posting handlers.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use jobpilot_media::{ImageFolder, ImageUpload};
use jobpilot_models::{Job, JobWithApplicationCount, SalaryRange};
use jobpilot_store::JobRepository;

use crate::aggregation::{self, StoreDirectory};
use crate::error::{ApiError, ApiResult};
use crate::handlers::{parse_json_field, read_image_field, required_field};
use crate::session::SessionUser;
use crate::state::AppState;

/// List all jobs, newest first.
pub async fn list_jobs(State(state): State<AppState>) -> ApiResult<Json<Vec<Job>>> {
    let repo = JobRepository::new((*state.store).clone());
    Ok(Json(repo.list_newest_first().await?))
}

/// Fetch one job by id.
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Job>> {
    let repo = JobRepository::new((*state.store).clone());
    let job = repo
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    Ok(Json(job))
}

/// Query parameter carrying the identity a request is about.
#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub email: String,
}

/// HR dashboard: jobs owned by an email, each annotated with its
/// application count. Requires a valid session cookie.
pub async fn hr_jobs_with_counts(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
    _session: SessionUser,
) -> ApiResult<Json<Vec<JobWithApplicationCount>>> {
    let directory = StoreDirectory::new((*state.store).clone());
    let jobs = directory.jobs.list_by_hr_email(&query.email).await?;
    let annotated = aggregation::count_applications_per_job(jobs, &directory).await?;
    Ok(Json(annotated))
}

/// Response for a created job.
#[derive(Serialize)]
pub struct JobCreatedResponse {
    #[serde(rename = "insertedId")]
    pub inserted_id: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_logo: Option<String>,
}

/// Create a job from a multipart form.
///
/// Text fields arrive alongside an optional `company_logo` file; the
/// salary range, requirements and responsibilities sub-fields are
/// JSON-encoded strings. An upload failure aborts the whole creation.
pub async fn add_job(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<JobCreatedResponse>)> {
    let mut form = JobForm::default();
    let mut logo: Option<ImageUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart request: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "company_logo" {
            logo = Some(read_image_field(&name, field).await?);
        } else {
            let value = field.text().await.map_err(|e| {
                ApiError::bad_request(format!("Failed to read field '{}': {}", name, e))
            })?;
            form.set(&name, value);
        }
    }

    let mut job = form.into_job()?;
    job.validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    if let Some(upload) = logo {
        let stored = state
            .media
            .store_image(ImageFolder::CompanyLogos, upload)
            .await?;
        job.company_logo = Some(stored.url);
        job.company_logo_public_id = Some(stored.public_id);
    }

    let repo = JobRepository::new((*state.store).clone());
    let inserted_id = repo.create(&job).await?;

    Ok((
        StatusCode::CREATED,
        Json(JobCreatedResponse {
            inserted_id,
            message: "Job posted successfully".to_string(),
            company_logo: job.company_logo,
        }),
    ))
}

/// Accumulates text fields of the job creation form.
#[derive(Debug, Default)]
struct JobForm {
    title: Option<String>,
    company: Option<String>,
    hr_email: Option<String>,
    salary_range: Option<String>,
    requirements: Option<String>,
    responsibilities: Option<String>,
}

impl JobForm {
    fn set(&mut self, name: &str, value: String) {
        match name {
            "title" => self.title = Some(value),
            "company" => self.company = Some(value),
            "hr_email" => self.hr_email = Some(value),
            "salaryRange" => self.salary_range = Some(value),
            "requirements" => self.requirements = Some(value),
            "responsibilities" => self.responsibilities = Some(value),
            // Unknown text fields are ignored
            _ => {}
        }
    }

    fn into_job(self) -> Result<Job, ApiError> {
        let salary_range: SalaryRange = parse_json_field(
            "salaryRange",
            &required_field("salaryRange", self.salary_range)?,
        )?;
        let requirements: Vec<String> = parse_json_field(
            "requirements",
            &required_field("requirements", self.requirements)?,
        )?;
        let responsibilities: Vec<String> = parse_json_field(
            "responsibilities",
            &required_field("responsibilities", self.responsibilities)?,
        )?;

        Ok(Job {
            id: None,
            title: required_field("title", self.title)?,
            company: required_field("company", self.company)?,
            hr_email: required_field("hr_email", self.hr_email)?,
            salary_range,
            requirements,
            responsibilities,
            company_logo: None,
            company_logo_public_id: None,
            posted_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> JobForm {
        let mut form = JobForm::default();
        form.set("title", "Backend Engineer".to_string());
        form.set("company", "Acme".to_string());
        form.set("hr_email", "hr@acme.com".to_string());
        form.set(
            "salaryRange",
            r#"{"min":60000,"max":90000,"currency":"usd"}"#.to_string(),
        );
        form.set("requirements", r#"["rust","tokio"]"#.to_string());
        form.set("responsibilities", r#"["build services"]"#.to_string());
        form
    }

    #[test]
    fn form_parses_json_sub_fields() {
        let job = filled_form().into_job().unwrap();
        assert_eq!(job.salary_range.min, 60_000);
        assert_eq!(job.requirements, vec!["rust", "tokio"]);
        assert_eq!(job.company_logo, None);
        assert!(job.validate().is_ok());
    }

    #[test]
    fn malformed_salary_range_is_a_validation_error() {
        let mut form = filled_form();
        form.set("salaryRange", "sixty-to-ninety".to_string());
        assert!(matches!(
            form.into_job(),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn missing_title_is_a_validation_error() {
        let mut form = filled_form();
        form.title = None;
        assert!(matches!(form.into_job(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn unknown_text_fields_are_ignored() {
        let mut form = filled_form();
        form.set("favouriteColour", "teal".to_string());
        assert!(form.into_job().is_ok());
    }
}
