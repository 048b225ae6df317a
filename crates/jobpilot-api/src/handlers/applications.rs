//! Job application handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use jobpilot_models::{Application, ApplicationStatus, EnrichedApplication};
use jobpilot_store::{ApplicationRepository, UpdateSummary};

use crate::aggregation::{self, StoreDirectory};
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::jobs::OwnerQuery;
use crate::state::AppState;

/// List applications referencing a job.
pub async fn list_for_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<Vec<Application>>> {
    let repo = ApplicationRepository::new((*state.store).clone());
    Ok(Json(repo.list_by_job(&job_id).await?))
}

/// Create an application.
///
/// New applications always start out pending, whatever the payload says;
/// the submission timestamp is stamped server-side.
pub async fn create_application(
    State(state): State<AppState>,
    Json(mut application): Json<Application>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    application
        .validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    application.id = None;
    application.status = ApplicationStatus::Pending;
    application.submitted_at = Some(Utc::now());

    let repo = ApplicationRepository::new((*state.store).clone());
    let inserted_id = repo.create(&application).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "insertedId": inserted_id })),
    ))
}

/// Caller-scoped listing: the bearer identity must own the requested
/// email, and the guard runs before any store access.
pub async fn my_applications(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
    user: AuthUser,
) -> ApiResult<Json<Vec<EnrichedApplication>>> {
    let directory = StoreDirectory::new((*state.store).clone());
    let enriched =
        aggregation::owned_applications(user.email.as_deref(), &query.email, &directory).await?;
    Ok(Json(enriched))
}

/// Status update payload.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ApplicationStatus,
}

/// Update an application's review status.
///
/// The status field is the only thing written; an illegal lifecycle
/// transition is rejected before any write.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> ApiResult<Json<UpdateSummary>> {
    let repo = ApplicationRepository::new((*state.store).clone());

    let current = repo
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Application not found"))?;

    if !current.status.can_transition_to(body.status) {
        return Err(ApiError::conflict(format!(
            "Cannot change status from '{}' to '{}'",
            current.status, body.status
        )));
    }

    let summary = repo.update_status(&id, body.status).await?;
    Ok(Json(summary))
}
