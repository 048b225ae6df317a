//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, patch, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;

use crate::handlers::applications::{
    create_application, list_for_job, my_applications, update_status,
};
use crate::handlers::blogs::{create_blog, list_blogs};
use crate::handlers::health::{health, ready};
use crate::handlers::jobs::{add_job, get_job, hr_jobs_with_counts, list_jobs};
use crate::handlers::session::issue_session;
use crate::middleware::{cors_layer, request_id, request_logging, security_headers};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Session
        .route("/jwt", post(issue_session))
        // Jobs
        .route("/jobs", get(list_jobs))
        .route("/jobs/applications", get(hr_jobs_with_counts))
        .route("/jobs/:id", get(get_job))
        .route("/add-job", post(add_job))
        // Applications
        .route("/applications", get(my_applications))
        .route("/applications/:id", patch(update_status))
        .route("/applications/job/:job_id", get(list_for_job))
        .route("/job-applications", post(create_application))
        // Blogs
        .route("/blogs", get(list_blogs).post(create_blog));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    Router::new()
        .merge(api_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(security_headers))
                .layer(middleware::from_fn(request_id))
                .layer(middleware::from_fn(request_logging))
                .layer(TimeoutLayer::new(state.config.request_timeout))
                .layer(DefaultBodyLimit::max(state.config.max_body_size)),
        )
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
