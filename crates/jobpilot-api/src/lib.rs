//! Axum HTTP API server for the JobPilot job board.
//!
//! This crate provides:
//! - The public endpoint surface (jobs, applications, blogs, session)
//! - Firebase ID token and session-cookie identity verification
//! - The application/job aggregation and authorization layer
//! - Multipart upload binding for record attachments

pub mod aggregation;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
