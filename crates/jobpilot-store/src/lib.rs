//! Firestore REST document-store adapter.
//!
//! This crate provides:
//! - Typed repositories for Jobs, Applications and Blogs
//! - Structured queries (filter, sort, limit) and COUNT aggregations
//! - Service account authentication via gcp_auth, with token caching
//! - Retry with exponential backoff and jitter

pub mod client;
pub mod error;
pub mod metrics;
pub mod query;
pub mod repos;
pub mod retry;
pub mod token_cache;
pub mod types;

pub use client::{FirestoreClient, FirestoreConfig};
pub use error::{StoreError, StoreResult};
pub use query::StructuredQuery;
pub use repos::{ApplicationRepository, BlogRepository, JobRepository, UpdateSummary};
pub use types::{Document, FromFirestoreValue, ToFirestoreValue, Value};
