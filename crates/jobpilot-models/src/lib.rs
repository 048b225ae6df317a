//! Shared data models for the JobPilot backend.
//!
//! This crate provides Serde-serializable types for:
//! - Job postings and their HR dashboard view
//! - Job applications and their enriched (joined) view
//! - Application status lifecycle
//! - Blog posts

pub mod application;
pub mod blog;
pub mod job;

// Re-export common types
pub use application::{Application, ApplicationStatus, EnrichedApplication};
pub use blog::Blog;
pub use job::{Job, JobWithApplicationCount, SalaryRange};
