//! Image upload adapter for record attachments.
//!
//! This crate provides:
//! - Content-type and size validation for uploaded images
//! - Uploads to an S3-compatible bucket fronted by a public CDN base URL
//! - Durable key generation and public URL binding
//! - Best-effort deletion for rolling back partial multi-image uploads

pub mod client;
pub mod error;
pub mod upload;

pub use client::{MediaClient, MediaConfig};
pub use error::{MediaError, MediaResult};
pub use upload::{ImageFolder, ImageUpload, StoredImage};
