//! API handlers.

pub mod applications;
pub mod blogs;
pub mod health;
pub mod jobs;
pub mod session;

use axum::extract::multipart::Field;

use jobpilot_media::ImageUpload;

use crate::error::ApiError;

/// Read a multipart file field into an image payload.
pub(crate) async fn read_image_field(
    name: &str,
    field: Field<'_>,
) -> Result<ImageUpload, ApiError> {
    let file_name = field.file_name().unwrap_or("image").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read upload '{}': {}", name, e)))?
        .to_vec();

    Ok(ImageUpload {
        field: name.to_string(),
        file_name,
        content_type,
        bytes,
    })
}

/// Parse a JSON-encoded multipart sub-field.
pub(crate) fn parse_json_field<T: serde::de::DeserializeOwned>(
    field: &str,
    raw: &str,
) -> Result<T, ApiError> {
    serde_json::from_str(raw)
        .map_err(|e| ApiError::validation(format!("Field '{}' is not valid JSON: {}", field, e)))
}

/// Reject a multipart form missing a required text field.
pub(crate) fn required_field(field: &'static str, value: Option<String>) -> Result<String, ApiError> {
    value.ok_or_else(|| ApiError::validation(format!("Missing field '{}'", field)))
}
