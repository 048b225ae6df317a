//! Blog post handlers.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::warn;

use jobpilot_media::{ImageFolder, ImageUpload, StoredImage};
use jobpilot_models::Blog;
use jobpilot_store::BlogRepository;

use crate::error::{ApiError, ApiResult};
use crate::handlers::{parse_json_field, read_image_field, required_field};
use crate::state::AppState;

/// List all blog posts, newest first.
pub async fn list_blogs(State(state): State<AppState>) -> ApiResult<Json<Vec<Blog>>> {
    let repo = BlogRepository::new((*state.store).clone());
    Ok(Json(repo.list_newest_first().await?))
}

/// Create a blog post from a multipart form.
///
/// The `logo` and `coverImage` files are each optional and tracked
/// independently; a post may carry zero, one or both. When the second
/// upload fails after the first succeeded, the orphaned image is removed
/// best-effort and the whole creation aborts.
pub async fn create_blog(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut form = BlogForm::default();
    let mut logo: Option<ImageUpload> = None;
    let mut cover_image: Option<ImageUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart request: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "logo" => logo = Some(read_image_field(&name, field).await?),
            "coverImage" => cover_image = Some(read_image_field(&name, field).await?),
            _ => {
                let value = field.text().await.map_err(|e| {
                    ApiError::bad_request(format!("Failed to read field '{}': {}", name, e))
                })?;
                form.set(&name, value);
            }
        }
    }

    let mut blog = form.into_blog()?;

    let stored_logo = match logo {
        Some(upload) => Some(
            state
                .media
                .store_image(ImageFolder::BlogImages, upload)
                .await?,
        ),
        None => None,
    };

    let stored_cover = match cover_image {
        Some(upload) => {
            match state
                .media
                .store_image(ImageFolder::BlogImages, upload)
                .await
            {
                Ok(stored) => Some(stored),
                Err(e) => {
                    rollback_orphan(&state, stored_logo.as_ref()).await;
                    return Err(e.into());
                }
            }
        }
        None => None,
    };

    blog.logo = stored_logo.map(|s| s.url);
    blog.cover_image = stored_cover.map(|s| s.url);

    let repo = BlogRepository::new((*state.store).clone());
    let inserted_id = repo.create(&blog).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "insertedId": inserted_id })),
    ))
}

/// Remove an image left behind by an aborted creation.
async fn rollback_orphan(state: &AppState, stored: Option<&StoredImage>) {
    if let Some(stored) = stored {
        if let Err(e) = state.media.delete_object(&stored.public_id).await {
            warn!(key = %stored.public_id, "Failed to roll back orphaned blog image: {}", e);
        }
    }
}

/// Accumulates text fields of the blog creation form.
#[derive(Debug, Default)]
struct BlogForm {
    title: Option<String>,
    author: Option<String>,
    published_date: Option<String>,
    read_time: Option<String>,
    tags: Option<String>,
    short_description: Option<String>,
    content: Option<String>,
}

impl BlogForm {
    fn set(&mut self, name: &str, value: String) {
        match name {
            "title" => self.title = Some(value),
            "author" => self.author = Some(value),
            "publishedDate" => self.published_date = Some(value),
            "readTime" => self.read_time = Some(value),
            "tags" => self.tags = Some(value),
            "shortDescription" => self.short_description = Some(value),
            "content" => self.content = Some(value),
            _ => {}
        }
    }

    fn into_blog(self) -> Result<Blog, ApiError> {
        let tags: Vec<String> =
            parse_json_field("tags", &required_field("tags", self.tags)?)?;

        Ok(Blog {
            id: None,
            title: required_field("title", self.title)?,
            author: required_field("author", self.author)?,
            published_date: required_field("publishedDate", self.published_date)?,
            read_time: required_field("readTime", self.read_time)?,
            tags,
            short_description: required_field("shortDescription", self.short_description)?,
            content: required_field("content", self.content)?,
            logo: None,
            cover_image: None,
            created_at: Some(Utc::now()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> BlogForm {
        let mut form = BlogForm::default();
        form.set("title", "Hiring in 2026".to_string());
        form.set("author", "Jane".to_string());
        form.set("publishedDate", "2026-08-01".to_string());
        form.set("readTime", "4 min".to_string());
        form.set("tags", r#"["hiring","culture"]"#.to_string());
        form.set("shortDescription", "What changed".to_string());
        form.set("content", "Long form...".to_string());
        form
    }

    #[test]
    fn form_parses_tags_and_leaves_images_unset() {
        let blog = filled_form().into_blog().unwrap();
        assert_eq!(blog.tags, vec!["hiring", "culture"]);
        assert_eq!(blog.logo, None);
        assert_eq!(blog.cover_image, None);
        assert!(blog.created_at.is_some());
    }

    #[test]
    fn malformed_tags_is_a_validation_error() {
        let mut form = filled_form();
        form.set("tags", "hiring,culture".to_string());
        assert!(matches!(form.into_blog(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn missing_content_is_a_validation_error() {
        let mut form = filled_form();
        form.content = None;
        assert!(matches!(form.into_blog(), Err(ApiError::Validation(_))));
    }
}
