//! Blog post model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A published blog post. Created once, immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blog {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub title: String,

    pub author: String,

    #[serde(rename = "publishedDate")]
    pub published_date: String,

    #[serde(rename = "readTime")]
    pub read_time: String,

    pub tags: Vec<String>,

    #[serde(rename = "shortDescription")]
    pub short_description: String,

    pub content: String,

    /// Durable public URL of the post logo, when one was uploaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,

    /// Durable public URL of the cover image, when one was uploaded.
    #[serde(rename = "coverImage", skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,

    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}
