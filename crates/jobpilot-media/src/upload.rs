//! Image validation, key generation and upload binding.

use uuid::Uuid;

use crate::client::MediaClient;
use crate::error::{MediaError, MediaResult};

/// Accepted image content types.
const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// Upload size cap: 5 MiB.
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Bucket folder an image lands in, by attachment kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFolder {
    CompanyLogos,
    BlogImages,
}

impl ImageFolder {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CompanyLogos => "company_logos",
            Self::BlogImages => "blog_images",
        }
    }
}

/// An image payload extracted from a multipart field.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Multipart field the file arrived in.
    pub field: String,
    /// Client-supplied file name.
    pub file_name: String,
    /// Declared content type.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A stored image: durable URL plus the storage identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub url: String,
    pub public_id: String,
}

impl ImageUpload {
    /// Validate the payload before any network call.
    pub fn validate(&self) -> MediaResult<()> {
        if self.bytes.is_empty() {
            return Err(MediaError::EmptyFile(self.field.clone()));
        }
        if !ALLOWED_IMAGE_TYPES.contains(&self.content_type.as_str()) {
            return Err(MediaError::UnsupportedType(self.content_type.clone()));
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(MediaError::TooLarge {
                size: self.bytes.len(),
                limit: MAX_IMAGE_BYTES,
            });
        }
        Ok(())
    }

    /// Object key for this payload: folder, sanitized stem, unique suffix.
    pub fn object_key(&self, folder: ImageFolder) -> String {
        let stem = sanitize_stem(&self.file_name);
        let ext = extension_for(&self.content_type);
        format!(
            "{}/{}_{}.{}",
            folder.as_str(),
            stem,
            Uuid::new_v4().simple(),
            ext
        )
    }
}

impl MediaClient {
    /// Validate and store one image, binding its durable URL and key.
    ///
    /// Validation failures never reach the bucket; upload failures surface
    /// so the caller can abort the enclosing record creation.
    pub async fn store_image(
        &self,
        folder: ImageFolder,
        upload: ImageUpload,
    ) -> MediaResult<StoredImage> {
        upload.validate()?;

        let key = upload.object_key(folder);
        self.upload_bytes(upload.bytes, &key, &upload.content_type)
            .await?;

        Ok(StoredImage {
            url: self.public_url(&key),
            public_id: key,
        })
    }
}

/// Reduce a client file name to a safe key stem.
fn sanitize_stem(file_name: &str) -> String {
    let stem = file_name
        .rsplit('/')
        .next()
        .unwrap_or(file_name)
        .split('.')
        .next()
        .unwrap_or("image");

    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "jpg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(content_type: &str, bytes: Vec<u8>) -> ImageUpload {
        ImageUpload {
            field: "company_logo".to_string(),
            file_name: "acme logo.png".to_string(),
            content_type: content_type.to_string(),
            bytes,
        }
    }

    #[test]
    fn accepted_types_pass_validation() {
        for ty in ALLOWED_IMAGE_TYPES {
            assert!(upload(ty, vec![1, 2, 3]).validate().is_ok(), "{}", ty);
        }
    }

    #[test]
    fn non_image_types_are_rejected() {
        let err = upload("application/pdf", vec![1]).validate().unwrap_err();
        assert!(matches!(err, MediaError::UnsupportedType(_)));
    }

    #[test]
    fn empty_payload_is_rejected() {
        let err = upload("image/png", vec![]).validate().unwrap_err();
        assert!(matches!(err, MediaError::EmptyFile(_)));
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let err = upload("image/png", vec![0; MAX_IMAGE_BYTES + 1])
            .validate()
            .unwrap_err();
        assert!(matches!(err, MediaError::TooLarge { .. }));
    }

    #[test]
    fn object_keys_are_distinct_per_upload() {
        let u = upload("image/png", vec![1]);
        let a = u.object_key(ImageFolder::CompanyLogos);
        let b = u.object_key(ImageFolder::CompanyLogos);
        assert_ne!(a, b);
        assert!(a.starts_with("company_logos/acme_logo_"));
        assert!(a.ends_with(".png"));
    }

    #[test]
    fn key_stem_is_sanitized() {
        let mut u = upload("image/jpeg", vec![1]);
        u.file_name = "../We ird/$name.v2.jpeg".to_string();
        let key = u.object_key(ImageFolder::BlogImages);
        assert!(key.starts_with("blog_images/_name_"));
        assert!(key.ends_with(".jpg"));
        assert_eq!(key.matches('/').count(), 1);
    }

    #[test]
    fn extension_follows_content_type() {
        assert_eq!(extension_for("image/webp"), "webp");
        assert_eq!(extension_for("image/jpeg"), "jpg");
        assert_eq!(extension_for("image/jpg"), "jpg");
    }
}
