//! S3-compatible media bucket client.

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use crate::error::{MediaError, MediaResult};

/// Configuration for the media bucket client.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// S3 API endpoint URL
    pub endpoint_url: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Bucket name
    pub bucket_name: String,
    /// Region ("auto" for R2-style providers)
    pub region: String,
    /// Public CDN base under which uploaded keys are served
    pub public_base_url: String,
}

impl MediaConfig {
    /// Create config from environment variables.
    pub fn from_env() -> MediaResult<Self> {
        Ok(Self {
            endpoint_url: std::env::var("MEDIA_ENDPOINT_URL")
                .map_err(|_| MediaError::config_error("MEDIA_ENDPOINT_URL not set"))?,
            access_key_id: std::env::var("MEDIA_ACCESS_KEY_ID")
                .map_err(|_| MediaError::config_error("MEDIA_ACCESS_KEY_ID not set"))?,
            secret_access_key: std::env::var("MEDIA_SECRET_ACCESS_KEY")
                .map_err(|_| MediaError::config_error("MEDIA_SECRET_ACCESS_KEY not set"))?,
            bucket_name: std::env::var("MEDIA_BUCKET_NAME")
                .map_err(|_| MediaError::config_error("MEDIA_BUCKET_NAME not set"))?,
            region: std::env::var("MEDIA_REGION").unwrap_or_else(|_| "auto".to_string()),
            public_base_url: std::env::var("MEDIA_PUBLIC_BASE_URL")
                .map_err(|_| MediaError::config_error("MEDIA_PUBLIC_BASE_URL not set"))?,
        })
    }
}

/// Media bucket client.
#[derive(Clone)]
pub struct MediaClient {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl MediaClient {
    /// Create a new media client from configuration.
    pub async fn new(config: MediaConfig) -> MediaResult<Self> {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "media",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        let client = Client::from_conf(sdk_config);

        Ok(Self {
            client,
            bucket: config.bucket_name,
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create from environment variables.
    pub async fn from_env() -> MediaResult<Self> {
        let config = MediaConfig::from_env()?;
        Self::new(config).await
    }

    /// Upload bytes under a key.
    pub async fn upload_bytes(
        &self,
        data: Vec<u8>,
        key: &str,
        content_type: &str,
    ) -> MediaResult<()> {
        debug!("Uploading {} bytes to {}", data.len(), key);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| MediaError::upload_failed(e.to_string()))?;

        info!("Uploaded {}", key);
        Ok(())
    }

    /// Delete an object. Used to roll back partial multi-image uploads.
    pub async fn delete_object(&self, key: &str) -> MediaResult<()> {
        debug!("Deleting {}", key);

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| MediaError::DeleteFailed(e.to_string()))?;

        Ok(())
    }

    /// Durable public URL for a stored key.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}
