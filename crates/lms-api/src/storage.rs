//! Object storage for uploaded images, videos and documents.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{Client as S3Client, config::Builder as S3ConfigBuilder, primitives::ByteStream};
use thiserror::Error;

use crate::config::ApiConfig;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("put {key} failed: {message}")]
    Put { key: String, message: String },
    #[error("delete {key} failed: {message}")]
    Delete { key: String, message: String },
}

/// Where uploaded files live. Objects are addressed by key; clients only ever
/// see the public URL.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key` and return the object's public URL.
    async fn put_object(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, StorageError>;

    async fn delete_object(&self, key: &str) -> Result<(), StorageError>;

    /// Base URL that public object URLs start with.
    fn public_base(&self) -> &str;

    /// The key of an object this store handed out, or `None` for foreign URLs.
    fn key_for_url(&self, url: &str) -> Option<String> {
        object_key_from_url(self.public_base(), url)
    }
}

pub fn object_key_from_url(base: &str, url: &str) -> Option<String> {
    let key = url.strip_prefix(base)?.strip_prefix('/')?;
    (!key.is_empty()).then(|| key.to_string())
}

/// S3-compatible store (AWS, MinIO, R2...).
#[derive(Debug, Clone)]
pub struct S3Store {
    client: S3Client,
    bucket: String,
    public_base: String,
}

impl S3Store {
    pub async fn new(config: &ApiConfig) -> Self {
        let base_config = aws_config::defaults(BehaviorVersion::latest())
            .endpoint_url(&config.s3_endpoint)
            .region(aws_config::Region::new(config.s3_region.clone()))
            .credentials_provider(aws_sdk_s3::config::Credentials::new(
                config.s3_access_key.clone(),
                config.s3_secret_key.clone(),
                None,
                None,
                "static",
            ))
            .load()
            .await;

        let s3_config = S3ConfigBuilder::from(&base_config)
            .force_path_style(true)
            .build();

        Self {
            client: S3Client::from_conf(s3_config),
            bucket: config.s3_bucket.clone(),
            public_base: config.s3_public_url(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_object(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::Put {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        Ok(format!("{}/{key}", self.public_base))
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Delete {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    fn public_base(&self) -> &str {
        &self.public_base
    }
}

/// Delete the objects behind `urls`, logging failures. URLs this store did
/// not issue are skipped.
pub async fn delete_urls<S>(store: &S, urls: impl IntoIterator<Item = String>)
where
    S: ObjectStore + ?Sized,
{
    for url in urls {
        let Some(key) = store.key_for_url(&url) else {
            tracing::debug!(%url, "not a stored object, skipping delete");
            continue;
        };
        if let Err(e) = store.delete_object(&key).await {
            tracing::warn!(error = %e, "failed to delete stored object");
        }
    }
}
