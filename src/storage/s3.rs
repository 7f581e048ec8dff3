//! AWS S3 storage implementation.
//!
//! The known-identifier set is one object, `s3://{bucket}/{key}`, read and
//! replaced whole on every invocation.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;

use crate::error::{AppError, Result};
use crate::models::{KnownIds, StorageConfig};
use crate::storage::{StateStore, decode_ids, encode_ids};

/// S3-based known-identifier storage.
#[derive(Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
    key: String,
}

impl S3Store {
    /// Create a new S3 store instance.
    pub fn new(client: Client, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Create an S3 store using the default AWS credential chain.
    pub async fn from_config(config: &StorageConfig) -> Self {
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = Client::new(&sdk_config);
        Self::new(client, &config.bucket, &config.object_key)
    }

    /// Read the object body, returning None if the key does not exist.
    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .send()
            .await;

        match result {
            Ok(output) => {
                let bytes = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| AppError::store(self.location(), e))?;
                Ok(Some(bytes.into_bytes().to_vec()))
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    Ok(None)
                } else {
                    Err(AppError::store(self.location(), service_err))
                }
            }
        }
    }
}

#[async_trait]
impl StateStore for S3Store {
    async fn load(&self) -> Result<KnownIds> {
        match self.read_bytes().await? {
            Some(bytes) => {
                let body = String::from_utf8(bytes)
                    .map_err(|e| AppError::store(self.location(), e))?;
                decode_ids(&body, &self.location())
            }
            None => {
                log::info!("No existing data at {}, starting empty", self.location());
                Ok(KnownIds::new())
            }
        }
    }

    async fn save(&self, ids: &KnownIds) -> Result<()> {
        let bytes = ByteStream::from(encode_ids(ids)?);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .body(bytes)
            .content_type("application/json")
            .send()
            .await
            .map_err(|e| AppError::store(self.location(), e.into_service_error()))?;

        log::info!("Wrote {} known ids to {}", ids.len(), self.location());
        Ok(())
    }

    fn location(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}
