use crate::config::AwsConfig;
use crate::error::ProcessingError;
use async_trait::async_trait;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::Client as S3Client;
use aws_types::SdkConfig;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Read access to uploaded objects
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectReader: Send + Sync {
    /// Fetch the object body
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ProcessingError>;

    /// Fetch the user metadata attached to the object
    async fn metadata(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<HashMap<String, String>, ProcessingError>;
}

/// S3-backed object reader
pub struct S3ObjectReader {
    client: S3Client,
}

impl S3ObjectReader {
    /// Create a reader from a resolved SDK configuration
    pub fn new(sdk_config: &SdkConfig, config: &AwsConfig) -> Self {
        let mut s3_config_builder = S3ConfigBuilder::from(sdk_config);

        // Force path-style access for MinIO compatibility
        if config.force_path_style {
            s3_config_builder = s3_config_builder.force_path_style(true);
        }

        Self {
            client: S3Client::from_conf(s3_config_builder.build()),
        }
    }
}

#[async_trait]
impl ObjectReader for S3ObjectReader {
    #[instrument(skip(self))]
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ProcessingError> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                ProcessingError::ObjectStore(format!(
                    "could not get s3://{bucket}/{key}: {}",
                    e.into_service_error()
                ))
            })?;

        let body = response
            .body
            .collect()
            .await
            .map_err(|e| ProcessingError::ObjectStore(format!("could not collect body: {e}")))?;
        let bytes = body.into_bytes().to_vec();

        debug!(size_bytes = bytes.len(), "Object fetched");

        Ok(bytes)
    }

    #[instrument(skip(self))]
    async fn metadata(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<HashMap<String, String>, ProcessingError> {
        let response = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                ProcessingError::ObjectStore(format!(
                    "could not head s3://{bucket}/{key}: {}",
                    e.into_service_error()
                ))
            })?;

        Ok(response.metadata().cloned().unwrap_or_default())
    }
}
