use crate::config::Config;
use crate::error::ConfigurationError;
use crate::image_analyzer::{ImageAnalyzer, RekognitionAnalyzer};
use crate::object_reader::{ObjectReader, S3ObjectReader};
use crate::record_store::{DynamoRecordStore, RecordStore};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_types::SdkConfig;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, instrument};

/// Handles to the services a notification may be routed to
#[derive(Clone)]
pub struct Services {
    pub objects: Arc<dyn ObjectReader>,
    pub analyzer: Arc<dyn ImageAnalyzer>,
    pub store: Arc<dyn RecordStore>,
}

/// Resolves configuration and hands out service handles
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServiceProvider: Send + Sync {
    async fn services(&self) -> Result<Services, ConfigurationError>;
}

/// Builds AWS clients from the Lambda environment.
///
/// Clients are constructed on the first successful resolution and shared by
/// every later invocation in the same execution environment.
pub struct AwsServiceProvider {
    config: Config,
    services: OnceCell<Services>,
}

impl AwsServiceProvider {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            services: OnceCell::new(),
        }
    }

    async fn build(&self) -> Result<Services, ConfigurationError> {
        info!("Initializing AWS clients");

        let sdk_config = self.load_sdk_config().await;
        validate_sdk_config(&sdk_config)?;

        // Only enroll mode calls these services, and it requires both names at load
        let collection_id = self.config.collection_id().unwrap_or_default();
        let table_name = self.config.table_name().unwrap_or_default();

        let services = Services {
            objects: Arc::new(S3ObjectReader::new(&sdk_config, &self.config.aws)),
            analyzer: Arc::new(RekognitionAnalyzer::new(
                &sdk_config,
                collection_id,
                &self.config.analysis,
            )),
            store: Arc::new(DynamoRecordStore::new(&sdk_config, table_name)),
        };

        info!(
            region = ?sdk_config.region().map(|r| r.as_ref()),
            collection_id = %collection_id,
            table = %table_name,
            "AWS clients initialized"
        );

        Ok(services)
    }

    async fn load_sdk_config(&self) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(ref region) = self.config.aws.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }

        // Configure custom endpoint for LocalStack
        if let Some(ref endpoint_url) = self.config.aws.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }

        loader.load().await
    }
}

#[async_trait]
impl ServiceProvider for AwsServiceProvider {
    #[instrument(skip(self))]
    async fn services(&self) -> Result<Services, ConfigurationError> {
        self.services
            .get_or_try_init(|| self.build())
            .await
            .cloned()
    }
}

/// Check that the resolved SDK configuration can sign requests
pub fn validate_sdk_config(sdk_config: &SdkConfig) -> Result<(), ConfigurationError> {
    if sdk_config.region().is_none() {
        return Err(ConfigurationError::MissingRegion);
    }
    if sdk_config.credentials_provider().is_none() {
        return Err(ConfigurationError::MissingCredentials);
    }
    Ok(())
}
