use crate::error::ConfigurationError;
use serde::Deserialize;

/// Main configuration for the image processor
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Service configuration
    #[serde(default)]
    pub service: ServiceConfig,
    /// AWS SDK overrides
    #[serde(default)]
    pub aws: AwsConfig,
    /// Image analysis configuration
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Record store configuration
    #[serde(default)]
    pub store: StoreConfig,
    /// Per-record processing behavior
    #[serde(default)]
    pub processing: ProcessingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Service name for logging
    #[serde(default = "default_service_name")]
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// AWS SDK configuration overrides.
///
/// Anything left unset is resolved from the Lambda environment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AwsConfig {
    /// AWS region
    pub region: Option<String>,
    /// Custom endpoint URL (for LocalStack, MinIO, etc.)
    pub endpoint_url: Option<String>,
    /// Force path-style S3 access (required for MinIO)
    #[serde(default)]
    pub force_path_style: bool,
}

/// Rekognition configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Face collection that enrolled faces are indexed into
    pub collection_id: Option<String>,
    /// Maximum number of faces indexed per image
    #[serde(default = "default_max_faces")]
    pub max_faces: i32,
    /// Rekognition quality filter (NONE, AUTO, LOW, MEDIUM, HIGH)
    #[serde(default = "default_quality_filter")]
    pub quality_filter: String,
}

/// DynamoDB configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// Table holding one item per enrolled person
    pub table_name: Option<String>,
}

/// What happens to each notification after it has been logged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMode {
    /// Log the notification and do nothing else
    #[default]
    LogOnly,
    /// Index the uploaded face and persist the enrollment
    Enroll,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessingConfig {
    #[serde(default)]
    pub mode: ProcessingMode,
    /// Report the invocation as failed when any record failed
    #[serde(default)]
    pub fail_on_record_error: bool,
}

// Default value functions
fn default_service_name() -> String {
    "image-processor".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_faces() -> i32 {
    1
}

fn default_quality_filter() -> String {
    "AUTO".to_string()
}

const QUALITY_FILTERS: [&str; 5] = ["NONE", "AUTO", "LOW", "MEDIUM", "HIGH"];

impl Config {
    /// Load configuration from config files and the environment
    pub fn load() -> Result<Self, ConfigurationError> {
        let builder = config::Config::builder()
            // Add config file if present
            .add_source(config::File::with_name("config/image-processor").required(false))
            .add_source(config::File::with_name("/etc/image-processor/config").required(false))
            // Override with environment variables
            // IMAGE_PROCESSOR__ANALYSIS__COLLECTION_ID -> analysis.collection_id
            .add_source(
                config::Environment::with_prefix("IMAGE_PROCESSOR")
                    .separator("__")
                    .try_parsing(true),
            )
            // Variables set by the deployment stack take precedence
            .set_override_option(
                "analysis.collection_id",
                std::env::var("AWS_REKOGNITION_COLLECTION").ok(),
            )?
            .set_override_option("store.table_name", std::env::var("PERSON_TABLE").ok())?;

        Self::from_builder(builder)
    }

    /// Build and validate configuration from an assembled source builder
    pub fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigurationError> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field requirements
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.analysis.max_faces < 1 {
            return Err(ConfigurationError::InvalidValue {
                key: "analysis.max_faces".to_string(),
                message: format!("must be at least 1, got {}", self.analysis.max_faces),
            });
        }

        if !QUALITY_FILTERS.contains(&self.analysis.quality_filter.to_uppercase().as_str()) {
            return Err(ConfigurationError::InvalidValue {
                key: "analysis.quality_filter".to_string(),
                message: format!(
                    "expected one of {}, got '{}'",
                    QUALITY_FILTERS.join(", "),
                    self.analysis.quality_filter
                ),
            });
        }

        if self.processing.mode == ProcessingMode::Enroll {
            if self.collection_id().is_none() {
                return Err(ConfigurationError::MissingRequired(
                    "analysis.collection_id (AWS_REKOGNITION_COLLECTION)".to_string(),
                ));
            }
            if self.table_name().is_none() {
                return Err(ConfigurationError::MissingRequired(
                    "store.table_name (PERSON_TABLE)".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Rekognition collection id, ignoring empty values
    pub fn collection_id(&self) -> Option<&str> {
        non_empty(self.analysis.collection_id.as_deref())
    }

    /// DynamoDB table name, ignoring empty values
    pub fn table_name(&self) -> Option<&str> {
        non_empty(self.store.table_name.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            collection_id: None,
            max_faces: default_max_faces(),
            quality_filter: default_quality_filter(),
        }
    }
}
