use thiserror::Error;

/// Errors raised while resolving configuration or AWS credentials.
///
/// These abort an invocation before any record is looked at.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("No AWS region could be resolved from the environment")]
    MissingRegion,

    #[error("No AWS credentials provider could be resolved from the environment")]
    MissingCredentials,
}

impl From<config::ConfigError> for ConfigurationError {
    fn from(err: config::ConfigError) -> Self {
        ConfigurationError::Load(err.to_string())
    }
}

/// Errors local to a single upload notification
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("Object store request failed: {0}")]
    ObjectStore(String),

    #[error("Object s3://{bucket}/{key} has no 'person_id' metadata")]
    MissingPersonId { bucket: String, key: String },

    #[error("Image analysis request failed: {0}")]
    Analysis(String),

    #[error("No face detected or quality too low")]
    NoFaceDetected,

    #[error("Record store write failed: {0}")]
    Store(String),
}

/// Errors returned to the host platform for a whole invocation
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("{failed} of {total} records failed to process")]
    PartialFailure { failed: usize, total: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_is_transparent() {
        let err = DispatchError::from(ConfigurationError::MissingRegion);
        assert_eq!(
            err.to_string(),
            "No AWS region could be resolved from the environment"
        );
    }

    #[test]
    fn test_partial_failure_message() {
        let err = DispatchError::PartialFailure { failed: 2, total: 5 };
        assert_eq!(err.to_string(), "2 of 5 records failed to process");
    }
}
