use crate::dispatcher::Dispatcher;
use crate::notification::UploadNotification;
use crate::provider::ServiceProvider;
use aws_lambda_events::event::s3::S3Event;
use lambda_runtime::{Error, LambdaEvent};
use tracing::{info, instrument};

/// Lambda entry point for S3 upload notifications
#[instrument(skip_all, fields(request_id = %event.context.request_id))]
pub async fn handler<P: ServiceProvider>(
    dispatcher: &Dispatcher<P>,
    event: LambdaEvent<S3Event>,
) -> Result<(), Error> {
    let notifications = UploadNotification::from_s3_event(&event.payload);

    info!(
        record_count = notifications.len(),
        "Processing S3 records"
    );

    let report = dispatcher.dispatch(&notifications).await?;

    info!(
        total = report.total(),
        failed = report.failed(),
        "Processing complete"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProcessingConfig;
    use crate::error::ConfigurationError;
    use crate::image_analyzer::MockImageAnalyzer;
    use crate::notification::fixtures::{s3_event, s3_record};
    use crate::object_reader::MockObjectReader;
    use crate::provider::{MockServiceProvider, Services};
    use crate::record_store::MockRecordStore;
    use lambda_runtime::Context;
    use std::sync::Arc;

    fn lambda_event(event: S3Event) -> LambdaEvent<S3Event> {
        LambdaEvent::new(event, Context::default())
    }

    #[tokio::test]
    async fn test_handler_succeeds_for_s3_event() {
        let mut provider = MockServiceProvider::new();
        provider.expect_services().times(1).returning(|| {
            Ok(Services {
                objects: Arc::new(MockObjectReader::new()),
                analyzer: Arc::new(MockImageAnalyzer::new()),
                store: Arc::new(MockRecordStore::new()),
            })
        });
        let dispatcher = Dispatcher::new(provider, ProcessingConfig::default());

        let event = s3_event(vec![
            s3_record("2024-01-01T00:00:00Z", "photos", "img1.jpg"),
            s3_record("2024-01-01T00:00:05Z", "avatars", "img2.png"),
        ]);

        tokio_test::assert_ok!(handler(&dispatcher, lambda_event(event)).await);
    }

    #[tokio::test]
    async fn test_handler_surfaces_configuration_error() {
        let mut provider = MockServiceProvider::new();
        provider
            .expect_services()
            .times(1)
            .returning(|| Err(ConfigurationError::MissingCredentials));
        let dispatcher = Dispatcher::new(provider, ProcessingConfig::default());

        let event = s3_event(vec![s3_record("2024-01-01T00:00:00Z", "photos", "img1.jpg")]);

        let err = handler(&dispatcher, lambda_event(event)).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            ConfigurationError::MissingCredentials.to_string()
        );
    }
}
