use crate::config::{ProcessingConfig, ProcessingMode};
use crate::error::{DispatchError, ProcessingError};
use crate::image_analyzer::ImageSource;
use crate::notification::UploadNotification;
use crate::provider::{ServiceProvider, Services};
use crate::record_store::{EnrollmentRecord, PERSON_ID_METADATA_KEY};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Receives one observability record per notification
pub trait NotificationObserver: Send + Sync {
    fn observe(&self, notification: &UploadNotification);
}

/// Emits each notification as a structured log event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl NotificationObserver for TracingObserver {
    fn observe(&self, notification: &UploadNotification) {
        info!(
            source = %notification.source,
            time = %notification.time,
            bucket = %notification.bucket,
            key = %notification.key,
            "Received upload notification"
        );
    }
}

/// Result of processing a single notification
#[derive(Debug, Clone, PartialEq)]
pub enum RecordStatus {
    /// Logged, nothing else to do
    Observed,
    /// Face indexed and enrollment persisted
    Enrolled { face_id: String },
    /// Processing failed, the batch moved on
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordOutcome {
    pub notification: UploadNotification,
    pub status: RecordStatus,
}

/// Per-record outcomes of one invocation, in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub outcomes: Vec<RecordOutcome>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, RecordStatus::Failed { .. }))
            .count()
    }
}

/// Dispatches a batch of upload notifications
pub struct Dispatcher<P> {
    provider: P,
    observer: Arc<dyn NotificationObserver>,
    config: ProcessingConfig,
}

impl<P: ServiceProvider> Dispatcher<P> {
    /// Create a dispatcher that logs through `tracing`
    pub fn new(provider: P, config: ProcessingConfig) -> Self {
        Self::with_observer(provider, Arc::new(TracingObserver), config)
    }

    pub fn with_observer(
        provider: P,
        observer: Arc<dyn NotificationObserver>,
        config: ProcessingConfig,
    ) -> Self {
        Self {
            provider,
            observer,
            config,
        }
    }

    /// Process one batch.
    ///
    /// Service resolution happens before any notification is observed; its
    /// failure aborts the batch. Record failures are collected in the report.
    #[instrument(skip(self, batch), fields(record_count = batch.len()))]
    pub async fn dispatch(
        &self,
        batch: &[UploadNotification],
    ) -> Result<BatchReport, DispatchError> {
        let services = self.provider.services().await?;

        let mut report = BatchReport::default();

        for notification in batch {
            self.observer.observe(notification);
            metrics::counter!("image_processor.records.observed").increment(1);

            let status = match self.config.mode {
                ProcessingMode::LogOnly => RecordStatus::Observed,
                ProcessingMode::Enroll => match enroll(&services, notification).await {
                    Ok(face_id) => {
                        metrics::counter!("image_processor.records.enrolled").increment(1);
                        RecordStatus::Enrolled { face_id }
                    }
                    Err(e) => {
                        error!(
                            error = %e,
                            bucket = %notification.bucket,
                            key = %notification.key,
                            "Failed to process record"
                        );
                        metrics::counter!("image_processor.records.failed").increment(1);
                        RecordStatus::Failed {
                            reason: e.to_string(),
                        }
                    }
                },
            };

            report.outcomes.push(RecordOutcome {
                notification: notification.clone(),
                status,
            });
        }

        let failed = report.failed();
        debug!(total = report.total(), failed, "Batch processed");

        if failed > 0 && self.config.fail_on_record_error {
            return Err(DispatchError::PartialFailure {
                failed,
                total: report.total(),
            });
        }

        Ok(report)
    }
}

/// Index the uploaded face and persist the enrollment, returning the face id
#[instrument(skip(services, notification), fields(bucket = %notification.bucket, key = %notification.key))]
async fn enroll(
    services: &Services,
    notification: &UploadNotification,
) -> Result<String, ProcessingError> {
    let metadata = services
        .objects
        .metadata(&notification.bucket, &notification.key)
        .await?;

    let person_id = metadata
        .get(PERSON_ID_METADATA_KEY)
        .cloned()
        .ok_or_else(|| ProcessingError::MissingPersonId {
            bucket: notification.bucket.clone(),
            key: notification.key.clone(),
        })?;

    let image = ImageSource::StoreObject {
        bucket: notification.bucket.clone(),
        key: notification.key.clone(),
    };
    let face = services.analyzer.index_face(&image, &person_id).await?;

    let record = EnrollmentRecord {
        person_id,
        face_id: face.face_id,
        confidence: face.confidence,
        created_at: Utc::now(),
        attributes: metadata,
    };
    services.store.put(&record).await?;

    info!(
        person_id = %record.person_id,
        face_id = %record.face_id,
        "Successfully enrolled person"
    );

    Ok(record.face_id)
}
