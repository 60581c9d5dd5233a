//! Image Processor
//!
//! Lambda function for the face enrollment pipeline. It is triggered by S3
//! upload notifications, logs every uploaded object and, when enrollment is
//! enabled, indexes the uploaded face in Rekognition and records the person
//! in DynamoDB.
//!
//! ## Architecture
//!
//! ```text
//! S3 Bucket                 Lambda                         AWS Services
//! ┌──────────────┐   event  ┌──────────────┐             ┌──────────────┐
//! │ ObjectCreated│─────────▶│ Handler      │             │ S3           │
//! └──────────────┘          └──────────────┘       ┌────▶│ (metadata)   │
//!                                  │               │     └──────────────┘
//!                                  ▼               │     ┌──────────────┐
//!                           ┌──────────────┐       ├────▶│ Rekognition  │
//!                           │ Dispatcher   │───────┤     │ (index_faces)│
//!                           └──────────────┘       │     └──────────────┘
//!                                  │               │     ┌──────────────┐
//!                                  ▼               └────▶│ DynamoDB     │
//!                           ┌──────────────┐             │ (put_item)   │
//!                           │ Service      │             └──────────────┘
//!                           │ Provider     │
//!                           └──────────────┘
//! ```
//!
//! The default `log_only` mode only logs; `enroll` mode runs the full
//! enrollment for each record.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod image_analyzer;
pub mod notification;
pub mod object_reader;
pub mod provider;
pub mod record_store;

pub use config::{Config, ProcessingMode};
pub use dispatcher::{
    BatchReport, Dispatcher, NotificationObserver, RecordOutcome, RecordStatus, TracingObserver,
};
pub use error::{ConfigurationError, DispatchError, ProcessingError};
pub use handler::handler;
pub use image_analyzer::{ImageAnalyzer, ImageSource, IndexedFace, RekognitionAnalyzer};
pub use notification::UploadNotification;
pub use object_reader::{ObjectReader, S3ObjectReader};
pub use provider::{AwsServiceProvider, ServiceProvider, Services};
pub use record_store::{DynamoRecordStore, EnrollmentRecord, RecordStore};
