use crate::config::AnalysisConfig;
use crate::error::ProcessingError;
use async_trait::async_trait;
use aws_sdk_rekognition::primitives::Blob;
use aws_sdk_rekognition::types::{Image, QualityFilter, S3Object};
use aws_sdk_rekognition::Client as RekognitionClient;
use aws_types::SdkConfig;
use tracing::{info, instrument, warn};

/// Where the analysis service reads the image from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// An object the service reads from the store itself
    StoreObject { bucket: String, key: String },
    /// Raw encoded image bytes
    Bytes(Vec<u8>),
}

impl ImageSource {
    fn to_rekognition_image(&self) -> Image {
        match self {
            ImageSource::StoreObject { bucket, key } => Image::builder()
                .s3_object(S3Object::builder().bucket(bucket).name(key).build())
                .build(),
            ImageSource::Bytes(bytes) => Image::builder().bytes(Blob::new(bytes.clone())).build(),
        }
    }
}

/// A face added to the collection
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedFace {
    pub face_id: String,
    pub confidence: Option<f32>,
}

/// Image analysis capability
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageAnalyzer: Send + Sync {
    /// Detect the most prominent face and index it under `external_id`
    async fn index_face(
        &self,
        image: &ImageSource,
        external_id: &str,
    ) -> Result<IndexedFace, ProcessingError>;
}

/// Rekognition-backed analyzer
pub struct RekognitionAnalyzer {
    client: RekognitionClient,
    collection_id: String,
    max_faces: i32,
    quality_filter: QualityFilter,
}

impl RekognitionAnalyzer {
    pub fn new(sdk_config: &SdkConfig, collection_id: &str, config: &AnalysisConfig) -> Self {
        Self {
            client: RekognitionClient::new(sdk_config),
            collection_id: collection_id.to_string(),
            max_faces: config.max_faces,
            quality_filter: QualityFilter::from(config.quality_filter.to_uppercase().as_str()),
        }
    }
}

#[async_trait]
impl ImageAnalyzer for RekognitionAnalyzer {
    #[instrument(skip(self, image), fields(collection_id = %self.collection_id))]
    async fn index_face(
        &self,
        image: &ImageSource,
        external_id: &str,
    ) -> Result<IndexedFace, ProcessingError> {
        let response = self
            .client
            .index_faces()
            .collection_id(&self.collection_id)
            .image(image.to_rekognition_image())
            .external_image_id(external_id)
            .max_faces(self.max_faces)
            .quality_filter(self.quality_filter.clone())
            .send()
            .await
            .map_err(|e| {
                let err = e.into_service_error();
                if err.is_invalid_parameter_exception() {
                    warn!(error = %err, "Rekognition rejected the image");
                }
                ProcessingError::Analysis(err.to_string())
            })?;

        let face_records = response.face_records();
        info!(face_count = face_records.len(), "Rekognition indexed faces");

        let face = face_records
            .first()
            .and_then(|record| record.face())
            .ok_or(ProcessingError::NoFaceDetected)?;

        let face_id = face
            .face_id()
            .ok_or_else(|| ProcessingError::Analysis("No FaceId in face data".to_string()))?;

        Ok(IndexedFace {
            face_id: face_id.to_string(),
            confidence: face.confidence(),
        })
    }
}
