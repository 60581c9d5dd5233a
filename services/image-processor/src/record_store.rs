use crate::error::ProcessingError;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_types::SdkConfig;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Metadata key that carries the enrolled person's id
pub const PERSON_ID_METADATA_KEY: &str = "person_id";

/// A person enrolled from an uploaded image
#[derive(Debug, Clone, PartialEq)]
pub struct EnrollmentRecord {
    /// Person the face belongs to
    pub person_id: String,
    /// Face id assigned by the analysis service
    pub face_id: String,
    /// Detection confidence
    pub confidence: Option<f32>,
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// Remaining object metadata, copied verbatim
    pub attributes: HashMap<String, String>,
}

impl EnrollmentRecord {
    /// Convert into a DynamoDB item
    pub fn to_item(&self) -> HashMap<String, AttributeValue> {
        let timestamp = self.created_at.to_rfc3339_opts(SecondsFormat::Secs, true);

        let mut item: HashMap<String, AttributeValue> = self
            .attributes
            .iter()
            .filter(|(key, _)| key.as_str() != PERSON_ID_METADATA_KEY)
            .map(|(key, value)| (key.clone(), AttributeValue::S(value.clone())))
            .collect();

        item.insert("PersonId".to_string(), AttributeValue::S(self.person_id.clone()));
        item.insert("FaceId".to_string(), AttributeValue::S(self.face_id.clone()));
        item.insert("CreatedAt".to_string(), AttributeValue::S(timestamp.clone()));
        item.insert("LastUpdatedAt".to_string(), AttributeValue::S(timestamp));
        if let Some(confidence) = self.confidence {
            item.insert(
                "Confidence".to_string(),
                AttributeValue::N(confidence.to_string()),
            );
        }

        item
    }
}

/// Structured record persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn put(&self, record: &EnrollmentRecord) -> Result<(), ProcessingError>;
}

/// DynamoDB-backed record store
pub struct DynamoRecordStore {
    client: DynamoDbClient,
    table_name: String,
}

impl DynamoRecordStore {
    pub fn new(sdk_config: &SdkConfig, table_name: &str) -> Self {
        Self {
            client: DynamoDbClient::new(sdk_config),
            table_name: table_name.to_string(),
        }
    }
}

#[async_trait]
impl RecordStore for DynamoRecordStore {
    #[instrument(skip(self, record), fields(table = %self.table_name, person_id = %record.person_id))]
    async fn put(&self, record: &EnrollmentRecord) -> Result<(), ProcessingError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(record.to_item()))
            .send()
            .await
            .map_err(|e| ProcessingError::Store(e.into_service_error().to_string()))?;

        debug!(face_id = %record.face_id, "Enrollment record saved");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn create_test_record() -> EnrollmentRecord {
        EnrollmentRecord {
            person_id: "p-42".to_string(),
            face_id: "f-0001".to_string(),
            confidence: Some(99.5),
            created_at: Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 45).unwrap(),
            attributes: HashMap::from([
                ("person_id".to_string(), "p-42".to_string()),
                ("department".to_string(), "assembly".to_string()),
            ]),
        }
    }

    #[test]
    fn test_to_item_core_attributes() {
        let item = create_test_record().to_item();

        assert_eq!(item.get("PersonId"), Some(&AttributeValue::S("p-42".to_string())));
        assert_eq!(item.get("FaceId"), Some(&AttributeValue::S("f-0001".to_string())));
        assert_eq!(
            item.get("CreatedAt"),
            Some(&AttributeValue::S("2024-01-15T10:30:45Z".to_string()))
        );
        assert_eq!(item.get("CreatedAt"), item.get("LastUpdatedAt"));
        assert_eq!(item.get("Confidence"), Some(&AttributeValue::N("99.5".to_string())));
    }

    #[test]
    fn test_to_item_copies_metadata_except_person_id() {
        let item = create_test_record().to_item();

        assert_eq!(
            item.get("department"),
            Some(&AttributeValue::S("assembly".to_string()))
        );
        assert!(!item.contains_key("person_id"));
        assert_eq!(item.len(), 6);
    }

    #[test]
    fn test_to_item_without_confidence() {
        let record = EnrollmentRecord {
            confidence: None,
            ..create_test_record()
        };

        assert!(!record.to_item().contains_key("Confidence"));
    }
}
