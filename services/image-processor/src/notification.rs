use aws_lambda_events::event::s3::{S3Event, S3EventRecord};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

/// A single object upload reported by the storage event mechanism
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadNotification {
    /// Event source identifier (e.g. `aws:s3`)
    pub source: String,
    /// Event time in RFC 3339
    pub time: String,
    /// Bucket the object was written to
    pub bucket: String,
    /// Object key, exactly as delivered
    pub key: String,
}

impl UploadNotification {
    /// Builds the notifications carried by an S3 event, in record order
    pub fn from_s3_event(event: &S3Event) -> Vec<Self> {
        event.records.iter().map(Self::from).collect()
    }
}

impl From<&S3EventRecord> for UploadNotification {
    fn from(record: &S3EventRecord) -> Self {
        Self {
            source: record.event_source.clone().unwrap_or_default(),
            time: record
                .event_time
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
            bucket: record.s3.bucket.name.clone().unwrap_or_default(),
            key: record.s3.object.key.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use aws_lambda_events::event::s3::S3Event;
    use serde_json::json;

    /// A record shaped like the ones S3 delivers for `ObjectCreated:Put`
    pub fn s3_record(time: &str, bucket: &str, key: &str) -> serde_json::Value {
        json!({
            "eventVersion": "2.1",
            "eventSource": "aws:s3",
            "awsRegion": "us-east-1",
            "eventTime": time,
            "eventName": "ObjectCreated:Put",
            "userIdentity": { "principalId": "EXAMPLE" },
            "requestParameters": { "sourceIPAddress": "127.0.0.1" },
            "responseElements": {
                "x-amz-request-id": "EXAMPLE123456789",
                "x-amz-id-2": "EXAMPLE123/5678abcdefghijklambdaisawesome/mnopqrstuvwxyzABCDEFGH"
            },
            "s3": {
                "s3SchemaVersion": "1.0",
                "configurationId": "testConfigRule",
                "bucket": {
                    "name": bucket,
                    "ownerIdentity": { "principalId": "EXAMPLE" },
                    "arn": format!("arn:aws:s3:::{bucket}")
                },
                "object": {
                    "key": key,
                    "size": 1024,
                    "eTag": "0123456789abcdef0123456789abcdef",
                    "sequencer": "0A1B2C3D4E5F678901"
                }
            }
        })
    }

    pub fn s3_event(records: Vec<serde_json::Value>) -> S3Event {
        serde_json::from_value(json!({ "Records": records })).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{s3_event, s3_record};
    use super::*;

    #[test]
    fn test_from_s3_event_single_record() {
        let event = s3_event(vec![s3_record(
            "2024-01-01T00:00:00Z",
            "photos",
            "img1.jpg",
        )]);

        let notifications = UploadNotification::from_s3_event(&event);

        assert_eq!(
            notifications,
            vec![UploadNotification {
                source: "aws:s3".to_string(),
                time: "2024-01-01T00:00:00Z".to_string(),
                bucket: "photos".to_string(),
                key: "img1.jpg".to_string(),
            }]
        );
    }

    #[test]
    fn test_from_s3_event_preserves_order() {
        let event = s3_event(vec![
            s3_record("2024-01-01T00:00:00Z", "photos", "a.jpg"),
            s3_record("2024-01-01T00:00:01Z", "avatars", "b.png"),
            s3_record("2024-01-01T00:00:02Z", "photos", "c.jpg"),
        ]);

        let keys: Vec<_> = UploadNotification::from_s3_event(&event)
            .into_iter()
            .map(|n| (n.bucket, n.key))
            .collect();

        assert_eq!(
            keys,
            vec![
                ("photos".to_string(), "a.jpg".to_string()),
                ("avatars".to_string(), "b.png".to_string()),
                ("photos".to_string(), "c.jpg".to_string()),
            ]
        );
    }

    #[test]
    fn test_time_keeps_milliseconds() {
        let event = s3_event(vec![s3_record(
            "2024-03-05T12:30:45.123Z",
            "photos",
            "img.jpg",
        )]);

        let notifications = UploadNotification::from_s3_event(&event);
        assert_eq!(notifications[0].time, "2024-03-05T12:30:45.123Z");
    }

    #[test]
    fn test_key_is_not_url_decoded() {
        let event = s3_event(vec![s3_record(
            "2024-01-01T00:00:00Z",
            "photos",
            "enrollments/jane+doe.jpg",
        )]);

        let notifications = UploadNotification::from_s3_event(&event);
        assert_eq!(notifications[0].key, "enrollments/jane+doe.jpg");
    }

    #[test]
    fn test_empty_event() {
        let event = s3_event(vec![]);
        assert!(UploadNotification::from_s3_event(&event).is_empty());
    }
}
