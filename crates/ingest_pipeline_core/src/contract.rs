use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Location of a source object named by a queue notification. Constructed
/// transiently per message and discarded after use.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectReference {
    pub bucket: String,
    pub key: String,
}

/// Metadata row written for each accepted upload. Keyed by filename in the
/// table, so a later upload with the same filename overwrites the earlier
/// record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadRecord {
    pub filename: String,
    pub arrival_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeError {
    message: String,
}

impl EnvelopeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for EnvelopeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EnvelopeError {}

#[derive(Debug, Clone, Deserialize)]
struct NotificationRecord {
    s3: RecordEntity,
}

#[derive(Debug, Clone, Deserialize)]
struct RecordEntity {
    bucket: RecordBucket,
    object: RecordObject,
}

#[derive(Debug, Clone, Deserialize)]
struct RecordBucket {
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RecordObject {
    key: String,
}

/// Resolves a queue message body to the object it announces.
///
/// The body is doubly JSON-encoded: the outer envelope carries a `Message`
/// string which is itself JSON containing a `Records` list. Only the first
/// record is consulted; fan-out notifications with additional records are
/// not supported.
pub fn extract_object_reference(body: &str) -> Result<ObjectReference, EnvelopeError> {
    let envelope: Value = serde_json::from_str(body)
        .map_err(|error| EnvelopeError::new(format!("notification body is not valid JSON: {error}")))?;

    let message = envelope
        .get("Message")
        .and_then(Value::as_str)
        .ok_or_else(|| EnvelopeError::new("notification envelope is missing the Message field"))?;

    let notification: Value = serde_json::from_str(message).map_err(|error| {
        EnvelopeError::new(format!("notification Message is not valid JSON: {error}"))
    })?;

    let records = notification
        .get("Records")
        .and_then(Value::as_array)
        .ok_or_else(|| EnvelopeError::new("notification is missing the Records field"))?;

    let first = records
        .first()
        .ok_or_else(|| EnvelopeError::new("notification Records list is empty"))?;

    let record: NotificationRecord = serde_json::from_value(first.clone())
        .map_err(|error| EnvelopeError::new(format!("notification record is malformed: {error}")))?;

    Ok(ObjectReference {
        bucket: record.s3.bucket.name,
        key: record.s3.object.key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn notification_body(bucket: &str, key: &str) -> String {
        let inner = json!({
            "Records": [
                {"s3": {"bucket": {"name": bucket}, "object": {"key": key}}}
            ]
        });
        json!({"Message": inner.to_string()}).to_string()
    }

    #[test]
    fn extracts_bucket_and_key_from_well_formed_envelope() {
        let body = notification_body("landing-bucket", "reports/daily.csv");

        let reference = extract_object_reference(&body).expect("envelope should parse");
        assert_eq!(reference.bucket, "landing-bucket");
        assert_eq!(reference.key, "reports/daily.csv");
    }

    #[test]
    fn consults_only_the_first_record() {
        let inner = json!({
            "Records": [
                {"s3": {"bucket": {"name": "first"}, "object": {"key": "first.csv"}}},
                {"s3": {"bucket": {"name": "second"}, "object": {"key": "second.csv"}}}
            ]
        });
        let body = json!({"Message": inner.to_string()}).to_string();

        let reference = extract_object_reference(&body).expect("envelope should parse");
        assert_eq!(reference.bucket, "first");
        assert_eq!(reference.key, "first.csv");
    }

    #[test]
    fn rejects_non_json_body() {
        let error = extract_object_reference("not json").expect_err("body should fail");
        assert!(error.message().contains("not valid JSON"));
    }

    #[test]
    fn rejects_envelope_without_message_field() {
        let body = json!({"Type": "Notification"}).to_string();

        let error = extract_object_reference(&body).expect_err("envelope should fail");
        assert_eq!(
            error.message(),
            "notification envelope is missing the Message field"
        );
    }

    #[test]
    fn rejects_message_without_records_field() {
        let body = json!({"Message": "{\"Event\":\"s3:TestEvent\"}"}).to_string();

        let error = extract_object_reference(&body).expect_err("envelope should fail");
        assert_eq!(error.message(), "notification is missing the Records field");
    }

    #[test]
    fn rejects_empty_records_list() {
        let body = json!({"Message": "{\"Records\":[]}"}).to_string();

        let error = extract_object_reference(&body).expect_err("envelope should fail");
        assert_eq!(error.message(), "notification Records list is empty");
    }

    #[test]
    fn rejects_record_without_object_details() {
        let inner = json!({"Records": [{"s3": {"bucket": {"name": "b"}}}]});
        let body = json!({"Message": inner.to_string()}).to_string();

        let error = extract_object_reference(&body).expect_err("envelope should fail");
        assert!(error.message().contains("notification record is malformed"));
    }
}
