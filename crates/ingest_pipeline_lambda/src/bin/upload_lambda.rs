use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_s3::primitives::ByteStream;
use chrono::Utc;
use ingest_pipeline_core::auth::UploadCredentials;
use ingest_pipeline_core::contract::UploadRecord;
use ingest_pipeline_lambda::adapters::metadata_table::MetadataTable;
use ingest_pipeline_lambda::adapters::object_store::ObjectStore;
use ingest_pipeline_lambda::handlers::upload::{
    handle_upload_event, ApiGatewayResponse, UploadHandlerConfig, DEFAULT_KEY_PREFIX,
};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

struct S3ObjectStore {
    s3_client: aws_sdk_s3::Client,
}

impl ObjectStore for S3ObjectStore {
    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, String> {
        let bucket = bucket.to_string();
        let object_key = key.to_string();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let response = client
                    .get_object()
                    .bucket(bucket)
                    .key(object_key)
                    .send()
                    .await
                    .map_err(|error| format!("failed to fetch object from s3: {error}"))?;
                let body = response
                    .body
                    .collect()
                    .await
                    .map_err(|error| format!("failed to read object body from s3: {error}"))?;
                Ok(body.into_bytes().to_vec())
            })
        })
    }

    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), String> {
        let bucket = bucket.to_string();
        let object_key = key.to_string();
        let body_bytes = body.to_vec();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_object()
                    .bucket(bucket)
                    .key(object_key)
                    .body(ByteStream::from(body_bytes))
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to write object to s3: {error}"))
            })
        })
    }
}

struct DynamoMetadataTable {
    table_name: String,
    dynamodb_client: aws_sdk_dynamodb::Client,
}

impl MetadataTable for DynamoMetadataTable {
    fn put_upload_record(&self, record: &UploadRecord) -> Result<(), String> {
        let table_name = self.table_name.clone();
        let filename = record.filename.clone();
        let arrival_time = record.arrival_time.clone();
        let client = self.dynamodb_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_item()
                    .table_name(table_name)
                    .item("filename", AttributeValue::S(filename))
                    .item("arrival_time", AttributeValue::S(arrival_time))
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to write metadata record: {error}"))
            })
        })
    }
}

async fn handle_request(event: LambdaEvent<Value>) -> Result<ApiGatewayResponse, Error> {
    let bucket =
        std::env::var("USER_BUCKET").map_err(|_| Error::from("USER_BUCKET must be configured"))?;
    let table_name = std::env::var("METADATA_TABLE")
        .map_err(|_| Error::from("METADATA_TABLE must be configured"))?;
    let credentials = UploadCredentials {
        identity: std::env::var("UPLOAD_IDENTITY")
            .map_err(|_| Error::from("UPLOAD_IDENTITY must be configured"))?,
        secret: std::env::var("UPLOAD_SECRET")
            .map_err(|_| Error::from("UPLOAD_SECRET must be configured"))?,
    };
    let key_prefix =
        std::env::var("UPLOAD_KEY_PREFIX").unwrap_or_else(|_| DEFAULT_KEY_PREFIX.to_string());

    let config = UploadHandlerConfig {
        bucket,
        key_prefix,
        credentials,
        arrival_time: format!("{:.6}", Utc::now().timestamp_micros() as f64 / 1_000_000.0),
    };

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let object_store = S3ObjectStore {
        s3_client: aws_sdk_s3::Client::new(&aws_config),
    };
    let metadata_table = DynamoMetadataTable {
        table_name,
        dynamodb_client: aws_sdk_dynamodb::Client::new(&aws_config),
    };

    Ok(handle_upload_event(
        &event.payload,
        &config,
        &object_store,
        &metadata_table,
    ))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
