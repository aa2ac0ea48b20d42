use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use aws_sdk_s3::primitives::ByteStream;
use ingest_pipeline_lambda::adapters::object_store::ObjectStore;
use ingest_pipeline_lambda::adapters::queue::{
    QueueMessage, QueueSource, RECEIVE_VISIBILITY_TIMEOUT_SECS, RECEIVE_WAIT_TIME_SECS,
};
use ingest_pipeline_lambda::handlers::poller::{run_poller, PollerConfig};
type Error = Box<dyn std::error::Error + Send + Sync>;

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

struct SqsQueueSource {
    queue_url: String,
    sqs_client: aws_sdk_sqs::Client,
}

impl QueueSource for SqsQueueSource {
    fn receive_one(&self) -> Result<Option<QueueMessage>, String> {
        let queue_url = self.queue_url.clone();
        let client = self.sqs_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let response = client
                    .receive_message()
                    .queue_url(queue_url)
                    .max_number_of_messages(1)
                    .visibility_timeout(RECEIVE_VISIBILITY_TIMEOUT_SECS)
                    .wait_time_seconds(RECEIVE_WAIT_TIME_SECS)
                    .send()
                    .await
                    .map_err(|error| format!("failed to receive from queue: {error}"))?;

                let Some(message) = response.messages().first() else {
                    return Ok(None);
                };
                let receipt_handle = message
                    .receipt_handle()
                    .ok_or_else(|| "received message without a receipt handle".to_string())?
                    .to_string();

                Ok(Some(QueueMessage {
                    body: message.body().unwrap_or_default().to_string(),
                    receipt_handle,
                }))
            })
        })
    }

    fn acknowledge(&self, receipt_handle: &str) -> Result<(), String> {
        let queue_url = self.queue_url.clone();
        let receipt_handle = receipt_handle.to_string();
        let client = self.sqs_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .delete_message()
                    .queue_url(queue_url)
                    .receipt_handle(receipt_handle)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to delete message from queue: {error}"))
            })
        })
    }
}

fn poller_config_from_env() -> Result<PollerConfig, Error> {
    let destination_bucket = std::env::var("DESTINATION_BUCKET")
        .map_err(|_| Error::from("DESTINATION_BUCKET must be configured"))?;

    let mut config = PollerConfig::new(destination_bucket);
    if let Ok(value) = std::env::var("MAX_POLL_CYCLES") {
        config.max_cycles = value
            .parse()
            .map_err(|_| Error::from("MAX_POLL_CYCLES must be an unsigned integer"))?;
    }
    if let Ok(value) = std::env::var("POLL_PAUSE_SECS") {
        let seconds: u64 = value
            .parse()
            .map_err(|_| Error::from("POLL_PAUSE_SECS must be an unsigned integer"))?;
        config.cycle_pause = Duration::from_secs(seconds);
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let queue_url = std::env::var("INGEST_QUEUE_URL")
        .map_err(|_| Error::from("INGEST_QUEUE_URL must be configured"))?;
    let config = poller_config_from_env()?;

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let object_store = S3ObjectStore {
        s3_client: aws_sdk_s3::Client::new(&aws_config),
    };
    let queue = SqsQueueSource {
        queue_url,
        sqs_client: aws_sdk_sqs::Client::new(&aws_config),
    };

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown_signal.store(true, Ordering::SeqCst);
        }
    });

    let summary =
        tokio::task::block_in_place(|| run_poller(&config, &queue, &object_store, &shutdown));

    if summary.messages_failed > 0 {
        return Err(Error::from(format!(
            "{} message(s) failed during processing",
            summary.messages_failed
        )));
    }

    Ok(())
}
