use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde_json::json;

use ingest_pipeline_core::columnar::encode_parquet;
use ingest_pipeline_core::contract::{extract_object_reference, ObjectReference};
use ingest_pipeline_core::storage_keys::destination_object_key;
use ingest_pipeline_core::tabular::parse_csv;

use crate::adapters::object_store::ObjectStore;
use crate::adapters::queue::QueueSource;

pub const DEFAULT_MAX_CYCLES: usize = 5;
pub const DEFAULT_CYCLE_PAUSE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    pub destination_bucket: String,
    /// Number of poll-process-acknowledge cycles per run. The poller is a
    /// batch-bounded run, not a persistent service.
    pub max_cycles: usize,
    pub cycle_pause: Duration,
}

impl PollerConfig {
    pub fn new(destination_bucket: impl Into<String>) -> Self {
        Self {
            destination_bucket: destination_bucket.into(),
            max_cycles: DEFAULT_MAX_CYCLES,
            cycle_pause: DEFAULT_CYCLE_PAUSE,
        }
    }
}

/// Result of handling one notification message. `Skipped` means the message
/// shape carried nothing to do; `Failed` means a transformation or storage
/// step lost data. Both are acknowledged by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    Completed {
        source: ObjectReference,
        destination_key: String,
        rows: usize,
    },
    Skipped {
        reason: String,
    },
    Failed {
        reason: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollerSummary {
    pub cycles_completed: usize,
    pub objects_transformed: usize,
    pub messages_skipped: usize,
    pub messages_failed: usize,
    pub empty_receives: usize,
}

/// Resolves one notification body to its source object, re-encodes the CSV
/// payload as Parquet, and stores the buffer under the derived key in the
/// destination bucket. Never panics; every failure is reported through the
/// outcome.
pub fn process_notification(
    body: &str,
    config: &PollerConfig,
    object_store: &impl ObjectStore,
) -> ProcessOutcome {
    let source = match extract_object_reference(body) {
        Ok(reference) => reference,
        Err(error) => {
            return ProcessOutcome::Skipped {
                reason: error.message().to_string(),
            }
        }
    };

    let csv_bytes = match object_store.get_object(&source.bucket, &source.key) {
        Ok(bytes) => bytes,
        Err(error) => {
            return ProcessOutcome::Failed {
                reason: format!("failed to fetch source object: {error}"),
            }
        }
    };

    let table = match parse_csv(&csv_bytes) {
        Ok(table) => table,
        Err(error) => {
            return ProcessOutcome::Failed {
                reason: format!("failed to parse tabular payload: {error}"),
            }
        }
    };

    let buffer = match encode_parquet(&table) {
        Ok(buffer) => buffer,
        Err(error) => {
            return ProcessOutcome::Failed {
                reason: format!("failed to encode columnar payload: {error}"),
            }
        }
    };

    let destination_key = destination_object_key(&source.key);
    if let Err(error) = object_store.put_object(&config.destination_bucket, &destination_key, &buffer)
    {
        return ProcessOutcome::Failed {
            reason: format!("failed to store transformed object: {error}"),
        };
    }

    ProcessOutcome::Completed {
        rows: table.row_count(),
        source,
        destination_key,
    }
}

/// Drains `config.max_cycles` poll-process-acknowledge cycles, pausing
/// between cycles, and returns per-outcome counts. Messages are acknowledged
/// after processing regardless of outcome; redelivery of lost messages is
/// governed solely by the queue's visibility timeout. Nothing here is fatal.
///
/// The shutdown flag ends the run early between cycles; within a cycle,
/// blocking calls run to completion.
pub fn run_poller(
    config: &PollerConfig,
    queue: &impl QueueSource,
    object_store: &impl ObjectStore,
    shutdown: &AtomicBool,
) -> PollerSummary {
    let mut summary = PollerSummary::default();

    for cycle in 0..config.max_cycles {
        if shutdown.load(Ordering::SeqCst) {
            log_poller_info(
                "shutdown_requested",
                json!({ "cycles_completed": summary.cycles_completed }),
            );
            break;
        }

        match queue.receive_one() {
            Err(error) => {
                log_poller_error("receive_failed", json!({ "cycle": cycle, "error": error }));
            }
            Ok(None) => {
                summary.empty_receives += 1;
                log_poller_info("queue_empty", json!({ "cycle": cycle }));
            }
            Ok(Some(message)) => {
                match process_notification(&message.body, config, object_store) {
                    ProcessOutcome::Completed {
                        source,
                        destination_key,
                        rows,
                    } => {
                        summary.objects_transformed += 1;
                        log_poller_info(
                            "object_transformed",
                            json!({
                                "cycle": cycle,
                                "source_bucket": source.bucket,
                                "source_key": source.key,
                                "destination_bucket": config.destination_bucket,
                                "destination_key": destination_key,
                                "rows": rows,
                            }),
                        );
                    }
                    ProcessOutcome::Skipped { reason } => {
                        summary.messages_skipped += 1;
                        log_poller_warn(
                            "message_skipped",
                            json!({ "cycle": cycle, "reason": reason }),
                        );
                    }
                    ProcessOutcome::Failed { reason } => {
                        summary.messages_failed += 1;
                        log_poller_error(
                            "message_failed",
                            json!({ "cycle": cycle, "reason": reason }),
                        );
                    }
                }

                // Acknowledged regardless of outcome; a failed message is
                // not redelivered once removed.
                if let Err(error) = queue.acknowledge(&message.receipt_handle) {
                    log_poller_error(
                        "acknowledge_failed",
                        json!({ "cycle": cycle, "error": error }),
                    );
                }
            }
        }

        summary.cycles_completed += 1;
        if cycle + 1 < config.max_cycles && !config.cycle_pause.is_zero() {
            std::thread::sleep(config.cycle_pause);
        }
    }

    log_poller_info(
        "poller_completed",
        json!({
            "cycles_completed": summary.cycles_completed,
            "objects_transformed": summary.objects_transformed,
            "messages_skipped": summary.messages_skipped,
            "messages_failed": summary.messages_failed,
            "empty_receives": summary.empty_receives,
        }),
    );

    summary
}

fn log_poller_info(event: &str, details: serde_json::Value) {
    eprintln!(
        "{}",
        json!({
            "component": "ingestion_poller",
            "event": event,
            "details": details,
        })
    );
}

fn log_poller_warn(event: &str, details: serde_json::Value) {
    eprintln!(
        "{}",
        json!({
            "component": "ingestion_poller",
            "level": "warn",
            "event": event,
            "details": details,
        })
    );
}

fn log_poller_error(event: &str, details: serde_json::Value) {
    eprintln!(
        "{}",
        json!({
            "component": "ingestion_poller",
            "level": "error",
            "event": event,
            "details": details,
        })
    );
}
