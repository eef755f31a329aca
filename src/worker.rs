use std::sync::Arc;

use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use crate::ingest::IngestPipeline;

pub const INGEST_QUEUE: &str = "ingest_queue";

/// Payload pushed onto [`INGEST_QUEUE`] by whatever schedules ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestJob {
    pub requested_at: DateTime<Utc>,
}

impl IngestJob {
    pub fn now() -> Self {
        Self {
            requested_at: Utc::now(),
        }
    }
}

// Queue Monitoring
pub async fn start_queue_monitor(redis_client: redis::Client) {
    let redis_client = Arc::new(redis_client);

    tokio::spawn(async move {
        tracing::info!("Queue Monitor started");
        loop {
            let mut conn = match redis_client.get_multiplexed_async_connection().await {
                Ok(c) => c,
                Err(e) => {
                    tracing::error!("Queue Monitor: Failed to get redis conn: {}", e);
                    tokio::time::sleep(tokio::time::Duration::from_secs(15)).await;
                    continue;
                }
            };

            let depth: redis::RedisResult<u64> = conn.llen(INGEST_QUEUE).await;
            match depth {
                Ok(len) => {
                    metrics::gauge!("menu_review_queue_depth", "queue" => INGEST_QUEUE)
                        .set(len as f64)
                }
                Err(e) => tracing::error!("Failed to get {} len: {}", INGEST_QUEUE, e),
            }

            tokio::time::sleep(tokio::time::Duration::from_secs(15)).await;
        }
    });
}

/// Runs the pipeline once per queued job. A single consumer keeps runs of
/// this process from overlapping.
pub async fn start_ingest_worker(
    redis_client: redis::Client,
    pipeline: IngestPipeline,
) -> tokio::task::JoinHandle<()> {
    start_queue_monitor(redis_client.clone()).await;

    let redis_client = Arc::new(redis_client);
    let pipeline = Arc::new(pipeline);

    tokio::spawn(async move {
        tracing::info!("Ingest worker started");
        loop {
            let mut conn = match redis_client.get_multiplexed_async_connection().await {
                Ok(c) => c,
                Err(e) => {
                    tracing::error!("Ingest worker: Failed to get redis conn: {}", e);
                    tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;
                    continue;
                }
            };

            let result: redis::RedisResult<(String, String)> =
                conn.blpop(INGEST_QUEUE, 0.0).await;

            match result {
                Ok((_key, payload)) => {
                    let job: IngestJob = match serde_json::from_str(&payload) {
                        Ok(job) => job,
                        Err(e) => {
                            tracing::error!("Ingest worker: Bad payload {:?}: {}", payload, e);
                            continue;
                        }
                    };
                    process_job(&pipeline, job).await;
                }
                Err(e) => {
                    tracing::error!("Ingest worker: Redis error: {}", e);
                    tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;
                }
            }
        }
    })
}

async fn process_job(pipeline: &IngestPipeline, job: IngestJob) {
    let span = tracing::info_span!(
        "process_ingest_job",
        "otel.name" = "process_ingest_job",
        requested_at = %job.requested_at
    );

    async move {
        tracing::info!("Dequeued ingestion job from {}", INGEST_QUEUE);
        // Failures are already logged and counted by the pipeline; the next
        // job simply retries the whole run.
        if let Ok(report) = pipeline.run().await {
            metrics::gauge!("menu_review_menus_total")
                .increment(report.menus.created as f64);
        }
    }
    .instrument(span)
    .await
}
