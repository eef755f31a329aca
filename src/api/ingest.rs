use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use redis::AsyncCommands;
use serde_json::json;

use super::error_response;
use crate::worker::{IngestJob, INGEST_QUEUE};

// POST /internal/ingest
pub async fn enqueue_ingest(Extension(redis_client): Extension<redis::Client>) -> Response {
    let mut conn = match redis_client.get_multiplexed_async_connection().await {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to get redis conn: {}", e);
            return error_response(StatusCode::SERVICE_UNAVAILABLE, "Queue unavailable");
        }
    };

    let job = IngestJob::now();
    let payload = match serde_json::to_string(&job) {
        Ok(p) => p,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    };

    match conn.rpush::<_, _, ()>(INGEST_QUEUE, payload).await {
        Ok(()) => {
            tracing::info!("Enqueued ingestion job to {}", INGEST_QUEUE);
            (StatusCode::ACCEPTED, Json(json!({"queued": job}))).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to enqueue ingestion job: {}", e);
            error_response(StatusCode::SERVICE_UNAVAILABLE, "Queue unavailable")
        }
    }
}
