use menu_review_server::{config::AppConfig, ingest::IngestPipeline, mnd::MndApi, worker};
use sea_orm::Database;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().expect("Invalid configuration");

    menu_review_server::telemetry::init_telemetry("menu-review-worker", &config.telemetry)
        .expect("Failed to initialize telemetry");
    let mnd_config = config.mnd().expect("Worker needs the MND API");

    let (prometheus_layer, metric_handle) = axum_prometheus::PrometheusMetricLayer::pair();

    let metrics_port = config.metrics_port;
    tokio::spawn(async move {
        let app = axum::Router::new()
            .route(
                "/metrics",
                axum::routing::get(|| async move { metric_handle.render() }),
            )
            .layer(prometheus_layer);
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], metrics_port));
        tracing::info!("Metrics server listening on {}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
        axum::serve(listener, app).await.unwrap();
    });

    let db = Database::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    let redis_client = redis::Client::open(config.redis_url.clone()).expect("Invalid Redis URL");

    let api = MndApi::from_config(mnd_config).expect("Failed to build MND API client");

    menu_review_server::metrics::init_metrics(&db).await;

    tracing::info!("Starting ingestion worker against {}", mnd_config.base_url);
    worker::start_ingest_worker(redis_client, IngestPipeline::new(api, db)).await;

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutting down worker process"),
        Err(err) => tracing::error!("Unable to listen for shutdown signal: {}", err),
    }
}
