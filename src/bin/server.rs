use axum::{routing::get, Router};
use menu_review_server::{api, config::AppConfig, jwt::JwtKeys, migrator};
use sea_orm::{Database, DatabaseConnection};
use std::net::SocketAddr;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().expect("Invalid configuration");

    menu_review_server::telemetry::init_telemetry("menu-review-server", &config.telemetry)
        .expect("Failed to initialize telemetry");

    let (prometheus_layer, metric_handle) = axum_prometheus::PrometheusMetricLayer::pair();

    let db = Database::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    let redis_client = redis::Client::open(config.redis_url.clone()).expect("Invalid Redis URL");

    use sea_orm_migration::MigratorTrait;
    migrator::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    menu_review_server::metrics::init_metrics(&db).await;

    let keys = JwtKeys::new(&config.jwt);
    let app = app(db, redis_client, keys, prometheus_layer, metric_handle);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.app_port));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

fn app(
    db: DatabaseConnection,
    redis_client: redis::Client,
    keys: JwtKeys,
    prometheus_layer: axum_prometheus::PrometheusMetricLayer<'static>,
    metric_handle: metrics_exporter_prometheus::PrometheusHandle,
) -> Router {
    api::router(db, redis_client, keys)
        .layer(prometheus_layer)
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<axum::body::Body>| {
                    let matched_path = request
                        .extensions()
                        .get::<axum::extract::MatchedPath>()
                        .map(|matched| matched.as_str());

                    // "METHOD /route", e.g. "POST /menus/:id/like"
                    let span_name = if let Some(path) = matched_path {
                        format!("{} {}", request.method(), path)
                    } else {
                        format!("{} {}", request.method(), request.uri().path())
                    };

                    let client_ip = request
                        .headers()
                        .get("x-forwarded-for")
                        .and_then(|v| v.to_str().ok())
                        .or_else(|| {
                            request
                                .headers()
                                .get("x-real-ip")
                                .and_then(|v| v.to_str().ok())
                        })
                        .unwrap_or("unknown");

                    // Handlers and the auth middleware fill in the empty fields.
                    tracing::info_span!(
                        "request",
                        "otel.name" = span_name,
                        client_ip = client_ip,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        action = tracing::field::Empty,
                        member_id = tracing::field::Empty,
                        menu_id = tracing::field::Empty,
                        meal_id = tracing::field::Empty,
                        error = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency = tracing::field::Empty,
                    )
                })
                .on_request(|_request: &axum::http::Request<axum::body::Body>, _span: &tracing::Span| {})
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record("status", tracing::field::display(response.status()));
                        span.record("latency", tracing::field::debug(latency));
                        tracing::info!("request completed");
                    },
                ),
        )
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PATCH,
                    axum::http::Method::DELETE,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::AUTHORIZATION,
                ]),
        )
        .route("/metrics", get(|| async move { metric_handle.render() }))
}
