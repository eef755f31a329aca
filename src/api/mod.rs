pub mod auth;
pub mod ingest;
pub mod meal;
pub mod menu;
pub mod middleware;
pub mod review;

use std::fmt::Display;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Extension, Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::jwt::JwtKeys;

pub fn error_response(status: StatusCode, message: impl Display) -> Response {
    (status, Json(json!({"error": message.to_string()}))).into_response()
}

async fn health_check() -> &'static str {
    "OK"
}

/// Application routes without the transport layers (tracing, CORS, metrics).
pub fn router(db: DatabaseConnection, redis_client: redis::Client, keys: JwtKeys) -> Router {
    let public_routes = Router::new()
        .route("/members", post(auth::register))
        .route("/login", post(auth::login));

    // Reads are open to anonymous callers; a valid token adds like state.
    let read_routes = Router::new()
        .route("/meals", get(meal::list_meals))
        .route("/meals/:id", get(meal::get_meal))
        .route("/meals/:id/reviews", get(review::list_reviews))
        .route("/meals/:id/reviews/:review_id", get(review::get_review))
        .route("/menus", get(menu::list_menus))
        .route("/menus/:id", get(menu::get_menu))
        .route_layer(axum::middleware::from_fn(middleware::optional_auth_middleware));

    let protected_routes = Router::new()
        .route("/meals/:id/reviews", post(review::create_review))
        .route(
            "/reviews/:id",
            patch(review::update_review).delete(review::delete_review),
        )
        .route(
            "/menus/:id/like",
            post(menu::like_menu).delete(menu::cancel_like),
        )
        .route("/internal/ingest", post(ingest::enqueue_ingest))
        .route_layer(axum::middleware::from_fn(middleware::auth_middleware));

    Router::new()
        .route("/health", get(health_check))
        .merge(public_routes)
        .merge(read_routes)
        .merge(protected_routes)
        .layer(Extension(db))
        .layer(Extension(redis_client))
        .layer(Extension(keys))
}
