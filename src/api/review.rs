use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DatabaseConnection;
use serde_json::json;

use super::{error_response, middleware::CurrentMember};
use crate::page::PageParams;
use crate::reviews::{self, ReviewError};

impl IntoResponse for ReviewError {
    fn into_response(self) -> Response {
        let status = match &self {
            ReviewError::EmptyContent => StatusCode::BAD_REQUEST,
            ReviewError::MealNotFound(_) | ReviewError::ReviewNotFound(_) => StatusCode::NOT_FOUND,
            ReviewError::NotOwner { .. } => StatusCode::FORBIDDEN,
            ReviewError::Db(e) => {
                tracing::error!("Review storage failure: {}", e);
                return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Database error");
            }
        };
        error_response(status, self)
    }
}

#[derive(serde::Deserialize)]
pub struct ReviewRequest {
    content: String,
}

// GET /meals/:id/reviews?page=&size=
pub async fn list_reviews(
    Extension(db): Extension<DatabaseConnection>,
    Path(meal_id): Path<i32>,
    Query(params): Query<PageParams>,
) -> Response {
    match reviews::list_for_meal(&db, meal_id, &params).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => e.into_response(),
    }
}

// GET /meals/:id/reviews/:review_id
pub async fn get_review(
    Extension(db): Extension<DatabaseConnection>,
    Path((meal_id, review_id)): Path<(i32, i32)>,
) -> Response {
    match reviews::by_id(&db, meal_id, review_id).await {
        Ok(review) => (StatusCode::OK, Json(review)).into_response(),
        Err(e) => e.into_response(),
    }
}

// POST /meals/:id/reviews
pub async fn create_review(
    Extension(db): Extension<DatabaseConnection>,
    Extension(CurrentMember(member_id)): Extension<CurrentMember>,
    Path(meal_id): Path<i32>,
    Json(payload): Json<ReviewRequest>,
) -> Response {
    match reviews::create(&db, member_id, meal_id, &payload.content).await {
        Ok(review) => {
            tracing::Span::current().record("action", "create_review");
            (StatusCode::CREATED, Json(review)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

// PATCH /reviews/:id
pub async fn update_review(
    Extension(db): Extension<DatabaseConnection>,
    Extension(CurrentMember(member_id)): Extension<CurrentMember>,
    Path(review_id): Path<i32>,
    Json(payload): Json<ReviewRequest>,
) -> Response {
    match reviews::update(&db, member_id, review_id, &payload.content).await {
        Ok(review) => (StatusCode::OK, Json(review)).into_response(),
        Err(e) => e.into_response(),
    }
}

// DELETE /reviews/:id
pub async fn delete_review(
    Extension(db): Extension<DatabaseConnection>,
    Extension(CurrentMember(member_id)): Extension<CurrentMember>,
    Path(review_id): Path<i32>,
) -> Response {
    match reviews::delete(&db, member_id, review_id).await {
        Ok(()) => (StatusCode::OK, Json(json!({"message": "Review deleted"}))).into_response(),
        Err(e) => e.into_response(),
    }
}
