use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DatabaseConnection;
use serde_json::json;

use super::{error_response, middleware::CurrentMember};
use crate::meals;
use crate::week::WeekRequest;

// GET /meals?year=&month=&week=
// Anonymous callers get `liked: false` everywhere.
pub async fn list_meals(
    Extension(db): Extension<DatabaseConnection>,
    member: Option<Extension<CurrentMember>>,
    Query(week): Query<WeekRequest>,
) -> Response {
    let member_id = member.map(|Extension(CurrentMember(id))| id);
    let (first, last) = match week.dates() {
        Ok(range) => range,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    match meals::meals_between(&db, member_id, first, last).await {
        Ok(meals) => (
            StatusCode::OK,
            Json(json!({
                "week": week,
                "first_date": first,
                "last_date": last,
                "meals": meals,
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to load meals for {:?}: {}", week, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Database error")
        }
    }
}

// GET /meals/:id
pub async fn get_meal(
    Extension(db): Extension<DatabaseConnection>,
    member: Option<Extension<CurrentMember>>,
    Path(meal_id): Path<i32>,
) -> Response {
    let member_id = member.map(|Extension(CurrentMember(id))| id);
    match meals::meal_by_id(&db, member_id, meal_id).await {
        Ok(Some(meal)) => {
            let week = WeekRequest::from_date(meal.date);
            (StatusCode::OK, Json(json!({"meal": meal, "week": week}))).into_response()
        }
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Meal not found"),
        Err(e) => {
            tracing::error!("Failed to load meal {}: {}", meal_id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Database error")
        }
    }
}
