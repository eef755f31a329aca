use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DatabaseConnection;
use serde_json::json;

use super::{error_response, middleware::CurrentMember};
use crate::likes::{LikeError, LikeService};
use crate::menus::{self, MenuError};
use crate::page::PageParams;

impl IntoResponse for LikeError {
    fn into_response(self) -> Response {
        let status = match &self {
            LikeError::AlreadyLiked { .. } => StatusCode::CONFLICT,
            LikeError::NotLiked { .. } | LikeError::MenuNotFound(_) => StatusCode::NOT_FOUND,
            LikeError::Db(e) => {
                tracing::error!("Like storage failure: {}", e);
                return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Database error");
            }
        };
        tracing::Span::current().record("error", tracing::field::display(&self));
        error_response(status, self)
    }
}

impl IntoResponse for MenuError {
    fn into_response(self) -> Response {
        let status = match &self {
            MenuError::NotFound(_) => StatusCode::NOT_FOUND,
            MenuError::InvalidSort(_) => StatusCode::BAD_REQUEST,
            MenuError::Db(e) => {
                tracing::error!("Menu storage failure: {}", e);
                return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Database error");
            }
        };
        error_response(status, self)
    }
}

// GET /menus?page=&size=&sort=name,ASC
pub async fn list_menus(
    Extension(db): Extension<DatabaseConnection>,
    member: Option<Extension<CurrentMember>>,
    Query(params): Query<PageParams>,
) -> Response {
    let member_id = member.map(|Extension(CurrentMember(id))| id);
    match menus::list(&db, member_id, &params).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => e.into_response(),
    }
}

// GET /menus/:id
pub async fn get_menu(
    Extension(db): Extension<DatabaseConnection>,
    member: Option<Extension<CurrentMember>>,
    Path(menu_id): Path<i32>,
) -> Response {
    let member_id = member.map(|Extension(CurrentMember(id))| id);
    match menus::by_id(&db, member_id, menu_id).await {
        Ok(menu) => (StatusCode::OK, Json(menu)).into_response(),
        Err(e) => e.into_response(),
    }
}

// POST /menus/:id/like
pub async fn like_menu(
    Extension(db): Extension<DatabaseConnection>,
    Extension(CurrentMember(member_id)): Extension<CurrentMember>,
    Path(menu_id): Path<i32>,
) -> Response {
    match LikeService::new(db).like(member_id, menu_id).await {
        Ok(like) => {
            tracing::Span::current().record("action", "like_menu");
            (StatusCode::CREATED, Json(like)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

// DELETE /menus/:id/like
pub async fn cancel_like(
    Extension(db): Extension<DatabaseConnection>,
    Extension(CurrentMember(member_id)): Extension<CurrentMember>,
    Path(menu_id): Path<i32>,
) -> Response {
    match LikeService::new(db).cancel(member_id, menu_id).await {
        Ok(menu) => {
            tracing::Span::current().record("action", "cancel_like");
            (
                StatusCode::OK,
                Json(json!({"id": menu.id, "name": menu.name, "like_count": menu.like_count})),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}
