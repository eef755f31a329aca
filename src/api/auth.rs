use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lazy_static::lazy_static;
use regex::Regex;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr};
use serde_json::json;
use tracing::field::display;

use super::error_response;
use crate::entities::{member, member::MemberType};
use crate::jwt::JwtKeys;

#[derive(serde::Deserialize)]
pub struct RegisterRequest {
    username: String,
    password: String,
    name: String,
}

fn valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.-]{3,32}$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

pub async fn register(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<RegisterRequest>,
) -> Response {
    if !valid_username(&payload.username) || payload.password.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Invalid username or password");
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = match Argon2::default().hash_password(payload.password.as_bytes(), &salt) {
        Ok(hash) => hash.to_string(),
        Err(_) => {
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to hash password")
        }
    };

    let new_member = member::ActiveModel {
        username: Set(payload.username),
        password_hash: Set(password_hash),
        name: Set(payload.name),
        member_type: Set(MemberType::Soldier),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    };

    match new_member.insert(&db).await {
        Ok(m) => {
            tracing::Span::current()
                .record("action", "register_member")
                .record("member_id", m.id);
            metrics::counter!("menu_review_members_registered_total").increment(1);

            (
                StatusCode::CREATED,
                Json(json!({"id": m.id, "username": m.username, "name": m.name})),
            )
                .into_response()
        }
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            tracing::Span::current()
                .record("action", "register_member_failed")
                .record("error", "duplicate_username");
            error_response(StatusCode::CONFLICT, "Username already exists")
        }
        Err(e) => {
            tracing::Span::current()
                .record("action", "register_member_error")
                .record("error", display(&e));
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}

#[derive(serde::Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

pub async fn login(
    Extension(db): Extension<DatabaseConnection>,
    Extension(keys): Extension<JwtKeys>,
    Json(payload): Json<LoginRequest>,
) -> Response {
    let member = match member::Entity::find()
        .filter(member::Column::Username.eq(payload.username.clone()))
        .one(&db)
        .await
    {
        Ok(Some(m)) => m,
        Ok(None) => {
            return error_response(StatusCode::UNAUTHORIZED, "Invalid username or password")
        }
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    };

    let verified = PasswordHash::new(&member.password_hash)
        .map(|hash| {
            Argon2::default()
                .verify_password(payload.password.as_bytes(), &hash)
                .is_ok()
        })
        .unwrap_or(false);

    if !verified {
        tracing::Span::current()
            .record("action", "login_failed")
            .record("error", "invalid_credentials");
        return error_response(StatusCode::UNAUTHORIZED, "Invalid username or password");
    }

    match keys.sign(member.id, &member.username) {
        Ok(token) => {
            tracing::Span::current()
                .record("action", "login")
                .record("member_id", member.id);
            (StatusCode::OK, Json(json!({"token": token}))).into_response()
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}
