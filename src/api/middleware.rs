use axum::{
    extract::{Extension, Request},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::jwt::JwtKeys;

/// Member resolved from the bearer token, available to handlers as an
/// `Extension` (or `Option<Extension<_>>` on routes open to anonymous reads).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentMember(pub i32);

fn bearer_member(keys: &JwtKeys, headers: &HeaderMap) -> Option<CurrentMember> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))?;

    match keys.verify(token) {
        Ok(claims) => {
            tracing::Span::current().record("member_id", claims.sub);
            Some(CurrentMember(claims.sub))
        }
        Err(e) => {
            tracing::warn!("Rejected token: {}", e);
            None
        }
    }
}

pub async fn auth_middleware(
    Extension(keys): Extension<JwtKeys>,
    mut request: Request,
    next: Next,
) -> Response {
    match bearer_member(&keys, request.headers()) {
        Some(member) => {
            request.extensions_mut().insert(member);
            next.run(request).await
        }
        None => (StatusCode::UNAUTHORIZED, Json(json!({"error": "Unauthorized"}))).into_response(),
    }
}

/// Like [`auth_middleware`], but a missing or invalid token lets the request
/// through anonymously.
pub async fn optional_auth_middleware(
    Extension(keys): Extension<JwtKeys>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(member) = bearer_member(&keys, request.headers()) {
        request.extensions_mut().insert(member);
    }
    next.run(request).await
}
