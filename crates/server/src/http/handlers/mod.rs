pub mod admin;
pub mod comments;
pub mod likes;
pub mod pokemon;
pub mod posts;
pub mod profiles;
pub mod rpc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
};
use domain::UserId;
use storage::WriteOutcome;
use tracing::error;

use crate::state::AppState;

pub type ApiError = (StatusCode, String);
pub type ApiResult<T> = Result<T, ApiError>;

pub fn internal(e: anyhow::Error) -> ApiError {
    error!("store failure: {:?}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

/// 404 bodies name the missing row, e.g. `post 5`.
pub fn not_found(what: String) -> ApiError {
    (StatusCode::NOT_FOUND, what)
}

pub fn outcome<T>(res: WriteOutcome<T>, what: impl FnOnce() -> String) -> ApiResult<T> {
    match res {
        WriteOutcome::Done(v) => Ok(v),
        WriteOutcome::NotFound => Err(not_found(what())),
        WriteOutcome::Forbidden => Err((
            StatusCode::FORBIDDEN,
            "Only the author may change this".into(),
        )),
        WriteOutcome::Invalid(reason) => Err((StatusCode::BAD_REQUEST, reason.to_string())),
    }
}

pub fn parse_user_id(raw: String) -> ApiResult<UserId> {
    UserId::new(raw).map_err(|e| (StatusCode::BAD_REQUEST, e))
}

/// Trimmed content, or 400 when nothing is left.
pub fn content(raw: &str, empty: &'static str) -> ApiResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err((StatusCode::BAD_REQUEST, empty.to_string()));
    }
    Ok(trimmed.to_string())
}

pub fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// The user behind the request's bearer session token.
pub struct Viewer(pub UserId);

#[async_trait]
impl FromRequestParts<AppState> for Viewer {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> ApiResult<Self> {
        let token = bearer(&parts.headers).ok_or((
            StatusCode::UNAUTHORIZED,
            "Missing Authorization header".to_string(),
        ))?;

        match state.db.resolve_session(token).await.map_err(internal)? {
            Some(user_id) => Ok(Viewer(user_id)),
            None => Err((StatusCode::UNAUTHORIZED, "Unknown session".to_string())),
        }
    }
}
