use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{bearer, internal, parse_user_id, ApiResult};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateSessionRequest {
    pub user_id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct SessionResponse {
    pub user_id: String,
    pub token: String,
}

/// Operator tooling: upserts the profile and mints a bearer token for it.
pub async fn create_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateSessionRequest>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let token = bearer(&headers).ok_or((
        StatusCode::UNAUTHORIZED,
        "Missing Authorization header".to_string(),
    ))?;
    if token != &*state.admin_token {
        return Err((StatusCode::FORBIDDEN, "Invalid Admin Token".into()));
    }

    let user_id = parse_user_id(payload.user_id)?;
    let username = payload.username.trim();
    if username.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Username cannot be empty".into()));
    }

    state
        .db
        .upsert_profile(
            &user_id,
            username,
            payload.display_name.as_deref(),
            payload.avatar_url.as_deref(),
        )
        .await
        .map_err(internal)?;
    let token = state.db.issue_session(&user_id).await.map_err(internal)?;
    info!("session issued for {}", user_id);

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            user_id: user_id.to_string(),
            token,
        }),
    ))
}
