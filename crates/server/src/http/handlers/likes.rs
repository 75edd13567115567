use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::PostId;
use serde_json::{json, Value};
use storage::Db;

use super::{internal, outcome, ApiResult, Viewer};

/// `{"liked": bool}` for the requesting user.
pub async fn has_liked(
    State(db): State<Db>,
    Viewer(user): Viewer,
    Path(post_id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let liked = db.has_liked(PostId(post_id), &user).await.map_err(internal)?;
    Ok(Json(json!({ "liked": liked })))
}

/// Inserts the like row only; the stored counter is moved by the rpc.
pub async fn insert_like(
    State(db): State<Db>,
    Viewer(user): Viewer,
    Path(post_id): Path<i64>,
) -> ApiResult<StatusCode> {
    let post_id = PostId(post_id);
    let res = db.insert_like(post_id, &user).await.map_err(internal)?;
    outcome(res, || format!("post {}", post_id))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_like(
    State(db): State<Db>,
    Viewer(user): Viewer,
    Path(post_id): Path<i64>,
) -> ApiResult<StatusCode> {
    db.delete_like(PostId(post_id), &user)
        .await
        .map_err(internal)?;
    Ok(StatusCode::NO_CONTENT)
}
