use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::PostId;
use serde::Deserialize;
use storage::Db;
use tracing::debug;

use super::{internal, not_found, ApiResult};

#[derive(Deserialize)]
pub struct ProcedureRequest {
    pub post_id: PostId,
}

/// Stored counter procedures. Decrement floors at zero.
pub async fn call_procedure(
    State(db): State<Db>,
    Path(procedure): Path<String>,
    Json(payload): Json<ProcedureRequest>,
) -> ApiResult<StatusCode> {
    let post_id = payload.post_id;
    let touched = match procedure.as_str() {
        "increment_likes_count" => db.increment_likes_count(post_id).await,
        "decrement_likes_count" => db.decrement_likes_count(post_id).await,
        "increment_comments_count" => db.increment_comments_count(post_id).await,
        _ => return Err(not_found(format!("procedure {}", procedure))),
    }
    .map_err(internal)?;

    if !touched {
        return Err(not_found(format!("post {}", post_id)));
    }
    debug!("{} applied to post {}", procedure, post_id);
    Ok(StatusCode::NO_CONTENT)
}
