use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::{Comment, CommentId, NewComment, PostId};
use serde::Deserialize;
use storage::Db;

use super::{content, internal, outcome, ApiResult, Viewer};

const EMPTY: &str = "Comment cannot be empty";

#[derive(Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
    pub parent_id: Option<CommentId>,
}

#[derive(Deserialize)]
pub struct UpdateCommentRequest {
    pub content: String,
}

pub async fn list_comments(
    State(db): State<Db>,
    Path(post_id): Path<i64>,
) -> ApiResult<Json<Vec<Comment>>> {
    let comments = db.list_comments(PostId(post_id)).await.map_err(internal)?;
    Ok(Json(comments))
}

pub async fn create_comment(
    State(db): State<Db>,
    Viewer(author): Viewer,
    Path(post_id): Path<i64>,
    Json(payload): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let new = NewComment {
        post_id: PostId(post_id),
        content: content(&payload.content, EMPTY)?,
        parent_id: payload.parent_id,
    };

    let res = db.insert_comment(&author, &new).await.map_err(internal)?;
    let created = outcome(res, || match new.parent_id {
        Some(parent) => format!("comment {}", parent),
        None => format!("post {}", new.post_id),
    })?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_comment(
    State(db): State<Db>,
    Viewer(author): Viewer,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCommentRequest>,
) -> ApiResult<Json<Comment>> {
    let id = CommentId(id);
    let content = content(&payload.content, EMPTY)?;

    let res = db.update_comment(id, &author, &content).await.map_err(internal)?;
    outcome(res, || format!("comment {}", id)).map(Json)
}

pub async fn delete_comment(
    State(db): State<Db>,
    Viewer(author): Viewer,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let id = CommentId(id);
    let res = db.delete_comment(id, &author).await.map_err(internal)?;
    outcome(res, || format!("comment {}", id))?;
    Ok(StatusCode::NO_CONTENT)
}
