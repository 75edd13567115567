use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::{NewPost, Post, PostCounts, PostEdit, PostId, PostQuery};
use storage::Db;
use tracing::info;

use super::{content, internal, not_found, outcome, ApiResult, Viewer};

pub async fn list_posts(
    State(db): State<Db>,
    Query(query): Query<PostQuery>,
) -> ApiResult<Json<Vec<Post>>> {
    let posts = db.list_posts(&query).await.map_err(internal)?;
    Ok(Json(posts))
}

pub async fn create_post(
    State(db): State<Db>,
    Viewer(author): Viewer,
    Json(mut new): Json<NewPost>,
) -> ApiResult<(StatusCode, Json<Post>)> {
    new.content = content(&new.content, "Post cannot be empty")?;

    let post = db.create_post(&author, &new).await.map_err(internal)?;
    info!("{} created post {}", author, post.id);
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn get_post(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Json<Post>> {
    let id = PostId(id);
    match db.get_post(id).await.map_err(internal)? {
        Some(post) => Ok(Json(post)),
        None => Err(not_found(format!("post {}", id))),
    }
}

pub async fn update_post(
    State(db): State<Db>,
    Viewer(author): Viewer,
    Path(id): Path<i64>,
    Json(mut edit): Json<PostEdit>,
) -> ApiResult<Json<Post>> {
    let id = PostId(id);
    edit.content = content(&edit.content, "Post cannot be empty")?;

    let res = db.update_post(id, &author, &edit).await.map_err(internal)?;
    let post = outcome(res, || format!("post {}", id))?;
    info!("{} edited post {}", author, id);
    Ok(Json(post))
}

pub async fn delete_post(
    State(db): State<Db>,
    Viewer(author): Viewer,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let id = PostId(id);
    let res = db.delete_post(id, &author).await.map_err(internal)?;
    outcome(res, || format!("post {}", id))?;
    info!("{} deleted post {}", author, id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn post_counts(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> ApiResult<Json<PostCounts>> {
    let id = PostId(id);
    match db.post_counts(id).await.map_err(internal)? {
        Some(counts) => Ok(Json(counts)),
        None => Err(not_found(format!("post {}", id))),
    }
}
