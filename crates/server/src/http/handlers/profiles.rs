use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::{Profile, ProfileStats};
use storage::Db;

use super::{internal, not_found, parse_user_id, ApiResult, Viewer};

pub async fn get_profile(
    State(db): State<Db>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Profile>> {
    let user_id = parse_user_id(user_id)?;
    match db.get_profile(&user_id).await.map_err(internal)? {
        Some(profile) => Ok(Json(profile)),
        None => Err(not_found(format!("profile {}", user_id))),
    }
}

pub async fn profile_stats(
    State(db): State<Db>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<ProfileStats>> {
    let user_id = parse_user_id(user_id)?;
    let stats = db.profile_stats(&user_id).await.map_err(internal)?;
    Ok(Json(stats))
}

pub async fn follow(
    State(db): State<Db>,
    Viewer(follower): Viewer,
    Path(user_id): Path<String>,
) -> ApiResult<StatusCode> {
    let user_id = parse_user_id(user_id)?;
    if follower == user_id {
        return Err((StatusCode::BAD_REQUEST, "Cannot follow yourself".into()));
    }
    if !db.follow(&follower, &user_id).await.map_err(internal)? {
        return Err(not_found(format!("profile {}", user_id)));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unfollow(
    State(db): State<Db>,
    Viewer(follower): Viewer,
    Path(user_id): Path<String>,
) -> ApiResult<StatusCode> {
    let user_id = parse_user_id(user_id)?;
    db.unfollow(&follower, &user_id).await.map_err(internal)?;
    Ok(StatusCode::NO_CONTENT)
}
