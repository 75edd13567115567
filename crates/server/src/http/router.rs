use super::handlers::{admin, comments, likes, pokemon, posts, profiles, rpc};
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

const METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
];

fn cors_layer(allowed_origins: &str) -> CorsLayer {
    let any = || {
        CorsLayer::new()
            .allow_methods(METHODS)
            .allow_origin(Any)
            .allow_headers(Any)
    };

    if allowed_origins == "*" {
        return any();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!("CORS config is invalid or empty, falling back to allow ANY.");
        any()
    } else {
        tracing::info!("CORS enabled for origins: {:?}", origins);
        CorsLayer::new()
            .allow_methods(METHODS)
            .allow_origin(origins)
            .allow_headers(Any)
    }
}

pub fn build_router(state: AppState, allowed_origins: &str) -> Router {
    Router::new()
        .route("/api/posts", get(posts::list_posts).post(posts::create_post))
        .route(
            "/api/posts/:post_id",
            get(posts::get_post)
                .patch(posts::update_post)
                .delete(posts::delete_post),
        )
        .route("/api/posts/:post_id/counts", get(posts::post_counts))
        .route(
            "/api/posts/:post_id/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route(
            "/api/comments/:comment_id",
            patch(comments::update_comment).delete(comments::delete_comment),
        )
        .route(
            "/api/posts/:post_id/likes/me",
            get(likes::has_liked)
                .put(likes::insert_like)
                .delete(likes::delete_like),
        )
        .route("/api/rpc/:procedure", post(rpc::call_procedure))
        .route("/api/profiles/:user_id", get(profiles::get_profile))
        .route("/api/profiles/:user_id/stats", get(profiles::profile_stats))
        .route(
            "/api/profiles/:user_id/follow",
            put(profiles::follow).delete(profiles::unfollow),
        )
        .route("/api/pokemon", get(pokemon::list_pokemon))
        .route(
            "/api/pokemon/:pokemon_id",
            get(pokemon::get_pokemon).put(pokemon::add_pokemon),
        )
        .route("/api/admin/sessions", post(admin::create_session))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}
