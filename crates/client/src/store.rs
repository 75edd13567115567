use async_trait::async_trait;
use domain::{
    Comment, CommentId, NewComment, NewPost, Pokemon, Post, PostCounts, PostEdit, PostId,
    PostQuery, Profile, ProfileStats, Session, StoreResult, UserId,
};

/// The backend store the feed services talk to.
///
/// Viewer-scoped calls take the `Session` explicitly; implementations reject
/// anonymous sessions with `StoreError::Unauthorized`.
#[async_trait]
pub trait FeedStore: Send + Sync {
    async fn list_posts(&self, query: &PostQuery) -> StoreResult<Vec<Post>>;
    async fn get_post(&self, post_id: PostId) -> StoreResult<Post>;
    async fn create_post(&self, session: &Session, new: &NewPost) -> StoreResult<Post>;
    async fn update_post(
        &self,
        session: &Session,
        post_id: PostId,
        edit: &PostEdit,
    ) -> StoreResult<Post>;
    async fn delete_post(&self, session: &Session, post_id: PostId) -> StoreResult<()>;

    /// Row counts, not the stored counter columns.
    async fn post_counts(&self, post_id: PostId) -> StoreResult<PostCounts>;

    /// Flat list; no ordering is promised.
    async fn list_comments(&self, post_id: PostId) -> StoreResult<Vec<Comment>>;
    /// Also increments the post's comment counter.
    async fn insert_comment(&self, session: &Session, new: &NewComment) -> StoreResult<Comment>;
    async fn update_comment(
        &self,
        session: &Session,
        comment_id: CommentId,
        content: &str,
    ) -> StoreResult<Comment>;
    async fn delete_comment(&self, session: &Session, comment_id: CommentId) -> StoreResult<()>;

    async fn has_liked(&self, session: &Session, post_id: PostId) -> StoreResult<bool>;
    /// Row only; pair with `increment_likes`.
    async fn insert_like(&self, session: &Session, post_id: PostId) -> StoreResult<()>;
    /// Row only; pair with `decrement_likes`.
    async fn delete_like(&self, session: &Session, post_id: PostId) -> StoreResult<()>;
    async fn increment_likes(&self, post_id: PostId) -> StoreResult<()>;
    async fn decrement_likes(&self, post_id: PostId) -> StoreResult<()>;

    async fn get_profile(&self, user_id: &UserId) -> StoreResult<Profile>;
    async fn profile_stats(&self, user_id: &UserId) -> StoreResult<ProfileStats>;
    async fn follow(&self, session: &Session, user_id: &UserId) -> StoreResult<()>;
    async fn unfollow(&self, session: &Session, user_id: &UserId) -> StoreResult<()>;

    async fn list_pokemon(&self) -> StoreResult<Vec<Pokemon>>;
    /// Inserts or refreshes a catalog entry keyed by `pokemon_id`.
    async fn add_pokemon(&self, session: &Session, pokemon: &Pokemon) -> StoreResult<Pokemon>;
}
