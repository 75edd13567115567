//! `FeedStore` straight on top of the SQLite database, for a client that
//! runs in the same process as the store.

use async_trait::async_trait;
use domain::{
    Comment, CommentId, NewComment, NewPost, Pokemon, Post, PostCounts, PostEdit, PostId,
    PostQuery, Profile, ProfileStats, Session, StoreError, StoreResult, UserId,
};
use storage::{Db, WriteOutcome};

use crate::store::FeedStore;

fn viewer(session: &Session) -> StoreResult<&UserId> {
    session.user_id().ok_or(StoreError::Unauthorized)
}

fn outcome<T>(res: anyhow::Result<WriteOutcome<T>>, what: impl FnOnce() -> String) -> StoreResult<T> {
    match res? {
        WriteOutcome::Done(v) => Ok(v),
        WriteOutcome::NotFound => Err(StoreError::NotFound(what())),
        WriteOutcome::Forbidden => Err(StoreError::Forbidden),
        WriteOutcome::Invalid(reason) => Err(StoreError::Rejected(reason.to_string())),
    }
}

fn found<T>(res: anyhow::Result<Option<T>>, what: impl FnOnce() -> String) -> StoreResult<T> {
    res?.ok_or_else(|| StoreError::NotFound(what()))
}

fn procedure(res: anyhow::Result<bool>, post_id: PostId) -> StoreResult<()> {
    if res? {
        Ok(())
    } else {
        Err(StoreError::NotFound(format!("post {}", post_id)))
    }
}

#[async_trait]
impl FeedStore for Db {
    async fn list_posts(&self, query: &PostQuery) -> StoreResult<Vec<Post>> {
        Ok(Db::list_posts(self, query).await?)
    }

    async fn get_post(&self, post_id: PostId) -> StoreResult<Post> {
        found(Db::get_post(self, post_id).await, || format!("post {}", post_id))
    }

    async fn create_post(&self, session: &Session, new: &NewPost) -> StoreResult<Post> {
        Ok(Db::create_post(self, viewer(session)?, new).await?)
    }

    async fn update_post(
        &self,
        session: &Session,
        post_id: PostId,
        edit: &PostEdit,
    ) -> StoreResult<Post> {
        outcome(
            Db::update_post(self, post_id, viewer(session)?, edit).await,
            || format!("post {}", post_id),
        )
    }

    async fn delete_post(&self, session: &Session, post_id: PostId) -> StoreResult<()> {
        outcome(
            Db::delete_post(self, post_id, viewer(session)?).await,
            || format!("post {}", post_id),
        )
    }

    async fn post_counts(&self, post_id: PostId) -> StoreResult<PostCounts> {
        found(Db::post_counts(self, post_id).await, || format!("post {}", post_id))
    }

    async fn list_comments(&self, post_id: PostId) -> StoreResult<Vec<Comment>> {
        Ok(Db::list_comments(self, post_id).await?)
    }

    async fn insert_comment(&self, session: &Session, new: &NewComment) -> StoreResult<Comment> {
        outcome(
            Db::insert_comment(self, viewer(session)?, new).await,
            || format!("post {}", new.post_id),
        )
    }

    async fn update_comment(
        &self,
        session: &Session,
        comment_id: CommentId,
        content: &str,
    ) -> StoreResult<Comment> {
        outcome(
            Db::update_comment(self, comment_id, viewer(session)?, content).await,
            || format!("comment {}", comment_id),
        )
    }

    async fn delete_comment(&self, session: &Session, comment_id: CommentId) -> StoreResult<()> {
        outcome(
            Db::delete_comment(self, comment_id, viewer(session)?).await,
            || format!("comment {}", comment_id),
        )
    }

    async fn has_liked(&self, session: &Session, post_id: PostId) -> StoreResult<bool> {
        Ok(Db::has_liked(self, post_id, viewer(session)?).await?)
    }

    async fn insert_like(&self, session: &Session, post_id: PostId) -> StoreResult<()> {
        outcome(
            Db::insert_like(self, post_id, viewer(session)?).await,
            || format!("post {}", post_id),
        )
    }

    async fn delete_like(&self, session: &Session, post_id: PostId) -> StoreResult<()> {
        Ok(Db::delete_like(self, post_id, viewer(session)?).await?)
    }

    async fn increment_likes(&self, post_id: PostId) -> StoreResult<()> {
        procedure(self.increment_likes_count(post_id).await, post_id)
    }

    async fn decrement_likes(&self, post_id: PostId) -> StoreResult<()> {
        procedure(self.decrement_likes_count(post_id).await, post_id)
    }

    async fn get_profile(&self, user_id: &UserId) -> StoreResult<Profile> {
        found(Db::get_profile(self, user_id).await, || format!("profile {}", user_id))
    }

    async fn profile_stats(&self, user_id: &UserId) -> StoreResult<ProfileStats> {
        Ok(Db::profile_stats(self, user_id).await?)
    }

    async fn follow(&self, session: &Session, user_id: &UserId) -> StoreResult<()> {
        if Db::follow(self, viewer(session)?, user_id).await? {
            Ok(())
        } else {
            Err(StoreError::NotFound(format!("profile {}", user_id)))
        }
    }

    async fn unfollow(&self, session: &Session, user_id: &UserId) -> StoreResult<()> {
        Ok(Db::unfollow(self, viewer(session)?, user_id).await?)
    }

    async fn list_pokemon(&self) -> StoreResult<Vec<Pokemon>> {
        Ok(Db::list_pokemon(self).await?)
    }

    async fn add_pokemon(&self, session: &Session, pokemon: &Pokemon) -> StoreResult<Pokemon> {
        viewer(session)?;
        Db::upsert_pokemon(self, pokemon).await?;
        found(Db::get_pokemon(self, &pokemon.pokemon_id).await, || {
            format!("pokemon {}", pokemon.pokemon_id)
        })
    }
}
