//! In-memory `FeedStore` for service tests. It records every call, can hold
//! like mutations behind a gate, and can be told to fail.

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime};
use domain::{
    Comment, CommentId, NewComment, NewPost, Pokemon, Post, PostCounts, PostEdit, PostId,
    PostQuery, Profile, ProfileStats, Session, StoreError, StoreResult, UserId,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::sync::Semaphore;

use crate::store::FeedStore;

pub const POST: PostId = PostId(1);

pub fn viewer() -> Session {
    Session::authenticated(UserId::new_unchecked("ash".into()), "token-ash")
}

pub fn other_viewer() -> Session {
    Session::authenticated(UserId::new_unchecked("misty".into()), "token-misty")
}

fn epoch() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2024-05-01 10:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
}

pub fn comment(id: i64, parent: Option<i64>, author: &str, minute: i64) -> Comment {
    Comment {
        id: CommentId(id),
        post_id: POST,
        parent_id: parent.map(CommentId),
        author_id: UserId::new_unchecked(author.into()),
        author: None,
        content: format!("comment {}", id),
        created_at: epoch() + Duration::minutes(minute),
        updated_at: None,
    }
}

pub struct ScriptedStore {
    calls: Mutex<Vec<&'static str>>,
    likes: Mutex<HashSet<UserId>>,
    other_likes: AtomicU64,
    comments: Mutex<Vec<Comment>>,
    next_comment: AtomicU64,
    gate: Semaphore,
    fail_likes: AtomicBool,
    fail_counts: AtomicBool,
    fail_comments: AtomicBool,
    fail_listing: AtomicBool,
    pokemon: Mutex<Vec<Pokemon>>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            likes: Mutex::new(HashSet::new()),
            other_likes: AtomicU64::new(0),
            comments: Mutex::new(Vec::new()),
            next_comment: AtomicU64::new(100),
            gate: Semaphore::new(Semaphore::MAX_PERMITS),
            fail_likes: AtomicBool::new(false),
            fail_counts: AtomicBool::new(false),
            fail_comments: AtomicBool::new(false),
            fail_listing: AtomicBool::new(false),
            pokemon: Mutex::new(Vec::new()),
        }
    }

    /// Like-row mutations wait until `release` is called.
    pub fn gated(self) -> Self {
        Self {
            gate: Semaphore::new(0),
            ..self
        }
    }

    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    pub fn with_other_likes(self, n: u64) -> Self {
        self.other_likes.store(n, Ordering::SeqCst);
        self
    }

    pub fn with_comments(self, comments: Vec<Comment>) -> Self {
        *self.comments.lock().unwrap() = comments;
        self
    }

    pub fn failing_likes(self) -> Self {
        self.fail_likes.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_counts(self) -> Self {
        self.fail_counts.store(true, Ordering::SeqCst);
        self
    }

    pub fn fail_comments(&self, fail: bool) {
        self.fail_comments.store(fail, Ordering::SeqCst);
    }

    /// Fails only `list_comments`; comment writes still go through.
    pub fn fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    pub fn add_other_likes(&self, n: u64) {
        self.other_likes.fetch_add(n, Ordering::SeqCst);
    }

    pub fn seed_like(&self, session: &Session) {
        if let Some(user) = session.user_id() {
            self.likes.lock().unwrap().insert(user.clone());
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    fn counts(&self) -> PostCounts {
        PostCounts {
            likes: self.other_likes.load(Ordering::SeqCst) + self.likes.lock().unwrap().len() as u64,
            comments: self.comments.lock().unwrap().len() as u64,
        }
    }

    fn check_post(post_id: PostId) -> StoreResult<()> {
        if post_id == POST {
            Ok(())
        } else {
            Err(StoreError::NotFound(format!("post {}", post_id)))
        }
    }

    fn user(session: &Session) -> StoreResult<UserId> {
        session.user_id().cloned().ok_or(StoreError::Unauthorized)
    }

    async fn like_gate(&self) -> StoreResult<()> {
        self.gate
            .acquire()
            .await
            .map_err(|e| StoreError::Backend(e.into()))?
            .forget();
        if self.fail_likes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(anyhow::anyhow!("connection reset")));
        }
        Ok(())
    }

    fn comment_gate(&self) -> StoreResult<()> {
        if self.fail_comments.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(anyhow::anyhow!("connection reset")));
        }
        Ok(())
    }

    fn post(&self) -> Post {
        let counts = self.counts();
        Post {
            id: POST,
            author_id: UserId::new_unchecked("brock".into()),
            content: "Onix is the best rock type".into(),
            image_url: None,
            pokemon_id: None,
            repost_id: None,
            repost_link: None,
            created_at: epoch(),
            likes_count: counts.likes,
            comments_count: counts.comments,
            author: None,
            pokemon: None,
        }
    }
}

#[async_trait]
impl FeedStore for ScriptedStore {
    async fn list_posts(&self, _query: &PostQuery) -> StoreResult<Vec<Post>> {
        self.record("list_posts");
        Ok(vec![self.post()])
    }

    async fn get_post(&self, post_id: PostId) -> StoreResult<Post> {
        self.record("get_post");
        Self::check_post(post_id)?;
        Ok(self.post())
    }

    async fn create_post(&self, session: &Session, new: &NewPost) -> StoreResult<Post> {
        self.record("create_post");
        let author_id = Self::user(session)?;
        Ok(Post {
            id: PostId(2),
            author_id,
            content: new.content.clone(),
            ..self.post()
        })
    }

    async fn update_post(
        &self,
        session: &Session,
        post_id: PostId,
        edit: &PostEdit,
    ) -> StoreResult<Post> {
        self.record("update_post");
        let user = Self::user(session)?;
        Self::check_post(post_id)?;
        let post = self.post();
        if post.author_id != user {
            return Err(StoreError::Forbidden);
        }
        Ok(Post {
            content: edit.content.clone(),
            image_url: edit.image_url.clone(),
            pokemon_id: edit.pokemon_id.clone(),
            ..post
        })
    }

    async fn delete_post(&self, session: &Session, post_id: PostId) -> StoreResult<()> {
        self.record("delete_post");
        Self::user(session)?;
        Self::check_post(post_id)?;
        Err(StoreError::Forbidden)
    }

    async fn post_counts(&self, post_id: PostId) -> StoreResult<PostCounts> {
        self.record("post_counts");
        Self::check_post(post_id)?;
        if self.fail_counts.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(anyhow::anyhow!("timeout")));
        }
        Ok(self.counts())
    }

    async fn list_comments(&self, post_id: PostId) -> StoreResult<Vec<Comment>> {
        self.record("list_comments");
        Self::check_post(post_id)?;
        self.comment_gate()?;
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(anyhow::anyhow!("read replica lagging")));
        }
        Ok(self.comments.lock().unwrap().clone())
    }

    async fn insert_comment(&self, session: &Session, new: &NewComment) -> StoreResult<Comment> {
        self.record("insert_comment");
        let author_id = Self::user(session)?;
        Self::check_post(new.post_id)?;
        self.comment_gate()?;

        let mut comments = self.comments.lock().unwrap();
        let id = self.next_comment.fetch_add(1, Ordering::SeqCst) as i64;
        let created = Comment {
            id: CommentId(id),
            post_id: new.post_id,
            parent_id: new.parent_id,
            author_id,
            author: None,
            content: new.content.clone(),
            created_at: epoch() + Duration::hours(1) + Duration::seconds(id),
            updated_at: None,
        };
        comments.push(created.clone());
        Ok(created)
    }

    async fn update_comment(
        &self,
        session: &Session,
        comment_id: CommentId,
        content: &str,
    ) -> StoreResult<Comment> {
        self.record("update_comment");
        let user = Self::user(session)?;
        self.comment_gate()?;

        let mut comments = self.comments.lock().unwrap();
        let c = comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| StoreError::NotFound(format!("comment {}", comment_id)))?;
        if c.author_id != user {
            return Err(StoreError::Forbidden);
        }
        c.content = content.to_string();
        c.updated_at = Some(c.created_at + Duration::minutes(5));
        Ok(c.clone())
    }

    async fn delete_comment(&self, session: &Session, comment_id: CommentId) -> StoreResult<()> {
        self.record("delete_comment");
        let user = Self::user(session)?;
        self.comment_gate()?;

        let mut comments = self.comments.lock().unwrap();
        let pos = comments
            .iter()
            .position(|c| c.id == comment_id)
            .ok_or_else(|| StoreError::NotFound(format!("comment {}", comment_id)))?;
        if comments[pos].author_id != user {
            return Err(StoreError::Forbidden);
        }
        comments.remove(pos);
        Ok(())
    }

    async fn has_liked(&self, session: &Session, post_id: PostId) -> StoreResult<bool> {
        self.record("has_liked");
        Self::check_post(post_id)?;
        let user = Self::user(session)?;
        Ok(self.likes.lock().unwrap().contains(&user))
    }

    async fn insert_like(&self, session: &Session, post_id: PostId) -> StoreResult<()> {
        self.like_gate().await?;
        self.record("insert_like");
        Self::check_post(post_id)?;
        let user = Self::user(session)?;
        self.likes.lock().unwrap().insert(user);
        Ok(())
    }

    async fn delete_like(&self, session: &Session, post_id: PostId) -> StoreResult<()> {
        self.like_gate().await?;
        self.record("delete_like");
        Self::check_post(post_id)?;
        let user = Self::user(session)?;
        self.likes.lock().unwrap().remove(&user);
        Ok(())
    }

    async fn increment_likes(&self, post_id: PostId) -> StoreResult<()> {
        self.record("increment_likes");
        Self::check_post(post_id)
    }

    async fn decrement_likes(&self, post_id: PostId) -> StoreResult<()> {
        self.record("decrement_likes");
        Self::check_post(post_id)
    }

    async fn get_profile(&self, user_id: &UserId) -> StoreResult<Profile> {
        self.record("get_profile");
        if user_id.as_str() != "brock" {
            return Err(StoreError::NotFound(format!("profile {}", user_id)));
        }
        Ok(Profile {
            user_id: user_id.clone(),
            username: "brock".into(),
            display_name: Some("Brock".into()),
            avatar_url: None,
            bio: Some("Pewter City gym leader".into()),
            created_at: epoch(),
        })
    }

    async fn profile_stats(&self, _user_id: &UserId) -> StoreResult<ProfileStats> {
        self.record("profile_stats");
        Ok(ProfileStats {
            posts: 1,
            comments: 0,
            followers: 3,
            following: 2,
        })
    }

    async fn follow(&self, session: &Session, _user_id: &UserId) -> StoreResult<()> {
        self.record("follow");
        Self::user(session).map(|_| ())
    }

    async fn unfollow(&self, session: &Session, _user_id: &UserId) -> StoreResult<()> {
        self.record("unfollow");
        Self::user(session).map(|_| ())
    }

    async fn list_pokemon(&self) -> StoreResult<Vec<Pokemon>> {
        self.record("list_pokemon");
        Ok(self.pokemon.lock().unwrap().clone())
    }

    async fn add_pokemon(&self, session: &Session, pokemon: &Pokemon) -> StoreResult<Pokemon> {
        self.record("add_pokemon");
        Self::user(session)?;
        let mut all = self.pokemon.lock().unwrap();
        all.retain(|p| p.pokemon_id != pokemon.pokemon_id);
        all.push(pokemon.clone());
        Ok(pokemon.clone())
    }
}
