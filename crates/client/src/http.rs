//! `FeedStore` over the store's HTTP API.

use async_trait::async_trait;
use domain::{
    Comment, CommentId, NewComment, NewPost, Pokemon, Post, PostCounts, PostEdit, PostId,
    PostQuery, Profile, ProfileStats, Session, StoreError, StoreResult, UserId,
};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::store::FeedStore;

#[derive(Serialize)]
struct ContentBody<'a> {
    content: &'a str,
}

#[derive(Serialize)]
struct NewCommentBody<'a> {
    content: &'a str,
    parent_id: Option<CommentId>,
}

#[derive(Serialize)]
struct ProcedureBody {
    post_id: PostId,
}

#[derive(Deserialize)]
struct LikedBody {
    liked: bool,
}

#[derive(Clone)]
pub struct HttpStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn authed(&self, req: RequestBuilder, session: &Session) -> StoreResult<RequestBuilder> {
        let token = session.token().ok_or(StoreError::Unauthorized)?;
        Ok(req.bearer_auth(token))
    }

    async fn call<T: DeserializeOwned>(req: RequestBuilder) -> StoreResult<T> {
        let resp = Self::checked(req).await?;
        resp.json::<T>()
            .await
            .map_err(|e| StoreError::Backend(e.into()))
    }

    async fn call_empty(req: RequestBuilder) -> StoreResult<()> {
        Self::checked(req).await.map(|_| ())
    }

    async fn checked(req: RequestBuilder) -> StoreResult<Response> {
        let resp = req.send().await.map_err(|e| StoreError::Backend(e.into()))?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::NOT_FOUND => StoreError::NotFound(body),
            StatusCode::UNAUTHORIZED => StoreError::Unauthorized,
            StatusCode::FORBIDDEN => StoreError::Forbidden,
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT => StoreError::Rejected(body),
            other => StoreError::Backend(anyhow::anyhow!("store returned {}: {}", other, body)),
        })
    }
}

#[async_trait]
impl FeedStore for HttpStore {
    async fn list_posts(&self, query: &PostQuery) -> StoreResult<Vec<Post>> {
        Self::call(self.client.get(self.url("/posts")).query(query)).await
    }

    async fn get_post(&self, post_id: PostId) -> StoreResult<Post> {
        Self::call(self.client.get(self.url(&format!("/posts/{}", post_id)))).await
    }

    async fn create_post(&self, session: &Session, new: &NewPost) -> StoreResult<Post> {
        let req = self.client.post(self.url("/posts")).json(new);
        Self::call(self.authed(req, session)?).await
    }

    async fn update_post(
        &self,
        session: &Session,
        post_id: PostId,
        edit: &PostEdit,
    ) -> StoreResult<Post> {
        let req = self
            .client
            .patch(self.url(&format!("/posts/{}", post_id)))
            .json(edit);
        Self::call(self.authed(req, session)?).await
    }

    async fn delete_post(&self, session: &Session, post_id: PostId) -> StoreResult<()> {
        let req = self.client.delete(self.url(&format!("/posts/{}", post_id)));
        Self::call_empty(self.authed(req, session)?).await
    }

    async fn post_counts(&self, post_id: PostId) -> StoreResult<PostCounts> {
        Self::call(self.client.get(self.url(&format!("/posts/{}/counts", post_id)))).await
    }

    async fn list_comments(&self, post_id: PostId) -> StoreResult<Vec<Comment>> {
        Self::call(self.client.get(self.url(&format!("/posts/{}/comments", post_id)))).await
    }

    async fn insert_comment(&self, session: &Session, new: &NewComment) -> StoreResult<Comment> {
        let req = self
            .client
            .post(self.url(&format!("/posts/{}/comments", new.post_id)))
            .json(&NewCommentBody {
                content: &new.content,
                parent_id: new.parent_id,
            });
        Self::call(self.authed(req, session)?).await
    }

    async fn update_comment(
        &self,
        session: &Session,
        comment_id: CommentId,
        content: &str,
    ) -> StoreResult<Comment> {
        let req = self
            .client
            .patch(self.url(&format!("/comments/{}", comment_id)))
            .json(&ContentBody { content });
        Self::call(self.authed(req, session)?).await
    }

    async fn delete_comment(&self, session: &Session, comment_id: CommentId) -> StoreResult<()> {
        let req = self
            .client
            .delete(self.url(&format!("/comments/{}", comment_id)));
        Self::call_empty(self.authed(req, session)?).await
    }

    async fn has_liked(&self, session: &Session, post_id: PostId) -> StoreResult<bool> {
        let req = self
            .client
            .get(self.url(&format!("/posts/{}/likes/me", post_id)));
        let body: LikedBody = Self::call(self.authed(req, session)?).await?;
        Ok(body.liked)
    }

    async fn insert_like(&self, session: &Session, post_id: PostId) -> StoreResult<()> {
        let req = self
            .client
            .put(self.url(&format!("/posts/{}/likes/me", post_id)));
        Self::call_empty(self.authed(req, session)?).await
    }

    async fn delete_like(&self, session: &Session, post_id: PostId) -> StoreResult<()> {
        let req = self
            .client
            .delete(self.url(&format!("/posts/{}/likes/me", post_id)));
        Self::call_empty(self.authed(req, session)?).await
    }

    async fn increment_likes(&self, post_id: PostId) -> StoreResult<()> {
        let req = self
            .client
            .post(self.url("/rpc/increment_likes_count"))
            .json(&ProcedureBody { post_id });
        Self::call_empty(req).await
    }

    async fn decrement_likes(&self, post_id: PostId) -> StoreResult<()> {
        let req = self
            .client
            .post(self.url("/rpc/decrement_likes_count"))
            .json(&ProcedureBody { post_id });
        Self::call_empty(req).await
    }

    async fn get_profile(&self, user_id: &UserId) -> StoreResult<Profile> {
        Self::call(self.client.get(self.url(&format!("/profiles/{}", user_id)))).await
    }

    async fn profile_stats(&self, user_id: &UserId) -> StoreResult<ProfileStats> {
        Self::call(
            self.client
                .get(self.url(&format!("/profiles/{}/stats", user_id))),
        )
        .await
    }

    async fn follow(&self, session: &Session, user_id: &UserId) -> StoreResult<()> {
        let req = self
            .client
            .put(self.url(&format!("/profiles/{}/follow", user_id)));
        Self::call_empty(self.authed(req, session)?).await
    }

    async fn unfollow(&self, session: &Session, user_id: &UserId) -> StoreResult<()> {
        let req = self
            .client
            .delete(self.url(&format!("/profiles/{}/follow", user_id)));
        Self::call_empty(self.authed(req, session)?).await
    }

    async fn list_pokemon(&self) -> StoreResult<Vec<Pokemon>> {
        Self::call(self.client.get(self.url("/pokemon"))).await
    }

    async fn add_pokemon(&self, session: &Session, pokemon: &Pokemon) -> StoreResult<Pokemon> {
        let req = self
            .client
            .put(self.url(&format!("/pokemon/{}", pokemon.pokemon_id)))
            .json(pokemon);
        Self::call(self.authed(req, session)?).await
    }
}
