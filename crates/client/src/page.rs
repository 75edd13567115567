use domain::{CommentId, FeedError, LikeCounterState, Post, PostCounts, PostId, Session};
use std::sync::Arc;
use tracing::warn;

use crate::likes::LikeReconciler;
use crate::store::FeedStore;
use crate::thread::{CommentThread, ThreadSnapshot};

/// A post with its like button and comment section.
///
/// The two parts share nothing; after a comment mutation returns, the page
/// re-reads the counts so the comment total stays in step.
pub struct PostPage {
    post: Post,
    comments_count: u64,
    pub likes: LikeReconciler,
    pub comments: CommentThread,
}

impl PostPage {
    /// Loads everything the page shows. A missing post is terminal.
    pub async fn open(
        store: Arc<dyn FeedStore>,
        session: Session,
        post_id: PostId,
    ) -> Result<Self, FeedError> {
        let post = store
            .get_post(post_id)
            .await
            .map_err(|e| FeedError::remote("Failed to load post", e))?;

        let mut likes = LikeReconciler::new(store.clone(), session.clone(), post_id, post.likes_count);
        let mut comments = CommentThread::new(store, session, post_id);
        futures::try_join!(likes.resolve(), comments.load())?;

        let mut page = Self {
            comments_count: post.comments_count,
            post,
            likes,
            comments,
        };
        page.sync_counts().await;
        Ok(page)
    }

    pub fn post(&self) -> &Post {
        &self.post
    }

    pub fn counts(&self) -> PostCounts {
        PostCounts {
            likes: self.likes.state().count,
            comments: self.comments_count,
        }
    }

    pub fn thread(&self) -> Arc<ThreadSnapshot> {
        self.comments.snapshot()
    }

    pub async fn toggle_like(&mut self) -> Result<LikeCounterState, FeedError> {
        self.likes.toggle().await
    }

    pub async fn comment(
        &mut self,
        content: &str,
        parent_id: Option<CommentId>,
    ) -> Result<Arc<ThreadSnapshot>, FeedError> {
        let snapshot = self.comments.create(content, parent_id).await?;
        self.sync_counts().await;
        Ok(snapshot)
    }

    pub async fn edit_comment(
        &mut self,
        comment_id: CommentId,
        content: &str,
    ) -> Result<Arc<ThreadSnapshot>, FeedError> {
        self.comments.edit(comment_id, content).await
    }

    pub async fn delete_comment(
        &mut self,
        comment_id: CommentId,
    ) -> Result<Arc<ThreadSnapshot>, FeedError> {
        let snapshot = self.comments.delete(comment_id).await?;
        self.sync_counts().await;
        Ok(snapshot)
    }

    // Count refreshes are best effort; the last known values stay on screen.
    async fn sync_counts(&mut self) {
        match self.likes.refresh_counts().await {
            Ok(counts) => self.comments_count = counts.comments,
            Err(e) => warn!("post {}: could not refresh counts: {}", self.post.id, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{comment, viewer, ScriptedStore, POST};
    use domain::LikeStatus;

    #[tokio::test]
    async fn missing_post_is_not_found() {
        let store = Arc::new(ScriptedStore::new());
        let err = PostPage::open(store.clone(), viewer(), PostId(42))
            .await
            .err()
            .unwrap();

        assert!(matches!(err, FeedError::NotFound(ref what) if what == "post 42"));
        assert_eq!(store.calls(), vec!["get_post"]);
    }

    #[tokio::test]
    async fn open_settles_likes_and_comments() {
        let store = Arc::new(
            ScriptedStore::new()
                .with_other_likes(4)
                .with_comments(vec![comment(1, None, "misty", 0), comment(2, Some(1), "ash", 1)]),
        );
        store.seed_like(&viewer());

        let page = PostPage::open(store, viewer(), POST).await.unwrap();

        assert_eq!(page.likes.state().status, LikeStatus::Liked);
        assert_eq!(page.counts(), PostCounts { likes: 5, comments: 2 });
        assert_eq!(page.thread().roots.len(), 1);
        assert_eq!(page.post().id, POST);
    }

    #[tokio::test]
    async fn commenting_refreshes_comment_count() {
        let store = Arc::new(ScriptedStore::new().with_comments(vec![comment(1, None, "misty", 0)]));
        let mut page = PostPage::open(store.clone(), viewer(), POST).await.unwrap();

        page.comment("Team Rocket blasting off", None).await.unwrap();
        assert_eq!(page.counts().comments, 2);

        let mine = page.thread().roots[1].comment.id;
        page.delete_comment(mine).await.unwrap();
        assert_eq!(page.counts().comments, 1);
        assert_eq!(page.thread().roots.len(), 1);
    }

    #[tokio::test]
    async fn anonymous_viewer_reads_but_cannot_like() {
        let store = Arc::new(ScriptedStore::new().with_other_likes(3));
        let mut page = PostPage::open(store.clone(), Session::Anonymous, POST)
            .await
            .unwrap();

        assert_eq!(page.likes.state().status, LikeStatus::NotLiked);
        assert!(!store.calls().contains(&"has_liked"));

        let err = page.toggle_like().await.unwrap_err();
        assert!(matches!(err, FeedError::AuthRequired(_)));
        assert_eq!(page.counts().likes, 3);
    }

    #[tokio::test]
    async fn counts_follow_a_comment_even_when_reload_fails() {
        let store = Arc::new(ScriptedStore::new().with_comments(vec![comment(1, None, "misty", 0)]));
        let mut page = PostPage::open(store.clone(), viewer(), POST).await.unwrap();

        store.fail_listing(true);
        let snap = page.comment("Gotta catch 'em all", None).await.unwrap();

        assert!(snap.stale);
        assert_eq!(snap.roots.len(), 1);
        assert_eq!(page.counts().comments, 2);
    }
}
