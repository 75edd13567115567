use domain::{
    build_comment_tree, find, Comment, CommentId, CommentTreeNode, FeedError, NewComment, PostId,
    Session,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::store::FeedStore;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadSnapshot {
    pub loaded: bool,
    /// Rows returned by the store, including any that fell out of the tree.
    pub total: usize,
    pub roots: Vec<CommentTreeNode>,
    /// Set when a write went through but the reload after it failed; the
    /// tree is the one from before the write.
    pub stale: bool,
}

impl ThreadSnapshot {
    pub fn find(&self, id: CommentId) -> Option<&Comment> {
        find(&self.roots, id)
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Comment section of one post. Every successful mutation reloads the flat
/// list and rebuilds the whole tree; the new snapshot is returned and also
/// published to subscribers. A mutation that succeeded is never reported as
/// failed: if the reload fails the previous tree comes back marked `stale`.
pub struct CommentThread {
    store: Arc<dyn FeedStore>,
    session: Session,
    post_id: PostId,
    snapshot: watch::Sender<Arc<ThreadSnapshot>>,
}

fn content(raw: &str) -> Result<String, FeedError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FeedError::Invalid("Comment cannot be empty"));
    }
    Ok(trimmed.to_string())
}

impl CommentThread {
    pub fn new(store: Arc<dyn FeedStore>, session: Session, post_id: PostId) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(ThreadSnapshot::default()));
        Self {
            store,
            session,
            post_id,
            snapshot,
        }
    }

    pub fn snapshot(&self) -> Arc<ThreadSnapshot> {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<ThreadSnapshot>> {
        self.snapshot.subscribe()
    }

    pub async fn load(&mut self) -> Result<Arc<ThreadSnapshot>, FeedError> {
        let mut comments = self
            .store
            .list_comments(self.post_id)
            .await
            .map_err(|e| FeedError::remote("Failed to load comments", e))?;

        // Oldest first; the tree builder keeps whatever order it is given.
        comments.sort_by_key(|c| (c.created_at, c.id));
        let total = comments.len();
        let roots = build_comment_tree(comments);
        debug!(
            "post {}: {} comments, {} threads",
            self.post_id,
            total,
            roots.len()
        );

        let snapshot = Arc::new(ThreadSnapshot {
            loaded: true,
            total,
            roots,
            stale: false,
        });
        self.snapshot.send_replace(snapshot.clone());
        Ok(snapshot)
    }

    /// Posts a top-level comment, or a reply when `parent_id` is set.
    pub async fn create(
        &mut self,
        raw: &str,
        parent_id: Option<CommentId>,
    ) -> Result<Arc<ThreadSnapshot>, FeedError> {
        self.session.require_user("comment")?;
        let new = NewComment {
            post_id: self.post_id,
            content: content(raw)?,
            parent_id,
        };

        let created = self
            .store
            .insert_comment(&self.session, &new)
            .await
            .map_err(|e| FeedError::remote("Failed to post comment", e))?;
        info!("post {}: comment {} created", self.post_id, created.id);

        Ok(self.reload_after_write().await)
    }

    pub async fn edit(
        &mut self,
        comment_id: CommentId,
        raw: &str,
    ) -> Result<Arc<ThreadSnapshot>, FeedError> {
        self.session.require_user("edit comments")?;
        let content = content(raw)?;
        self.check_author(comment_id)?;

        self.store
            .update_comment(&self.session, comment_id, &content)
            .await
            .map_err(|e| FeedError::remote("Failed to update comment", e))?;

        Ok(self.reload_after_write().await)
    }

    pub async fn delete(&mut self, comment_id: CommentId) -> Result<Arc<ThreadSnapshot>, FeedError> {
        self.session.require_user("delete comments")?;
        self.check_author(comment_id)?;

        self.store
            .delete_comment(&self.session, comment_id)
            .await
            .map_err(|e| FeedError::remote("Failed to delete comment", e))?;
        info!("post {}: comment {} deleted", self.post_id, comment_id);

        Ok(self.reload_after_write().await)
    }

    async fn reload_after_write(&mut self) -> Arc<ThreadSnapshot> {
        match self.load().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("post {}: comments changed but reload failed: {}", self.post_id, e);
                let mut stale = ThreadSnapshot::clone(&self.snapshot());
                stale.stale = true;
                let stale = Arc::new(stale);
                self.snapshot.send_replace(stale.clone());
                stale
            }
        }
    }

    // Comments not in the current tree are left for the store to judge.
    fn check_author(&self, comment_id: CommentId) -> Result<(), FeedError> {
        match self.snapshot.borrow().find(comment_id) {
            Some(c) if !self.session.is_author(&c.author_id) => Err(FeedError::Forbidden),
            _ => Ok(()),
        }
    }
}
