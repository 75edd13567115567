use domain::{
    FeedError, LikeCounterState, LikeIntent, LikeStatus, PostCounts, PostId, Session, StoreResult,
};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, warn};

use crate::store::FeedStore;

/// Drives the like button of one post for one viewer.
///
/// State changes are published on a watch channel: the optimistic value goes
/// out before the store is contacted, then either the store's count or the
/// pre-toggle snapshot replaces it. `toggle` takes `&mut self`, so a second
/// toggle cannot start while one is in flight.
pub struct LikeReconciler {
    store: Arc<dyn FeedStore>,
    session: Session,
    post_id: PostId,
    state: watch::Sender<LikeCounterState>,
}

impl LikeReconciler {
    pub fn new(
        store: Arc<dyn FeedStore>,
        session: Session,
        post_id: PostId,
        initial_count: u64,
    ) -> Self {
        let (state, _) = watch::channel(LikeCounterState::new(initial_count));
        Self {
            store,
            session,
            post_id,
            state,
        }
    }

    pub fn post_id(&self) -> PostId {
        self.post_id
    }

    pub fn state(&self) -> LikeCounterState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<LikeCounterState> {
        self.state.subscribe()
    }

    pub fn changes(&self) -> WatchStream<LikeCounterState> {
        WatchStream::new(self.state.subscribe())
    }

    /// Settles `Unknown` by asking the store whether the viewer's like row
    /// exists. Anonymous viewers are `NotLiked` without a query.
    pub async fn resolve(&mut self) -> Result<LikeStatus, FeedError> {
        let liked = match self.session.user_id() {
            None => false,
            Some(_) => self
                .store
                .has_liked(&self.session, self.post_id)
                .await
                .map_err(|e| FeedError::remote("Failed to load like status", e))?,
        };

        self.state.send_modify(|s| s.resolve(liked));
        Ok(self.state().status)
    }

    /// Replaces the displayed count with the store's row count.
    pub async fn refresh_counts(&mut self) -> Result<PostCounts, FeedError> {
        let counts = self
            .store
            .post_counts(self.post_id)
            .await
            .map_err(|e| FeedError::remote("Failed to load counts", e))?;

        self.state.send_modify(|s| s.confirm(counts.likes));
        Ok(counts)
    }

    pub async fn toggle(&mut self) -> Result<LikeCounterState, FeedError> {
        self.session.require_user("like posts")?;

        if self.state().status == LikeStatus::Unknown {
            self.resolve().await?;
        }

        let mut next = self.state();
        let pending = next
            .begin_toggle()
            .ok_or(FeedError::Invalid("Like status is not loaded yet"))?;
        self.state.send_replace(next);
        debug!(
            "post {}: optimistic {:?}, showing {}",
            self.post_id,
            pending.intent(),
            next.count
        );

        if let Err(e) = self.push(pending.intent()).await {
            self.state.send_modify(|s| s.rollback(pending));
            warn!("post {}: like toggle rolled back: {}", self.post_id, e);
            return Err(FeedError::remote("Failed to update like", e));
        }

        // The mutation went through; a failed re-fetch leaves the optimistic
        // count on screen.
        if let Err(e) = self.refresh_counts().await {
            warn!("post {}: could not reload counts: {}", self.post_id, e);
        }

        Ok(self.state())
    }

    async fn push(&self, intent: LikeIntent) -> StoreResult<()> {
        match intent {
            LikeIntent::Like => {
                self.store.insert_like(&self.session, self.post_id).await?;
                self.store.increment_likes(self.post_id).await
            }
            LikeIntent::Unlike => {
                self.store.delete_like(&self.session, self.post_id).await?;
                self.store.decrement_likes(self.post_id).await
            }
        }
    }
}
