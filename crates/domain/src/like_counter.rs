//! Optimistic like counter for one post as seen by one viewer.
//!
//! The state is updated before the store answers; the pending toggle keeps
//! a snapshot so a failed mutation can be undone exactly.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeStatus {
    Unknown,
    Liked,
    NotLiked,
}

impl From<bool> for LikeStatus {
    fn from(liked: bool) -> Self {
        if liked {
            Self::Liked
        } else {
            Self::NotLiked
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LikeIntent {
    Like,
    Unlike,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeCounterState {
    pub status: LikeStatus,
    pub count: u64,
}

/// An optimistic toggle that has been applied locally but not yet confirmed.
#[must_use = "a pending toggle must be confirmed or rolled back"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingToggle {
    previous: LikeCounterState,
    intent: LikeIntent,
}

impl PendingToggle {
    pub fn intent(&self) -> LikeIntent {
        self.intent
    }

    pub fn previous(&self) -> LikeCounterState {
        self.previous
    }
}

impl LikeCounterState {
    pub fn new(count: u64) -> Self {
        Self {
            status: LikeStatus::Unknown,
            count,
        }
    }

    pub fn is_liked(&self) -> bool {
        self.status == LikeStatus::Liked
    }

    pub fn resolve(&mut self, liked: bool) {
        self.status = liked.into();
    }

    /// Applies the toggle locally. Returns `None` while the viewer's status is
    /// still `Unknown`.
    pub fn begin_toggle(&mut self) -> Option<PendingToggle> {
        let previous = *self;
        let intent = match self.status {
            LikeStatus::Unknown => return None,
            LikeStatus::NotLiked => {
                self.status = LikeStatus::Liked;
                self.count = self.count.saturating_add(1);
                LikeIntent::Like
            }
            LikeStatus::Liked => {
                self.status = LikeStatus::NotLiked;
                self.count = self.count.saturating_sub(1);
                LikeIntent::Unlike
            }
        };
        Some(PendingToggle { previous, intent })
    }

    /// Overwrites the displayed count with the store's row count.
    pub fn confirm(&mut self, authoritative: u64) {
        self.count = authoritative;
    }

    pub fn rollback(&mut self, pending: PendingToggle) {
        *self = pending.previous;
    }
}
