use thiserror::Error;

/// Failure reported by a backend store call.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("session is missing or expired")]
    Unauthorized,
    #[error("only the author may change this")]
    Forbidden,
    #[error("rejected by store: {0}")]
    Rejected(String),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure surfaced to the viewer. Every variant is terminal for the call
/// that produced it; nothing is retried.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Please login to {0}")]
    AuthRequired(&'static str),
    #[error("{0} not found")]
    NotFound(String),
    #[error("You can only change your own content")]
    Forbidden,
    #[error("{0}")]
    Invalid(&'static str),
    #[error("{notice}")]
    Remote {
        notice: &'static str,
        #[source]
        source: StoreError,
    },
}

impl FeedError {
    /// Maps a store failure onto the taxonomy, using `notice` as the
    /// user-visible message for backend failures.
    pub fn remote(notice: &'static str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => Self::NotFound(what),
            StoreError::Forbidden => Self::Forbidden,
            StoreError::Unauthorized => Self::AuthRequired("continue"),
            other => Self::Remote {
                notice,
                source: other,
            },
        }
    }
}
