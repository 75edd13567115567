use crate::{error::FeedError, models::UserId};
use std::fmt;

/// The viewer a service call acts on behalf of.
#[derive(Clone, PartialEq, Eq)]
pub enum Session {
    Anonymous,
    Authenticated { user_id: UserId, token: String },
}

impl Session {
    pub fn authenticated(user_id: UserId, token: impl Into<String>) -> Self {
        Self::Authenticated {
            user_id,
            token: token.into(),
        }
    }

    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { user_id, .. } => Some(user_id),
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { token, .. } => Some(token),
        }
    }

    /// Rejects anonymous viewers before anything touches the network.
    pub fn require_user(&self, action: &'static str) -> Result<&UserId, FeedError> {
        self.user_id().ok_or(FeedError::AuthRequired(action))
    }

    pub fn is_author(&self, author_id: &UserId) -> bool {
        self.user_id() == Some(author_id)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str("Anonymous"),
            Self::Authenticated { user_id, .. } => f
                .debug_struct("Authenticated")
                .field("user_id", user_id)
                .field("token", &"<redacted>")
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_is_rejected() {
        let err = Session::Anonymous.require_user("like posts").unwrap_err();
        assert!(matches!(err, FeedError::AuthRequired(_)));
        assert_eq!(err.to_string(), "Please login to like posts");
    }

    #[test]
    fn debug_hides_token() {
        let s = Session::authenticated(UserId::new_unchecked("ash".into()), "s3cret");
        let printed = format!("{:?}", s);
        assert!(printed.contains("ash"));
        assert!(!printed.contains("s3cret"));
        assert!(s.is_author(&UserId::new_unchecked("ash".into())));
    }
}
