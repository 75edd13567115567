use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(s: impl Into<String>) -> Result<Self, String> {
        let s = s.into();
        if s.is_empty() {
            return Err("User ID cannot be empty.".to_string());
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err("User ID contains invalid characters.".to_string());
        }
        if s.len() > 64 {
            return Err("User ID is too long (max 64 chars).".to_string());
        }
        Ok(Self(s))
    }

    pub fn new_unchecked(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! row_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

row_id!(PostId);
row_id!(CommentId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Profile {
    pub fn summary(&self) -> ProfileSummary {
        ProfileSummary {
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileStats {
    pub posts: u64,
    pub comments: u64,
    pub followers: u64,
    pub following: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub parent_id: Option<CommentId>,
    pub author_id: UserId,
    pub author: Option<ProfileSummary>,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

impl Comment {
    pub fn is_edited(&self) -> bool {
        matches!(self.updated_at, Some(t) if t != self.created_at)
    }

    /// Name shown next to the comment.
    pub fn author_label(&self) -> &str {
        self.author
            .as_ref()
            .and_then(|p| p.display_name.as_deref())
            .unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub post_id: PostId,
    pub content: String,
    pub parent_id: Option<CommentId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pokemon {
    pub pokemon_id: String,
    pub name: String,
    pub types: Vec<String>,
    pub abilities: Vec<String>,
    pub image_url: Option<String>,
    pub small_url: Option<String>,
    pub artwork: Option<String>,
    pub front_gif: Option<String>,
    pub back_gif: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub content: String,
    pub image_url: Option<String>,
    pub pokemon_id: Option<String>,
    pub repost_id: Option<PostId>,
    pub repost_link: Option<String>,
    pub created_at: NaiveDateTime,
    pub likes_count: u64,
    pub comments_count: u64,
    pub author: Option<ProfileSummary>,
    pub pokemon: Option<Pokemon>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub content: String,
    pub image_url: Option<String>,
    pub pokemon_id: Option<String>,
    pub repost_id: Option<PostId>,
    pub repost_link: Option<String>,
}

/// Replacement for the editable part of a post. Reposts are fixed at creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostEdit {
    pub content: String,
    pub image_url: Option<String>,
    pub pokemon_id: Option<String>,
}

/// Authoritative counts, obtained by counting rows rather than reading the
/// stored counter columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCounts {
    pub likes: u64,
    pub comments: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostSort {
    #[default]
    CreatedAt,
    LikesCount,
    CommentsCount,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostQuery {
    pub sort: PostSort,
    pub order: SortOrder,
    pub limit: u32,
    pub offset: u32,
    pub user_id: Option<UserId>,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            sort: PostSort::CreatedAt,
            order: SortOrder::Desc,
            limit: 10,
            offset: 0,
            user_id: None,
        }
    }
}
