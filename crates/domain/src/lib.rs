mod comment_tree;
mod error;
mod like_counter;
mod models;
mod session;
mod time;

pub use comment_tree::{build_comment_tree, find, flatten, CommentTreeNode};
pub use error::{FeedError, StoreError, StoreResult};
pub use like_counter::{LikeCounterState, LikeIntent, LikeStatus, PendingToggle};
pub use models::{
    Comment, CommentId, NewComment, NewPost, Pokemon, Post, PostCounts, PostEdit, PostId,
    PostQuery, PostSort, Profile, ProfileStats, ProfileSummary, SortOrder, UserId,
};
pub use session::Session;
pub use time::format_distance_to_now;
