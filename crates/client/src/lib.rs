mod feed;
mod http;
mod likes;
mod local;
mod page;
mod store;
mod thread;

#[cfg(test)]
mod testing;

pub use feed::{Feed, ProfileView};
pub use http::HttpStore;
pub use likes::LikeReconciler;
pub use page::PostPage;
pub use store::FeedStore;
pub use thread::{CommentThread, ThreadSnapshot};
