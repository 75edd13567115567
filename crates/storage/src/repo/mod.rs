mod comments;
mod likes;
mod pokemon;
mod posts;
mod profiles;
mod sessions;
