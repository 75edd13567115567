use domain::{
    FeedError, NewPost, Pokemon, Post, PostEdit, PostId, PostQuery, Profile, ProfileStats,
    Session, UserId,
};
use std::sync::Arc;
use tracing::info;

use crate::store::FeedStore;

const IMAGE_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "gif", "webp", "bmp", "svg", "ico"];

fn post_content(raw: &str) -> Result<String, FeedError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FeedError::Invalid("Post cannot be empty"));
    }
    Ok(trimmed.to_string())
}

/// Blank means no image. Anything else must name an image file; a query
/// string after the extension is allowed.
fn image_url(raw: Option<String>) -> Result<Option<String>, FeedError> {
    let Some(url) = raw.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) else {
        return Ok(None);
    };
    let path = url.split('?').next().unwrap_or_default();
    let ext = path.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext {
        Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => Ok(Some(url)),
        _ => Err(FeedError::Invalid(
            "Image URL must end with a valid image extension",
        )),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    pub profile: Profile,
    pub stats: ProfileStats,
}

/// Post listing, profiles and the Pokemon catalog.
#[derive(Clone)]
pub struct Feed {
    store: Arc<dyn FeedStore>,
}

impl Feed {
    pub fn new(store: Arc<dyn FeedStore>) -> Self {
        Self { store }
    }

    pub async fn posts(&self, query: &PostQuery) -> Result<Vec<Post>, FeedError> {
        self.store
            .list_posts(query)
            .await
            .map_err(|e| FeedError::remote("Failed to load posts", e))
    }

    pub async fn create_post(&self, session: &Session, mut new: NewPost) -> Result<Post, FeedError> {
        session.require_user("create posts")?;
        new.content = post_content(&new.content)?;
        new.image_url = image_url(new.image_url)?;

        let post = self
            .store
            .create_post(session, &new)
            .await
            .map_err(|e| FeedError::remote("Failed to create post", e))?;
        info!("post {} created", post.id);
        Ok(post)
    }

    /// Only the author may edit; the store enforces it.
    pub async fn edit_post(
        &self,
        session: &Session,
        post_id: PostId,
        mut edit: PostEdit,
    ) -> Result<Post, FeedError> {
        session.require_user("edit posts")?;
        edit.content = post_content(&edit.content)?;
        edit.image_url = image_url(edit.image_url)?;

        let post = self
            .store
            .update_post(session, post_id, &edit)
            .await
            .map_err(|e| FeedError::remote("Failed to save post", e))?;
        info!("post {} edited", post.id);
        Ok(post)
    }

    pub async fn delete_post(&self, session: &Session, post_id: PostId) -> Result<(), FeedError> {
        session.require_user("delete posts")?;
        self.store
            .delete_post(session, post_id)
            .await
            .map_err(|e| FeedError::remote("Failed to delete post", e))
    }

    pub async fn profile(&self, user_id: &UserId) -> Result<ProfileView, FeedError> {
        let (profile, stats) = futures::try_join!(
            self.store.get_profile(user_id),
            self.store.profile_stats(user_id)
        )
        .map_err(|e| FeedError::remote("Failed to load profile", e))?;
        Ok(ProfileView { profile, stats })
    }

    pub async fn follow(&self, session: &Session, user_id: &UserId) -> Result<(), FeedError> {
        session.require_user("follow profiles")?;
        self.store
            .follow(session, user_id)
            .await
            .map_err(|e| FeedError::remote("Failed to follow", e))
    }

    pub async fn unfollow(&self, session: &Session, user_id: &UserId) -> Result<(), FeedError> {
        session.require_user("follow profiles")?;
        self.store
            .unfollow(session, user_id)
            .await
            .map_err(|e| FeedError::remote("Failed to unfollow", e))
    }

    pub async fn pokemon(&self) -> Result<Vec<Pokemon>, FeedError> {
        self.store
            .list_pokemon()
            .await
            .map_err(|e| FeedError::remote("Failed to load Pokemon", e))
    }

    /// Adds a Pokemon to the shared catalog so posts can be tagged with it.
    pub async fn add_pokemon(
        &self,
        session: &Session,
        mut pokemon: Pokemon,
    ) -> Result<Pokemon, FeedError> {
        session.require_user("add Pokemon")?;
        pokemon.pokemon_id = pokemon.pokemon_id.trim().to_string();
        pokemon.name = pokemon.name.trim().to_string();
        if pokemon.pokemon_id.is_empty() || pokemon.name.is_empty() {
            return Err(FeedError::Invalid("Pokemon needs an id and a name"));
        }

        self.store
            .add_pokemon(session, &pokemon)
            .await
            .map_err(|e| FeedError::remote("Failed to add Pokemon", e))
    }
}
