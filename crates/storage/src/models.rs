use chrono::NaiveDateTime;
use domain::{Comment, CommentId, Pokemon, Post, PostId, Profile, ProfileSummary, UserId};
use sqlx::FromRow;

fn summary(
    username: Option<String>,
    display_name: Option<String>,
    avatar_url: Option<String>,
) -> Option<ProfileSummary> {
    username.map(|username| ProfileSummary {
        username,
        display_name,
        avatar_url,
    })
}

fn string_list(raw: Option<String>) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

pub(crate) fn to_count(n: i64) -> u64 {
    u64::try_from(n).unwrap_or(0)
}

#[derive(FromRow)]
pub struct SqlComment {
    pub id: i64,
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub user_id: String,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,

    // LEFT JOIN profiles
    pub author_username: Option<String>,
    pub author_display_name: Option<String>,
    pub author_avatar_url: Option<String>,
}

impl From<SqlComment> for Comment {
    fn from(sql: SqlComment) -> Self {
        Comment {
            id: CommentId(sql.id),
            post_id: PostId(sql.post_id),
            parent_id: sql.parent_id.map(CommentId),
            author_id: UserId::new_unchecked(sql.user_id),
            author: summary(
                sql.author_username,
                sql.author_display_name,
                sql.author_avatar_url,
            ),
            content: sql.content,
            created_at: sql.created_at,
            updated_at: sql.updated_at,
        }
    }
}

#[derive(FromRow)]
pub struct SqlPost {
    pub id: i64,
    pub user_id: String,
    pub content: String,
    pub image_url: Option<String>,
    pub pokemon_id: Option<String>,
    pub repost_id: Option<i64>,
    pub repost_link: Option<String>,
    pub created_at: NaiveDateTime,
    pub likes_count: i64,
    pub comments_count: i64,

    // LEFT JOIN profiles
    pub author_username: Option<String>,
    pub author_display_name: Option<String>,
    pub author_avatar_url: Option<String>,

    // LEFT JOIN pokemon
    pub pokemon_name: Option<String>,
    pub pokemon_types: Option<String>,
    pub pokemon_abilities: Option<String>,
    pub pokemon_image_url: Option<String>,
    pub pokemon_small_url: Option<String>,
    pub pokemon_artwork: Option<String>,
    pub pokemon_front_gif: Option<String>,
    pub pokemon_back_gif: Option<String>,
}

impl From<SqlPost> for Post {
    fn from(sql: SqlPost) -> Self {
        let pokemon = match (&sql.pokemon_id, sql.pokemon_name) {
            (Some(pokemon_id), Some(name)) => Some(Pokemon {
                pokemon_id: pokemon_id.clone(),
                name,
                types: string_list(sql.pokemon_types),
                abilities: string_list(sql.pokemon_abilities),
                image_url: sql.pokemon_image_url,
                small_url: sql.pokemon_small_url,
                artwork: sql.pokemon_artwork,
                front_gif: sql.pokemon_front_gif,
                back_gif: sql.pokemon_back_gif,
            }),
            _ => None,
        };

        Post {
            id: PostId(sql.id),
            author_id: UserId::new_unchecked(sql.user_id),
            content: sql.content,
            image_url: sql.image_url,
            pokemon_id: sql.pokemon_id,
            repost_id: sql.repost_id.map(PostId),
            repost_link: sql.repost_link,
            created_at: sql.created_at,
            likes_count: to_count(sql.likes_count),
            comments_count: to_count(sql.comments_count),
            author: summary(
                sql.author_username,
                sql.author_display_name,
                sql.author_avatar_url,
            ),
            pokemon,
        }
    }
}

#[derive(FromRow)]
pub struct SqlProfile {
    pub user_id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub created_at: NaiveDateTime,
}

impl From<SqlProfile> for Profile {
    fn from(sql: SqlProfile) -> Self {
        Profile {
            user_id: UserId::new_unchecked(sql.user_id),
            username: sql.username,
            display_name: sql.display_name,
            avatar_url: sql.avatar_url,
            bio: sql.bio,
            created_at: sql.created_at,
        }
    }
}

#[derive(FromRow)]
pub struct SqlPokemon {
    pub pokemon_id: String,
    pub name: String,
    pub types: String,
    pub abilities: String,
    pub image_url: Option<String>,
    pub small_url: Option<String>,
    pub artwork: Option<String>,
    pub front_gif: Option<String>,
    pub back_gif: Option<String>,
}

impl From<SqlPokemon> for Pokemon {
    fn from(sql: SqlPokemon) -> Self {
        Pokemon {
            pokemon_id: sql.pokemon_id,
            name: sql.name,
            types: string_list(Some(sql.types)),
            abilities: string_list(Some(sql.abilities)),
            image_url: sql.image_url,
            small_url: sql.small_url,
            artwork: sql.artwork,
            front_gif: sql.front_gif,
            back_gif: sql.back_gif,
        }
    }
}
