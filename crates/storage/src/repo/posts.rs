use crate::{
    models::{to_count, SqlPost},
    Db, WriteOutcome,
};
use chrono::Utc;
use domain::{
    NewPost, Post, PostCounts, PostEdit, PostId, PostQuery, PostSort, SortOrder, UserId,
};

const LIKES_ROWS: &str = "(SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id)";
const COMMENTS_ROWS: &str = "(SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id)";

/// Shared projection: post columns plus author profile and pokemon, with the
/// two count expressions supplied by the caller.
fn select_posts(likes_expr: &str, comments_expr: &str) -> String {
    format!(
        r#"
        SELECT
            p.id, p.user_id, p.content, p.image_url, p.pokemon_id,
            p.repost_id, p.repost_link, p.created_at,
            {likes_expr} AS likes_count,
            {comments_expr} AS comments_count,
            pr.username AS author_username,
            pr.display_name AS author_display_name,
            pr.avatar_url AS author_avatar_url,
            pk.name AS pokemon_name,
            pk.types AS pokemon_types,
            pk.abilities AS pokemon_abilities,
            pk.image_url AS pokemon_image_url,
            pk.small_url AS pokemon_small_url,
            pk.artwork AS pokemon_artwork,
            pk.front_gif AS pokemon_front_gif,
            pk.back_gif AS pokemon_back_gif
        FROM posts p
        LEFT JOIN profiles pr ON pr.user_id = p.user_id
        LEFT JOIN pokemon pk ON pk.pokemon_id = p.pokemon_id
        "#
    )
}

impl Db {
    pub async fn create_post(&self, author: &UserId, new: &NewPost) -> anyhow::Result<Post> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO posts (user_id, content, image_url, pokemon_id, repost_id, repost_link, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(author.as_str())
        .bind(&new.content)
        .bind(&new.image_url)
        .bind(&new.pokemon_id)
        .bind(new.repost_id.map(|p| p.0))
        .bind(&new.repost_link)
        .bind(Utc::now().naive_utc())
        .fetch_one(&self.pool)
        .await?;

        self.get_post(PostId(id))
            .await?
            .ok_or_else(|| anyhow::anyhow!("post {} vanished after insert", id))
    }

    pub async fn get_post(&self, id: PostId) -> anyhow::Result<Option<Post>> {
        let sql = format!(
            "{} WHERE p.id = ?",
            select_posts("p.likes_count", "p.comments_count")
        );
        let row = sqlx::query_as::<_, SqlPost>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    pub async fn delete_post(&self, id: PostId, author: &UserId) -> anyhow::Result<WriteOutcome<()>> {
        match self.post_owner(id).await? {
            None => Ok(WriteOutcome::NotFound),
            Some(owner) if owner != author.as_str() => Ok(WriteOutcome::Forbidden),
            Some(_) => {
                sqlx::query("DELETE FROM posts WHERE id = ?")
                    .bind(id.0)
                    .execute(&self.pool)
                    .await?;
                Ok(WriteOutcome::Done(()))
            }
        }
    }

    /// Replaces content, image and Pokemon tag. Only the author may edit.
    pub async fn update_post(
        &self,
        id: PostId,
        author: &UserId,
        edit: &PostEdit,
    ) -> anyhow::Result<WriteOutcome<Post>> {
        match self.post_owner(id).await? {
            None => return Ok(WriteOutcome::NotFound),
            Some(owner) if owner != author.as_str() => return Ok(WriteOutcome::Forbidden),
            Some(_) => {}
        }

        sqlx::query("UPDATE posts SET content = ?, image_url = ?, pokemon_id = ? WHERE id = ?")
            .bind(&edit.content)
            .bind(&edit.image_url)
            .bind(&edit.pokemon_id)
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        Ok(match self.get_post(id).await? {
            Some(p) => WriteOutcome::Done(p),
            None => WriteOutcome::NotFound,
        })
    }

    /// Lists posts. Sorting by likes or comments orders by the actual row
    /// counts and reports those counts; sorting by date reports the stored
    /// counter columns.
    pub async fn list_posts(&self, query: &PostQuery) -> anyhow::Result<Vec<Post>> {
        let dir = match query.order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        let (likes_expr, comments_expr, order_by) = match query.sort {
            PostSort::CreatedAt => (
                "p.likes_count",
                "p.comments_count",
                format!("p.created_at {dir}, p.id {dir}"),
            ),
            PostSort::LikesCount => (
                LIKES_ROWS,
                COMMENTS_ROWS,
                format!("likes_count {dir}, p.id DESC"),
            ),
            PostSort::CommentsCount => (
                LIKES_ROWS,
                COMMENTS_ROWS,
                format!("comments_count {dir}, p.id DESC"),
            ),
        };

        let sql = format!(
            "{} WHERE (? IS NULL OR p.user_id = ?) ORDER BY {} LIMIT ? OFFSET ?",
            select_posts(likes_expr, comments_expr),
            order_by
        );
        let author = query.user_id.as_ref().map(|u| u.as_str());

        let rows = sqlx::query_as::<_, SqlPost>(&sql)
            .bind(author)
            .bind(author)
            .bind(i64::from(query.limit))
            .bind(i64::from(query.offset))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Row counts for a post, `None` when the post does not exist.
    pub async fn post_counts(&self, id: PostId) -> anyhow::Result<Option<PostCounts>> {
        let row: Option<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM likes WHERE post_id = p.id),
                (SELECT COUNT(*) FROM comments WHERE post_id = p.id)
            FROM posts p
            WHERE p.id = ?
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(likes, comments)| PostCounts {
            likes: to_count(likes),
            comments: to_count(comments),
        }))
    }

    pub async fn increment_likes_count(&self, id: PostId) -> anyhow::Result<bool> {
        self.bump_counter("UPDATE posts SET likes_count = likes_count + 1 WHERE id = ?", id)
            .await
    }

    pub async fn decrement_likes_count(&self, id: PostId) -> anyhow::Result<bool> {
        self.bump_counter(
            "UPDATE posts SET likes_count = MAX(likes_count - 1, 0) WHERE id = ?",
            id,
        )
        .await
    }

    pub async fn increment_comments_count(&self, id: PostId) -> anyhow::Result<bool> {
        self.bump_counter(
            "UPDATE posts SET comments_count = comments_count + 1 WHERE id = ?",
            id,
        )
        .await
    }

    async fn post_owner(&self, id: PostId) -> anyhow::Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT user_id FROM posts WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(owner,)| owner))
    }

    async fn bump_counter(&self, sql: &str, id: PostId) -> anyhow::Result<bool> {
        let res = sqlx::query(sql).bind(id.0).execute(&self.pool).await?;
        Ok(res.rows_affected() > 0)
    }
}
