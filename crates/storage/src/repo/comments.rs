use crate::{models::SqlComment, Db, WriteOutcome};
use chrono::Utc;
use domain::{Comment, CommentId, NewComment, PostId, UserId};

const SELECT_COMMENTS: &str = r#"
    SELECT
        c.id, c.post_id, c.parent_id, c.user_id, c.content,
        c.created_at, c.updated_at,
        pr.username AS author_username,
        pr.display_name AS author_display_name,
        pr.avatar_url AS author_avatar_url
    FROM comments c
    LEFT JOIN profiles pr ON pr.user_id = c.user_id
"#;

impl Db {
    /// Inserts a comment and bumps the post's comment counter in the same
    /// transaction.
    pub async fn insert_comment(
        &self,
        author: &UserId,
        new: &NewComment,
    ) -> anyhow::Result<WriteOutcome<Comment>> {
        let mut tx = self.pool.begin().await?;

        let post: Option<(i64,)> = sqlx::query_as("SELECT id FROM posts WHERE id = ?")
            .bind(new.post_id.0)
            .fetch_optional(&mut *tx)
            .await?;
        if post.is_none() {
            return Ok(WriteOutcome::NotFound);
        }

        if let Some(parent) = new.parent_id {
            let parent_post: Option<(i64,)> =
                sqlx::query_as("SELECT post_id FROM comments WHERE id = ?")
                    .bind(parent.0)
                    .fetch_optional(&mut *tx)
                    .await?;
            match parent_post {
                None => return Ok(WriteOutcome::NotFound),
                Some((post_id,)) if post_id != new.post_id.0 => {
                    return Ok(WriteOutcome::Invalid(
                        "parent comment belongs to another post",
                    ))
                }
                Some(_) => {}
            }
        }

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO comments (post_id, parent_id, user_id, content, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(new.post_id.0)
        .bind(new.parent_id.map(|p| p.0))
        .bind(author.as_str())
        .bind(&new.content)
        .bind(Utc::now().naive_utc())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE posts SET comments_count = comments_count + 1 WHERE id = ?")
            .bind(new.post_id.0)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        match self.get_comment(CommentId(id)).await? {
            Some(c) => Ok(WriteOutcome::Done(c)),
            None => Err(anyhow::anyhow!("comment {} vanished after insert", id)),
        }
    }

    pub async fn update_comment(
        &self,
        id: CommentId,
        author: &UserId,
        content: &str,
    ) -> anyhow::Result<WriteOutcome<Comment>> {
        match self.comment_owner(id).await? {
            None => return Ok(WriteOutcome::NotFound),
            Some(owner) if owner != author.as_str() => return Ok(WriteOutcome::Forbidden),
            Some(_) => {}
        }

        sqlx::query("UPDATE comments SET content = ?, updated_at = ? WHERE id = ?")
            .bind(content)
            .bind(Utc::now().naive_utc())
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        Ok(match self.get_comment(id).await? {
            Some(c) => WriteOutcome::Done(c),
            None => WriteOutcome::NotFound,
        })
    }

    /// Hard delete. Replies keep their `parent_id` and drop out of the tree.
    pub async fn delete_comment(
        &self,
        id: CommentId,
        author: &UserId,
    ) -> anyhow::Result<WriteOutcome<()>> {
        match self.comment_owner(id).await? {
            None => return Ok(WriteOutcome::NotFound),
            Some(owner) if owner != author.as_str() => return Ok(WriteOutcome::Forbidden),
            Some(_) => {}
        }

        sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        Ok(WriteOutcome::Done(()))
    }

    pub async fn get_comment(&self, id: CommentId) -> anyhow::Result<Option<Comment>> {
        let sql = format!("{SELECT_COMMENTS} WHERE c.id = ?");
        let row = sqlx::query_as::<_, SqlComment>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// All comments of a post, oldest first.
    pub async fn list_comments(&self, post_id: PostId) -> anyhow::Result<Vec<Comment>> {
        let sql = format!("{SELECT_COMMENTS} WHERE c.post_id = ? ORDER BY c.created_at ASC, c.id ASC");
        let rows = sqlx::query_as::<_, SqlComment>(&sql)
            .bind(post_id.0)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn comment_owner(&self, id: CommentId) -> anyhow::Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT user_id FROM comments WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(owner,)| owner))
    }
}
