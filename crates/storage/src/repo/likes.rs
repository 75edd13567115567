use crate::{Db, WriteOutcome};
use chrono::Utc;
use domain::{PostId, UserId};

impl Db {
    pub async fn has_liked(&self, post_id: PostId, user_id: &UserId) -> anyhow::Result<bool> {
        let (liked,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM likes WHERE post_id = ? AND user_id = ?)")
                .bind(post_id.0)
                .bind(user_id.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(liked)
    }

    /// Inserts the like row only. The stored counter is maintained by the
    /// separate counter procedures. An existing row counts as done, so a
    /// toggle whose counter call failed can be repeated.
    pub async fn insert_like(
        &self,
        post_id: PostId,
        user_id: &UserId,
    ) -> anyhow::Result<WriteOutcome<()>> {
        let res = sqlx::query(
            r#"
            INSERT INTO likes (post_id, user_id, created_at)
            SELECT id, ?, ? FROM posts WHERE id = ?
            ON CONFLICT(post_id, user_id) DO NOTHING
            "#,
        )
        .bind(user_id.as_str())
        .bind(Utc::now().naive_utc())
        .bind(post_id.0)
        .execute(&self.pool)
        .await?;

        if res.rows_affected() == 0 && self.post_counts(post_id).await?.is_none() {
            return Ok(WriteOutcome::NotFound);
        }
        Ok(WriteOutcome::Done(()))
    }

    pub async fn delete_like(&self, post_id: PostId, user_id: &UserId) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM likes WHERE post_id = ? AND user_id = ?")
            .bind(post_id.0)
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{testing, WriteOutcome};
    use domain::{NewPost, PostId};

    #[tokio::test]
    async fn like_rows_do_not_touch_stored_counter() {
        let db = testing::db().await;
        let ash = testing::user(&db, "ash").await;
        let post = db
            .create_post(
                &ash,
                &NewPost {
                    content: "Bulbasaur".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(!db.has_liked(post.id, &ash).await.unwrap());
        assert_eq!(db.insert_like(post.id, &ash).await.unwrap(), WriteOutcome::Done(()));
        assert!(db.has_liked(post.id, &ash).await.unwrap());
        assert_eq!(db.insert_like(post.id, &ash).await.unwrap(), WriteOutcome::Done(()));
        assert_eq!(db.post_counts(post.id).await.unwrap().unwrap().likes, 1);

        assert_eq!(db.get_post(post.id).await.unwrap().unwrap().likes_count, 0);
        assert_eq!(db.post_counts(post.id).await.unwrap().unwrap().likes, 1);

        db.delete_like(post.id, &ash).await.unwrap();
        db.delete_like(post.id, &ash).await.unwrap();
        assert!(!db.has_liked(post.id, &ash).await.unwrap());

        assert_eq!(
            db.insert_like(PostId(404), &ash).await.unwrap(),
            WriteOutcome::NotFound
        );
    }
}
