use crate::{
    models::{to_count, SqlProfile},
    Db,
};
use chrono::Utc;
use domain::{Profile, ProfileStats, UserId};

impl Db {
    pub async fn get_profile(&self, user_id: &UserId) -> anyhow::Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, SqlProfile>(
            r#"
            SELECT user_id, username, display_name, avatar_url, bio, created_at
            FROM profiles
            WHERE user_id = ?
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile.map(Into::into))
    }

    // Provisioning only; editing a profile goes through the hosted UI.
    pub async fn upsert_profile(
        &self,
        user_id: &UserId,
        username: &str,
        display_name: Option<&str>,
        avatar_url: Option<&str>,
    ) -> anyhow::Result<()> {
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, username, display_name, avatar_url, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                username = excluded.username,
                display_name = excluded.display_name,
                avatar_url = excluded.avatar_url
            "#,
        )
        .bind(user_id.as_str())
        .bind(username)
        .bind(display_name)
        .bind(avatar_url)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn profile_stats(&self, user_id: &UserId) -> anyhow::Result<ProfileStats> {
        let (posts, comments, followers, following): (i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM posts WHERE user_id = ?),
                (SELECT COUNT(*) FROM comments WHERE user_id = ?),
                (SELECT COUNT(*) FROM follows WHERE following_id = ?),
                (SELECT COUNT(*) FROM follows WHERE follower_id = ?)
            "#,
        )
        .bind(user_id.as_str())
        .bind(user_id.as_str())
        .bind(user_id.as_str())
        .bind(user_id.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(ProfileStats {
            posts: to_count(posts),
            comments: to_count(comments),
            followers: to_count(followers),
            following: to_count(following),
        })
    }

    /// Returns false when `following` has no profile.
    pub async fn follow(&self, follower: &UserId, following: &UserId) -> anyhow::Result<bool> {
        if self.get_profile(following).await?.is_none() {
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO follows (follower_id, following_id, created_at)
            VALUES (?, ?, ?)
            ON CONFLICT(follower_id, following_id) DO NOTHING
            "#,
        )
        .bind(follower.as_str())
        .bind(following.as_str())
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(true)
    }

    pub async fn unfollow(&self, follower: &UserId, following: &UserId) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM follows WHERE follower_id = ? AND following_id = ?")
            .bind(follower.as_str())
            .bind(following.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
