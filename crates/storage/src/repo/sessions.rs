use crate::Db;
use chrono::Utc;
use domain::UserId;
use sha2::{Digest, Sha256};

fn token_hash(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

impl Db {
    /// Mints a bearer token for an existing profile. Only the hash is stored.
    pub async fn issue_session(&self, user_id: &UserId) -> anyhow::Result<String> {
        let token = hex::encode(rand::random::<[u8; 32]>());

        sqlx::query("INSERT INTO sessions (token_hash, user_id, created_at) VALUES (?, ?, ?)")
            .bind(token_hash(&token))
            .bind(user_id.as_str())
            .bind(Utc::now().naive_utc())
            .execute(&self.pool)
            .await?;

        Ok(token)
    }

    pub async fn resolve_session(&self, token: &str) -> anyhow::Result<Option<UserId>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT user_id FROM sessions WHERE token_hash = ?")
                .bind(token_hash(token))
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(id,)| UserId::new_unchecked(id)))
    }
}

#[cfg(test)]
mod tests {
    use crate::testing;

    #[tokio::test]
    async fn tokens_resolve_to_their_user() {
        let db = testing::db().await;
        let ash = testing::user(&db, "ash").await;

        let token = db.issue_session(&ash).await.unwrap();
        assert_eq!(token.len(), 64);
        assert_eq!(db.resolve_session(&token).await.unwrap(), Some(ash.clone()));
        assert_ne!(db.issue_session(&ash).await.unwrap(), token);
        assert!(db.resolve_session("not-a-token").await.unwrap().is_none());
    }
}
