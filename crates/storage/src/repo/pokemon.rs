use crate::{models::SqlPokemon, Db};
use domain::Pokemon;

const SELECT_POKEMON: &str = r#"
    SELECT pokemon_id, name, types, abilities, image_url, small_url, artwork, front_gif, back_gif
    FROM pokemon
"#;

impl Db {
    pub async fn list_pokemon(&self) -> anyhow::Result<Vec<Pokemon>> {
        let sql = format!("{SELECT_POKEMON} ORDER BY id ASC");
        let rows = sqlx::query_as::<_, SqlPokemon>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get_pokemon(&self, pokemon_id: &str) -> anyhow::Result<Option<Pokemon>> {
        let sql = format!("{SELECT_POKEMON} WHERE pokemon_id = ?");
        let row = sqlx::query_as::<_, SqlPokemon>(&sql)
            .bind(pokemon_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    pub async fn upsert_pokemon(&self, p: &Pokemon) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO pokemon (
                pokemon_id, name, types, abilities,
                image_url, small_url, artwork, front_gif, back_gif
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(pokemon_id) DO UPDATE SET
                name = excluded.name,
                types = excluded.types,
                abilities = excluded.abilities,
                image_url = excluded.image_url,
                small_url = excluded.small_url,
                artwork = excluded.artwork,
                front_gif = excluded.front_gif,
                back_gif = excluded.back_gif
            "#,
        )
        .bind(&p.pokemon_id)
        .bind(&p.name)
        .bind(serde_json::to_string(&p.types)?)
        .bind(serde_json::to_string(&p.abilities)?)
        .bind(&p.image_url)
        .bind(&p.small_url)
        .bind(&p.artwork)
        .bind(&p.front_gif)
        .bind(&p.back_gif)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::testing;
    use domain::Pokemon;

    fn mon(id: &str, name: &str) -> Pokemon {
        Pokemon {
            pokemon_id: id.into(),
            name: name.into(),
            types: vec!["water".into()],
            abilities: vec!["torrent".into(), "rain-dish".into()],
            image_url: None,
            small_url: Some(format!("https://sprites.example/{}.png", id)),
            artwork: None,
            front_gif: None,
            back_gif: None,
        }
    }

    #[tokio::test]
    async fn catalog_keeps_insertion_order() {
        let db = testing::db().await;
        db.upsert_pokemon(&mon("7", "squirtle")).await.unwrap();
        db.upsert_pokemon(&mon("1", "bulbasaur")).await.unwrap();
        db.upsert_pokemon(&mon("7", "squirtle")).await.unwrap();

        let all = db.list_pokemon().await.unwrap();
        let names: Vec<_> = all.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["squirtle", "bulbasaur"]);

        let squirtle = db.get_pokemon("7").await.unwrap().unwrap();
        assert_eq!(squirtle, mon("7", "squirtle"));
        assert!(db.get_pokemon("999").await.unwrap().is_none());
    }
}
