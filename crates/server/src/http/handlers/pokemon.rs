use axum::{
    extract::{Path, State},
    Json,
};
use domain::Pokemon;
use storage::Db;
use tracing::info;

use super::{content, internal, not_found, ApiResult, Viewer};

pub async fn list_pokemon(State(db): State<Db>) -> ApiResult<Json<Vec<Pokemon>>> {
    let all = db.list_pokemon().await.map_err(internal)?;
    Ok(Json(all))
}

pub async fn get_pokemon(
    State(db): State<Db>,
    Path(pokemon_id): Path<String>,
) -> ApiResult<Json<Pokemon>> {
    match db.get_pokemon(&pokemon_id).await.map_err(internal)? {
        Some(p) => Ok(Json(p)),
        None => Err(not_found(format!("pokemon {}", pokemon_id))),
    }
}

/// Inserts or refreshes the catalog entry named by the path.
pub async fn add_pokemon(
    State(db): State<Db>,
    Viewer(user): Viewer,
    Path(pokemon_id): Path<String>,
    Json(mut p): Json<Pokemon>,
) -> ApiResult<Json<Pokemon>> {
    p.pokemon_id = content(&pokemon_id, "Pokemon needs an id and a name")?;
    p.name = content(&p.name, "Pokemon needs an id and a name")?;

    db.upsert_pokemon(&p).await.map_err(internal)?;
    info!("{} added pokemon {}", user, p.pokemon_id);
    match db.get_pokemon(&p.pokemon_id).await.map_err(internal)? {
        Some(p) => Ok(Json(p)),
        None => Err(not_found(format!("pokemon {}", p.pokemon_id))),
    }
}
