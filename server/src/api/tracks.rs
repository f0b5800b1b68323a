use axum::extract::State;
use entity::{NewTrack, Track};
use serde::Deserialize;
use serde_json::Value;

use crate::api::{
    extract::{Json, Query},
    AppState, Error,
};
use crate::store::{create_record, Filter, ID_FIELD};

pub static COLLECTION: &str = "track";

#[derive(Deserialize)]
pub struct TracksQuery {
    #[serde(default = "default_limit")]
    limit: u64,
    artist: Option<String>,
}

fn default_limit() -> u64 {
    50
}

pub async fn tracks(
    State(state): State<AppState>,
    Query(query): Query<TracksQuery>,
) -> Result<Json<Vec<Track>>, Error> {
    let mut filter = Filter::new();
    if let Some(artist) = query.artist {
        filter.insert("artist".to_string(), Value::String(artist));
    }
    let documents = state
        .store()?
        .get_documents(COLLECTION, &filter, query.limit)
        .await?;
    let tracks = documents
        .into_iter()
        .map(|mut document| {
            document.remove(ID_FIELD);
            Track::from_document(document).map_err(Error::Corrupt)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(tracks))
}

/// Stores a new track. The response echoes the stored fields, not the identifier.
pub async fn create_track(
    State(state): State<AppState>,
    Json(payload): Json<NewTrack>,
) -> Result<Json<Track>, Error> {
    let track = Track::create(payload)?;
    let id = create_record(state.store()?, COLLECTION, &track).await?;
    tracing::info! {%id, title = %track.title, artist = %track.artist, "Created track"};
    Ok(Json(track))
}
