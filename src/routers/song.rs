use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use super::root::not_found_route;
use super::AppState;
use crate::controllers::ApiError;
use crate::models::song::SongKey;

/// `/song` family: numeric ids only, lists wrapped under `songs`.
pub fn song_routes() -> Router<AppState> {
    Router::new()
        .route("/song", get(list_songs_route).post(create_song_route))
        .route(
            "/song/{id}",
            get(get_song_route).put(update_song_route).delete(delete_song_route),
        )
}

/// `/songs` family: flexible ids, lists returned as a bare array.
pub fn legacy_song_routes() -> Router<AppState> {
    Router::new()
        .route("/songs", get(list_songs_legacy_route).post(create_song_route))
        .route(
            "/songs/{id}",
            get(get_song_legacy_route)
                .put(update_song_legacy_route)
                .delete(delete_song_legacy_route),
        )
}

pub async fn count_route(State(state): State<AppState>) -> Result<Response, ApiError> {
    let count = state.songs.count().await?;
    Ok((StatusCode::OK, Json(json!({ "count": count }))).into_response())
}

pub async fn list_songs_route(State(state): State<AppState>) -> Result<Response, ApiError> {
    let songs = state.songs.list().await?;
    Ok((StatusCode::OK, Json(json!({ "songs": songs }))).into_response())
}

pub async fn list_songs_legacy_route(State(state): State<AppState>) -> Result<Response, ApiError> {
    let songs = state.songs.list().await?;
    Ok((StatusCode::OK, Json(songs)).into_response())
}

pub async fn create_song_route(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let song = state.songs.create(&body).await?;
    Ok((StatusCode::CREATED, Json(song)).into_response())
}

// Non-numeric `/song/{id}` segments are treated as unknown paths.

pub async fn get_song_route(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let Some(key) = SongKey::from_numeric(&id) else {
        return Ok(not_found_route().await.into_response());
    };
    let song = state.songs.get(&key).await?;
    Ok((StatusCode::OK, Json(song)).into_response())
}

pub async fn update_song_route(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let Some(key) = SongKey::from_numeric(&id) else {
        return Ok(not_found_route().await.into_response());
    };
    let song = state.songs.update(&key, &body).await?;
    Ok((StatusCode::CREATED, Json(song)).into_response())
}

pub async fn delete_song_route(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let Some(key) = SongKey::from_numeric(&id) else {
        return Ok(not_found_route().await.into_response());
    };
    state.songs.delete(&key).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn get_song_legacy_route(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let song = state.songs.get_flexible(&id).await?;
    Ok((StatusCode::OK, Json(song)).into_response())
}

pub async fn update_song_legacy_route(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let song = state.songs.update_flexible(&id, &body).await?;
    Ok((StatusCode::CREATED, Json(song)).into_response())
}

pub async fn delete_song_legacy_route(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    state.songs.delete_flexible(&id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
