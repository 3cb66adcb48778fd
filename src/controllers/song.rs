use std::sync::Arc;

use mongodb::bson::{Bson, Document};
use serde_json::Value;
use tracing::{debug, error, info};

use super::error::ApiError;
use crate::db::{SongStore, StoreError};
use crate::models::song::{self, KeyError, SongKey};

const NOT_FOUND: &str = "song not found";
const NOT_FOUND_LEGACY: &str = "Song not found";
const INTERNAL: &str = "Internal server error";

/// Song CRUD on top of a [`SongStore`].
///
/// Operations come in two flavours: the numeric `/song/{id}` family takes an
/// already resolved [`SongKey`], the `/songs/{id}` family takes the raw path
/// segment and resolves it itself.
pub struct SongController {
    store: Arc<dyn SongStore>,
}

/// Logs the underlying store failure and hides it behind `message`.
fn internal(context: &str, message: &str) -> impl FnOnce(StoreError) -> ApiError + use<> {
    let context = context.to_string();
    let message = message.to_string();
    move |e| {
        error!("{}: {}", context, e);
        ApiError::Internal(message)
    }
}

fn duplicate(id: &Bson) -> ApiError {
    let shown = match id {
        Bson::String(s) => s.clone(),
        other => other.clone().into_relaxed_extjson().to_string(),
    };
    ApiError::Conflict(format!("song with id {} already present", shown))
}

impl SongController {
    pub fn new(store: Arc<dyn SongStore>) -> Self {
        SongController { store }
    }

    pub async fn list(&self) -> Result<Vec<Value>, ApiError> {
        let songs = self
            .store
            .find_all()
            .await
            .map_err(internal("Error fetching songs", INTERNAL))?;
        Ok(songs.into_iter().map(song::to_json).collect())
    }

    pub async fn count(&self) -> Result<u64, ApiError> {
        self.store
            .count()
            .await
            .map_err(internal("Error counting songs", INTERNAL))
    }

    /// GET /song/{id}
    pub async fn get(&self, key: &SongKey) -> Result<Value, ApiError> {
        self.find(key, NOT_FOUND).await
    }

    /// GET /songs/{id}. Ids that are neither digits nor an ObjectId simply match nothing.
    pub async fn get_flexible(&self, raw_id: &str) -> Result<Value, ApiError> {
        match SongKey::from_flexible(raw_id) {
            Ok(key) => self.find(&key, NOT_FOUND_LEGACY).await,
            Err(_) => {
                debug!("Song id {:?} cannot match any song", raw_id);
                Err(ApiError::NotFound(NOT_FOUND_LEGACY.to_string()))
            }
        }
    }

    async fn find(&self, key: &SongKey, not_found: &str) -> Result<Value, ApiError> {
        let found = self
            .store
            .find_one(key)
            .await
            .map_err(internal("Error fetching song", INTERNAL))?;
        found
            .map(song::to_json)
            .ok_or_else(|| ApiError::NotFound(not_found.to_string()))
    }

    /// Stores a new song.
    ///
    /// A song carrying an `id` that is already taken is refused. The lookup
    /// and the insert are separate store calls; if a concurrent create slips
    /// between them the store's unique index rejects the insert, which is
    /// reported the same way.
    pub async fn create(&self, payload: &[u8]) -> Result<Value, ApiError> {
        let new_song = song::parse_payload(payload)?;
        let failed = "Failed to create song";

        let requested_id = new_song.get("id").filter(|id| !matches!(id, Bson::Null)).cloned();
        if let Some(id) = &requested_id {
            let existing = self
                .store
                .find_one(&SongKey::Id(id.clone()))
                .await
                .map_err(internal("Error creating song", failed))?;
            if existing.is_some() {
                return Err(duplicate(id));
            }
        }

        let oid = match self.store.insert_one(new_song).await {
            Ok(oid) => oid,
            Err(StoreError::Duplicate) => {
                info!("Concurrent create claimed song id {:?} first", requested_id);
                return Err(duplicate(requested_id.as_ref().unwrap_or(&Bson::Null)));
            }
            Err(e) => return Err(internal("Error creating song", failed)(e)),
        };

        let stored = self
            .store
            .find_one(&SongKey::ObjectId(oid))
            .await
            .map_err(internal("Error creating song", failed))?;
        stored.map(song::to_json).ok_or_else(|| {
            error!("Error creating song: {} vanished right after insert", oid);
            ApiError::Internal(failed.to_string())
        })
    }

    /// PUT /song/{id}
    pub async fn update(&self, key: &SongKey, payload: &[u8]) -> Result<Value, ApiError> {
        let changes = song::parse_payload(payload)?;
        self.merge(key, changes).await
    }

    /// PUT /songs/{id}. Unlike get and delete, an id that cannot be resolved
    /// is reported to the client as a bad request.
    pub async fn update_flexible(&self, raw_id: &str, payload: &[u8]) -> Result<Value, ApiError> {
        let changes = song::parse_payload(payload)?;
        let key = SongKey::from_flexible(raw_id)
            .map_err(|_| ApiError::BadRequest("Invalid song ID format".to_string()))?;
        self.merge(&key, changes).await
    }

    async fn merge(&self, key: &SongKey, changes: Document) -> Result<Value, ApiError> {
        let new_id = changes.get("id").cloned();
        match self.store.update_one(key, changes).await {
            Ok(Some(updated)) => Ok(song::to_json(updated)),
            Ok(None) => Err(ApiError::NotFound(NOT_FOUND.to_string())),
            Err(StoreError::Duplicate) => Err(duplicate(new_id.as_ref().unwrap_or(&Bson::Null))),
            Err(e) => Err(internal("Error updating song", "Failed to update song")(e)),
        }
    }

    /// DELETE /song/{id}
    pub async fn delete(&self, key: &SongKey) -> Result<(), ApiError> {
        self.remove(key, NOT_FOUND).await
    }

    /// DELETE /songs/{id}
    pub async fn delete_flexible(&self, raw_id: &str) -> Result<(), ApiError> {
        match SongKey::from_flexible(raw_id) {
            Ok(key) => self.remove(&key, NOT_FOUND_LEGACY).await,
            Err(KeyError::OutOfRange | KeyError::Malformed) => {
                Err(ApiError::NotFound(NOT_FOUND_LEGACY.to_string()))
            }
        }
    }

    async fn remove(&self, key: &SongKey, not_found: &str) -> Result<(), ApiError> {
        let deleted = self
            .store
            .delete_one(key)
            .await
            .map_err(internal("Error deleting song", "Failed to delete song"))?;
        if deleted == 0 {
            return Err(ApiError::NotFound(not_found.to_string()));
        }
        Ok(())
    }
}
