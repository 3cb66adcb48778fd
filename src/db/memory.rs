use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Document};
use tokio::sync::RwLock;

use super::{SongStore, StoreError};
use crate::models::song::{numeric_id, same_id, SongKey};

/// In-process song store that mirrors the MongoDB adapter's semantics,
/// including the uniqueness of numeric `id` values.
#[derive(Default)]
pub struct MemoryStore {
    songs: RwLock<Vec<Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// True if another song (not at `skip`) already holds the numeric id of `song`.
fn id_taken(songs: &[Document], song: &Document, skip: Option<usize>) -> bool {
    let Some(id) = numeric_id(song) else {
        return false;
    };
    songs
        .iter()
        .enumerate()
        .filter(|(index, _)| Some(*index) != skip)
        .filter_map(|(_, existing)| numeric_id(existing))
        .any(|existing| same_id(existing, id))
}

fn with_object_id(mut song: Document) -> (ObjectId, Document) {
    let oid = song.get_object_id("_id").unwrap_or_else(|_| {
        let oid = ObjectId::new();
        song.insert("_id", oid);
        oid
    });
    (oid, song)
}

#[async_trait]
impl SongStore for MemoryStore {
    async fn replace_all(&self, songs: Vec<Document>) -> Result<(), StoreError> {
        let mut loaded: Vec<Document> = Vec::with_capacity(songs.len());
        for song in songs {
            if id_taken(&loaded, &song, None) {
                return Err(StoreError::Duplicate);
            }
            let (_, song) = with_object_id(song);
            loaded.push(song);
        }
        *self.songs.write().await = loaded;
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Document>, StoreError> {
        Ok(self.songs.read().await.clone())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.songs.read().await.len() as u64)
    }

    async fn find_one(&self, key: &SongKey) -> Result<Option<Document>, StoreError> {
        let songs = self.songs.read().await;
        Ok(songs.iter().find(|song| key.matches(song)).cloned())
    }

    async fn insert_one(&self, song: Document) -> Result<ObjectId, StoreError> {
        let mut songs = self.songs.write().await;
        if id_taken(&songs, &song, None) {
            return Err(StoreError::Duplicate);
        }
        let (oid, song) = with_object_id(song);
        songs.push(song);
        Ok(oid)
    }

    async fn update_one(
        &self,
        key: &SongKey,
        changes: Document,
    ) -> Result<Option<Document>, StoreError> {
        let mut songs = self.songs.write().await;
        let Some(index) = songs.iter().position(|song| key.matches(song)) else {
            return Ok(None);
        };

        // Field names are literal (no dots or `$`), so a shallow insert matches `$set`.
        let mut merged = songs[index].clone();
        for (field, value) in changes {
            merged.insert(field, value);
        }
        if id_taken(&songs, &merged, Some(index)) {
            return Err(StoreError::Duplicate);
        }

        songs[index] = merged.clone();
        Ok(Some(merged))
    }

    async fn delete_one(&self, key: &SongKey) -> Result<u64, StoreError> {
        let mut songs = self.songs.write().await;
        match songs.iter().position(|song| key.matches(song)) {
            Some(index) => {
                songs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, Bson};

    fn by_id(id: i64) -> SongKey {
        SongKey::Id(Bson::Int64(id))
    }

    #[tokio::test]
    async fn should_assign_object_id_on_insert() {
        // given
        let store = MemoryStore::new();

        // when
        let oid = store.insert_one(doc! { "title": "A" }).await.unwrap();

        // then
        let stored = store.find_one(&SongKey::ObjectId(oid)).await.unwrap().unwrap();
        assert_eq!(stored.get_str("title").unwrap(), "A");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn should_reject_duplicate_numeric_id_on_insert() {
        // given
        let store = MemoryStore::new();
        store.insert_one(doc! { "id": 7_i32 }).await.unwrap();

        // when
        let result = store.insert_one(doc! { "id": 7_i64, "title": "B" }).await;

        // then
        assert!(matches!(result, Err(StoreError::Duplicate)));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn should_keep_large_neighbouring_ids_apart() {
        // given
        let store = MemoryStore::new();
        store
            .insert_one(doc! { "id": 9_007_199_254_740_992_i64, "title": "low" })
            .await
            .unwrap();

        // when
        let result = store
            .insert_one(doc! { "id": 9_007_199_254_740_993_i64, "title": "high" })
            .await;

        // then
        assert!(result.is_ok());
        let found = store
            .find_one(&by_id(9_007_199_254_740_993))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.get_str("title").unwrap(), "high");
    }

    #[tokio::test]
    async fn should_allow_repeated_non_numeric_ids() {
        // given
        let store = MemoryStore::new();
        store.insert_one(doc! { "id": "seven" }).await.unwrap();

        // when
        let result = store.insert_one(doc! { "id": "seven" }).await;

        // then
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn should_merge_changes_and_keep_other_fields() {
        // given
        let store = MemoryStore::new();
        let oid = store
            .insert_one(doc! { "id": 1_i64, "title": "A", "artist": "B" })
            .await
            .unwrap();

        // when
        let updated = store
            .update_one(&by_id(1), doc! { "title": "C" })
            .await
            .unwrap()
            .unwrap();

        // then
        assert_eq!(updated.get_object_id("_id").unwrap(), oid);
        assert_eq!(updated.get_str("title").unwrap(), "C");
        assert_eq!(updated.get_str("artist").unwrap(), "B");
    }

    #[tokio::test]
    async fn should_reject_update_onto_taken_id() {
        // given
        let store = MemoryStore::new();
        store.insert_one(doc! { "id": 1_i64 }).await.unwrap();
        store.insert_one(doc! { "id": 2_i64 }).await.unwrap();

        // when
        let result = store.update_one(&by_id(2), doc! { "id": 1_i64 }).await;

        // then
        assert!(matches!(result, Err(StoreError::Duplicate)));
        assert!(store.find_one(&by_id(2)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn should_report_missing_song_on_update_and_delete() {
        // given
        let store = MemoryStore::new();

        // then
        assert!(store.update_one(&by_id(9), doc! { "a": 1 }).await.unwrap().is_none());
        assert_eq!(store.delete_one(&by_id(9)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn should_replace_previous_contents() {
        // given
        let store = MemoryStore::new();
        store.insert_one(doc! { "id": 100_i64 }).await.unwrap();

        // when
        store
            .replace_all(vec![doc! { "id": 1_i64 }, doc! { "id": 2_i64 }])
            .await
            .unwrap();

        // then
        let ids: Vec<i64> = store
            .find_all()
            .await
            .unwrap()
            .iter()
            .map(|song| song.get_i64("id").unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(store.find_all().await.unwrap().iter().all(|song| song.contains_key("_id")));
    }
}
