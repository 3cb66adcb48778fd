//! Document store access for the songs collection.
//!
//! Handlers only see the [`SongStore`] trait. [`Database`] talks to MongoDB,
//! [`MemoryStore`] keeps the collection in process.

mod memory;
mod mongo;
pub mod seed;

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Document};

use crate::models::song::SongKey;

pub use memory::MemoryStore;
pub use mongo::Database;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A write would give two songs the same numeric `id`.
    #[error("duplicate song id")]
    Duplicate,
    #[error("store error: {0}")]
    Backend(String),
}

/// Operations the song handlers need from the document store.
///
/// Implementations are shared by every in-flight request and must be safe
/// for concurrent use.
#[async_trait]
pub trait SongStore: Send + Sync {
    /// Drops the collection and bulk-loads `songs` in its place.
    async fn replace_all(&self, songs: Vec<Document>) -> Result<(), StoreError>;

    /// All songs in store order.
    async fn find_all(&self) -> Result<Vec<Document>, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    async fn find_one(&self, key: &SongKey) -> Result<Option<Document>, StoreError>;

    /// Inserts `song` and returns the `_id` the store assigned to it.
    async fn insert_one(&self, song: Document) -> Result<ObjectId, StoreError>;

    /// Merges `changes` into the matching song and returns it as stored after
    /// the merge, or `None` if nothing matched.
    async fn update_one(
        &self,
        key: &SongKey,
        changes: Document,
    ) -> Result<Option<Document>, StoreError>;

    /// Deletes at most one matching song and returns how many were removed.
    async fn delete_one(&self, key: &SongKey) -> Result<u64, StoreError>;
}
