use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, IndexModel};
use tracing::{debug, info};

use super::{SongStore, StoreError};
use crate::models::song::SongKey;

const DATABASE_NAME: &str = "songs";
const COLLECTION_NAME: &str = "songs";
const DUPLICATE_KEY: i32 = 11000;

/// MongoDB-backed song store. Cloning is cheap; the driver pools connections.
#[derive(Clone)]
pub struct Database {
    songs: Collection<Document>,
}

impl Database {
    /// Connects and pings the server, which surfaces bad hosts and credentials.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(url).await?;
        let database = client.database(DATABASE_NAME);
        database.run_command(doc! { "ping": 1 }).await?;
        debug!("Pinged MongoDB database {}", DATABASE_NAME);

        Ok(Self {
            songs: database.collection(COLLECTION_NAME),
        })
    }

    /// Numeric application ids are unique at the store level.
    async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .partial_filter_expression(doc! { "id": { "$type": "number" } })
                    .build(),
            )
            .build();
        self.songs.create_index(index).await?;
        info!("Ensured unique index on songs.id");
        Ok(())
    }
}

#[async_trait]
impl SongStore for Database {
    async fn replace_all(&self, songs: Vec<Document>) -> Result<(), StoreError> {
        self.songs.drop().await?;
        // Dropping the collection takes its indexes with it.
        self.ensure_indexes().await?;
        if !songs.is_empty() {
            self.songs.insert_many(songs).await?;
        }
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Document>, StoreError> {
        let cursor = self.songs.find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.songs.count_documents(doc! {}).await?)
    }

    async fn find_one(&self, key: &SongKey) -> Result<Option<Document>, StoreError> {
        Ok(self.songs.find_one(key.filter()).await?)
    }

    async fn insert_one(&self, song: Document) -> Result<ObjectId, StoreError> {
        let result = self.songs.insert_one(song).await?;
        result.inserted_id.as_object_id().ok_or_else(|| {
            StoreError::Backend(format!(
                "unexpected inserted id {:?}",
                result.inserted_id
            ))
        })
    }

    async fn update_one(
        &self,
        key: &SongKey,
        changes: Document,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self
            .songs
            .find_one_and_update(key.filter(), doc! { "$set": changes })
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn delete_one(&self, key: &SongKey) -> Result<u64, StoreError> {
        let result = self.songs.delete_one(key.filter()).await?;
        Ok(result.deleted_count)
    }
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        if is_duplicate_key(&err) {
            return StoreError::Duplicate;
        }
        StoreError::Backend(err.to_string())
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY
        }
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY,
        _ => false,
    }
}
