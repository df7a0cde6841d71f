use mongodb::{
    Client, Collection,
    bson::{DateTime as BsonDateTime, Document, doc},
};

use crate::canary::record::ResultRecord;

use super::{ResultStore, StoreError};

/// Writes result records into a MongoDB collection, keyed by run timestamp.
pub struct MongoStore {
    collection: Collection<Document>,
}

impl MongoStore {
    /// Connect using a MongoDB connection string. The driver connects lazily, so this
    /// only fails on a malformed URI.
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        let collection = client.database(database).collection::<Document>(collection);
        tracing::debug!(database, collection = %collection.name(), "result store ready");
        Ok(Self { collection })
    }
}

impl ResultStore for MongoStore {
    async fn insert(&self, record: &ResultRecord) -> Result<(), StoreError> {
        self.collection.insert_one(to_document(record)).await?;
        Ok(())
    }
}

/// The persisted document. Field names are part of the external contract.
pub fn to_document(record: &ResultRecord) -> Document {
    doc! {
        "_id": BsonDateTime::from_millis(record.timestamp.timestamp_millis()),
        "connection_success": record.connection_success,
        "probe_success": record.probe_success,
        "error": record.error.as_str(),
        "connection_latency_ms": record.connection_latency_ms,
    }
}
