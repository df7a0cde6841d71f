//! Persistence collaborator for result records.

pub mod mongo;

use thiserror::Error;

use crate::canary::record::ResultRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("mongodb error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// Raised only by the in-memory store used in tests.
    #[cfg(test)]
    #[error("store rejected write: {0}")]
    Rejected(String),
}

/// A sink for result records. One call inserts one document; there is no upsert.
#[allow(async_fn_in_trait)]
pub trait ResultStore {
    async fn insert(&self, record: &ResultRecord) -> Result<(), StoreError>;
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Keeps every inserted record. Can be told to reject writes.
    #[derive(Default)]
    pub struct MemoryStore {
        records: Mutex<Vec<ResultRecord>>,
        reject_with: Option<String>,
    }

    impl MemoryStore {
        pub fn rejecting(message: &str) -> Self {
            Self {
                records: Mutex::default(),
                reject_with: Some(message.to_string()),
            }
        }

        pub fn records(&self) -> Vec<ResultRecord> {
            self.records.lock().unwrap().clone()
        }
    }

    impl ResultStore for MemoryStore {
        async fn insert(&self, record: &ResultRecord) -> Result<(), StoreError> {
            if let Some(message) = &self.reject_with {
                return Err(StoreError::Rejected(message.clone()));
            }
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }
}
