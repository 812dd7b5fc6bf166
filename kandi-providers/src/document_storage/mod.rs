//! Remote document store holding the `kandis` and `users` collections.

use serde_json::Value;
use strum::Display;
use thiserror::Error;

pub mod in_memory;


pub type Document = serde_json::Map<String, Value>;

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait DocumentStorage: Send + Sync {
    async fn get(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document>, DocumentStorageError>;

    /// Creates the document or replaces it entirely.
    async fn set(
        &self,
        collection: Collection,
        id: &str,
        document: Document,
    ) -> Result<(), DocumentStorageError>;

    /// Applies all updates to an existing document or none of them.
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        updates: Vec<FieldUpdate>,
    ) -> Result<(), DocumentStorageError>;
}

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Hash)]
pub enum Collection {
    #[strum(serialize = "kandis")]
    Kandis,
    #[strum(serialize = "users")]
    Users,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FieldUpdate {
    Set { field: String, value: Value },
    /// Appends every value, duplicates included.
    ArrayAppend { field: String, values: Vec<Value> },
    /// Appends only the values not already present.
    ArrayUnion { field: String, values: Vec<Value> },
}

impl FieldUpdate {
    pub fn field(&self) -> &str {
        match self {
            FieldUpdate::Set { field, .. }
            | FieldUpdate::ArrayAppend { field, .. }
            | FieldUpdate::ArrayUnion { field, .. } => field,
        }
    }
}

#[derive(Clone, Error, Debug)]
pub enum DocumentStorageError {
    #[error("Document not found: `{collection}/{id}`")]
    NotFound { collection: Collection, id: String },
    #[error("Field `{0}` is not an array")]
    NotAnArray(String),
    #[error("Get error: `{0}`")]
    Get(String),
    #[error("Set error: `{0}`")]
    Set(String),
    #[error("Update error: `{0}`")]
    Update(String),
}
