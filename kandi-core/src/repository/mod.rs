//! Typed access to the `kandis` and `users` collections.

use std::sync::Arc;

use kandi_providers::{
    common_models::{
        kandi::{HistoryEntry, JourneyEntry, KandiRecord, TagUid},
        user::{UserId, UserProfile},
    },
    document_storage::{Collection, DocumentStorage, DocumentStorageError, FieldUpdate},
};
use serde_json::Value;
use thiserror::Error;

mod dto;
mod mapper;

#[cfg(test)]
mod test;

const JOURNEY_FIELD: &str = "journey";
const HISTORY_FIELD: &str = "history";
const KANDIS_FIELD: &str = "kandis";

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Document storage error: `{0}`")]
    Storage(#[from] DocumentStorageError),
    #[error("Corrupted document `{collection}/{id}`: {reason}")]
    Integrity {
        collection: Collection,
        id: String,
        reason: String,
    },
    #[error("Serialization error: `{0}`")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct KandiRepository {
    storage: Arc<dyn DocumentStorage>,
}

impl KandiRepository {
    pub fn new(storage: Arc<dyn DocumentStorage>) -> Self {
        Self { storage }
    }

    pub async fn get_kandi(&self, tag_uid: &TagUid) -> Result<Option<KandiRecord>, RepositoryError> {
        self.storage
            .get(Collection::Kandis, tag_uid.as_str())
            .await?
            .map(|document| mapper::kandi_from_document(tag_uid, document))
            .transpose()
    }

    pub async fn get_profile(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserProfile>, RepositoryError> {
        self.storage
            .get(Collection::Users, user_id.as_str())
            .await?
            .map(|document| mapper::profile_from_document(user_id, document))
            .transpose()
    }

    /// Writes the whole record, replacing any document under the same tag.
    pub async fn create_kandi(&self, record: &KandiRecord) -> Result<(), RepositoryError> {
        let document = mapper::kandi_to_document(record)?;

        self.storage
            .set(Collection::Kandis, record.tag_uid.as_str(), document)
            .await?;

        Ok(())
    }

    /// Appends one journey entry and its parallel history entry in a single update.
    pub async fn append_to_kandi(
        &self,
        tag_uid: &TagUid,
        journey: &JourneyEntry,
        history: &HistoryEntry,
    ) -> Result<(), RepositoryError> {
        let updates = vec![
            FieldUpdate::ArrayAppend {
                field: JOURNEY_FIELD.to_string(),
                values: vec![mapper::journey_entry_to_value(journey)?],
            },
            FieldUpdate::ArrayAppend {
                field: HISTORY_FIELD.to_string(),
                values: vec![mapper::history_entry_to_value(history)?],
            },
        ];

        self.storage
            .update(Collection::Kandis, tag_uid.as_str(), updates)
            .await?;

        Ok(())
    }

    /// Set union: linking an already linked tag changes nothing.
    pub async fn link_kandi_to_profile(
        &self,
        user_id: &UserId,
        tag_uid: &TagUid,
    ) -> Result<(), RepositoryError> {
        self.storage
            .update(
                Collection::Users,
                user_id.as_str(),
                vec![FieldUpdate::ArrayUnion {
                    field: KANDIS_FIELD.to_string(),
                    values: vec![Value::String(tag_uid.to_string())],
                }],
            )
            .await?;

        Ok(())
    }
}
