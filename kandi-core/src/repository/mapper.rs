use kandi_providers::{
    common_models::{
        kandi::{HistoryAction, HistoryEntry, JourneyEntry, KandiRecord, TagUid},
        user::{UserId, UserProfile},
    },
    document_storage::{Collection, Document},
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::{
    dto::{HistoryActionDTO, HistoryEntryDTO, JourneyEntryDTO, KandiDocumentDTO, UserDocumentDTO},
    RepositoryError,
};

impl From<HistoryActionDTO> for HistoryAction {
    fn from(value: HistoryActionDTO) -> Self {
        match value {
            HistoryActionDTO::Claimed => HistoryAction::Claimed,
            HistoryActionDTO::Adopted => HistoryAction::Adopted,
        }
    }
}

impl From<HistoryAction> for HistoryActionDTO {
    fn from(value: HistoryAction) -> Self {
        match value {
            HistoryAction::Claimed => HistoryActionDTO::Claimed,
            HistoryAction::Adopted => HistoryActionDTO::Adopted,
        }
    }
}

impl From<JourneyEntryDTO> for JourneyEntry {
    fn from(value: JourneyEntryDTO) -> Self {
        Self {
            location: value.location.unwrap_or_default(),
            photo: value.photo,
        }
    }
}

impl From<&JourneyEntry> for JourneyEntryDTO {
    fn from(value: &JourneyEntry) -> Self {
        Self {
            location: Some(value.location.to_owned()),
            photo: value.photo.to_owned(),
        }
    }
}

impl From<HistoryEntryDTO> for HistoryEntry {
    fn from(value: HistoryEntryDTO) -> Self {
        Self {
            user_id: value.user_id.into(),
            display_name: value.display_name.unwrap_or_default(),
            action: value.action.into(),
            timestamp: value.timestamp,
            photo: value.photo,
            location: value.location,
        }
    }
}

impl From<&HistoryEntry> for HistoryEntryDTO {
    fn from(value: &HistoryEntry) -> Self {
        Self {
            user_id: value.user_id.to_string(),
            display_name: Some(value.display_name.to_owned()),
            action: value.action.into(),
            timestamp: value.timestamp,
            photo: value.photo.to_owned(),
            location: value.location.to_owned(),
        }
    }
}

pub(super) fn kandi_from_document(
    tag_uid: &TagUid,
    document: Document,
) -> Result<KandiRecord, RepositoryError> {
    let dto: KandiDocumentDTO = from_document(Collection::Kandis, tag_uid.as_str(), document)?;

    if dto.creator_id.trim().is_empty() {
        return Err(RepositoryError::Integrity {
            collection: Collection::Kandis,
            id: tag_uid.to_string(),
            reason: "empty creatorId".to_string(),
        });
    }

    if !matches!(
        dto.history.first(),
        Some(HistoryEntryDTO {
            action: HistoryActionDTO::Claimed,
            ..
        })
    ) {
        return Err(RepositoryError::Integrity {
            collection: Collection::Kandis,
            id: tag_uid.to_string(),
            reason: "history does not start with a claim".to_string(),
        });
    }

    Ok(KandiRecord {
        tag_uid: tag_uid.to_owned(),
        creator_id: dto.creator_id.into(),
        origin_location: dto.origin_location,
        created_at: dto.created_at,
        journey: dto.journey.into_iter().map(Into::into).collect(),
        history: dto.history.into_iter().map(Into::into).collect(),
    })
}

pub(super) fn kandi_to_document(record: &KandiRecord) -> Result<Document, RepositoryError> {
    to_document(&KandiDocumentDTO {
        creator_id: record.creator_id.to_string(),
        origin_location: record.origin_location.to_owned(),
        created_at: record.created_at,
        journey: record.journey.iter().map(Into::into).collect(),
        history: record.history.iter().map(Into::into).collect(),
    })
}

pub(super) fn journey_entry_to_value(entry: &JourneyEntry) -> Result<Value, RepositoryError> {
    Ok(serde_json::to_value(JourneyEntryDTO::from(entry))?)
}

pub(super) fn history_entry_to_value(entry: &HistoryEntry) -> Result<Value, RepositoryError> {
    Ok(serde_json::to_value(HistoryEntryDTO::from(entry))?)
}

pub(super) fn profile_from_document(
    user_id: &UserId,
    document: Document,
) -> Result<UserProfile, RepositoryError> {
    let dto: UserDocumentDTO = from_document(Collection::Users, user_id.as_str(), document)?;

    Ok(UserProfile {
        user_id: user_id.to_owned(),
        display_name: dto.display_name.filter(|name| !name.trim().is_empty()),
        profile_photo: dto.profile_photo,
        kandis: dto.kandis.into_iter().map(Into::into).collect(),
    })
}

fn from_document<T: DeserializeOwned>(
    collection: Collection,
    id: &str,
    document: Document,
) -> Result<T, RepositoryError> {
    serde_json::from_value(Value::Object(document)).map_err(|err| RepositoryError::Integrity {
        collection,
        id: id.to_owned(),
        reason: err.to_string(),
    })
}

fn to_document<T: Serialize>(value: &T) -> Result<Document, RepositoryError> {
    match serde_json::to_value(value)? {
        Value::Object(document) => Ok(document),
        other => Err(RepositoryError::Serialization(serde::ser::Error::custom(
            format!("expected an object, got `{other}`"),
        ))),
    }
}
