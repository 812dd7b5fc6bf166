use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct KandiDocumentDTO {
    pub creator_id: String,
    #[serde(default)]
    pub origin_location: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    #[serde(default)]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub journey: Vec<JourneyEntryDTO>,
    #[serde(default)]
    pub history: Vec<HistoryEntryDTO>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct JourneyEntryDTO {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct HistoryEntryDTO {
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub action: HistoryActionDTO,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(super) enum HistoryActionDTO {
    Claimed,
    Adopted,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UserDocumentDTO {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub profile_photo: Option<String>,
    #[serde(default)]
    pub kandis: Vec<String>,
}
