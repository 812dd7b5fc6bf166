use strum::{Display, EnumString};
use time::OffsetDateTime;

use super::{
    macros::{impl_display, impl_string_conversions},
    user::UserId,
};

/// Identifier read from the NFC tag embedded in a kandi.
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TagUid(String);
impl_display!(TagUid);
impl_string_conversions!(TagUid);

#[derive(Debug, Copy, Clone, Display, EnumString, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum HistoryAction {
    Claimed,
    Adopted,
}

/// One waypoint of a kandi's journey.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JourneyEntry {
    pub location: String,
    pub photo: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HistoryEntry {
    pub user_id: UserId,
    pub display_name: String,
    pub action: HistoryAction,
    pub timestamp: OffsetDateTime,
    pub photo: Option<String>,
    pub location: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KandiRecord {
    pub tag_uid: TagUid,
    pub creator_id: UserId,
    pub origin_location: Option<String>,
    pub created_at: Option<OffsetDateTime>,
    pub journey: Vec<JourneyEntry>,
    pub history: Vec<HistoryEntry>,
}

impl KandiRecord {
    /// Actor of the most recent history entry.
    pub fn current_holder(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }

    pub fn has_actor(&self, user_id: &UserId) -> bool {
        self.history.iter().any(|entry| &entry.user_id == user_id)
    }

    /// Journey and history run in parallel, the first entry is the claim and
    /// every later one an adoption.
    pub fn is_consistent(&self) -> bool {
        self.journey.len() == self.history.len()
            && self.history.iter().enumerate().all(|(index, entry)| {
                (index == 0) == (entry.action == HistoryAction::Claimed)
            })
    }
}
