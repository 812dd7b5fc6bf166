use kandi_providers::common_models::{
    kandi::{HistoryEntry, JourneyEntry, KandiRecord, TagUid},
    user::{UserId, UserProfile},
};
use strum_macros::{Display, EnumString};

#[derive(Debug, Copy, Clone, Display, EnumString, PartialEq, Eq, PartialOrd, Ord)]
pub enum FlowKind {
    #[strum(serialize = "CLAIM")]
    Claim,
    #[strum(serialize = "ADOPT")]
    Adopt,
}

/// Which flow a scanned tag leads to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classification {
    NewTag,
    /// Created by the scanning user; read-only.
    OwnFoundTag(KandiRecord),
    ForeignFoundTag(OwnerSnapshot),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnerSnapshot {
    pub record: KandiRecord,
    pub current_holder: Option<HolderSummary>,
    /// The scanning user already appears in the history.
    pub already_adopted: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HolderSummary {
    pub user_id: UserId,
    pub display_name: String,
    pub profile_photo: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KandiDetails {
    pub record: KandiRecord,
    pub creator: HolderSummary,
    /// Newest first.
    pub timeline: Vec<TimelineEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimelineEntry {
    pub history: HistoryEntry,
    pub journey: Option<JourneyEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileSummary {
    pub profile: UserProfile,
    pub kandis: Vec<KandiRecord>,
    /// The user's own history entries across `kandis`, newest first.
    pub activity: Vec<ActivityEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivityEntry {
    pub tag_uid: TagUid,
    pub history: HistoryEntry,
}
