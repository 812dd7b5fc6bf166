use super::{
    kandi::TagUid,
    macros::{impl_display, impl_string_conversions},
};

#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct UserId(String);
impl_display!(UserId);
impl_string_conversions!(UserId);

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserProfile {
    pub user_id: UserId,
    pub display_name: Option<String>,
    pub profile_photo: Option<String>,

    // Relations:
    pub kandis: Vec<TagUid>,
}

impl UserProfile {
    pub fn holds(&self, tag_uid: &TagUid) -> bool {
        self.kandis.contains(tag_uid)
    }
}
