use kandi_providers::common_models::{
    kandi::{KandiRecord, TagUid},
    user::UserId,
};
use tracing::{debug, warn};

use crate::{
    config::ProfileConfig,
    model::{Classification, HolderSummary, OwnerSnapshot},
    repository::{KandiRepository, RepositoryError},
    service::error::ClassifierError,
};


/// Decides whether a scanned tag starts a claim, an adoption or is read-only.
#[derive(Clone)]
pub struct TagClassifier {
    repository: KandiRepository,
    config: ProfileConfig,
}

impl TagClassifier {
    pub fn new(repository: KandiRepository, config: ProfileConfig) -> Self {
        Self { repository, config }
    }

    /// `current_user_id` is the user the resulting flow will act as.
    pub async fn classify(
        &self,
        tag_uid: &TagUid,
        current_user_id: &UserId,
    ) -> Result<Classification, ClassifierError> {
        let record = self
            .repository
            .get_kandi(tag_uid)
            .await
            .map_err(|err| lookup_error(tag_uid, err))?;

        let Some(record) = record else {
            debug!(%tag_uid, "unregistered tag");
            return Ok(Classification::NewTag);
        };

        if !record.is_consistent() {
            warn!(
                %tag_uid,
                journey = record.journey.len(),
                history = record.history.len(),
                "journey and history out of step"
            );
        }

        if current_user_id == &record.creator_id {
            return Ok(Classification::OwnFoundTag(record));
        }

        let already_adopted = record.has_actor(current_user_id);
        let current_holder = self.holder_summary(&record).await;

        Ok(Classification::ForeignFoundTag(OwnerSnapshot {
            record,
            current_holder,
            already_adopted,
        }))
    }

    async fn holder_summary(&self, record: &KandiRecord) -> Option<HolderSummary> {
        let holder = record.current_holder()?;

        Some(
            self.summary_of(&holder.user_id, Some(holder.display_name.as_str()))
                .await,
        )
    }

    /// Profile data wins over `fallback_name`; lookup failures only degrade the summary.
    pub(crate) async fn summary_of(
        &self,
        user_id: &UserId,
        fallback_name: Option<&str>,
    ) -> HolderSummary {
        let profile = match self.repository.get_profile(user_id).await {
            Ok(profile) => profile,
            Err(err) => {
                warn!(%user_id, %err, "holder profile lookup failed");
                None
            }
        };

        let fallback = fallback_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.config.default_display_name);

        match profile {
            Some(profile) => HolderSummary {
                user_id: user_id.clone(),
                display_name: profile.display_name.unwrap_or_else(|| fallback.to_owned()),
                profile_photo: profile.profile_photo,
            },
            None => HolderSummary {
                user_id: user_id.clone(),
                display_name: fallback.to_owned(),
                profile_photo: None,
            },
        }
    }
}

fn lookup_error(tag_uid: &TagUid, err: RepositoryError) -> ClassifierError {
    match err {
        RepositoryError::Storage(err) => ClassifierError::LookupFailed(err.to_string()),
        RepositoryError::Integrity { reason, .. } => ClassifierError::DataIntegrity {
            tag_uid: tag_uid.clone(),
            reason,
        },
        RepositoryError::Serialization(err) => ClassifierError::DataIntegrity {
            tag_uid: tag_uid.clone(),
            reason: err.to_string(),
        },
    }
}
