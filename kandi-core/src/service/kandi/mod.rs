//! Entry point for the host UI: scanning, kandi details and profile pages.

use std::sync::Arc;

use kandi_providers::{
    common_models::{
        kandi::{KandiRecord, TagUid},
        user::UserId,
    },
    identity::IdentityProvider,
};
use tracing::{info, warn};

use crate::{
    model::{ActivityEntry, Classification, FlowKind, KandiDetails, ProfileSummary, TimelineEntry},
    repository::{KandiRepository, RepositoryError},
    service::{
        classifier::TagClassifier,
        error::KandiServiceError,
        flow::{ClaimFlow, FlowController},
        session::HardwareSessionManager,
    },
};

#[cfg(test)]
mod test;

#[derive(Debug)]
pub enum ScanOutcome {
    Claim(ClaimFlow),
    Adopt(ClaimFlow),
    /// The scanning user created this kandi; shown read-only.
    Owned(KandiDetails),
}

pub struct KandiService {
    session_manager: Arc<HardwareSessionManager>,
    classifier: TagClassifier,
    flow_controller: FlowController,
    repository: KandiRepository,
    identity: Arc<dyn IdentityProvider>,
}

impl KandiService {
    pub fn new(
        session_manager: Arc<HardwareSessionManager>,
        classifier: TagClassifier,
        flow_controller: FlowController,
        repository: KandiRepository,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            session_manager,
            classifier,
            flow_controller,
            repository,
            identity,
        }
    }

    /// Reads one tag and routes it to a claim, an adoption or the detail view.
    pub async fn scan(&self) -> Result<ScanOutcome, KandiServiceError> {
        let actor = self
            .identity
            .current_user()
            .ok_or(KandiServiceError::NotSignedIn)?;

        let reading = self.session_manager.acquire_and_read(None).await?;
        let tag_uid = TagUid::from(reading.uid);

        let classification = self
            .classifier
            .classify(&tag_uid, &actor.user_id)
            .await?;
        if let Classification::OwnFoundTag(record) = classification {
            info!(%tag_uid, user_id = %actor.user_id, "own kandi scanned");
            return Ok(ScanOutcome::Owned(self.details_of(record).await));
        }

        let flow = self.flow_controller.start(tag_uid, actor, classification)?;

        Ok(match flow.kind() {
            FlowKind::Claim => ScanOutcome::Claim(flow),
            FlowKind::Adopt => ScanOutcome::Adopt(flow),
        })
    }

    /// Aborts a pending scan. Also called when the app goes to the background.
    pub async fn cancel_scan(&self) {
        self.session_manager.release().await;
    }

    pub async fn kandi_details(&self, tag_uid: &TagUid) -> Result<KandiDetails, KandiServiceError> {
        let record = self
            .repository
            .get_kandi(tag_uid)
            .await?
            .ok_or_else(|| KandiServiceError::KandiNotFound(tag_uid.clone()))?;

        Ok(self.details_of(record).await)
    }

    pub async fn profile_summary(
        &self,
        user_id: &UserId,
    ) -> Result<ProfileSummary, KandiServiceError> {
        let profile = self
            .repository
            .get_profile(user_id)
            .await?
            .ok_or_else(|| KandiServiceError::ProfileNotFound(user_id.clone()))?;

        let mut kandis = Vec::with_capacity(profile.kandis.len());
        for tag_uid in &profile.kandis {
            match self.repository.get_kandi(tag_uid).await {
                Ok(Some(record)) => kandis.push(record),
                Ok(None) => warn!(%user_id, %tag_uid, "profile references a missing kandi"),
                Err(RepositoryError::Integrity { reason, .. }) => {
                    warn!(%user_id, %tag_uid, %reason, "skipping corrupted kandi")
                }
                Err(err) => return Err(err.into()),
            }
        }

        let mut activity: Vec<ActivityEntry> = kandis
            .iter()
            .flat_map(|record| {
                record
                    .history
                    .iter()
                    .filter(|entry| &entry.user_id == user_id)
                    .map(|entry| ActivityEntry {
                        tag_uid: record.tag_uid.clone(),
                        history: entry.clone(),
                    })
            })
            .collect();
        activity.sort_by(|a, b| b.history.timestamp.cmp(&a.history.timestamp));

        Ok(ProfileSummary {
            profile,
            kandis,
            activity,
        })
    }

    pub async fn my_profile(&self) -> Result<ProfileSummary, KandiServiceError> {
        let user = self
            .identity
            .current_user()
            .ok_or(KandiServiceError::NotSignedIn)?;

        self.profile_summary(&user.user_id).await
    }

    async fn details_of(&self, record: KandiRecord) -> KandiDetails {
        let recorded_name = record
            .history
            .first()
            .filter(|entry| entry.user_id == record.creator_id)
            .map(|entry| entry.display_name.as_str());
        let creator = self
            .classifier
            .summary_of(&record.creator_id, recorded_name)
            .await;

        let timeline = record
            .history
            .iter()
            .enumerate()
            .rev()
            .map(|(index, history)| TimelineEntry {
                history: history.clone(),
                journey: record.journey.get(index).cloned(),
            })
            .collect();

        KandiDetails {
            record,
            creator,
            timeline,
        }
    }
}
