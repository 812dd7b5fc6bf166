//! Per-scan claim/adopt interaction: location, then photo, then submit.

use std::sync::Arc;

use kandi_providers::{
    blob_storage::{to_file_uri, BlobStorage, BlobStorageError},
    common_models::kandi::{HistoryAction, HistoryEntry, JourneyEntry, KandiRecord, TagUid},
    identity::AuthenticatedUser,
};
use strum_macros::Display;
use time::OffsetDateTime;
use tracing::{debug, error, info, warn};

use crate::{
    config::{PhotoConfig, ProfileConfig},
    model::{Classification, FlowKind, OwnerSnapshot},
    repository::KandiRepository,
    service::error::FlowError,
};


#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum FlowState {
    AwaitingLocation,
    AwaitingPhoto,
    Submitting,
    Committed,
    Failed,
    Cancelled,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClaimDraft {
    pub location: String,
    /// Local path or `file://` URI of the pending photo.
    pub photo: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitReceipt {
    pub tag_uid: TagUid,
    pub kind: FlowKind,
    pub journey_entry: JourneyEntry,
    pub history_entry: HistoryEntry,
}

/// Starts flows for classified tags.
#[derive(Clone)]
pub struct FlowController {
    context: Arc<FlowContext>,
}

impl FlowController {
    pub fn new(
        repository: KandiRepository,
        blob_storage: Arc<dyn BlobStorage>,
        photos: PhotoConfig,
        profile: ProfileConfig,
    ) -> Self {
        Self {
            context: Arc::new(FlowContext {
                repository,
                blob_storage,
                photos,
                profile,
            }),
        }
    }

    /// A tag created by `actor`, or one `actor` adopted before, does not start a flow.
    pub fn start(
        &self,
        tag_uid: TagUid,
        actor: AuthenticatedUser,
        classification: Classification,
    ) -> Result<ClaimFlow, FlowError> {
        let (kind, owner) = match classification {
            Classification::NewTag => (FlowKind::Claim, None),
            Classification::OwnFoundTag(_) => return Err(FlowError::OwnKandi(tag_uid)),
            Classification::ForeignFoundTag(snapshot) if snapshot.already_adopted => {
                return Err(FlowError::AlreadyAdopted(tag_uid))
            }
            Classification::ForeignFoundTag(snapshot) => (FlowKind::Adopt, Some(snapshot)),
        };

        info!(%tag_uid, user_id = %actor.user_id, %kind, "flow started");

        Ok(ClaimFlow {
            kind,
            tag_uid,
            actor,
            owner,
            state: FlowState::AwaitingLocation,
            draft: ClaimDraft::default(),
            context: self.context.clone(),
        })
    }
}

pub struct ClaimFlow {
    kind: FlowKind,
    tag_uid: TagUid,
    actor: AuthenticatedUser,
    owner: Option<OwnerSnapshot>,
    state: FlowState,
    draft: ClaimDraft,
    context: Arc<FlowContext>,
}

impl std::fmt::Debug for ClaimFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimFlow")
            .field("kind", &self.kind)
            .field("tag_uid", &self.tag_uid)
            .field("state", &self.state)
            .field("draft", &self.draft)
            .finish()
    }
}

impl ClaimFlow {
    pub fn kind(&self) -> FlowKind {
        self.kind
    }

    pub fn tag_uid(&self) -> &TagUid {
        &self.tag_uid
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn draft(&self) -> &ClaimDraft {
        &self.draft
    }

    /// Current holder of an adopted kandi, for display before confirming.
    pub fn owner(&self) -> Option<&OwnerSnapshot> {
        self.owner.as_ref()
    }

    pub fn set_location(&mut self, location: impl Into<String>) -> Result<(), FlowError> {
        self.expect_state(FlowState::AwaitingLocation, "set location")?;
        self.draft.location = location.into();
        Ok(())
    }

    pub fn confirm_location(&mut self) -> Result<(), FlowError> {
        self.expect_state(FlowState::AwaitingLocation, "confirm location")?;

        let location = self.draft.location.trim();
        if location.is_empty() && self.kind == FlowKind::Claim {
            return Err(FlowError::LocationRequired);
        }

        self.draft.location = location.to_owned();
        self.state = FlowState::AwaitingPhoto;

        Ok(())
    }

    /// Replaces any pending photo.
    pub fn attach_photo(&mut self, local_uri: impl Into<String>) -> Result<(), FlowError> {
        self.expect_state(FlowState::AwaitingPhoto, "attach photo")?;

        if self.draft.photo.replace(local_uri.into()).is_some() {
            debug!(tag_uid = %self.tag_uid, "pending photo replaced");
        }

        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), FlowError> {
        match self.state {
            FlowState::AwaitingLocation | FlowState::AwaitingPhoto => {
                self.state = FlowState::Cancelled;
                self.draft = ClaimDraft::default();
                info!(tag_uid = %self.tag_uid, kind = %self.kind, "flow cancelled");
                Ok(())
            }
            state => Err(FlowError::InvalidTransition {
                state,
                action: "cancel",
            }),
        }
    }

    /// Uploads the photo, writes the record, then links it to the actor's
    /// profile. The work runs on its own task and completes even if the
    /// returned future is dropped.
    pub async fn submit(&mut self) -> Result<CommitReceipt, FlowError> {
        self.expect_state(FlowState::AwaitingPhoto, "submit")?;

        if self.draft.photo.is_none() && self.context.photos.require_photo {
            return Err(FlowError::PhotoRequired);
        }

        self.state = FlowState::Submitting;

        let submission = Submission {
            kind: self.kind,
            tag_uid: self.tag_uid.clone(),
            actor: self.actor.clone(),
            draft: self.draft.clone(),
            timestamp: OffsetDateTime::now_utc(),
        };
        let context = self.context.clone();

        let result = tokio::spawn(async move { context.commit(submission).await })
            .await
            .unwrap_or_else(|err| Err(FlowError::CommitFailed(err.to_string())));

        match result {
            Ok(receipt) => {
                self.state = FlowState::Committed;
                self.draft = ClaimDraft::default();
                Ok(receipt)
            }
            Err(err @ FlowError::UploadFailed(_)) => {
                self.state = FlowState::AwaitingPhoto;
                Err(err)
            }
            Err(err) => {
                self.state = FlowState::Failed;
                Err(err)
            }
        }
    }

    fn expect_state(&self, expected: FlowState, action: &'static str) -> Result<(), FlowError> {
        if self.state != expected {
            return Err(FlowError::InvalidTransition {
                state: self.state,
                action,
            });
        }
        Ok(())
    }
}

struct Submission {
    kind: FlowKind,
    tag_uid: TagUid,
    actor: AuthenticatedUser,
    draft: ClaimDraft,
    timestamp: OffsetDateTime,
}

struct FlowContext {
    repository: KandiRepository,
    blob_storage: Arc<dyn BlobStorage>,
    photos: PhotoConfig,
    profile: ProfileConfig,
}

impl FlowContext {
    async fn commit(&self, submission: Submission) -> Result<CommitReceipt, FlowError> {
        let Submission {
            kind,
            tag_uid,
            actor,
            draft,
            timestamp,
        } = submission;

        let photo_url = match &draft.photo {
            Some(local) => Some(self.upload_photo(&tag_uid, local, timestamp).await?),
            None => None,
        };
        let display_name = self.display_name_of(&actor).await;

        let journey_entry = JourneyEntry {
            location: draft.location.clone(),
            photo: photo_url.clone(),
        };
        let history_entry = HistoryEntry {
            user_id: actor.user_id.clone(),
            display_name,
            action: match kind {
                FlowKind::Claim => HistoryAction::Claimed,
                FlowKind::Adopt => HistoryAction::Adopted,
            },
            timestamp,
            photo: photo_url,
            location: Some(draft.location).filter(|location| !location.is_empty()),
        };

        let written = match kind {
            FlowKind::Claim => {
                self.repository
                    .create_kandi(&KandiRecord {
                        tag_uid: tag_uid.clone(),
                        creator_id: actor.user_id.clone(),
                        origin_location: Some(journey_entry.location.clone()),
                        created_at: Some(timestamp),
                        journey: vec![journey_entry.clone()],
                        history: vec![history_entry.clone()],
                    })
                    .await
            }
            FlowKind::Adopt => {
                self.repository
                    .append_to_kandi(&tag_uid, &journey_entry, &history_entry)
                    .await
            }
        };
        if let Err(err) = written {
            error!(%tag_uid, %kind, %err, "kandi write failed");
            return Err(FlowError::CommitFailed(err.to_string()));
        }

        if let Err(err) = self
            .repository
            .link_kandi_to_profile(&actor.user_id, &tag_uid)
            .await
        {
            error!(%tag_uid, user_id = %actor.user_id, %err, "profile link failed after kandi write");
            return Err(FlowError::CommitPartialFailure {
                tag_uid,
                reason: err.to_string(),
            });
        }

        info!(%tag_uid, user_id = %actor.user_id, %kind, "kandi committed");

        Ok(CommitReceipt {
            tag_uid,
            kind,
            journey_entry,
            history_entry,
        })
    }

    async fn upload_photo(
        &self,
        tag_uid: &TagUid,
        local: &str,
        timestamp: OffsetDateTime,
    ) -> Result<String, BlobStorageError> {
        let key = format!(
            "{}/{}_{}.jpg",
            self.photos.key_prefix,
            tag_uid,
            timestamp.unix_timestamp_nanos() / 1_000_000
        );

        self.blob_storage
            .upload(&to_file_uri(local), &key)
            .await
            .inspect_err(|err| warn!(%tag_uid, %key, %err, "photo upload failed"))
    }

    /// Profile name, then the identity's name, then the configured default.
    async fn display_name_of(&self, actor: &AuthenticatedUser) -> String {
        let profile_name = match self.repository.get_profile(&actor.user_id).await {
            Ok(profile) => profile.and_then(|profile| profile.display_name),
            Err(err) => {
                warn!(user_id = %actor.user_id, %err, "actor profile lookup failed");
                None
            }
        };

        profile_name
            .or_else(|| {
                actor
                    .display_name
                    .clone()
                    .filter(|name| !name.trim().is_empty())
            })
            .unwrap_or_else(|| self.profile.default_display_name.clone())
    }
}
