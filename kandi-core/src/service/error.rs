use kandi_providers::{
    blob_storage::BlobStorageError,
    common_models::{kandi::TagUid, user::UserId},
    nfc::error::NfcError,
};
use thiserror::Error;

use crate::{repository::RepositoryError, service::flow::FlowState};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("NFC hardware unavailable: `{0}`")]
    HardwareUnavailable(String),
    #[error("Another scan is already in progress")]
    SessionBusy,
    #[error("Tag read timed out")]
    ReadTimeout,
    #[error("Tag read failed: `{0}`")]
    ReadFailure(String),
    #[error("Scan cancelled")]
    Cancelled,
}

impl From<NfcError> for SessionError {
    fn from(value: NfcError) -> Self {
        match value {
            NfcError::NotSupported | NfcError::NotEnabled => {
                SessionError::HardwareUnavailable(value.to_string())
            }
            NfcError::Timeout => SessionError::ReadTimeout,
            NfcError::Cancelled => SessionError::Cancelled,
            NfcError::InvalidTag(reason) | NfcError::Platform(reason) => {
                SessionError::ReadFailure(reason)
            }
        }
    }
}

impl SessionError {
    /// Only a missing or disabled radio needs the user to act outside the app.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, SessionError::HardwareUnavailable(_))
    }
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Kandi lookup failed: `{0}`")]
    LookupFailed(String),
    #[error("Kandi `{tag_uid}` is corrupted: {reason}")]
    DataIntegrity { tag_uid: TagUid, reason: String },
}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Origin location is required")]
    LocationRequired,
    #[error("A photo is required")]
    PhotoRequired,
    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        state: FlowState,
        action: &'static str,
    },
    #[error("Kandi `{0}` was created by the current user")]
    OwnKandi(TagUid),
    #[error("Kandi `{0}` was already adopted by the current user")]
    AlreadyAdopted(TagUid),
    #[error("Photo upload failed: `{0}`")]
    UploadFailed(#[from] BlobStorageError),
    #[error("Commit failed: `{0}`")]
    CommitFailed(String),
    #[error("Kandi `{tag_uid}` saved but the profile was not updated: {reason}")]
    CommitPartialFailure { tag_uid: TagUid, reason: String },
}

#[derive(Debug, Error)]
pub enum KandiServiceError {
    #[error("No user is signed in")]
    NotSignedIn,
    #[error("Kandi not found: `{0}`")]
    KandiNotFound(TagUid),
    #[error("Profile not found: `{0}`")]
    ProfileNotFound(UserId),
    #[error("Session error: `{0}`")]
    Session(#[from] SessionError),
    #[error("Classifier error: `{0}`")]
    Classifier(#[from] ClassifierError),
    #[error("Flow error: `{0}`")]
    Flow(#[from] FlowError),
    #[error("Repository error: `{0}`")]
    Repository(#[from] RepositoryError),
}

impl SessionError {
    pub fn user_message(&self) -> &'static str {
        match self {
            SessionError::HardwareUnavailable(_) => {
                "NFC is unavailable. Turn on NFC in your device settings and try again."
            }
            SessionError::SessionBusy => "A scan is already in progress.",
            SessionError::ReadTimeout => "No kandi was detected. Try scanning again.",
            SessionError::ReadFailure(_) => "Scan failed. Hold the kandi still and try again.",
            SessionError::Cancelled => "Scan cancelled.",
        }
    }
}

impl FlowError {
    pub fn user_message(&self) -> &'static str {
        match self {
            FlowError::LocationRequired => "Please enter the origin location.",
            FlowError::PhotoRequired => "Please take a photo first.",
            FlowError::InvalidTransition { .. } => "That step is not available right now.",
            FlowError::OwnKandi(_) => "You cannot adopt your own kandi.",
            FlowError::AlreadyAdopted(_) => "You already own this kandi.",
            FlowError::UploadFailed(_) => "Photo upload failed. Try again.",
            FlowError::CommitFailed(_) => "Could not complete action.",
            FlowError::CommitPartialFailure { .. } => {
                "Kandi saved, but it could not be added to your profile yet."
            }
        }
    }
}

impl KandiServiceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            KandiServiceError::NotSignedIn => "You must be signed in.",
            KandiServiceError::KandiNotFound(_) => "Kandi not found.",
            KandiServiceError::ProfileNotFound(_) => "Failed to load profile.",
            KandiServiceError::Session(error) => error.user_message(),
            KandiServiceError::Classifier(ClassifierError::LookupFailed(_)) => {
                "Could not reach the kandi registry. Try scanning again."
            }
            KandiServiceError::Classifier(ClassifierError::DataIntegrity { .. }) => {
                "Kandi data is missing or damaged."
            }
            KandiServiceError::Flow(error) => error.user_message(),
            KandiServiceError::Repository(_) => "Failed to fetch kandi data.",
        }
    }
}
