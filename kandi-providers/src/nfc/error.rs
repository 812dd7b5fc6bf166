//! Enumerates errors reported by the NFC platform.

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NfcError {
    #[error("NFC is not supported on this device")]
    NotSupported,
    #[error("NFC is disabled")]
    NotEnabled,
    #[error("Tag read timed out")]
    Timeout,
    #[error("Technology request cancelled")]
    Cancelled,
    #[error("Invalid tag: `{0}`")]
    InvalidTag(String),
    #[error("Platform error: `{0}`")]
    Platform(String),
}
