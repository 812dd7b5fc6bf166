use kandi_providers::nfc::model::NfcTechnology;
use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KandiCoreConfig {
    pub nfc: NfcConfig,
    pub photos: PhotoConfig,
    pub profile: ProfileConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NfcConfig {
    pub technology: NfcTechnology,
    pub alert_message: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhotoConfig {
    /// Blob keys are `{key_prefix}/{tag_uid}_{unix_millis}.jpg`.
    pub key_prefix: String,
    pub require_photo: bool,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileConfig {
    pub default_display_name: String,
}

impl Default for NfcConfig {
    fn default() -> Self {
        Self {
            technology: NfcTechnology::Ndef,
            alert_message: "Ready to scan NFC tag".to_string(),
        }
    }
}

impl Default for PhotoConfig {
    fn default() -> Self {
        Self {
            key_prefix: "kandiPhotos".to_string(),
            require_photo: true,
        }
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            default_display_name: "Unknown".to_string(),
        }
    }
}
