//! `struct`s and `enum`s for the NFC platform.

use serde::Deserialize;
use strum::{Display, EnumString};

#[derive(Debug, Copy, Clone, Default, Display, EnumString, Deserialize, PartialEq, Eq)]
pub enum NfcTechnology {
    #[default]
    #[strum(serialize = "Ndef")]
    Ndef,
    #[strum(serialize = "NfcA")]
    NfcA,
    #[strum(serialize = "MifareUltralight")]
    MifareUltralight,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TechnologyRequest {
    pub technology: NfcTechnology,
    /// Text of the system scan sheet, where the platform shows one.
    pub alert_message: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagReading {
    pub uid: String,
    pub payload: Option<Vec<NdefRecord>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NdefRecord {
    pub tnf: u8,
    pub record_type: Vec<u8>,
    pub payload: Vec<u8>,
}
