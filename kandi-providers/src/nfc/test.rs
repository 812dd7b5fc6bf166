use std::sync::Arc;

use crate::nfc::{
    error::NfcError,
    imp::simulated::SimulatedNfcPlatform,
    model::{NfcTechnology, TechnologyRequest},
    NfcPlatform,
};

fn ndef_request() -> TechnologyRequest {
    TechnologyRequest {
        technology: NfcTechnology::Ndef,
        alert_message: "Ready to scan NFC tag".to_string(),
    }
}

#[tokio::test]
async fn test_unsupported_device() {
    let platform = SimulatedNfcPlatform::new(false, false);

    assert_eq!(Err(NfcError::NotSupported), platform.start().await);
    assert_eq!(Err(NfcError::NotSupported), platform.is_enabled().await);
}

#[tokio::test]
async fn test_request_requires_start() {
    let platform = SimulatedNfcPlatform::default();

    let result = platform.request_technology(&ndef_request()).await;
    assert!(matches!(result, Err(NfcError::Platform(_))));
}

#[tokio::test]
async fn test_request_on_disabled_radio() {
    let platform = SimulatedNfcPlatform::new(true, false);
    platform.start().await.unwrap();

    assert_eq!(Ok(false), platform.is_enabled().await);
    assert_eq!(
        Err(NfcError::NotEnabled),
        platform.request_technology(&ndef_request()).await
    );
}

#[tokio::test]
async fn test_presented_tag_is_read() {
    let platform = SimulatedNfcPlatform::default();
    platform.start().await.unwrap();
    platform.present_tag("04:A2:19:7C");

    platform.request_technology(&ndef_request()).await.unwrap();
    let reading = platform.read_tag().await.unwrap();
    assert_eq!("04:A2:19:7C", reading.uid);

    platform.cancel_technology_request().await.unwrap();
    assert!(matches!(
        platform.read_tag().await,
        Err(NfcError::Platform(_))
    ));
    assert_eq!(1, platform.request_calls());
    assert_eq!(1, platform.cancel_calls());
}

#[tokio::test]
async fn test_second_request_while_active_is_rejected() {
    let platform = SimulatedNfcPlatform::default();
    platform.start().await.unwrap();
    platform.present_tag("04:A2:19:7C");
    platform.request_technology(&ndef_request()).await.unwrap();

    let result = platform.request_technology(&ndef_request()).await;
    assert!(matches!(result, Err(NfcError::Platform(_))));

    platform.cancel_technology_request().await.unwrap();
    platform.present_tag("04:A2:19:7C");
    assert!(platform.request_technology(&ndef_request()).await.is_ok());
}

#[tokio::test]
async fn test_cancel_wakes_pending_request() {
    let platform = Arc::new(SimulatedNfcPlatform::default());
    platform.start().await.unwrap();

    let pending = tokio::spawn({
        let platform = platform.clone();
        async move { platform.request_technology(&ndef_request()).await }
    });

    while !platform.has_active_request() {
        tokio::task::yield_now().await;
    }
    platform.cancel_technology_request().await.unwrap();

    assert_eq!(Err(NfcError::Cancelled), pending.await.unwrap());
    assert!(!platform.has_active_request());
}

#[tokio::test]
async fn test_presented_error_is_reported() {
    let platform = SimulatedNfcPlatform::default();
    platform.start().await.unwrap();
    platform.present(Err(NfcError::Timeout));

    assert_eq!(
        Err(NfcError::Timeout),
        platform.request_technology(&ndef_request()).await
    );
}
