use std::sync::Arc;

use kandi_providers::{
    blob_storage::imp::in_memory::InMemoryBlobStorage,
    common_models::kandi::{HistoryAction, TagUid},
    document_storage::{in_memory::InMemoryDocumentStorage, Collection, DocumentStorage},
    identity::{imp::fixed::FixedIdentityProvider, AuthenticatedUser},
    nfc::imp::simulated::SimulatedNfcPlatform,
};
use serde_json::json;

use super::ScanOutcome;
use crate::{
    service::{
        error::{FlowError, KandiServiceError, SessionError},
        flow::{ClaimFlow, FlowState},
        session::SessionState,
    },
    Collaborators, KandiCore,
};

const TAG: &str = "04:A2:19";

struct Harness {
    nfc: Arc<SimulatedNfcPlatform>,
    storage: InMemoryDocumentStorage,
    identity: Arc<FixedIdentityProvider>,
    core: KandiCore,
}

async fn harness() -> Harness {
    let nfc = Arc::new(SimulatedNfcPlatform::default());
    let storage = InMemoryDocumentStorage::default();
    let identity = Arc::new(FixedIdentityProvider::default());

    for (user_id, name) in [("alice", "Alice"), ("bob", "Bob")] {
        storage
            .set(
                Collection::Users,
                user_id,
                json!({ "displayName": name, "kandis": [] })
                    .as_object()
                    .unwrap()
                    .clone(),
            )
            .await
            .unwrap();
    }

    let core = KandiCore::new(
        None,
        Collaborators {
            nfc: nfc.clone(),
            document_storage: Arc::new(storage.clone()),
            blob_storage: Arc::new(InMemoryBlobStorage::default()),
            identity: identity.clone(),
        },
    );

    Harness {
        nfc,
        storage,
        identity,
        core,
    }
}

impl Harness {
    fn sign_in(&self, user_id: &str) {
        self.identity.switch_user(Some(AuthenticatedUser {
            user_id: user_id.into(),
            display_name: None,
        }));
    }

    async fn scan(&self, tag_uid: &str) -> Result<ScanOutcome, KandiServiceError> {
        self.nfc.present_tag(tag_uid);
        self.core.kandi_service.scan().await
    }
}

async fn complete(mut flow: ClaimFlow, location: &str, photo: &str) {
    flow.set_location(location).unwrap();
    flow.confirm_location().unwrap();
    flow.attach_photo(photo).unwrap();
    flow.submit().await.unwrap();
    assert_eq!(FlowState::Committed, flow.state());
}

#[tokio::test]
async fn test_scan_requires_sign_in() {
    let harness = harness().await;

    let result = harness.core.kandi_service.scan().await;

    let err = result.unwrap_err();
    assert!(matches!(err, KandiServiceError::NotSignedIn));
    assert_eq!("You must be signed in.", err.user_message());
    assert_eq!(0, harness.nfc.request_calls());
}

#[tokio::test]
async fn test_claim_rescan_and_adopt() {
    let harness = harness().await;
    harness.sign_in("alice");

    let ScanOutcome::Claim(flow) = harness.scan(TAG).await.unwrap() else {
        panic!("expected a claim");
    };
    complete(flow, "EDC Las Vegas", "/tmp/p1.jpg").await;

    let ScanOutcome::Owned(details) = harness.scan(TAG).await.unwrap() else {
        panic!("expected own kandi");
    };
    assert_eq!(1, details.timeline.len());
    assert_eq!("Alice", details.creator.display_name);

    harness.sign_in("bob");
    let ScanOutcome::Adopt(flow) = harness.scan(TAG).await.unwrap() else {
        panic!("expected an adoption");
    };
    let owner = flow.owner().unwrap();
    assert_eq!(1, owner.record.history.len());
    assert_eq!("Alice", owner.current_holder.as_ref().unwrap().display_name);
    complete(flow, "", "/tmp/p2.jpg").await;

    let details = harness
        .core
        .kandi_service
        .kandi_details(&TAG.into())
        .await
        .unwrap();
    assert!(details.record.is_consistent());
    assert_eq!("alice", details.creator.user_id.as_str());
    assert_eq!(2, details.timeline.len());
    assert_eq!("bob", details.timeline[0].history.user_id.as_str());
    assert_eq!(HistoryAction::Adopted, details.timeline[0].history.action);
    assert_eq!(
        Some(""),
        details.timeline[0]
            .journey
            .as_ref()
            .map(|entry| entry.location.as_str())
    );
    assert_eq!(HistoryAction::Claimed, details.timeline[1].history.action);

    assert_eq!(3, harness.nfc.cancel_calls());
    assert_eq!(SessionState::Ready, harness.core.session_manager.state());
}

#[tokio::test]
async fn test_second_adoption_is_refused() {
    let harness = harness().await;
    harness.sign_in("alice");
    let ScanOutcome::Claim(flow) = harness.scan(TAG).await.unwrap() else {
        panic!("expected a claim");
    };
    complete(flow, "EDC Las Vegas", "/tmp/p1.jpg").await;

    harness.sign_in("bob");
    let ScanOutcome::Adopt(flow) = harness.scan(TAG).await.unwrap() else {
        panic!("expected an adoption");
    };
    complete(flow, "Tomorrowland", "/tmp/p2.jpg").await;

    let err = harness.scan(TAG).await.unwrap_err();
    assert!(matches!(
        err,
        KandiServiceError::Flow(FlowError::AlreadyAdopted(_))
    ));
    assert_eq!("You already own this kandi.", err.user_message());
}

#[tokio::test]
async fn test_cancelled_flow_leaves_tag_unclaimed() {
    let harness = harness().await;
    harness.sign_in("alice");

    let ScanOutcome::Claim(mut flow) = harness.scan(TAG).await.unwrap() else {
        panic!("expected a claim");
    };
    flow.set_location("EDC Las Vegas").unwrap();
    flow.confirm_location().unwrap();
    flow.cancel().unwrap();

    assert_eq!(0, harness.storage.document_count(Collection::Kandis).await);
    assert!(matches!(
        harness.scan(TAG).await.unwrap(),
        ScanOutcome::Claim(_)
    ));
}

#[tokio::test]
async fn test_cancelled_scan_can_be_retried() {
    let harness = Arc::new(harness().await);
    harness.sign_in("alice");

    let pending = tokio::spawn({
        let harness = harness.clone();
        async move { harness.core.kandi_service.scan().await }
    });
    for _ in 0..100 {
        if harness.nfc.has_active_request() {
            break;
        }
        tokio::task::yield_now().await;
    }

    harness.core.kandi_service.cancel_scan().await;

    let err = pending.await.unwrap().unwrap_err();
    assert!(matches!(
        err,
        KandiServiceError::Session(SessionError::Cancelled)
    ));
    assert_eq!("Scan cancelled.", err.user_message());
    assert_eq!(1, harness.nfc.cancel_calls());

    assert!(matches!(
        harness.scan(TAG).await.unwrap(),
        ScanOutcome::Claim(_)
    ));
}

#[tokio::test]
async fn test_sign_out_during_scan_keeps_scanning_user() {
    let harness = Arc::new(harness().await);
    harness.sign_in("alice");
    let ScanOutcome::Claim(flow) = harness.scan(TAG).await.unwrap() else {
        panic!("expected a claim");
    };
    complete(flow, "EDC Las Vegas", "/tmp/p1.jpg").await;

    let pending = tokio::spawn({
        let harness = harness.clone();
        async move { harness.core.kandi_service.scan().await }
    });
    for _ in 0..100 {
        if harness.nfc.has_active_request() {
            break;
        }
        tokio::task::yield_now().await;
    }

    harness.identity.switch_user(None);
    harness.nfc.present_tag(TAG);

    let ScanOutcome::Owned(details) = pending.await.unwrap().unwrap() else {
        panic!("expected own kandi");
    };
    assert_eq!(1, details.record.history.len());
    assert_eq!(1, details.timeline.len());
}

#[tokio::test]
async fn test_details_of_unknown_kandi() {
    let harness = harness().await;

    let result = harness
        .core
        .kandi_service
        .kandi_details(&TAG.into())
        .await;

    assert!(matches!(result, Err(KandiServiceError::KandiNotFound(_))));
}

#[tokio::test]
async fn test_profile_summary() {
    let harness = harness().await;
    harness.sign_in("alice");
    for (tag_uid, location) in [("04:A2:19", "EDC Las Vegas"), ("04:B7:33", "Tomorrowland")] {
        let ScanOutcome::Claim(flow) = harness.scan(tag_uid).await.unwrap() else {
            panic!("expected a claim");
        };
        complete(flow, location, "/tmp/p.jpg").await;
    }

    harness.sign_in("bob");
    let ScanOutcome::Adopt(flow) = harness.scan("04:B7:33").await.unwrap() else {
        panic!("expected an adoption");
    };
    complete(flow, "", "/tmp/q.jpg").await;

    let alice = harness
        .core
        .kandi_service
        .profile_summary(&"alice".into())
        .await
        .unwrap();
    assert_eq!(2, alice.kandis.len());
    assert_eq!(2, alice.activity.len());
    assert!(alice.activity[0].history.timestamp >= alice.activity[1].history.timestamp);
    assert!(alice
        .activity
        .iter()
        .all(|entry| entry.history.action == HistoryAction::Claimed));

    let bob = harness.core.kandi_service.my_profile().await.unwrap();
    assert_eq!(vec![TagUid::from("04:B7:33")], bob.profile.kandis);
    assert_eq!(1, bob.activity.len());
    assert_eq!(HistoryAction::Adopted, bob.activity[0].history.action);
    assert_eq!(TagUid::from("04:B7:33"), bob.activity[0].tag_uid);
}

#[tokio::test]
async fn test_profile_with_missing_kandi_and_unknown_profile() {
    let harness = harness().await;
    harness
        .storage
        .set(
            Collection::Users,
            "carol",
            json!({ "displayName": "Carol", "kandis": ["04:FF:00"] })
                .as_object()
                .unwrap()
                .clone(),
        )
        .await
        .unwrap();

    let carol = harness
        .core
        .kandi_service
        .profile_summary(&"carol".into())
        .await
        .unwrap();
    assert!(carol.kandis.is_empty());
    assert!(carol.activity.is_empty());

    let result = harness
        .core
        .kandi_service
        .profile_summary(&"ghost".into())
        .await;
    assert!(matches!(result, Err(KandiServiceError::ProfileNotFound(_))));
}
