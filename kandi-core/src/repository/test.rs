use std::sync::Arc;

use kandi_providers::{
    common_models::kandi::{HistoryAction, HistoryEntry, JourneyEntry, KandiRecord, TagUid},
    document_storage::{
        in_memory::InMemoryDocumentStorage, Collection, Document, DocumentStorage,
        DocumentStorageError, MockDocumentStorage,
    },
};
use serde_json::{json, Value};
use time::macros::datetime;

use super::{KandiRepository, RepositoryError};

fn document(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

fn stored_kandi() -> Value {
    json!({
        "creatorId": "alice",
        "originLocation": "EDC Las Vegas",
        "createdAt": "2025-05-17T21:30:00Z",
        "journey": [
            { "location": "EDC Las Vegas", "photo": "https://cdn.example/p1.jpg" }
        ],
        "history": [
            {
                "userId": "alice",
                "displayName": "Alice",
                "action": "claimed",
                "timestamp": "2025-05-17T21:30:00Z",
                "photo": "https://cdn.example/p1.jpg",
                "location": "EDC Las Vegas"
            }
        ]
    })
}

async fn repository_with(tag_uid: &str, value: Value) -> (KandiRepository, InMemoryDocumentStorage) {
    let storage = InMemoryDocumentStorage::default();
    storage
        .set(Collection::Kandis, tag_uid, document(value))
        .await
        .unwrap();

    (KandiRepository::new(Arc::new(storage.clone())), storage)
}

#[tokio::test]
async fn test_get_missing_kandi() {
    let repository = KandiRepository::new(Arc::new(InMemoryDocumentStorage::default()));

    let result = repository.get_kandi(&"04:A2:19".into()).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_get_kandi_maps_document() {
    let (repository, _) = repository_with("04:A2:19", stored_kandi()).await;

    let record = repository
        .get_kandi(&"04:A2:19".into())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(TagUid::from("04:A2:19"), record.tag_uid);
    assert_eq!("alice", record.creator_id.as_str());
    assert_eq!(Some("EDC Las Vegas".to_string()), record.origin_location);
    assert_eq!(Some(datetime!(2025-05-17 21:30 UTC)), record.created_at);
    assert_eq!(1, record.journey.len());
    assert_eq!(HistoryAction::Claimed, record.history[0].action);
    assert_eq!("Alice", record.history[0].display_name);
    assert!(record.is_consistent());
}

#[tokio::test]
async fn test_get_kandi_without_creator_is_integrity_error() {
    let mut value = stored_kandi();
    value.as_object_mut().unwrap().remove("creatorId");
    let (repository, _) = repository_with("04:A2:19", value).await;

    let result = repository.get_kandi(&"04:A2:19".into()).await;
    assert!(matches!(
        result,
        Err(RepositoryError::Integrity {
            collection: Collection::Kandis,
            ..
        })
    ));
}

#[tokio::test]
async fn test_get_kandi_with_blank_creator_is_integrity_error() {
    let mut value = stored_kandi();
    value["creatorId"] = json!("  ");
    let (repository, _) = repository_with("04:A2:19", value).await;

    let result = repository.get_kandi(&"04:A2:19".into()).await;
    assert!(matches!(result, Err(RepositoryError::Integrity { .. })));
}

#[tokio::test]
async fn test_get_kandi_with_unknown_action_is_integrity_error() {
    let mut value = stored_kandi();
    value["history"][0]["action"] = json!("stolen");
    let (repository, _) = repository_with("04:A2:19", value).await;

    let result = repository.get_kandi(&"04:A2:19".into()).await;
    assert!(matches!(result, Err(RepositoryError::Integrity { .. })));
}

#[tokio::test]
async fn test_get_kandi_not_starting_with_claim_is_integrity_error() {
    let mut adopted_first = stored_kandi();
    adopted_first["history"][0]["action"] = json!("adopted");
    let mut without_history = stored_kandi();
    without_history["journey"] = json!([]);
    without_history["history"] = json!([]);

    for value in [adopted_first, without_history] {
        let (repository, _) = repository_with("04:A2:19", value).await;

        let result = repository.get_kandi(&"04:A2:19".into()).await;
        assert!(matches!(
            result,
            Err(RepositoryError::Integrity { collection: Collection::Kandis, .. })
        ));
    }
}

#[tokio::test]
async fn test_create_then_append() {
    let storage = InMemoryDocumentStorage::default();
    let repository = KandiRepository::new(Arc::new(storage.clone()));
    let tag_uid = TagUid::from("04:A2:19");

    let claimed_at = datetime!(2025-05-17 21:30 UTC);
    repository
        .create_kandi(&KandiRecord {
            tag_uid: tag_uid.clone(),
            creator_id: "alice".into(),
            origin_location: Some("EDC Las Vegas".to_string()),
            created_at: Some(claimed_at),
            journey: vec![JourneyEntry {
                location: "EDC Las Vegas".to_string(),
                photo: Some("p1".to_string()),
            }],
            history: vec![HistoryEntry {
                user_id: "alice".into(),
                display_name: "Alice".to_string(),
                action: HistoryAction::Claimed,
                timestamp: claimed_at,
                photo: Some("p1".to_string()),
                location: Some("EDC Las Vegas".to_string()),
            }],
        })
        .await
        .unwrap();

    repository
        .append_to_kandi(
            &tag_uid,
            &JourneyEntry {
                location: "".to_string(),
                photo: Some("p2".to_string()),
            },
            &HistoryEntry {
                user_id: "bob".into(),
                display_name: "Bob".to_string(),
                action: HistoryAction::Adopted,
                timestamp: datetime!(2025-06-01 10:00 UTC),
                photo: Some("p2".to_string()),
                location: None,
            },
        )
        .await
        .unwrap();

    let stored = storage
        .get(Collection::Kandis, "04:A2:19")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored["history"][1]["location"], Value::Null);
    assert_eq!(stored["history"][1]["action"], json!("adopted"));
    assert_eq!(stored["journey"][1]["location"], json!(""));

    let record = repository.get_kandi(&tag_uid).await.unwrap().unwrap();
    assert_eq!(2, record.journey.len());
    assert_eq!(2, record.history.len());
    assert!(record.is_consistent());
    assert!(record.has_actor(&"bob".into()));
    assert_eq!("bob", record.current_holder().unwrap().user_id.as_str());
}

#[tokio::test]
async fn test_link_kandi_is_set_union() {
    let storage = InMemoryDocumentStorage::default();
    storage
        .set(
            Collection::Users,
            "alice",
            document(json!({ "displayName": "Alice" })),
        )
        .await
        .unwrap();
    let repository = KandiRepository::new(Arc::new(storage));

    for _ in 0..2 {
        repository
            .link_kandi_to_profile(&"alice".into(), &"04:A2:19".into())
            .await
            .unwrap();
    }

    let profile = repository
        .get_profile(&"alice".into())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(vec![TagUid::from("04:A2:19")], profile.kandis);
    assert_eq!(Some("Alice".to_string()), profile.display_name);
    assert!(profile.holds(&"04:A2:19".into()));
}

#[tokio::test]
async fn test_link_kandi_to_missing_profile() {
    let repository = KandiRepository::new(Arc::new(InMemoryDocumentStorage::default()));

    let result = repository
        .link_kandi_to_profile(&"ghost".into(), &"04:A2:19".into())
        .await;

    assert!(matches!(
        result,
        Err(RepositoryError::Storage(DocumentStorageError::NotFound { .. }))
    ));
}

#[tokio::test]
async fn test_storage_failure_is_propagated() {
    let mut storage = MockDocumentStorage::default();
    storage
        .expect_get()
        .times(1)
        .returning(|_, _| Err(DocumentStorageError::Get("unreachable".to_string())));

    let repository = KandiRepository::new(Arc::new(storage));

    let result = repository.get_kandi(&"04:A2:19".into()).await;
    assert!(matches!(
        result,
        Err(RepositoryError::Storage(DocumentStorageError::Get(_)))
    ));
}
