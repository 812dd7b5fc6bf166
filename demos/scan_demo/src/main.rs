use std::sync::Arc;

use kandi_core::{
    config::KandiCoreConfig,
    service::{
        error::KandiServiceError,
        flow::ClaimFlow,
        kandi::{KandiService, ScanOutcome},
    },
    Collaborators, KandiCore,
};
use kandi_providers::{
    blob_storage::imp::in_memory::InMemoryBlobStorage,
    document_storage::{in_memory::InMemoryDocumentStorage, Collection, DocumentStorage},
    identity::{imp::fixed::FixedIdentityProvider, AuthenticatedUser},
    nfc::imp::simulated::SimulatedNfcPlatform,
};
use serde_json::json;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const TAG: &str = "04:A2:19:6B:3C:80:00";

#[tokio::main]
async fn main() -> Result<(), KandiServiceError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config: KandiCoreConfig = serde_json::from_value(json!({
        "nfc": { "alertMessage": "Hold your kandi near the phone" },
        "photos": { "keyPrefix": "demoPhotos" }
    }))
    .expect("valid demo config");

    let nfc = Arc::new(SimulatedNfcPlatform::default());
    let storage = InMemoryDocumentStorage::default();
    let identity = Arc::new(FixedIdentityProvider::default());

    for (user_id, display_name) in [("alice", "Alice"), ("bob", "Bob")] {
        let profile = json!({ "displayName": display_name, "kandis": [] });
        storage
            .set(
                Collection::Users,
                user_id,
                profile.as_object().cloned().unwrap_or_default(),
            )
            .await
            .expect("profile seeded");
    }

    let core = KandiCore::new(
        Some(config),
        Collaborators {
            nfc: nfc.clone(),
            document_storage: Arc::new(storage),
            blob_storage: Arc::new(InMemoryBlobStorage::default()),
            identity: identity.clone(),
        },
    );
    let service = &core.kandi_service;

    // Alice claims a fresh tag
    sign_in(&identity, "alice", "Alice");
    nfc.present_tag(TAG);
    if let ScanOutcome::Claim(flow) = service.scan().await? {
        commit(flow, "EDC Las Vegas", "/tmp/kandi-alice.jpg").await?;
    }

    // Re-scanning her own kandi only shows it
    nfc.present_tag(TAG);
    if let ScanOutcome::Owned(details) = service.scan().await? {
        info!(
            creator = %details.creator.display_name,
            entries = details.timeline.len(),
            "own kandi"
        );
    }

    // Bob adopts it without naming a place
    sign_in(&identity, "bob", "Bob");
    nfc.present_tag(TAG);
    match service.scan().await {
        Ok(ScanOutcome::Adopt(flow)) => {
            if let Some(holder) = flow.owner().and_then(|owner| owner.current_holder.as_ref()) {
                info!(holder = %holder.display_name, "adopting from");
            }
            commit(flow, "", "/tmp/kandi-bob.jpg").await?;
        }
        Ok(_) => info!("unexpected scan outcome"),
        Err(err) => info!(message = err.user_message(), "scan failed"),
    }

    print_details(service).await?;

    let summary = service.my_profile().await?;
    info!(
        user_id = %summary.profile.user_id,
        kandis = summary.kandis.len(),
        activity = summary.activity.len(),
        "profile"
    );

    Ok(())
}

fn sign_in(identity: &FixedIdentityProvider, user_id: &str, display_name: &str) {
    identity.switch_user(Some(AuthenticatedUser {
        user_id: user_id.into(),
        display_name: Some(display_name.to_owned()),
    }));
}

async fn commit(mut flow: ClaimFlow, location: &str, photo: &str) -> Result<(), KandiServiceError> {
    flow.set_location(location)?;
    flow.confirm_location()?;
    flow.attach_photo(photo)?;

    let receipt = flow.submit().await?;
    info!(
        tag_uid = %receipt.tag_uid,
        kind = %receipt.kind,
        photo = ?receipt.journey_entry.photo,
        "committed"
    );

    Ok(())
}

async fn print_details(service: &KandiService) -> Result<(), KandiServiceError> {
    let details = service.kandi_details(&TAG.into()).await?;

    for entry in &details.timeline {
        println!(
            "{} {} by {} at {}",
            entry.history.timestamp,
            entry.history.action,
            entry.history.display_name,
            entry
                .journey
                .as_ref()
                .map(|journey| journey.location.as_str())
                .filter(|location| !location.is_empty())
                .unwrap_or("somewhere")
        );
    }

    Ok(())
}
