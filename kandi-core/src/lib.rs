//! The **Kandi Core** tracks physical kandi bracelets carrying NFC tags.
//!
//! Scanning a tag either claims it (first scan of an unregistered tag),
//! adopts it from its current holder, or shows it read-only to its creator.
//! Every claim and adoption appends to the kandi's journey and history in a
//! remote document store and links the kandi to the actor's profile.
//!
//! ## Repository structure
//!
//! * **Providers** (`kandi-providers`): the seams to the outside world.
//!   * NFC platform
//!   * Document storage
//!   * Blob storage (photos)
//!   * Identity
//!   * HTTP client
//! * **Core** (`kandi-core`): services orchestrating the providers.
//!
//! ## Getting started
//!
//! Initialize the core with the platform implementations and use the
//! [`KandiService`][ks]:
//!
//! ```ignore rust
//! let core = KandiCore::new(None, collaborators);
//!
//! match core.kandi_service.scan().await? {
//!     ScanOutcome::Claim(mut flow) | ScanOutcome::Adopt(mut flow) => {
//!         flow.set_location("EDC Las Vegas")?;
//!         flow.confirm_location()?;
//!         flow.attach_photo("/tmp/photo.jpg")?;
//!         flow.submit().await?;
//!     }
//!     ScanOutcome::Owned(details) => show(details),
//! }
//! ```
//!
//! See `demos/scan_demo` for a run against the simulated NFC platform.
//!
//! [ks]: crate::service::kandi::KandiService

use std::sync::Arc;

use config::KandiCoreConfig;
use kandi_providers::{
    blob_storage::BlobStorage, document_storage::DocumentStorage, identity::IdentityProvider,
    nfc::NfcPlatform,
};
use repository::KandiRepository;
use service::{
    classifier::TagClassifier, flow::FlowController, kandi::KandiService,
    session::HardwareSessionManager,
};

pub mod config;
pub mod model;
pub mod repository;
pub mod service;

/// Platform implementations the core runs on.
#[derive(Clone)]
pub struct Collaborators {
    pub nfc: Arc<dyn NfcPlatform>,
    pub document_storage: Arc<dyn DocumentStorage>,
    pub blob_storage: Arc<dyn BlobStorage>,
    pub identity: Arc<dyn IdentityProvider>,
}

pub struct KandiCore {
    pub session_manager: Arc<HardwareSessionManager>,
    pub kandi_service: KandiService,
}

impl KandiCore {
    pub fn new(config: Option<KandiCoreConfig>, collaborators: Collaborators) -> Self {
        let config = config.unwrap_or_default();

        let repository = KandiRepository::new(collaborators.document_storage);

        let session_manager = Arc::new(HardwareSessionManager::new(
            collaborators.nfc,
            config.nfc,
        ));

        let classifier = TagClassifier::new(repository.clone(), config.profile.clone());

        let flow_controller = FlowController::new(
            repository.clone(),
            collaborators.blob_storage,
            config.photos,
            config.profile,
        );

        let kandi_service = KandiService::new(
            session_manager.clone(),
            classifier,
            flow_controller,
            repository,
            collaborators.identity,
        );

        Self {
            session_manager,
            kandi_service,
        }
    }
}
