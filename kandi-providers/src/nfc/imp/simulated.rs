//! In-process NFC radio. Tags are "presented" by the host (tests, demos) and
//! picked up by the next technology request; presentations made while no
//! request is pending stay queued until one is.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex as StdMutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::{mpsc, watch, Mutex};

use crate::nfc::{
    error::NfcError,
    model::{TagReading, TechnologyRequest},
    NfcPlatform,
};

type Presentation = Result<TagReading, NfcError>;

pub struct SimulatedNfcPlatform {
    supported: bool,
    enabled: AtomicBool,
    started: AtomicBool,

    presenter: mpsc::UnboundedSender<Presentation>,
    field: Mutex<mpsc::UnboundedReceiver<Presentation>>,
    cancellations: watch::Sender<u64>,

    active_request: StdMutex<Option<u64>>,
    connected: StdMutex<Option<TagReading>>,

    start_calls: AtomicUsize,
    request_calls: AtomicUsize,
    cancel_calls: AtomicUsize,
}

impl Default for SimulatedNfcPlatform {
    fn default() -> Self {
        Self::new(true, true)
    }
}

impl SimulatedNfcPlatform {
    pub fn new(supported: bool, enabled: bool) -> Self {
        let (presenter, field) = mpsc::unbounded_channel();
        let (cancellations, _) = watch::channel(0);

        Self {
            supported,
            enabled: AtomicBool::new(enabled),
            started: AtomicBool::new(false),
            presenter,
            field: Mutex::new(field),
            cancellations,
            active_request: StdMutex::new(None),
            connected: StdMutex::new(None),
            start_calls: AtomicUsize::new(0),
            request_calls: AtomicUsize::new(0),
            cancel_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn present_tag(&self, uid: impl Into<String>) {
        self.present(Ok(TagReading {
            uid: uid.into(),
            payload: None,
        }));
    }

    /// Queues a reading or a platform failure for the next technology request.
    pub fn present(&self, presentation: Presentation) {
        // the receiving half lives as long as `self`
        let _ = self.presenter.send(presentation);
    }

    pub fn has_active_request(&self) -> bool {
        lock(&self.active_request).is_some()
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn request_calls(&self) -> usize {
        self.request_calls.load(Ordering::SeqCst)
    }

    pub fn cancel_calls(&self) -> usize {
        self.cancel_calls.load(Ordering::SeqCst)
    }

    fn ensure_available(&self) -> Result<(), NfcError> {
        if !self.supported {
            return Err(NfcError::NotSupported);
        }
        if !self.started.load(Ordering::SeqCst) {
            return Err(NfcError::Platform("NFC manager not started".to_string()));
        }
        if !self.enabled.load(Ordering::SeqCst) {
            return Err(NfcError::NotEnabled);
        }

        Ok(())
    }
}

#[async_trait]
impl NfcPlatform for SimulatedNfcPlatform {
    async fn start(&self) -> Result<(), NfcError> {
        if !self.supported {
            return Err(NfcError::NotSupported);
        }

        self.start_calls.fetch_add(1, Ordering::SeqCst);
        self.started.store(true, Ordering::SeqCst);

        Ok(())
    }

    async fn is_enabled(&self) -> Result<bool, NfcError> {
        if !self.supported {
            return Err(NfcError::NotSupported);
        }

        Ok(self.enabled.load(Ordering::SeqCst))
    }

    async fn request_technology(&self, request: &TechnologyRequest) -> Result<(), NfcError> {
        self.ensure_available()?;

        let generation = {
            let mut active = lock(&self.active_request);
            if active.is_some() {
                return Err(NfcError::Platform(
                    "a technology request is already active".to_string(),
                ));
            }
            let generation = *self.cancellations.borrow();
            *active = Some(generation);
            generation
        };
        self.request_calls.fetch_add(1, Ordering::SeqCst);

        tracing::debug!(technology = %request.technology, alert = %request.alert_message, "waiting for tag");

        let mut cancelled = self.cancellations.subscribe();
        let mut field = self.field.lock().await;

        let presentation = tokio::select! {
            presented = field.recv() => presented
                .unwrap_or_else(|| Err(NfcError::Platform("tag field closed".to_string()))),
            _ = cancelled.wait_for(|current| *current != generation) => Err(NfcError::Cancelled),
        };

        let reading = presentation?;
        *lock(&self.connected) = Some(reading);

        Ok(())
    }

    async fn read_tag(&self) -> Result<TagReading, NfcError> {
        lock(&self.connected)
            .clone()
            .ok_or_else(|| NfcError::Platform("no tag connected".to_string()))
    }

    async fn cancel_technology_request(&self) -> Result<(), NfcError> {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);

        *lock(&self.active_request) = None;
        *lock(&self.connected) = None;
        self.cancellations.send_modify(|generation| *generation += 1);

        Ok(())
    }
}

fn lock<T>(mutex: &StdMutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
