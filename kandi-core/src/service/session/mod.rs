//! Exclusive, scoped access to the NFC radio for one tag read at a time.
//!
//! A session is opened by [`HardwareSessionManager::acquire_and_read`] and
//! released on every way out of it: a successful read, a platform error, a
//! user cancel through [`HardwareSessionManager::release`], or the calling
//! future being dropped. The platform technology request is cancelled exactly
//! once per session, and the next session is only accepted once that cancel
//! has completed.

use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use kandi_providers::nfc::{
    model::{TagReading, TechnologyRequest},
    NfcPlatform,
};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::{config::NfcConfig, service::error::SessionError};


/// `Releasing` holds the radio until the platform cancel has completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Ready,
    Acquiring { session_id: u64 },
    Reading { session_id: u64 },
    Releasing { session_id: u64 },
}

pub struct HardwareSessionManager {
    slot: Arc<SessionSlot>,
    config: NfcConfig,
    init_lock: Mutex<()>,
}

impl HardwareSessionManager {
    pub fn new(platform: Arc<dyn NfcPlatform>, config: NfcConfig) -> Self {
        Self {
            slot: Arc::new(SessionSlot {
                platform,
                inner: StdMutex::new(SlotInner {
                    state: SessionState::Uninitialized,
                    next_session_id: 1,
                }),
            }),
            config,
            init_lock: Mutex::new(()),
        }
    }

    pub fn state(&self) -> SessionState {
        self.slot.lock().state
    }

    /// Starts the platform NFC manager. Later calls return immediately.
    pub async fn initialize(&self) -> Result<(), SessionError> {
        let _lock = self.init_lock.lock().await;

        if self.state() != SessionState::Uninitialized {
            return Ok(());
        }

        let platform = &self.slot.platform;
        platform.start().await.map_err(hardware_unavailable)?;
        if !platform.is_enabled().await.map_err(hardware_unavailable)? {
            warn!("NFC radio is disabled");
            return Err(SessionError::HardwareUnavailable(
                "NFC is disabled".to_string(),
            ));
        }

        self.slot.lock().state = SessionState::Ready;
        info!(technology = %self.config.technology, "NFC manager started");

        Ok(())
    }

    /// Reads one tag. `prompt` overrides the configured scan-sheet text.
    ///
    /// Fails with [`SessionError::SessionBusy`] while another read is pending.
    pub async fn acquire_and_read(&self, prompt: Option<&str>) -> Result<TagReading, SessionError> {
        if self.state() == SessionState::Uninitialized {
            self.initialize().await?;
        }

        let session_id = self.slot.begin()?;
        let guard = SessionGuard {
            slot: self.slot.clone(),
            session_id,
        };
        debug!(session_id, "NFC session acquired");

        let result = self.read_in_session(session_id, prompt).await;

        guard.release().await;

        match &result {
            Ok(reading) => info!(session_id, tag_uid = %reading.uid, "tag read"),
            Err(err) => warn!(session_id, %err, "tag read failed"),
        }

        result
    }

    /// Releases the session currently held, if any. Used for user cancel and
    /// when the app moves to the background.
    pub async fn release(&self) {
        if !self.slot.release(None).await {
            debug!("release requested without a held NFC session");
        }
    }

    async fn read_in_session(
        &self,
        session_id: u64,
        prompt: Option<&str>,
    ) -> Result<TagReading, SessionError> {
        let request = TechnologyRequest {
            technology: self.config.technology,
            alert_message: prompt
                .map(str::to_owned)
                .unwrap_or_else(|| self.config.alert_message.clone()),
        };

        self.slot.platform.request_technology(&request).await?;
        self.slot.advance_to_reading(session_id)?;

        let read = self.slot.platform.read_tag().await;
        self.slot.ensure_reading(session_id)?;

        let reading = read?;
        if reading.uid.trim().is_empty() {
            return Err(SessionError::ReadFailure(
                "tag has no identifier".to_string(),
            ));
        }

        Ok(reading)
    }
}

fn hardware_unavailable(err: kandi_providers::nfc::error::NfcError) -> SessionError {
    SessionError::HardwareUnavailable(err.to_string())
}

struct SlotInner {
    state: SessionState,
    next_session_id: u64,
}

struct SessionSlot {
    platform: Arc<dyn NfcPlatform>,
    inner: StdMutex<SlotInner>,
}

impl SessionSlot {
    fn lock(&self) -> MutexGuard<'_, SlotInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) -> Result<u64, SessionError> {
        let mut inner = self.lock();

        match inner.state {
            SessionState::Uninitialized => Err(SessionError::HardwareUnavailable(
                "NFC manager not started".to_string(),
            )),
            SessionState::Ready => {
                let session_id = inner.next_session_id;
                inner.next_session_id += 1;
                inner.state = SessionState::Acquiring { session_id };
                Ok(session_id)
            }
            _ => Err(SessionError::SessionBusy),
        }
    }

    fn advance_to_reading(&self, session_id: u64) -> Result<(), SessionError> {
        let mut inner = self.lock();

        if inner.state != (SessionState::Acquiring { session_id }) {
            return Err(SessionError::Cancelled);
        }
        inner.state = SessionState::Reading { session_id };

        Ok(())
    }

    /// A release that landed while the tag was being read wins over the reading.
    fn ensure_reading(&self, session_id: u64) -> Result<(), SessionError> {
        if self.lock().state != (SessionState::Reading { session_id }) {
            return Err(SessionError::Cancelled);
        }

        Ok(())
    }

    /// Moves a held session to `Releasing`. `None` matches whichever session is held.
    fn take(&self, session_id: Option<u64>) -> Option<u64> {
        let mut inner = self.lock();

        match inner.state {
            SessionState::Acquiring { session_id: held }
            | SessionState::Reading { session_id: held }
                if session_id.map_or(true, |requested| requested == held) =>
            {
                inner.state = SessionState::Releasing { session_id: held };
                Some(held)
            }
            _ => None,
        }
    }

    fn mark_released(&self, session_id: u64) {
        let mut inner = self.lock();

        if inner.state == (SessionState::Releasing { session_id }) {
            inner.state = SessionState::Ready;
        }
    }

    async fn finish_release(&self, session_id: u64) {
        if let Err(err) = self.platform.cancel_technology_request().await {
            warn!(session_id, %err, "platform cancel failed");
        }

        self.mark_released(session_id);
        debug!(session_id, "NFC session released");
    }

    /// Returns `false` when nothing was held. The platform cancel runs on its
    /// own task so that dropping the caller does not leave the radio locked.
    async fn release(self: &Arc<Self>, session_id: Option<u64>) -> bool {
        let Some(held) = self.take(session_id) else {
            return false;
        };

        let slot = self.clone();
        if let Err(err) = tokio::spawn(async move { slot.finish_release(held).await }).await {
            error!(session_id = held, %err, "release task failed");
            self.mark_released(held);
        }

        true
    }
}

/// Releases the session if `acquire_and_read` is dropped before reaching its own release.
struct SessionGuard {
    slot: Arc<SessionSlot>,
    session_id: u64,
}

impl SessionGuard {
    async fn release(self) {
        self.slot.release(Some(self.session_id)).await;
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(held) = self.slot.take(Some(self.session_id)) else {
            return;
        };

        warn!(session_id = held, "NFC session dropped while held");

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let slot = self.slot.clone();
                handle.spawn(async move { slot.finish_release(held).await });
            }
            Err(_) => {
                error!(
                    session_id = held,
                    "no async runtime to cancel the platform request"
                );
                self.slot.mark_released(held);
            }
        }
    }
}
