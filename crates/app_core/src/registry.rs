//! Resource handle registry
//!
//! Tracks the single heavyweight resource owned by the preview modal (a video
//! element or an engine instance) and guarantees it is torn down exactly once.

use crate::engine::EngineHandle;
use crate::error::AppError;
use crate::media::MediaElement;
use std::fmt;

/// Kind of heavyweight resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Video,
    Engine,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Video => write!(f, "video"),
            ResourceKind::Engine => write!(f, "engine"),
        }
    }
}

/// Live resource owned by the registry
pub enum ResourceHandle {
    Video(Box<dyn MediaElement>),
    Engine(Box<dyn EngineHandle>),
}

impl ResourceHandle {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceHandle::Video(_) => ResourceKind::Video,
            ResourceHandle::Engine(_) => ResourceKind::Engine,
        }
    }

    /// Stop the resource. Teardown failures are logged, never raised.
    fn teardown(mut self) {
        match &mut self {
            ResourceHandle::Video(element) => {
                element.pause();
                element.detach_source();
                tracing::debug!("Video element released");
            }
            ResourceHandle::Engine(engine) => match engine.shutdown() {
                Ok(()) => tracing::debug!("Engine instance shut down"),
                Err(e) => tracing::warn!("Engine shutdown failed: {}", e),
            },
        }
    }
}

impl fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceHandle({})", self.kind())
    }
}

/// Identifies one acquisition attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    pub kind: ResourceKind,
    /// Session generation the acquisition was started in
    pub generation: u64,
    serial: u64,
}

impl LoadTicket {
    pub fn new(kind: ResourceKind, generation: u64, serial: u64) -> Self {
        Self { kind, generation, serial }
    }
}

enum Slot {
    Empty,
    Pending(LoadTicket),
    Live(LoadTicket, ResourceHandle),
}

/// Zero-or-one resource slot
pub struct ResourceRegistry {
    slot: Slot,
    next_serial: u64,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self {
            slot: Slot::Empty,
            next_serial: 1,
        }
    }

    fn issue(&mut self, kind: ResourceKind, generation: u64) -> Result<LoadTicket, AppError> {
        if let Some(current) = self.kind() {
            return Err(AppError::ResourceBusy(current));
        }

        let ticket = LoadTicket::new(kind, generation, self.next_serial);
        self.next_serial += 1;
        Ok(ticket)
    }

    /// Acquire a resource synchronously
    pub fn acquire<F>(&mut self, kind: ResourceKind, generation: u64, ctor: F) -> Result<LoadTicket, AppError>
    where
        F: FnOnce() -> Result<ResourceHandle, AppError>,
    {
        let ticket = self.issue(kind, generation)?;
        let handle = ctor()?;
        debug_assert_eq!(handle.kind(), kind);

        self.slot = Slot::Live(ticket, handle);
        tracing::debug!(?ticket, "Resource acquired");
        Ok(ticket)
    }

    /// Begin an asynchronous acquisition; the handle arrives via [`fulfill`](Self::fulfill)
    pub fn reserve(&mut self, kind: ResourceKind, generation: u64) -> Result<LoadTicket, AppError> {
        let ticket = self.issue(kind, generation)?;
        self.slot = Slot::Pending(ticket);
        tracing::debug!(?ticket, "Resource reserved");
        Ok(ticket)
    }

    /// Store the result of a reservation.
    ///
    /// A handle whose ticket is no longer pending is handed back to the caller.
    pub fn fulfill(&mut self, ticket: LoadTicket, handle: ResourceHandle) -> Result<(), ResourceHandle> {
        if !self.is_pending(ticket) {
            return Err(handle);
        }

        self.slot = Slot::Live(ticket, handle);
        tracing::debug!(?ticket, "Resource fulfilled");
        Ok(())
    }

    /// Drop a pending reservation without a handle (load failed)
    pub fn abandon(&mut self, ticket: LoadTicket) -> bool {
        if self.is_pending(ticket) {
            self.slot = Slot::Empty;
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self, ticket: LoadTicket) -> bool {
        matches!(&self.slot, Slot::Pending(pending) if *pending == ticket)
    }

    /// Whether `ticket` is the reservation or live resource currently held
    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        self.ticket() == Some(ticket)
    }

    /// Ticket of the pending or live resource
    pub fn ticket(&self) -> Option<LoadTicket> {
        match &self.slot {
            Slot::Empty => None,
            Slot::Pending(ticket) | Slot::Live(ticket, _) => Some(*ticket),
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self.slot, Slot::Live(..))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.slot, Slot::Empty)
    }

    /// Kind of the held or pending resource
    pub fn kind(&self) -> Option<ResourceKind> {
        self.ticket().map(|ticket| ticket.kind)
    }

    pub fn handle(&self) -> Option<&ResourceHandle> {
        match &self.slot {
            Slot::Live(_, handle) => Some(handle),
            _ => None,
        }
    }

    pub fn handle_mut(&mut self) -> Option<&mut ResourceHandle> {
        match &mut self.slot {
            Slot::Live(_, handle) => Some(handle),
            _ => None,
        }
    }

    /// Live video element, if any
    pub fn media(&self) -> Option<&dyn MediaElement> {
        match self.handle() {
            Some(ResourceHandle::Video(element)) => Some(element.as_ref()),
            _ => None,
        }
    }

    pub fn media_mut(&mut self) -> Option<&mut (dyn MediaElement + 'static)> {
        match self.handle_mut() {
            Some(ResourceHandle::Video(element)) => Some(element.as_mut()),
            _ => None,
        }
    }

    /// Tear down whatever is held. Safe to call repeatedly.
    pub fn release(&mut self) {
        match std::mem::replace(&mut self.slot, Slot::Empty) {
            Slot::Empty => {}
            Slot::Pending(ticket) => {
                tracing::debug!(?ticket, "Pending acquisition abandoned");
            }
            Slot::Live(ticket, handle) => {
                tracing::debug!(?ticket, "Releasing resource");
                handle.teardown();
            }
        }
    }

    /// Tear down a handle that arrived too late to be stored
    pub fn dispose(handle: ResourceHandle) {
        tracing::debug!(kind = %handle.kind(), "Disposing stale resource");
        handle.teardown();
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ResourceRegistry {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeEngineHandle, FakeMedia};

    #[test]
    fn test_acquire_and_release_video() {
        let media = FakeMedia::new("/videos/a.mp4");
        let probe = media.probe();
        let mut registry = ResourceRegistry::new();

        registry
            .acquire(ResourceKind::Video, 1, || Ok(ResourceHandle::Video(Box::new(media))))
            .unwrap();
        assert!(registry.is_live());
        assert_eq!(registry.kind(), Some(ResourceKind::Video));

        registry.media_mut().unwrap().play();
        assert!(!probe.lock().paused);

        registry.release();
        assert!(registry.is_empty());
        assert!(probe.lock().paused);
        assert!(probe.lock().source.is_none());

        // idempotent
        registry.release();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_busy_slot_rejected() {
        let mut registry = ResourceRegistry::new();
        registry.reserve(ResourceKind::Engine, 1).unwrap();

        let err = registry
            .acquire(ResourceKind::Video, 1, || Ok(ResourceHandle::Video(Box::new(FakeMedia::new("x")))))
            .unwrap_err();
        assert!(matches!(err, AppError::ResourceBusy(ResourceKind::Engine)));
    }

    #[test]
    fn test_failed_ctor_leaves_slot_empty() {
        let mut registry = ResourceRegistry::new();
        let result = registry.acquire(ResourceKind::Video, 1, || Err(AppError::MediaLoad("gone".into())));

        assert!(result.is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_fulfill_matching_ticket() {
        let handle = FakeEngineHandle::new();
        let shutdowns = handle.shutdowns();
        let mut registry = ResourceRegistry::new();

        let ticket = registry.reserve(ResourceKind::Engine, 3).unwrap();
        assert!(registry.is_pending(ticket));
        assert!(registry.fulfill(ticket, ResourceHandle::Engine(Box::new(handle))).is_ok());
        assert!(registry.is_live());

        registry.release();
        registry.release();
        assert_eq!(shutdowns.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stale_fulfill_hands_back() {
        let handle = FakeEngineHandle::new();
        let shutdowns = handle.shutdowns();
        let mut registry = ResourceRegistry::new();

        let stale = registry.reserve(ResourceKind::Engine, 1).unwrap();
        registry.release();
        let current = registry.reserve(ResourceKind::Engine, 2).unwrap();

        let returned = registry
            .fulfill(stale, ResourceHandle::Engine(Box::new(handle)))
            .unwrap_err();
        assert!(registry.is_pending(current));
        assert!(!registry.is_live());

        ResourceRegistry::dispose(returned);
        assert_eq!(shutdowns.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn test_shutdown_failure_is_swallowed() {
        let mut registry = ResourceRegistry::new();
        registry
            .acquire(ResourceKind::Engine, 1, || {
                Ok(ResourceHandle::Engine(Box::new(FakeEngineHandle::failing_shutdown())))
            })
            .unwrap();

        registry.release();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_abandon() {
        let mut registry = ResourceRegistry::new();
        let ticket = registry.reserve(ResourceKind::Engine, 1).unwrap();

        assert!(registry.abandon(ticket));
        assert!(!registry.abandon(ticket));
        assert!(registry.is_empty());
    }
}
