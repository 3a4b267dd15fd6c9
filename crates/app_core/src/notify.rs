//! User-facing notifications

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// Receives transient user messages
pub trait NotificationSink: Send {
    fn notify(&mut self, message: &str, level: NotificationLevel);
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub level: NotificationLevel,
    pub created_at: Instant,
}

impl Notification {
    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created_at) >= ttl
    }
}

/// Most-recent-N notification queue with expiry
#[derive(Debug)]
pub struct NotificationCenter {
    entries: Vec<Notification>,
    max_visible: usize,
    duration: Duration,
    next_id: u64,
}

impl NotificationCenter {
    pub fn new(max_visible: usize, duration: Duration) -> Self {
        Self {
            entries: Vec::new(),
            max_visible: max_visible.max(1),
            duration,
            next_id: 1,
        }
    }

    pub fn push(&mut self, message: impl Into<String>, level: NotificationLevel) -> u64 {
        self.push_at(message, level, Instant::now())
    }

    pub fn push_at(&mut self, message: impl Into<String>, level: NotificationLevel, now: Instant) -> u64 {
        let message = message.into();
        match level {
            NotificationLevel::Error => tracing::warn!(%message, "Notification"),
            _ => tracing::info!(%message, ?level, "Notification"),
        }

        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(Notification {
            id,
            message,
            level,
            created_at: now,
        });

        // oldest fall off
        if self.entries.len() > self.max_visible {
            let excess = self.entries.len() - self.max_visible;
            self.entries.drain(..excess);
        }
        id
    }

    /// Visible notifications, oldest first
    pub fn visible(&self) -> &[Notification] {
        &self.entries
    }

    /// Drop expired notifications; returns whether anything changed
    pub fn prune(&mut self, now: Instant) -> bool {
        let before = self.entries.len();
        let ttl = self.duration;
        self.entries.retain(|n| !n.is_expired(now, ttl));
        before != self.entries.len()
    }

    pub fn dismiss(&mut self, id: u64) {
        self.entries.retain(|n| n.id != id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(4500))
    }
}

/// Notification center shared between the controller and the view
pub type SharedNotifications = Arc<Mutex<NotificationCenter>>;

impl NotificationSink for SharedNotifications {
    fn notify(&mut self, message: &str, level: NotificationLevel) {
        self.lock().push(message, level);
    }
}
