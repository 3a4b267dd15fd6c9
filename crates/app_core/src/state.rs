//! Application state management

use crate::notify::{NotificationCenter, SharedNotifications};
use crate::{AppConfig, Catalog};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// Process-wide application state.
///
/// The preview session is deliberately absent: it lives in the
/// [`ModalController`](crate::ModalController) owned by the UI thread.
pub struct AppState {
    /// Application configuration
    pub config: RwLock<AppConfig>,

    /// Portfolio catalog (read only)
    pub catalog: Arc<Catalog>,

    /// Notification queue shared with the view
    pub notifications: SharedNotifications,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: AppConfig, catalog: Catalog) -> Self {
        let notifications = Arc::new(Mutex::new(NotificationCenter::new(
            config.notifications.max_visible,
            config.notifications.duration(),
        )));

        Self {
            config: RwLock::new(config),
            catalog: Arc::new(catalog),
            notifications,
        }
    }

    /// Save the current configuration
    pub fn save_config(&self) -> anyhow::Result<()> {
        self.config.read().save()
    }

    /// Switch between the dark and light theme, returning the new name
    pub fn toggle_theme(&self) -> String {
        let mut config = self.config.write();
        config.general.theme = if config.general.theme == "light" {
            "dark".to_string()
        } else {
            "light".to_string()
        };
        config.general.theme.clone()
    }
}
