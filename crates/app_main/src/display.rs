//! Window-backed display control

use app_core::{AppError, DisplayControl};
use parking_lot::Mutex;
use std::sync::Arc;
use winit::window::{Fullscreen, Window};

/// Slot the event loop fills once the window exists
pub type WindowSlot = Arc<Mutex<Option<Arc<Window>>>>;

/// Borderless fullscreen on the window's current monitor
pub struct WindowDisplay {
    window: WindowSlot,
}

impl WindowDisplay {
    pub fn new(window: WindowSlot) -> Self {
        Self { window }
    }
}

impl DisplayControl for WindowDisplay {
    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), AppError> {
        let guard = self.window.lock();
        let window = guard
            .as_ref()
            .ok_or_else(|| AppError::Fullscreen("window not created yet".into()))?;

        let mode = fullscreen.then(|| Fullscreen::Borderless(window.current_monitor()));
        window.set_fullscreen(mode);
        tracing::debug!(fullscreen, "Window display mode changed");
        Ok(())
    }
}
