//! Folio Viewer Core Domain Logic
//!
//! This crate contains:
//! - Portfolio catalog
//! - Preview modal session, controller and resource registry
//! - Preview surface rendering
//! - Navigation and swipe detection
//! - Engine and media element boundaries
//! - Notifications
//! - Configuration, commands and error types
//! - Image loading

pub mod state;
pub mod config;
pub mod command;
pub mod error;
pub mod catalog;
pub mod navigation;
pub mod registry;
pub mod media;
pub mod engine;
pub mod renderer;
pub mod session;
pub mod controller;
pub mod notify;
pub mod image_loader;

#[cfg(test)]
pub(crate) mod testing;

pub use state::AppState;
pub use config::{
    AppConfig, GeneralConfig, CatalogConfig, ViewerConfig, NotificationConfig,
    EngineSettings, DownloadConfig,
};
pub use command::{Command, CommandId, CommandParams};
pub use error::AppError;
pub use catalog::{
    Catalog, CatalogItem, Category, ItemId, ItemKind, DisplayStatus, EngineAssetRef,
    GameItem, WebsiteItem, PhotoItem, VideoItem,
};
pub use navigation::{Direction, SwipeTracker, step_index, DEFAULT_SWIPE_THRESHOLD};
pub use registry::{LoadTicket, ResourceHandle, ResourceKind, ResourceRegistry};
pub use media::{MediaElement, MediaFactory, MediaLoad, PlayOutcome, PlaybackView};
pub use engine::{
    Engine, EngineConfig, EngineError, EngineHandle, EngineLoadRequest, LoadEvent,
    LoadEventKind, MountPoint, ProgressFn, run_engine_load,
};
pub use renderer::{
    GamePhase, PreviewAction, PreviewSurface, RenderContext, SurfaceBody, SurfaceKind,
    SurfaceVisibility, ZoomState, download_filename, render,
};
pub use session::{ModalSession, SessionState};
pub use controller::{CloseReason, DisplayControl, ModalController};
pub use notify::{Notification, NotificationCenter, NotificationLevel, NotificationSink, SharedNotifications};
pub use image_loader::{ImageLoader, LoadedImage, LoadResult, cache_key, decode_file, is_supported_image};

use once_cell::sync::OnceCell;

/// Global application state (for UI access)
static APP_STATE: OnceCell<AppState> = OnceCell::new();

/// Initialize global application state
pub fn init(config: AppConfig, catalog: Catalog) -> anyhow::Result<&'static AppState> {
    let state = AppState::new(config, catalog);
    APP_STATE.set(state).map_err(|_| anyhow::anyhow!("AppState already initialized"))?;
    APP_STATE
        .get()
        .ok_or_else(|| anyhow::anyhow!("AppState missing after initialization"))
}

/// Get global application state
pub fn state() -> Option<&'static AppState> {
    APP_STATE.get()
}
