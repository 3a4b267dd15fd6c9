//! Embedded game engine boundary
//!
//! Instantiation is asynchronous and reports progress. Results travel back to
//! the UI thread as [`LoadEvent`]s tagged with the [`LoadTicket`] they belong to.

use crate::catalog::EngineAssetRef;
use crate::config::EngineSettings;
use crate::registry::{LoadTicket, ResourceHandle};
use async_trait::async_trait;
use crossbeam_channel::Sender;
use std::sync::Arc;
use thiserror::Error;

/// Engine boundary errors
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Game engine not initialized")]
    Unavailable,

    #[error("Missing build asset: {0}")]
    MissingAsset(String),

    #[error("Engine failed to start: {0}")]
    Spawn(String),

    #[error("Engine shutdown failed: {0}")]
    Shutdown(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Designated element the engine renders into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPoint(String);

impl MountPoint {
    pub const GAME_CANVAS: &'static str = "game-canvas";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl Default for MountPoint {
    fn default() -> Self {
        Self::new(Self::GAME_CANVAS)
    }
}

/// Build configuration handed to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub data_url: String,
    pub framework_url: String,
    pub code_url: String,
    pub streaming_assets_url: String,
    pub company_name: String,
    pub product_name: String,
    pub product_version: String,
}

impl EngineConfig {
    /// Derive asset paths `<build_dir>/<folder>/Build/<build>.{data,framework.js,wasm}`
    pub fn from_asset_ref(asset: &EngineAssetRef, product_name: &str, settings: &EngineSettings) -> Self {
        let base = format!(
            "{}/{}/Build/{}",
            settings.build_dir.trim_end_matches('/'),
            asset.folder,
            asset.build_name
        );

        Self {
            data_url: format!("{}.data", base),
            framework_url: format!("{}.framework.js", base),
            code_url: format!("{}.wasm", base),
            streaming_assets_url: settings.streaming_assets_url.clone(),
            company_name: settings.company_name.clone(),
            product_name: product_name.to_string(),
            product_version: settings.product_version.clone(),
        }
    }

    /// The three build files, in load order
    pub fn build_assets(&self) -> [&str; 3] {
        [&self.data_url, &self.framework_url, &self.code_url]
    }
}

/// Progress callback, fraction in `[0, 1]`
pub type ProgressFn = Box<dyn Fn(f32) + Send + Sync>;

/// A running engine instance
pub trait EngineHandle: Send {
    fn shutdown(&mut self) -> Result<(), EngineError>;

    fn is_running(&self) -> bool;
}

/// Engine loader
#[async_trait]
pub trait Engine: Send + Sync {
    async fn instantiate(
        &self,
        mount: &MountPoint,
        config: &EngineConfig,
        progress: ProgressFn,
    ) -> Result<Box<dyn EngineHandle>, EngineError>;
}

/// Request produced when the user starts a game
#[derive(Debug, Clone)]
pub struct EngineLoadRequest {
    pub ticket: LoadTicket,
    pub mount: MountPoint,
    pub config: EngineConfig,
}

/// Outcome of an asynchronous load, delivered to the UI thread
pub struct LoadEvent {
    pub ticket: LoadTicket,
    pub kind: LoadEventKind,
}

pub enum LoadEventKind {
    Progress(f32),
    Ready(ResourceHandle),
    Failed(EngineError),
}

impl std::fmt::Debug for LoadEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadEventKind::Progress(p) => write!(f, "Progress({:.2})", p),
            LoadEventKind::Ready(handle) => write!(f, "Ready({})", handle.kind()),
            LoadEventKind::Failed(e) => write!(f, "Failed({})", e),
        }
    }
}

/// Drive one engine instantiation, forwarding progress and the result.
///
/// There is no timeout; a load that never settles leaves the modal loading
/// until the user closes or navigates away.
pub async fn run_engine_load(engine: Arc<dyn Engine>, request: EngineLoadRequest, sender: Sender<LoadEvent>) {
    let ticket = request.ticket;
    let progress_sender = sender.clone();
    let progress: ProgressFn = Box::new(move |p| {
        let _ = progress_sender.send(LoadEvent {
            ticket,
            kind: LoadEventKind::Progress(p),
        });
    });

    tracing::debug!(?ticket, product = %request.config.product_name, "Engine instantiate started");

    let kind = match engine.instantiate(&request.mount, &request.config, progress).await {
        Ok(handle) => LoadEventKind::Ready(ResourceHandle::Engine(handle)),
        Err(e) => {
            tracing::warn!(?ticket, "Engine instantiate failed: {}", e);
            LoadEventKind::Failed(e)
        }
    };

    if sender.send(LoadEvent { ticket, kind }).is_err() {
        tracing::debug!(?ticket, "Load result dropped, receiver gone");
    }
}
