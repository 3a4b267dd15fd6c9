//! Application error types

use crate::catalog::{Category, ItemId};
use crate::registry::ResourceKind;
use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Invalid input (notify, session unchanged) =====
    #[error("No {category} item with id {id}")]
    ItemNotFound { category: Category, id: ItemId },

    #[error("No {0} to show")]
    EmptyCategory(Category),

    #[error("Index {index} out of range for {category} ({len} items)")]
    IndexOutOfRange { category: Category, index: usize, len: usize },

    #[error("No preview is open")]
    NotOpen,

    // ===== Resource acquisition (notify, force close) =====
    #[error("Failed to initialize game: {0}")]
    EngineLoad(String),

    #[error("Failed to load video: {0}")]
    MediaLoad(String),

    // ===== External action (notify, session unaffected) =====
    #[error("Download failed: {0}")]
    Download(String),

    #[error("Could not open link: {0}")]
    OpenUrl(String),

    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("Fullscreen unavailable: {0}")]
    Fullscreen(String),

    // ===== Contract violation =====
    #[error("A {0} resource is already live")]
    ResourceBusy(ResourceKind),

    // ===== Startup / ambient =====
    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decode error: {0}")]
    ImageDecode(String),

    #[error("Initialization failed: {0}")]
    Init(String),
}

impl AppError {
    /// Is this error recoverable?
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::ItemNotFound { .. }
                | AppError::EmptyCategory(_)
                | AppError::IndexOutOfRange { .. }
                | AppError::NotOpen
                | AppError::EngineLoad(_)
                | AppError::MediaLoad(_)
                | AppError::Download(_)
                | AppError::OpenUrl(_)
                | AppError::Clipboard(_)
                | AppError::Fullscreen(_)
                | AppError::Io(_)
                | AppError::ImageDecode(_)
        )
    }

    /// Is this a fatal error?
    pub fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Get a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AppError::ItemNotFound { .. } => "That item is no longer available".to_string(),
            AppError::EmptyCategory(category) => format!("No {} yet - coming soon", category),
            AppError::ImageDecode(_) => "Cannot load image".to_string(),
            AppError::ResourceBusy(_) => "Preview is busy, close it and try again".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<app_fs::ActionError> for AppError {
    fn from(e: app_fs::ActionError) -> Self {
        match e {
            app_fs::ActionError::Clipboard(msg) => AppError::Clipboard(msg),
            app_fs::ActionError::Open { url, reason } => AppError::OpenUrl(format!("{} ({})", url, reason)),
            app_fs::ActionError::MissingUrl => AppError::Download("Download URL missing".to_string()),
            other => AppError::Download(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Catalog(e.to_string())
    }
}

impl From<image::ImageError> for AppError {
    fn from(e: image::ImageError) -> Self {
        AppError::ImageDecode(e.to_string())
    }
}
