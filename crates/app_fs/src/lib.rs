//! Folio Viewer platform actions
//!
//! Provides the side effects the preview modal triggers outside the window:
//! - Downloads: saving a catalog asset into the user's download directory
//! - Opening URLs in the system browser
//! - Clipboard text
//! - Filename sanitization for saved files

mod sanitize;
mod actions;

pub use sanitize::{sanitize_filename, is_valid_filename, with_extension, SanitizeMode};
pub use actions::{ExternalActions, DesktopActions, DownloadOutcome, AssetLocation, resolve_asset, unique_destination};

use std::path::PathBuf;
use thiserror::Error;

/// External action errors
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Source not found: {0}")]
    NotFound(PathBuf),

    #[error("Missing URL")]
    MissingUrl,

    #[error("No download directory available")]
    NoDownloadDir,

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Failed to open {url}: {reason}")]
    Open { url: String, reason: String },

    #[error("Feature not enabled: {0}")]
    Unsupported(&'static str),
}

pub type Result<T> = std::result::Result<T, ActionError>;
