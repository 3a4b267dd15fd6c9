//! External actions triggered from the preview modal
//! Provides download, open-in-browser and clipboard operations

use crate::{sanitize_filename, ActionError, Result, SanitizeMode};
use std::path::{Path, PathBuf};

/// Where a catalog URL points to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetLocation {
    /// File under the assets root
    Local(PathBuf),
    /// Absolute web URL
    Remote(String),
}

/// Map a catalog URL onto the filesystem.
///
/// Site-relative URLs (`/images/a.jpg`, `images/a.jpg`) resolve against `root`;
/// `http(s)://` URLs stay remote.
pub fn resolve_asset(root: &Path, url: &str) -> AssetLocation {
    let url = url.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        return AssetLocation::Remote(url.to_string());
    }

    let relative = url.trim_start_matches('/');
    AssetLocation::Local(root.join(relative))
}

/// Result of a download request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Copied into the download directory
    Saved(PathBuf),
    /// Remote asset handed to the system browser to save
    Delegated(String),
}

/// Side effects outside the application window
pub trait ExternalActions: Send {
    /// Save the asset behind `url` as `filename`
    fn download(&self, url: &str, filename: &str) -> Result<DownloadOutcome>;

    /// Open `url` in a new browsing context
    fn open_url(&self, url: &str) -> Result<()>;

    /// Put `text` on the system clipboard
    fn copy_text(&self, text: &str) -> Result<()>;
}

/// Desktop implementation of external actions
pub struct DesktopActions {
    assets_root: PathBuf,
    download_dir: Option<PathBuf>,

    #[cfg(feature = "clipboard")]
    clipboard: parking_lot::Mutex<Option<arboard::Clipboard>>,
}

impl DesktopActions {
    /// Create with the assets root and an optional download directory override
    pub fn new(assets_root: impl Into<PathBuf>, download_dir: Option<PathBuf>) -> Self {
        #[cfg(feature = "open-external")]
        let download_dir = download_dir.or_else(dirs_next::download_dir);

        Self {
            assets_root: assets_root.into(),
            download_dir,

            #[cfg(feature = "clipboard")]
            clipboard: parking_lot::Mutex::new(None),
        }
    }

    /// Directory downloads are written to
    pub fn download_dir(&self) -> Option<&Path> {
        self.download_dir.as_deref()
    }

    fn save_local(&self, source: &Path, filename: &str) -> Result<PathBuf> {
        if !source.is_file() {
            return Err(ActionError::NotFound(source.to_path_buf()));
        }

        let dir = self.download_dir.as_deref().ok_or(ActionError::NoDownloadDir)?;
        std::fs::create_dir_all(dir)?;

        let name = sanitize_filename(filename, SanitizeMode::Underscore);
        let dest = unique_destination(dir, &name);
        std::fs::copy(source, &dest)?;

        tracing::info!("Saved {} -> {}", source.display(), dest.display());
        Ok(dest)
    }
}

impl ExternalActions for DesktopActions {
    fn download(&self, url: &str, filename: &str) -> Result<DownloadOutcome> {
        if url.trim().is_empty() {
            return Err(ActionError::MissingUrl);
        }

        match resolve_asset(&self.assets_root, url) {
            AssetLocation::Local(path) => self.save_local(&path, filename).map(DownloadOutcome::Saved),
            AssetLocation::Remote(remote) => {
                self.open_url(&remote)?;
                Ok(DownloadOutcome::Delegated(remote))
            }
        }
    }

    #[cfg(feature = "open-external")]
    fn open_url(&self, url: &str) -> Result<()> {
        if url.trim().is_empty() {
            return Err(ActionError::MissingUrl);
        }

        open::that(url).map_err(|e| ActionError::Open {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        tracing::info!("Opened externally: {}", url);
        Ok(())
    }

    #[cfg(not(feature = "open-external"))]
    fn open_url(&self, _url: &str) -> Result<()> {
        Err(ActionError::Unsupported("open-external"))
    }

    #[cfg(feature = "clipboard")]
    fn copy_text(&self, text: &str) -> Result<()> {
        let mut guard = self.clipboard.lock();
        if guard.is_none() {
            *guard = Some(arboard::Clipboard::new().map_err(|e| ActionError::Clipboard(e.to_string()))?);
        }

        if let Some(clipboard) = guard.as_mut() {
            clipboard
                .set_text(text.to_string())
                .map_err(|e| ActionError::Clipboard(e.to_string()))?;
        }

        tracing::debug!("Copied {} bytes to clipboard", text.len());
        Ok(())
    }

    #[cfg(not(feature = "clipboard"))]
    fn copy_text(&self, _text: &str) -> Result<()> {
        Err(ActionError::Unsupported("clipboard"))
    }
}

/// Pick `dir/name`, or `dir/stem (n).ext` when that file already exists
pub fn unique_destination(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let path = Path::new(name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(name);
    let ext = path.extension().and_then(|e| e.to_str());

    (1u32..)
        .map(|n| match ext {
            Some(ext) => dir.join(format!("{} ({}).{}", stem, n, ext)),
            None => dir.join(format!("{} ({})", stem, n)),
        })
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}
