//! Clock-driven video element
//!
//! The desktop build has no decoder in its stack, so the preview shows the
//! video's poster frame and tracks playback as a clock. Sources resolve
//! through the same asset root as images; a local file that does not exist
//! fails to load, remote URLs are accepted as-is.

use app_core::{AppError, MediaElement, MediaFactory, MediaLoad, PlayOutcome};
use app_fs::{resolve_asset, AssetLocation};
use std::path::PathBuf;
use std::time::{Duration, Instant};

pub struct ClockedVideo {
    source: Option<String>,
    location: AssetLocation,
    muted: bool,
    /// Set while playing
    started: Option<Instant>,
    elapsed: Duration,
}

impl ClockedVideo {
    pub fn new(source: &str, location: AssetLocation) -> Self {
        Self {
            source: Some(source.to_string()),
            location,
            muted: false,
            started: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Playback position
    pub fn position(&self) -> Duration {
        self.elapsed + self.started.map(|t| t.elapsed()).unwrap_or_default()
    }
}

impl MediaElement for ClockedVideo {
    fn load(&mut self) -> Result<MediaLoad, AppError> {
        let Some(source) = self.source.as_deref() else {
            return Err(AppError::MediaLoad("no source".into()));
        };

        match &self.location {
            AssetLocation::Local(path) if !path.is_file() => {
                Err(AppError::MediaLoad(format!("{} not found", source)))
            }
            _ => {
                tracing::debug!(source, "Video loaded");
                Ok(MediaLoad::FirstFrame)
            }
        }
    }

    fn play(&mut self) -> PlayOutcome {
        if self.source.is_some() && self.started.is_none() {
            self.started = Some(Instant::now());
        }
        PlayOutcome::Playing
    }

    fn pause(&mut self) {
        if let Some(started) = self.started.take() {
            self.elapsed += started.elapsed();
        }
    }

    fn is_paused(&self) -> bool {
        self.started.is_none()
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn is_muted(&self) -> bool {
        self.muted
    }

    fn detach_source(&mut self) {
        self.pause();
        self.source = None;
        self.elapsed = Duration::ZERO;
    }

    fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

/// Creates [`ClockedVideo`]s for catalog URLs
pub struct ClockedVideoFactory {
    assets_root: PathBuf,
}

impl ClockedVideoFactory {
    pub fn new(assets_root: impl Into<PathBuf>) -> Self {
        Self {
            assets_root: assets_root.into(),
        }
    }
}

impl MediaFactory for ClockedVideoFactory {
    fn create(&mut self, media_url: &str) -> Result<Box<dyn MediaElement>, AppError> {
        if media_url.trim().is_empty() {
            return Err(AppError::MediaLoad("empty video URL".into()));
        }
        let location = resolve_asset(&self.assets_root, media_url);
        Ok(Box::new(ClockedVideo::new(media_url, location)))
    }
}
