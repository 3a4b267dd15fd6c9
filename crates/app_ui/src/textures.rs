//! Texture cache for catalog images
//!
//! Card thumbnails and photo previews are decoded by the background
//! [`ImageLoader`] and uploaded to egui once they arrive. Entries are keyed by
//! asset URL and decode size, so the grid thumbnail and the full preview of the
//! same photo are cached separately.

use app_core::{cache_key, is_supported_image, AppError, ImageLoader};
use app_fs::{resolve_asset, AssetLocation};
use egui::{ColorImage, TextureHandle, TextureOptions};
use std::collections::HashMap;
use std::path::PathBuf;

/// Load state of one cached image
#[derive(Clone)]
pub enum TextureState {
    Loading,
    Ready { texture: TextureHandle, size: [u32; 2] },
    /// Missing file, undecodable data or a remote URL
    Unavailable,
}

impl TextureState {
    pub fn texture(&self) -> Option<&TextureHandle> {
        match self {
            TextureState::Ready { texture, .. } => Some(texture),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, TextureState::Loading)
    }
}

pub struct TextureCache {
    loader: ImageLoader,
    assets_root: PathBuf,
    entries: HashMap<u64, TextureState>,
}

impl TextureCache {
    pub fn new(assets_root: impl Into<PathBuf>) -> Result<Self, AppError> {
        Ok(Self {
            loader: ImageLoader::new()?,
            assets_root: assets_root.into(),
            entries: HashMap::new(),
        })
    }

    fn key(url: &str, max_size: Option<u32>) -> String {
        match max_size {
            Some(size) => format!("{}@{}", url.trim(), size),
            None => url.trim().to_string(),
        }
    }

    /// Current state for `url`, queuing a decode on first sight
    pub fn get(&mut self, url: &str, max_size: Option<u32>) -> TextureState {
        let key = Self::key(url, max_size);
        let hash = cache_key(&key);
        if let Some(state) = self.entries.get(&hash) {
            return state.clone();
        }

        let state = match resolve_asset(&self.assets_root, url) {
            AssetLocation::Local(path) if !is_supported_image(&path) => {
                tracing::debug!("Not an image format: {}", url);
                TextureState::Unavailable
            }
            AssetLocation::Local(path) => {
                if self.loader.request(key.clone(), path, max_size) {
                    TextureState::Loading
                } else {
                    tracing::warn!("Image loader gone, cannot load {}", url);
                    TextureState::Unavailable
                }
            }
            AssetLocation::Remote(remote) => {
                tracing::debug!("Remote image not cached: {}", remote);
                TextureState::Unavailable
            }
        };

        self.entries.insert(hash, state.clone());
        state
    }

    /// Upload finished decodes; returns true when anything changed
    pub fn poll(&mut self, ctx: &egui::Context) -> bool {
        let results = self.loader.poll();
        let changed = !results.is_empty();

        for result in results {
            let state = match result.image {
                Ok(image) => {
                    let color = ColorImage::from_rgba_unmultiplied(
                        [image.width as usize, image.height as usize],
                        &image.rgba,
                    );
                    let texture = ctx.load_texture(&result.key, color, TextureOptions::LINEAR);
                    TextureState::Ready {
                        texture,
                        size: [image.width, image.height],
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to load {}: {}", result.key, e);
                    TextureState::Unavailable
                }
            };
            self.entries.insert(cache_key(&result.key), state);
        }

        changed
    }

    pub fn pending(&self) -> usize {
        self.entries.values().filter(|s| s.is_loading()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every texture (theme or asset root change)
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
