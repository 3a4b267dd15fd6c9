//! Image loading and decoding service
//!
//! Card thumbnails and photo previews are decoded off the UI thread. Requests
//! queue on a channel; the worker drains whatever is queued and decodes the
//! batch in parallel.

use crate::AppError;
use crossbeam_channel::{Receiver, Sender};
use image::{GenericImageView, ImageReader};
use rayon::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;
use xxhash_rust::xxh3::xxh3_64;

/// Image loader service
pub struct ImageLoader {
    request_tx: Sender<LoadRequest>,
    result_rx: Receiver<LoadResult>,
}

/// Load request
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub key: String,
    pub path: PathBuf,
    /// Longest edge of the decoded image
    pub max_size: Option<u32>,
}

/// Finished load
#[derive(Debug)]
pub struct LoadResult {
    pub key: String,
    pub image: Result<LoadedImage, AppError>,
}

/// Decoded RGBA8 image
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
    /// xxh3 of the encoded bytes
    pub hash: u64,
}

impl ImageLoader {
    /// Create a new image loader with its worker thread
    pub fn new() -> Result<Self, AppError> {
        let (request_tx, request_rx) = crossbeam_channel::unbounded::<LoadRequest>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<LoadResult>();

        std::thread::Builder::new()
            .name("image-loader".into())
            .spawn(move || {
                while let Ok(first) = request_rx.recv() {
                    let mut batch = vec![first];
                    batch.extend(request_rx.try_iter());

                    let results: Vec<LoadResult> = batch
                        .into_par_iter()
                        .map(|req| LoadResult {
                            image: decode_file(&req.path, req.max_size),
                            key: req.key,
                        })
                        .collect();

                    for result in results {
                        if result_tx.send(result).is_err() {
                            return;
                        }
                    }
                }
                tracing::debug!("Image loader stopped");
            })
            .map_err(|e| AppError::Init(format!("image loader thread: {}", e)))?;

        Ok(Self { request_tx, result_rx })
    }

    /// Queue a decode; returns false when the worker is gone
    pub fn request(&self, key: impl Into<String>, path: impl Into<PathBuf>, max_size: Option<u32>) -> bool {
        self.request_tx
            .send(LoadRequest {
                key: key.into(),
                path: path.into(),
                max_size,
            })
            .is_ok()
    }

    /// Finished loads, without blocking
    pub fn poll(&self) -> Vec<LoadResult> {
        self.result_rx.try_iter().collect()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<LoadResult> {
        self.result_rx.recv_timeout(timeout).ok()
    }
}

/// Decode an image file, shrinking it to fit `max_size` if given
pub fn decode_file(path: &Path, max_size: Option<u32>) -> Result<LoadedImage, AppError> {
    tracing::debug!("Loading image: {:?}", path);
    let data = std::fs::read(path)?;
    decode_bytes(&data, max_size)
}

pub fn decode_bytes(data: &[u8], max_size: Option<u32>) -> Result<LoadedImage, AppError> {
    let hash = xxh3_64(data);

    let img = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| AppError::ImageDecode(e.to_string()))?
        .decode()?;

    let img = match max_size {
        Some(max) => {
            let (w, h) = img.dimensions();
            if w > max || h > max {
                img.thumbnail(max, max)
            } else {
                img
            }
        }
        None => img,
    };

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(LoadedImage {
        width,
        height,
        rgba: rgba.into_raw(),
        hash,
    })
}

/// Stable cache key for an asset URL
pub fn cache_key(url: &str) -> u64 {
    xxh3_64(url.trim().as_bytes())
}

/// Check if a file is a supported image format
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            matches!(
                e.to_lowercase().as_str(),
                "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp"
            )
        })
        .unwrap_or(false)
}
