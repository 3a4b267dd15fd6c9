//! Folio Viewer - portfolio browser with an in-place media preview
//!
//! Main entry point.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod display;
mod engine;
mod video;

use anyhow::{Context, Result};

fn main() -> Result<()> {
    // Initialize logging and panic hook first
    let _log_guard = app_log::init()?;

    // Clean up old logs (7 days)
    if let Err(e) = app_log::cleanup_old_logs(7) {
        tracing::warn!("Failed to cleanup old logs: {}", e);
    }

    tracing::info!("Folio Viewer starting...");

    // Load configuration
    let config = app_core::AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("Using default configuration: {:#}", e);
        app_core::AppConfig::default()
    });

    // Relative catalog paths are taken from the working directory
    let base = std::env::current_dir().context("Cannot read working directory")?;
    let catalog_path = config.catalog.resolved_path(&base);
    let assets_root = config.catalog.resolved_assets_root(&base);

    let catalog = app_core::Catalog::load(&catalog_path)
        .with_context(|| format!("Failed to load catalog {}", catalog_path.display()))?;

    // Initialize application state
    let state = app_core::init(config, catalog)?;

    // Run the application
    app::run(state, assets_root)
}
