//! Application configuration

use crate::command::CommandId;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub catalog: CatalogConfig,
    pub viewer: ViewerConfig,
    pub notifications: NotificationConfig,
    pub engine: EngineSettings,
    pub downloads: DownloadConfig,
    pub keybindings: HashMap<String, Vec<String>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            catalog: CatalogConfig::default(),
            viewer: ViewerConfig::default(),
            notifications: NotificationConfig::default(),
            engine: EngineSettings::default(),
            downloads: DownloadConfig::default(),
            keybindings: default_keybindings(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub language: String,
    pub theme: String,
    pub start_maximized: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            theme: "dark".to_string(),
            start_maximized: false,
        }
    }
}

/// Where the portfolio data lives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Portfolio data file
    pub path: PathBuf,
    /// Directory site-relative asset URLs resolve against
    pub assets_root: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("catalog.json"),
            assets_root: PathBuf::from("."),
        }
    }
}

impl CatalogConfig {
    /// Catalog path, relative paths resolved against `base`
    pub fn resolved_path(&self, base: &Path) -> PathBuf {
        if self.path.is_absolute() {
            self.path.clone()
        } else {
            base.join(&self.path)
        }
    }

    pub fn resolved_assets_root(&self, base: &Path) -> PathBuf {
        if self.assets_root.is_absolute() {
            self.assets_root.clone()
        } else {
            base.join(&self.assets_root)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub zoom_min: f32,
    pub zoom_max: f32,
    pub zoom_step: f32,
    pub swipe_threshold_px: f32,
    pub autoplay_video: bool,
    pub start_muted: bool,
    pub thumbnail_size: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            zoom_min: 1.0,
            zoom_max: 3.0,
            zoom_step: 0.25,
            swipe_threshold_px: 50.0,
            autoplay_video: true,
            start_muted: false,
            thumbnail_size: 256,
        }
    }
}

impl ViewerConfig {
    /// Validated `(min, max, step)` zoom bounds
    pub fn zoom_bounds(&self) -> (f32, f32, f32) {
        let valid = self.zoom_min.is_finite()
            && self.zoom_max.is_finite()
            && self.zoom_step.is_finite()
            && self.zoom_min >= 1.0
            && self.zoom_max >= self.zoom_min
            && self.zoom_step > 0.0;

        if valid {
            (self.zoom_min, self.zoom_max, self.zoom_step)
        } else {
            tracing::warn!(
                min = self.zoom_min,
                max = self.zoom_max,
                step = self.zoom_step,
                "Invalid zoom bounds, using defaults"
            );
            let d = Self::default();
            (d.zoom_min, d.zoom_max, d.zoom_step)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub max_visible: usize,
    pub duration_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            max_visible: 3,
            duration_ms: 4500,
        }
    }
}

impl NotificationConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Game engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// External runtime that hosts the game build
    pub runtime_command: Option<String>,
    pub build_dir: String,
    pub streaming_assets_url: String,
    pub company_name: String,
    pub product_version: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            runtime_command: None,
            build_dir: "games".to_string(),
            streaming_assets_url: "StreamingAssets".to_string(),
            company_name: "DefaultCompany".to_string(),
            product_version: "1.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Target directory; the user's download directory when unset
    pub directory: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::info!("Configuration loaded from {:?}", config_path);
            Ok(config)
        } else {
            tracing::info!("Using default configuration");
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;

        tracing::info!("Configuration saved to {:?}", config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("com", "FolioViewer", "FolioViewer")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }

    /// Keys bound to `command`, falling back to the built-in defaults
    pub fn keys_for(&self, command: &str) -> Vec<String> {
        self.keybindings
            .get(command)
            .cloned()
            .or_else(|| default_keybindings().remove(command))
            .unwrap_or_default()
    }
}

fn default_keybindings() -> HashMap<String, Vec<String>> {
    let mut kb = HashMap::new();

    // Modal
    kb.insert(CommandId::MODAL_CLOSE.into(), vec!["Escape".into()]);
    kb.insert(CommandId::MODAL_NEXT.into(), vec!["Right".into()]);
    kb.insert(CommandId::MODAL_PREV.into(), vec!["Left".into()]);

    // View
    kb.insert(CommandId::VIEW_ZOOM_IN.into(), vec!["+".into(), "=".into()]);
    kb.insert(CommandId::VIEW_ZOOM_OUT.into(), vec!["-".into()]);
    kb.insert(CommandId::VIEW_ZOOM_RESET.into(), vec!["0".into()]);
    kb.insert(CommandId::VIEW_TOGGLE_FULLSCREEN.into(), vec!["f".into(), "F11".into()]);

    // Media
    kb.insert(CommandId::MEDIA_TOGGLE_PLAY.into(), vec!["Space".into()]);
    kb.insert(CommandId::MEDIA_TOGGLE_MUTE.into(), vec!["m".into()]);
    kb.insert(CommandId::MEDIA_DOWNLOAD.into(), vec!["d".into()]);

    // Game / website
    kb.insert(CommandId::GAME_PLAY.into(), vec!["Return".into()]);
    kb.insert(CommandId::WEBSITE_VISIT.into(), vec!["Return".into()]);
    kb.insert(CommandId::WEBSITE_SHARE.into(), vec!["s".into()]);

    kb.insert(CommandId::APP_EXIT.into(), vec!["q".into()]);

    kb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [viewer]
            zoom_max = 4.0

            [engine]
            runtime_command = "game-runtime"
            "#,
        )
        .unwrap();

        assert_eq!(config.viewer.zoom_max, 4.0);
        assert_eq!(config.viewer.zoom_step, 0.25);
        assert_eq!(config.engine.runtime_command.as_deref(), Some("game-runtime"));
        assert_eq!(config.engine.build_dir, "games");
        assert_eq!(config.notifications.max_visible, 3);
    }

    #[test]
    fn test_invalid_zoom_bounds_fall_back() {
        let viewer = ViewerConfig {
            zoom_min: 2.0,
            zoom_max: 1.5,
            ..ViewerConfig::default()
        };
        assert_eq!(viewer.zoom_bounds(), (1.0, 3.0, 0.25));

        let viewer = ViewerConfig {
            zoom_step: 0.0,
            ..ViewerConfig::default()
        };
        assert_eq!(viewer.zoom_bounds(), (1.0, 3.0, 0.25));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.general.theme = "light".into();
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.general.theme, "light");
        assert_eq!(loaded.keys_for(CommandId::MODAL_CLOSE), vec!["Escape".to_string()]);
    }

    #[test]
    fn test_missing_binding_falls_back() {
        let mut config = AppConfig::default();
        config.keybindings.clear();
        assert_eq!(config.keys_for(CommandId::MEDIA_TOGGLE_MUTE), vec!["m".to_string()]);
        assert!(config.keys_for("unknown.command").is_empty());
    }
}
