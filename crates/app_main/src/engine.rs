//! Out-of-process game engine
//!
//! Games run in an external runtime. Instantiation verifies the three build
//! files (reporting progress per file), then launches the runtime with the
//! build configuration. The child is killed on shutdown or when the handle
//! is dropped.

use app_core::{Engine, EngineConfig, EngineError, EngineHandle, MountPoint, ProgressFn};
use app_fs::{resolve_asset, AssetLocation};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::PathBuf;
use tokio::process::{Child, Command};

pub struct ProcessEngine {
    runtime_command: Option<String>,
    assets_root: PathBuf,
}

impl ProcessEngine {
    pub fn new(runtime_command: Option<String>, assets_root: impl Into<PathBuf>) -> Self {
        Self {
            runtime_command: runtime_command.filter(|c| !c.trim().is_empty()),
            assets_root: assets_root.into(),
        }
    }

    async fn locate(&self, url: &str) -> Result<PathBuf, EngineError> {
        match resolve_asset(&self.assets_root, url) {
            AssetLocation::Local(path) => match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.is_file() => Ok(path),
                _ => Err(EngineError::MissingAsset(url.to_string())),
            },
            // The runtime fetches remote builds itself
            AssetLocation::Remote(remote) => Ok(PathBuf::from(remote)),
        }
    }
}

#[async_trait]
impl Engine for ProcessEngine {
    async fn instantiate(
        &self,
        mount: &MountPoint,
        config: &EngineConfig,
        progress: ProgressFn,
    ) -> Result<Box<dyn EngineHandle>, EngineError> {
        let program = self.runtime_command.as_deref().ok_or(EngineError::Unavailable)?;

        progress(0.0);
        let assets = config.build_assets();
        let mut paths = Vec::with_capacity(assets.len());
        for (i, url) in assets.iter().enumerate() {
            paths.push(self.locate(url).await?);
            // Leave the last step for the launch itself
            progress((i + 1) as f32 / (assets.len() + 1) as f32);
        }

        let child = Command::new(program)
            .arg("--mount")
            .arg(mount.id())
            .arg("--data")
            .arg(&paths[0])
            .arg("--framework")
            .arg(&paths[1])
            .arg("--code")
            .arg(&paths[2])
            .arg("--streaming-assets")
            .arg(&config.streaming_assets_url)
            .env("FOLIO_COMPANY_NAME", &config.company_name)
            .env("FOLIO_PRODUCT_NAME", &config.product_name)
            .env("FOLIO_PRODUCT_VERSION", &config.product_version)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EngineError::Spawn(format!("{}: {}", program, e)))?;

        tracing::info!(
            pid = child.id(),
            product = %config.product_name,
            "Game runtime started"
        );
        progress(1.0);

        Ok(Box::new(ProcessHandle {
            child: Mutex::new(child),
        }))
    }
}

/// Running game runtime process
pub struct ProcessHandle {
    child: Mutex<Child>,
}

impl EngineHandle for ProcessHandle {
    fn shutdown(&mut self) -> Result<(), EngineError> {
        let child = self.child.get_mut();

        if let Some(status) = child.try_wait()? {
            tracing::debug!(%status, "Game runtime already exited");
            return Ok(());
        }

        child
            .start_kill()
            .map_err(|e| EngineError::Shutdown(e.to_string()))?;
        tracing::info!(pid = child.id(), "Game runtime stopped");
        Ok(())
    }

    fn is_running(&self) -> bool {
        matches!(self.child.lock().try_wait(), Ok(None))
    }
}
