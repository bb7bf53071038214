//! Simulation settings loaded from an optional TOML file.
//!
//! Lookup order: `--config <path>`, then `NFIELD_CONFIG`, then built-in
//! defaults. Every key is optional.
//!
//! ```toml
//! width = 1280
//! height = 720
//! seed = 7
//! reduced_motion = false
//! frame_interval_ms = 16
//! target_fps = 60
//!
//! [host]
//! hardware_concurrency = 8
//! device_pixel_ratio = 2.0
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use nfield_core::{FRAME_MS, HostHints, TARGET_FPS};
use serde::{Deserialize, Serialize};

pub const CONFIG_ENV: &str = "NFIELD_CONFIG";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Surface width in surface units.
    pub width: f64,
    pub height: f64,
    /// Fixed RNG seed; random when absent.
    pub seed: Option<u64>,
    pub reduced_motion: bool,
    /// Spacing of frame timestamps.
    pub frame_interval_ms: f64,
    pub target_fps: f64,
    /// Overrides for the probed host hints.
    pub host: HostHints,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            seed: None,
            reduced_motion: false,
            frame_interval_ms: FRAME_MS,
            target_fps: TARGET_FPS,
            host: HostHints::default(),
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub seed: Option<u64>,
    pub reduced_motion: bool,
}

impl SimConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: SimConfig = toml::from_str(content).context("failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, else from `NFIELD_CONFIG`, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(width) = overrides.width {
            self.width = width;
        }
        if let Some(height) = overrides.height {
            self.height = height;
        }
        if overrides.seed.is_some() {
            self.seed = overrides.seed;
        }
        self.reduced_motion |= overrides.reduced_motion;
    }

    /// Host hints for this machine with the configured overrides on top.
    pub fn host_hints(&self) -> HostHints {
        HostHints::from_system().merged(&self.host)
    }

    fn validate(&self) -> Result<()> {
        if !(self.frame_interval_ms.is_finite() && self.frame_interval_ms > 0.0) {
            bail!("frame_interval_ms must be positive, got {}", self.frame_interval_ms);
        }
        if !(self.target_fps.is_finite() && self.target_fps > 0.0) {
            bail!("target_fps must be positive, got {}", self.target_fps);
        }
        Ok(())
    }
}
