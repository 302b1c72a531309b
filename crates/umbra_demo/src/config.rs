//! Demo configuration
//!
//! Everything the demo needs to run: frame count and timing, output size,
//! shadow settings and the scene description.
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Path given with `--config`
//! 2. Environment variable: `UMBRA_CONFIG=/path/to/umbra.toml`
//! 3. `./umbra.toml`
//! 4. Built-in defaults (the demo scene)
//!
//! `UMBRA_FRAMES` and `UMBRA_DEPTH` then override the loaded values, and
//! command line flags override those.
//!
//! # Example Config File
//!
//! ```toml
//! frames = 120
//! frame_ms = 16.0
//! width = 320
//! height = 240
//! output = "shadows.png"
//!
//! [shadow]
//! extrusion_depth = 40.0
//! overlay_passes = 3
//! mark_strategy = "culled_passes"
//!
//! [scene.camera]
//! half_width = 24.0
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use umbra_render::ShadowConfig;
use umbra_scene::SceneConfig;

pub const CONFIG_ENV: &str = "UMBRA_CONFIG";
pub const FRAMES_ENV: &str = "UMBRA_FRAMES";
pub const DEPTH_ENV: &str = "UMBRA_DEPTH";
pub const DEFAULT_CONFIG_FILE: &str = "umbra.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Complete demo configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Frames to simulate and render
    pub frames: u32,
    /// Simulated time per frame in milliseconds
    pub frame_ms: f32,
    pub width: usize,
    pub height: usize,
    /// Clear colour
    pub background: [f32; 4],
    /// PNG path for the final frame
    pub output: Option<PathBuf>,
    pub shadow: ShadowConfig,
    pub scene: SceneConfig,
    /// Where this configuration was loaded from
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            frames: 60,
            frame_ms: 16.0,
            width: 320,
            height: 240,
            background: [0.1, 0.1, 0.15, 1.0],
            output: None,
            shadow: ShadowConfig::default(),
            scene: SceneConfig::default(),
            config_path: None,
        }
    }
}

impl DemoConfig {
    /// Load from the process environment and the working directory
    pub fn load(cli_path: Option<&Path>) -> ConfigResult<Self> {
        Self::load_with(cli_path, |name| std::env::var(name).ok())
    }

    /// Load with a custom environment lookup
    pub fn load_with<F>(cli_path: Option<&Path>, env: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_path = env(CONFIG_ENV).filter(|p| !p.is_empty()).map(PathBuf::from);
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        let path = match (cli_path, env_path) {
            (Some(path), _) => Some(path.to_path_buf()),
            (None, Some(path)) => Some(path),
            (None, None) if default_path.exists() => Some(default_path.to_path_buf()),
            (None, None) => None,
        };

        let mut config = match path {
            Some(path) => {
                let config = Self::load_from_file(&path)?;
                log::info!("Loaded demo config from {}", path.display());
                config
            }
            None => {
                log::info!("No config file found, using defaults");
                Self::default()
            }
        };

        config.apply_env(env);
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply `UMBRA_FRAMES` and `UMBRA_DEPTH`; unparsable values are ignored
    pub fn apply_env<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = env(FRAMES_ENV) {
            match value.trim().parse() {
                Ok(frames) => {
                    self.frames = frames;
                    log::info!("Frames from env: {}", self.frames);
                }
                Err(_) => log::warn!("Ignoring {}={:?}", FRAMES_ENV, value),
            }
        }

        if let Some(value) = env(DEPTH_ENV) {
            match value.trim().parse() {
                Ok(depth) => {
                    self.shadow.extrusion_depth = depth;
                    log::info!("Extrusion depth from env: {}", depth);
                }
                Err(_) => log::warn!("Ignoring {}={:?}", DEPTH_ENV, value),
            }
        }
    }

    /// Apply command line overrides
    pub fn apply_overrides(
        &mut self,
        frames: Option<u32>,
        output: Option<PathBuf>,
        width: Option<usize>,
        height: Option<usize>,
    ) {
        if let Some(frames) = frames {
            self.frames = frames;
        }
        if output.is_some() {
            self.output = output;
        }
        if let Some(width) = width {
            self.width = width;
        }
        if let Some(height) = height {
            self.height = height;
        }
        self.width = self.width.max(1);
        self.height = self.height.max(1);
        self.shadow.validate();
    }

    pub fn print_summary(&self) {
        log::info!("Demo configuration:");
        if let Some(path) = &self.config_path {
            log::info!("  Source: {}", path.display());
        }
        log::info!("  Frames: {} x {} ms", self.frames, self.frame_ms);
        log::info!("  Viewport: {}x{}", self.width, self.height);
        log::info!(
            "  Shadows: depth {}, {} overlay passes, {:?}",
            self.shadow.extrusion_depth,
            self.shadow.overlay_passes,
            self.shadow.mark_strategy
        );
        if let Some(output) = &self.output {
            log::info!("  Output: {}", output.display());
        }
    }
}
