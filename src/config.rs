use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::detect::BoundaryLayout;
use crate::ingest::SourceConfig;
use crate::transport::ControllerEndpoint;

const DEFAULT_SOURCE_URL: &str = "stub://camera/rgb/image_raw";
const DEFAULT_TARGET_FPS: u32 = 10;
const DEFAULT_WIDTH: u32 = 640;
const DEFAULT_HEIGHT: u32 = 480;
const DEFAULT_CONTROLLER_URL: &str = "stub://ball_chaser/command_robot";
const DEFAULT_DISPATCH_TIMEOUT_MS: u64 = 250;

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ChaserConfigFile {
    source: Option<SourceConfigFile>,
    controller: Option<ControllerConfigFile>,
    scanner: Option<ScannerConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SourceConfigFile {
    url: Option<String>,
    target_fps: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ControllerConfigFile {
    url: Option<String>,
    timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ScannerConfigFile {
    boundary_layout: Option<BoundaryLayout>,
}

/// Runtime configuration for the decision loop and its collaborators.
#[derive(Debug, Clone)]
pub struct ChaserConfig {
    pub source: SourceConfig,
    pub controller_url: String,
    pub dispatch_timeout: Duration,
    pub boundary_layout: BoundaryLayout,
}

impl Default for ChaserConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig {
                url: DEFAULT_SOURCE_URL.to_string(),
                target_fps: DEFAULT_TARGET_FPS,
                width: DEFAULT_WIDTH,
                height: DEFAULT_HEIGHT,
            },
            controller_url: DEFAULT_CONTROLLER_URL.to_string(),
            dispatch_timeout: Duration::from_millis(DEFAULT_DISPATCH_TIMEOUT_MS),
            boundary_layout: BoundaryLayout::default(),
        }
    }
}

impl ChaserConfig {
    /// Load from `$BALL_CHASER_CONFIG` (if set), apply environment overrides,
    /// then validate.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("BALL_CHASER_CONFIG").ok();
        Self::load_from(config_path.as_deref().map(Path::new))
    }

    /// Load from an explicit file (or defaults), then environment overrides.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let file_cfg = match path {
            Some(path) => read_config_file(path)?,
            None => ChaserConfigFile::default(),
        };
        let mut cfg = Self::from_file(file_cfg);
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: ChaserConfigFile) -> Self {
        let defaults = Self::default();
        let source = file.source.unwrap_or_default();
        let controller = file.controller.unwrap_or_default();
        Self {
            source: SourceConfig {
                url: source.url.unwrap_or(defaults.source.url),
                target_fps: source.target_fps.unwrap_or(defaults.source.target_fps),
                width: source.width.unwrap_or(defaults.source.width),
                height: source.height.unwrap_or(defaults.source.height),
            },
            controller_url: controller.url.unwrap_or(defaults.controller_url),
            dispatch_timeout: controller
                .timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.dispatch_timeout),
            boundary_layout: file
                .scanner
                .and_then(|scanner| scanner.boundary_layout)
                .unwrap_or(defaults.boundary_layout),
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("BALL_CHASER_SOURCE_URL") {
            if !url.trim().is_empty() {
                self.source.url = url;
            }
        }
        if let Ok(fps) = std::env::var("BALL_CHASER_TARGET_FPS") {
            self.source.target_fps = fps
                .trim()
                .parse()
                .map_err(|_| anyhow!("BALL_CHASER_TARGET_FPS must be an integer"))?;
        }
        if let Ok(url) = std::env::var("BALL_CHASER_CONTROLLER_URL") {
            if !url.trim().is_empty() {
                self.controller_url = url;
            }
        }
        if let Ok(timeout) = std::env::var("BALL_CHASER_DISPATCH_TIMEOUT_MS") {
            let millis: u64 = timeout.trim().parse().map_err(|_| {
                anyhow!("BALL_CHASER_DISPATCH_TIMEOUT_MS must be an integer number of milliseconds")
            })?;
            self.dispatch_timeout = Duration::from_millis(millis);
        }
        if let Ok(layout) = std::env::var("BALL_CHASER_BOUNDARY_LAYOUT") {
            if !layout.trim().is_empty() {
                self.boundary_layout = layout.parse()?;
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.source.target_fps == 0 {
            return Err(anyhow!("target_fps must be greater than zero"));
        }
        if self.source.width == 0 || self.source.height == 0 {
            return Err(anyhow!("frame width and height must be greater than zero"));
        }
        if self.dispatch_timeout.is_zero() {
            return Err(anyhow!("dispatch timeout must be greater than zero"));
        }
        self.controller_endpoint()?;
        Ok(())
    }

    pub fn controller_endpoint(&self) -> Result<ControllerEndpoint> {
        ControllerEndpoint::parse(&self.controller_url)
    }
}

fn read_config_file(path: &Path) -> Result<ChaserConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let cfg = if is_toml {
        toml::from_str(&raw).map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    };
    Ok(cfg)
}
