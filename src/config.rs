use rgb::RGB8;
use serde::Deserialize;

use crate::layout::TimeLayout;
use crate::renderer::RenderOptions;

/// Configuration shipped with the firmware.
pub const DEFAULT_CONFIG: &str = include_str!("../clock.toml");

/// Which panel hardware the clock drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// LED driver chip on an I2C bus.
    #[default]
    Chip,
    /// Addressable pixel strip.
    Strip,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    pub backend: Backend,
    pub animations: bool,
    pub minute_ticks: bool,
    pub poll_interval_ms: u32,
    pub chip: ChipConfig,
    pub strip: StripConfig,
    /// Replaces the built-in English layout when present.
    pub layout: Option<TimeLayout>,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            animations: true,
            minute_ticks: false,
            poll_interval_ms: 1000,
            chip: ChipConfig::default(),
            strip: StripConfig::default(),
            layout: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChipConfig {
    /// 7-bit I2C address of the chip.
    pub address: u8,
}

impl Default for ChipConfig {
    fn default() -> Self {
        Self { address: 0x30 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StripConfig {
    /// Colour of lit pixels at full brightness, `[r, g, b]`.
    pub colour: [u8; 3],
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            colour: [255, 255, 255],
        }
    }
}

impl StripConfig {
    #[inline]
    pub fn colour(&self) -> RGB8 {
        let [r, g, b] = self.colour;
        RGB8::new(r, g, b)
    }
}

impl ClockConfig {
    /// Parse a configuration from TOML; missing keys take their defaults.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(ConfigError::Parsing)
    }

    /// Read and parse a configuration file.
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Reading {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&source)
    }

    /// The configuration shipped with the firmware.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_toml(DEFAULT_CONFIG)
    }

    #[inline]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            animations: self.animations,
            minute_ticks: self.minute_ticks,
        }
    }

    /// The configured layout, or the built-in English one.
    pub fn layout(&self) -> TimeLayout {
        self.layout.clone().unwrap_or_default()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration file '{}'", .path.display())]
    Reading {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parsing(#[from] toml::de::Error),
}
