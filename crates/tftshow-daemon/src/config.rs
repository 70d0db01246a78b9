//! Configuration management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tftshow_hw::codec::parse_hex_color;
use tftshow_hw::{ChannelOrder, Orientation, Panel};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the images and the optional `config.txt`
    #[serde(default = "default_images")]
    pub images: PathBuf,

    /// Seconds between images, unless `config.txt` overrides it
    #[serde(default = "default_delay")]
    pub delay: f64,

    /// Panel geometry
    #[serde(default)]
    pub panel: PanelConfig,

    /// SPI and GPIO wiring
    #[serde(default)]
    pub bus: BusConfig,

    /// Display output
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Panel geometry and color layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Native (portrait) width
    #[serde(default = "default_width")]
    pub width: u16,

    /// Native (portrait) height
    #[serde(default = "default_height")]
    pub height: u16,

    /// "portrait", "landscape", "portrait-flipped" or "landscape-flipped"
    #[serde(default = "default_orientation")]
    pub orientation: String,

    /// "bgr" or "rgb"
    #[serde(default = "default_channel_order")]
    pub channel_order: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            orientation: default_orientation(),
            channel_order: default_channel_order(),
        }
    }
}

impl PanelConfig {
    /// Builds the immutable panel description.
    pub fn build(&self) -> Result<Panel> {
        let orientation: Orientation = self
            .orientation
            .parse()
            .with_context(|| format!("Invalid panel orientation '{}'", self.orientation))?;
        let order: ChannelOrder = self
            .channel_order
            .parse()
            .with_context(|| format!("Invalid channel order '{}'", self.channel_order))?;
        if self.width == 0 || self.height == 0 {
            anyhow::bail!("Panel dimensions must be non-zero");
        }
        Ok(Panel::new(self.width, self.height, orientation, order))
    }
}

/// Linux SPI and GPIO character device wiring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusConfig {
    /// spidev device path
    #[serde(default = "default_spi")]
    pub spi: String,

    /// SPI clock in Hz
    #[serde(default = "default_speed")]
    pub speed_hz: u32,

    /// GPIO chip device path
    #[serde(default = "default_gpio_chip")]
    pub gpio_chip: String,

    /// Data/command line offset
    #[serde(default = "default_dc")]
    pub dc: u32,

    /// Chip-select line offset
    #[serde(default = "default_cs")]
    pub cs: u32,

    /// Reset line offset, if wired
    #[serde(default)]
    pub rst: Option<u32>,

    /// Backlight enable line offset, if wired
    #[serde(default)]
    pub backlight: Option<u32>,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            spi: default_spi(),
            speed_hz: default_speed(),
            gpio_chip: default_gpio_chip(),
            dc: default_dc(),
            cs: default_cs(),
            rst: None,
            backlight: None,
        }
    }
}

/// Display output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Drive the panel; when false images are only logged
    #[serde(default = "default_true")]
    pub enable: bool,

    /// Color the screen is cleared to on startup (#RRGGBB)
    #[serde(default = "default_clear_color")]
    pub clear_color: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            enable: default_true(),
            clear_color: default_clear_color(),
        }
    }
}

impl DisplayConfig {
    /// Packs the clear color for `panel`.
    pub fn clear_color(&self, panel: &Panel) -> Result<u16> {
        parse_hex_color(&self.clear_color, panel.codec())
            .with_context(|| format!("Invalid clear color '{}'", self.clear_color))
    }
}

// Default value functions
fn default_images() -> PathBuf {
    PathBuf::from("/media/sd")
}

fn default_delay() -> f64 {
    crate::settings::DEFAULT_DELAY
}

fn default_width() -> u16 {
    tftshow_hw::PANEL_WIDTH
}

fn default_height() -> u16 {
    tftshow_hw::PANEL_HEIGHT
}

fn default_orientation() -> String {
    "portrait".to_string()
}

fn default_channel_order() -> String {
    "bgr".to_string()
}

fn default_spi() -> String {
    "/dev/spidev0.0".to_string()
}

fn default_speed() -> u32 {
    40_000_000
}

fn default_gpio_chip() -> String {
    "/dev/gpiochip0".to_string()
}

fn default_dc() -> u32 {
    25
}

fn default_cs() -> u32 {
    8
}

fn default_true() -> bool {
    true
}

fn default_clear_color() -> String {
    "#000000".to_string()
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse configuration")?;
        if Duration::try_from_secs_f64(config.delay).is_err() {
            anyhow::bail!("delay {} is not a usable number of seconds", config.delay);
        }
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            images: default_images(),
            delay: default_delay(),
            panel: PanelConfig::default(),
            bus: BusConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}
