//! tftshow hardware library
//!
//! Drives an ILI9341 SPI TFT controller and feeds it images from two
//! on-device containers: 24-bit BMP and pre-converted packed-565 raw files.

pub mod codec;
pub mod error;
pub mod formats;
pub mod lcd;
pub mod orientation;
pub mod panel;

pub use codec::ChannelOrder;
pub use error::{Error, Result};
pub use formats::{ImageFormat, ImageSource, RowBuffers};
pub use lcd::{DriverState, Ili9341, PixelSink, PixelWrite};
pub use orientation::Orientation;
pub use panel::{AddressWindow, Panel};

/// Native panel dimensions (portrait).
pub const PANEL_WIDTH: u16 = 240;
pub const PANEL_HEIGHT: u16 = 320;
