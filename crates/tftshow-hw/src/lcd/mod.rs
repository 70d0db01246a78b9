//! LCD controller module.
//!
//! Drives an ILI9341 over SPI with separate chip-select and data/command
//! lines, in 16-bit packed color mode.

mod device;
mod sink;

pub mod protocol;

pub use device::{DriverState, Ili9341, NoDelay, NoPin, PixelWriter};
pub use protocol::Command;
pub use sink::{PixelSink, PixelWrite};
