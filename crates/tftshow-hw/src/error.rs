//! Error types for the tftshow hardware library.

use std::path::PathBuf;
use thiserror::Error;

use crate::lcd::DriverState;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding images or talking to the controller.
#[derive(Error, Debug)]
pub enum Error {
    /// Container is structurally invalid (bad signature, truncated, zero size).
    #[error("{}: invalid image: {reason}", path.display())]
    Format { path: PathBuf, reason: String },

    /// Container is recognized but uses an encoding we do not decode.
    #[error("{}: unsupported image: {reason}", path.display())]
    UnsupportedFormat { path: PathBuf, reason: String },

    /// SPI or GPIO failure while a frame was open.
    #[error("Bus transfer failed: {0}")]
    Transfer(String),

    /// Malformed line in a slideshow configuration file.
    #[error("Config line {line}: {reason}")]
    ConfigParse { line: usize, reason: String },

    /// File or directory does not exist.
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    /// File holds fewer bytes than its declared geometry requires.
    #[error("{}: short read, expected {expected} bytes, got {actual}", path.display())]
    ShortRead {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    /// Address window outside the panel or with inverted bounds.
    #[error("Invalid window ({x0},{y0})-({x1},{y1}) for {width}x{height} panel")]
    InvalidWindow {
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
        width: u16,
        height: u16,
    },

    /// Pixel buffer length does not match the window it is written to.
    #[error("Buffer size mismatch: expected {expected}, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    /// Pixel operation attempted before initialization completed.
    #[error("Display not ready (state: {0})")]
    NotReady(DriverState),

    /// Filesystem I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wraps an SPI bus error.
    pub(crate) fn spi<E: embedded_hal::spi::Error>(err: E) -> Self {
        Error::Transfer(format!("spi: {:?}", err.kind()))
    }

    /// Wraps a GPIO error on one of the control lines.
    pub(crate) fn pin<E: embedded_hal::digital::Error>(line: &str, err: E) -> Self {
        Error::Transfer(format!("{} line: {:?}", line, err.kind()))
    }

    /// Returns true for errors that only affect the current image.
    pub fn is_per_image(&self) -> bool {
        !matches!(self, Error::NotReady(_))
    }
}
