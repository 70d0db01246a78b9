//! On-device image containers.
//!
//! Two formats are displayed: uncompressed 24-bit bottom-up BMP, decoded and
//! converted row by row, and headerless `.raw` files already holding packed
//! big-endian pixels, streamed straight to the controller.

pub mod bmp;
pub mod raw;

use std::path::{Path, PathBuf};

use crate::lcd::PixelSink;
use crate::panel::Panel;
use crate::Result;

pub use bmp::{BitmapDecoder, BitmapHeader};
pub use raw::RawStream;

/// Container format of an image file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Bitmap,
    Raw,
}

impl ImageFormat {
    /// Detects the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "bmp" => Some(ImageFormat::Bitmap),
            "raw" => Some(ImageFormat::Raw),
            _ => None,
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageFormat::Bitmap => write!(f, "bmp"),
            ImageFormat::Raw => write!(f, "raw"),
        }
    }
}

/// An image file queued for display.
///
/// Bitmap dimensions come from the file header when it is opened. Raw files
/// carry no header, so their dimensions are supplied by the panel config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Bitmap { path: PathBuf },
    Raw { path: PathBuf, width: u16, height: u16 },
}

impl ImageSource {
    /// Builds a source for `path`, or `None` if the extension is not recognized.
    pub fn from_path(path: PathBuf, panel: &Panel) -> Option<Self> {
        match ImageFormat::from_path(&path)? {
            ImageFormat::Bitmap => Some(ImageSource::Bitmap { path }),
            ImageFormat::Raw => Some(ImageSource::Raw {
                path,
                width: panel.width(),
                height: panel.height(),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ImageSource::Bitmap { path } | ImageSource::Raw { path, .. } => path,
        }
    }

    pub fn format(&self) -> ImageFormat {
        match self {
            ImageSource::Bitmap { .. } => ImageFormat::Bitmap,
            ImageSource::Raw { .. } => ImageFormat::Raw,
        }
    }

    /// Opens the file, streams it into `sink` from the top-left corner, and
    /// closes it. Returns the size of the area drawn.
    pub fn show<S: PixelSink>(
        &self,
        sink: &mut S,
        buffers: &mut RowBuffers,
    ) -> Result<(u16, u16)> {
        let panel = *sink.panel();
        match self {
            ImageSource::Bitmap { path } => {
                let mut decoder = BitmapDecoder::open(path, &panel)?;
                decoder.draw(sink, buffers)?;
                Ok(decoder.output_size())
            }
            ImageSource::Raw {
                path,
                width,
                height,
            } => {
                let stream = RawStream::open(path, *width, *height, &panel)?;
                stream.stream(sink, buffers)?;
                Ok((*width, *height))
            }
        }
    }
}

/// Scanline buffers reused across rows and across images.
///
/// `source` holds one stored row (or one raw chunk), `packed` one converted
/// output row. Both only ever grow.
#[derive(Debug, Default)]
pub struct RowBuffers {
    source: Vec<u8>,
    packed: Vec<u8>,
}

impl RowBuffers {
    /// Allocates buffers sized for a full-width panel row.
    pub fn new(panel: &Panel) -> Self {
        let row = bmp::row_size(panel.width() as u32) as usize;
        Self {
            source: vec![0; row.max(raw::CHUNK_SIZE)],
            packed: vec![0; panel.row_bytes()],
        }
    }

    /// Source buffer of at least `len` bytes.
    pub(crate) fn source(&mut self, len: usize) -> &mut [u8] {
        if self.source.len() < len {
            self.source.resize(len, 0);
        }
        &mut self.source[..len]
    }

    /// Source and packed buffers of at least the given lengths.
    pub(crate) fn split(&mut self, source_len: usize, packed_len: usize) -> (&[u8], &mut [u8]) {
        if self.packed.len() < packed_len {
            self.packed.resize(packed_len, 0);
        }
        (&self.source[..source_len], &mut self.packed[..packed_len])
    }

    /// Current capacities, for checking reuse.
    pub fn lens(&self) -> (usize, usize) {
        (self.source.len(), self.packed.len())
    }
}
