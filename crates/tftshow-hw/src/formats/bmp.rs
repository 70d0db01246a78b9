//! 24-bit bottom-up BMP decoding.
//!
//! Layout read from the 54-byte header:
//! - 0..2: signature `BM`
//! - 10..14: pixel data offset (u32 LE)
//! - 18..22: width (u32 LE)
//! - 22..26: height (i32 LE, positive = bottom-up)
//! - 28..30: bits per pixel (u16 LE)
//! - 30..34: compression (u32 LE, 0 = none)
//!
//! Rows are padded to 4 bytes and stored last row first, B,G,R per pixel.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::codec::{pack_bgr_row, ChannelOrder};
use crate::lcd::{PixelSink, PixelWrite};
use crate::panel::Panel;
use crate::{Error, Result};

use super::RowBuffers;

/// Size of the file header plus BITMAPINFOHEADER.
pub const HEADER_SIZE: usize = 54;

/// Container signature.
pub const SIGNATURE: [u8; 2] = *b"BM";

/// On-disk row length for a 24-bit image, padded to 4 bytes.
pub fn row_size(width: u32) -> u64 {
    (width as u64 * 3).div_ceil(4) * 4
}

/// Fields of a validated BMP header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapHeader {
    pub width: u32,
    pub height: u32,
    pub bits_per_pixel: u16,
    pub data_offset: u32,
}

impl BitmapHeader {
    /// Parses and validates a header.
    ///
    /// Fails with `Format` on a bad signature, zero dimensions or a pixel
    /// area too large to address, and with
    /// `UnsupportedFormat` on anything but uncompressed 24-bit bottom-up data.
    pub fn parse(header: &[u8; HEADER_SIZE], path: &Path) -> Result<Self> {
        if header[0..2] != SIGNATURE {
            return Err(Error::Format {
                path: path.to_path_buf(),
                reason: format!(
                    "bad signature {:02X} {:02X} (expected 42 4D)",
                    header[0], header[1]
                ),
            });
        }

        let u16_at = |o: usize| u16::from_le_bytes([header[o], header[o + 1]]);
        let u32_at = |o: usize| {
            u32::from_le_bytes([header[o], header[o + 1], header[o + 2], header[o + 3]])
        };

        let data_offset = u32_at(10);
        let width = u32_at(18);
        let height = u32_at(22) as i32;
        let bits_per_pixel = u16_at(28);
        let compression = u32_at(30);

        if bits_per_pixel != 24 {
            return Err(Error::UnsupportedFormat {
                path: path.to_path_buf(),
                reason: format!("{} bits per pixel (need 24)", bits_per_pixel),
            });
        }
        if compression != 0 {
            return Err(Error::UnsupportedFormat {
                path: path.to_path_buf(),
                reason: format!("compression type {} (need uncompressed)", compression),
            });
        }
        if height < 0 {
            return Err(Error::UnsupportedFormat {
                path: path.to_path_buf(),
                reason: "top-down row order".to_string(),
            });
        }
        if width == 0 || height == 0 {
            return Err(Error::Format {
                path: path.to_path_buf(),
                reason: format!("empty image {}x{}", width, height),
            });
        }

        let data_offset = data_offset.max(HEADER_SIZE as u32);
        let fits = (height as u64)
            .checked_mul(row_size(width))
            .and_then(|pixels| pixels.checked_add(data_offset as u64))
            .is_some();
        if !fits {
            return Err(Error::Format {
                path: path.to_path_buf(),
                reason: format!("image dimensions overflow ({}x{})", width, height),
            });
        }

        Ok(Self {
            width,
            height: height as u32,
            bits_per_pixel,
            data_offset,
        })
    }

    /// Padded on-disk row length.
    pub fn row_size(&self) -> u64 {
        row_size(self.width)
    }

    /// File offset of logical (top-to-bottom) row `row`.
    pub fn row_offset(&self, row: u32) -> u64 {
        self.data_offset as u64 + (self.height - 1 - row) as u64 * self.row_size()
    }

    /// Minimum file length holding every stored row.
    pub fn required_len(&self) -> u64 {
        self.data_offset as u64 + self.height as u64 * self.row_size()
    }
}

/// Streaming decoder producing packed rows top to bottom.
///
/// Single pass: once every row has been produced the decoder is exhausted
/// and the file must be reopened to decode again.
pub struct BitmapDecoder {
    file: File,
    path: PathBuf,
    header: BitmapHeader,
    order: ChannelOrder,
    cols: u16,
    rows: u16,
    next: u16,
}

impl BitmapDecoder {
    /// Opens a bitmap and validates it for display on `panel`.
    ///
    /// Nothing past the header is read and no bus traffic happens if the
    /// file is rejected.
    pub fn open(path: &Path, panel: &Panel) -> Result<Self> {
        let mut file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;

        let mut raw = [0u8; HEADER_SIZE];
        file.read_exact(&mut raw).map_err(|e| match e.kind() {
            std::io::ErrorKind::UnexpectedEof => Error::Format {
                path: path.to_path_buf(),
                reason: "truncated header".to_string(),
            },
            _ => Error::Io(e),
        })?;
        let header = BitmapHeader::parse(&raw, path)?;

        let len = file.metadata()?.len();
        if len < header.required_len() {
            return Err(Error::Format {
                path: path.to_path_buf(),
                reason: format!(
                    "truncated pixel data ({} bytes, need {})",
                    len,
                    header.required_len()
                ),
            });
        }

        let cols = header.width.min(panel.width() as u32) as u16;
        let rows = header.height.min(panel.height() as u32) as u16;
        debug!(
            "BMP {}: {}x{}, {}bpp, drawing {}x{}",
            path.display(),
            header.width,
            header.height,
            header.bits_per_pixel,
            cols,
            rows
        );

        Ok(Self {
            file,
            path: path.to_path_buf(),
            header,
            order: panel.codec(),
            cols,
            rows,
            next: 0,
        })
    }

    pub fn header(&self) -> &BitmapHeader {
        &self.header
    }

    /// Clipped output size (width, height).
    pub fn output_size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    /// Decodes the next row into the packed buffer and returns it.
    ///
    /// Returns `Ok(None)` once all visible rows have been produced.
    pub fn next_row<'b>(&mut self, buffers: &'b mut RowBuffers) -> Result<Option<&'b [u8]>> {
        if self.next >= self.rows {
            return Ok(None);
        }
        // Only the visible pixels are read; each row is reached by seeking.
        let used = self.cols as usize * 3;
        let offset = self.header.row_offset(self.next as u32);

        self.file.seek(SeekFrom::Start(offset))?;
        self.file
            .read_exact(buffers.source(used))
            .map_err(|e| Error::Format {
                path: self.path.clone(),
                reason: format!("row {} unreadable: {}", self.next, e),
            })?;

        let (source, packed) = buffers.split(used, self.cols as usize * 2);
        pack_bgr_row(source, self.order, packed);
        self.next += 1;
        Ok(Some(&*packed))
    }

    /// Streams every visible row into `sink`, one row per write.
    pub fn draw<S: PixelSink>(&mut self, sink: &mut S, buffers: &mut RowBuffers) -> Result<()> {
        let window = sink.panel().window_at(0, 0, self.cols, self.rows)?;
        let mut writer = sink.set_window(window)?;
        while let Some(row) = self.next_row(buffers)? {
            writer.write(row)?;
        }
        writer.finish()
    }
}
