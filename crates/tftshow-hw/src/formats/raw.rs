//! Headerless packed-565 container.
//!
//! A `.raw` file is exactly `width * height * 2` bytes of big-endian packed
//! color, row-major, top to bottom, no padding. Dimensions are not stored in
//! the file; both ends take them from the panel configuration.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::codec::{pack_rgb_row, ChannelOrder};
use crate::lcd::{PixelSink, PixelWrite};
use crate::panel::Panel;
use crate::{Error, Result};

use super::RowBuffers;

/// Bytes forwarded per bus write.
pub const CHUNK_SIZE: usize = 4096;

/// Length in bytes of a raw image of the given size.
pub fn expected_len(width: u16, height: u16) -> u64 {
    width as u64 * height as u64 * 2
}

/// Encodes tightly packed R,G,B pixels into raw container bytes.
///
/// Appends `rgb.len() / 3 * 2` bytes to `out`. This is the same conversion
/// the bitmap decoder applies on the device.
pub fn encode_rgb888(rgb: &[u8], order: ChannelOrder, out: &mut Vec<u8>) {
    let start = out.len();
    out.resize(start + rgb.len() / 3 * 2, 0);
    pack_rgb_row(rgb, order, &mut out[start..]);
}

/// Pass-through reader for a raw image file.
pub struct RawStream {
    file: File,
    path: PathBuf,
    width: u16,
    height: u16,
}

impl RawStream {
    /// Opens a raw file and checks it holds a full image for `panel`.
    ///
    /// Short files are rejected here, before any window is addressed.
    pub fn open(path: &Path, width: u16, height: u16, panel: &Panel) -> Result<Self> {
        if width == 0 || height == 0 || width > panel.width() || height > panel.height() {
            return Err(Error::Format {
                path: path.to_path_buf(),
                reason: format!(
                    "raw size {}x{} does not fit {}x{} panel",
                    width,
                    height,
                    panel.width(),
                    panel.height()
                ),
            });
        }

        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;

        let expected = expected_len(width, height);
        let actual = file.metadata()?.len();
        if actual < expected {
            return Err(Error::ShortRead {
                path: path.to_path_buf(),
                expected,
                actual,
            });
        }
        if actual > expected {
            warn!(
                "{}: {} trailing bytes ignored",
                path.display(),
                actual - expected
            );
        }

        Ok(Self {
            file,
            path: path.to_path_buf(),
            width,
            height,
        })
    }

    /// Forwards the image to `sink` in fixed-size chunks through one window.
    pub fn stream<S: PixelSink>(mut self, sink: &mut S, buffers: &mut RowBuffers) -> Result<()> {
        let window = sink.panel().window_at(0, 0, self.width, self.height)?;
        let total = expected_len(self.width, self.height);
        let chunk = buffers.source(CHUNK_SIZE);

        let mut writer = sink.set_window(window)?;
        let mut sent = 0u64;
        while sent < total {
            let n = (total - sent).min(CHUNK_SIZE as u64) as usize;
            self.file
                .read_exact(&mut chunk[..n])
                .map_err(|e| match e.kind() {
                    std::io::ErrorKind::UnexpectedEof => Error::ShortRead {
                        path: self.path.clone(),
                        expected: total,
                        actual: sent,
                    },
                    _ => Error::Io(e),
                })?;
            writer.write(&chunk[..n])?;
            sent += n as u64;
        }
        writer.finish()?;

        debug!("RAW {}: streamed {} bytes", self.path.display(), sent);
        Ok(())
    }
}
