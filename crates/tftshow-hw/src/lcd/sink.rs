//! Window-write primitives shared by the driver and the image decoders.

use crate::panel::{AddressWindow, Panel};
use crate::{Error, Result};

use super::protocol::{fill_pattern, FILL_CHUNK_SIZE};

/// An open pixel-data transfer into an addressing window.
///
/// Dropping the writer ends the transfer; [`PixelWrite::finish`] does the
/// same but reports any error from closing it.
pub trait PixelWrite {
    /// Appends packed pixel bytes to the open transfer.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Ends the transfer.
    fn finish(self) -> Result<()>;
}

/// Something that accepts packed pixel streams addressed by window.
pub trait PixelSink {
    type Writer<'a>: PixelWrite
    where
        Self: 'a;

    /// Panel geometry the sink was built for.
    fn panel(&self) -> &Panel;

    /// Addresses `window` and opens a data transfer into it.
    ///
    /// The caller must write exactly `window.byte_len()` bytes.
    fn set_window(&mut self, window: AddressWindow) -> Result<Self::Writer<'_>>;

    /// Fills the whole panel with one packed color.
    fn fill(&mut self, color: u16) -> Result<()> {
        let window = self.panel().full_window();
        self.fill_rect(window, color)
    }

    /// Fills a window with one packed color.
    fn fill_rect(&mut self, window: AddressWindow, color: u16) -> Result<()> {
        let mut chunk = [0u8; FILL_CHUNK_SIZE];
        fill_pattern(color, &mut chunk);

        let mut remaining = window.byte_len();
        let mut writer = self.set_window(window)?;
        while remaining > 0 {
            let n = remaining.min(FILL_CHUNK_SIZE);
            writer.write(&chunk[..n])?;
            remaining -= n;
        }
        writer.finish()
    }

    /// Writes a ready-made packed buffer into a window.
    fn blit(&mut self, window: AddressWindow, data: &[u8]) -> Result<()> {
        if data.len() != window.byte_len() {
            return Err(Error::BufferSize {
                expected: window.byte_len(),
                actual: data.len(),
            });
        }
        let mut writer = self.set_window(window)?;
        writer.write(data)?;
        writer.finish()
    }
}
