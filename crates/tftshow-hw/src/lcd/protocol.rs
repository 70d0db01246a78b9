//! ILI9341 command set and payload encoding.
//!
//! Every exchange is either a command frame (DC low, one byte) or a data
//! frame (DC high, one or more bytes). Multi-byte parameters are big-endian.

/// Controller commands used by this driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    /// Software reset.
    SoftwareReset = 0x01,
    /// Leave sleep mode.
    SleepOut = 0x11,
    /// Turn the display on.
    DisplayOn = 0x29,
    /// Column address set (x0, x1).
    ColumnAddressSet = 0x2A,
    /// Page (row) address set (y0, y1).
    PageAddressSet = 0x2B,
    /// Start writing pixel data into the current window.
    MemoryWrite = 0x2C,
    /// Memory access control (scan direction and channel order).
    MemoryAccessControl = 0x36,
    /// Interface pixel format.
    PixelFormatSet = 0x3A,
}

/// PIXFMT payload selecting 16 bits per pixel on both RGB and MCU interfaces.
pub const PIXEL_FORMAT_16BIT: u8 = 0x55;

/// Hardware reset timing: initial high, low pulse, recovery (ms).
pub const RESET_PULSE_MS: [u32; 3] = [5, 20, 150];

/// Bytes per chunk when streaming a solid color.
pub const FILL_CHUNK_SIZE: usize = 512;

/// One initialization step: a command, an optional one-byte payload, and the
/// settle time required before the next command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitStep {
    pub command: Command,
    pub payload: Option<u8>,
    pub settle_ms: u32,
}

/// Builds the initialization sequence for a memory-access-control byte.
pub fn init_sequence(madctl: u8) -> [InitStep; 5] {
    [
        InitStep {
            command: Command::SoftwareReset,
            payload: None,
            settle_ms: 150,
        },
        InitStep {
            command: Command::SleepOut,
            payload: None,
            settle_ms: 255,
        },
        InitStep {
            command: Command::PixelFormatSet,
            payload: Some(PIXEL_FORMAT_16BIT),
            settle_ms: 0,
        },
        InitStep {
            command: Command::MemoryAccessControl,
            payload: Some(madctl),
            settle_ms: 0,
        },
        InitStep {
            command: Command::DisplayOn,
            payload: None,
            settle_ms: 100,
        },
    ]
}

/// Encodes a start/end address pair for CASET or PASET.
pub fn address_payload(start: u16, end: u16) -> [u8; 4] {
    let [s_hi, s_lo] = start.to_be_bytes();
    let [e_hi, e_lo] = end.to_be_bytes();
    [s_hi, s_lo, e_hi, e_lo]
}

/// Fills a buffer with a repeating big-endian color pattern.
pub fn fill_pattern(color: u16, buffer: &mut [u8]) {
    let bytes = color.to_be_bytes();
    for pair in buffer.chunks_exact_mut(2) {
        pair.copy_from_slice(&bytes);
    }
}
