//! Recording bus, pins and delay shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, OutputPin};
use embedded_hal::spi::{self, SpiBus};
use tftshow_hw::{Ili9341, Panel};

/// One observable action on the bus or a control line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    CsLow,
    CsHigh,
    DcLow,
    DcHigh,
    RstLow,
    RstHigh,
    Write(Vec<u8>),
    Flush,
    DelayMs(u32),
}

pub type Log = Rc<RefCell<Vec<Event>>>;

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusFault;

impl spi::Error for BusFault {
    fn kind(&self) -> spi::ErrorKind {
        spi::ErrorKind::Other
    }
}

/// SPI bus that records every write and can fail on demand.
pub struct RecordingBus {
    log: Log,
    fail_on_write: Option<usize>,
    writes: usize,
}

impl RecordingBus {
    pub fn new(log: Log) -> Self {
        Self {
            log,
            fail_on_write: None,
            writes: 0,
        }
    }

    /// Fails the n-th write (0-based) counted from construction.
    pub fn failing_on(log: Log, n: usize) -> Self {
        Self {
            log,
            fail_on_write: Some(n),
            writes: 0,
        }
    }
}

impl spi::ErrorType for RecordingBus {
    type Error = BusFault;
}

impl SpiBus for RecordingBus {
    fn read(&mut self, words: &mut [u8]) -> Result<(), BusFault> {
        words.fill(0);
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), BusFault> {
        let n = self.writes;
        self.writes += 1;
        if self.fail_on_write == Some(n) {
            return Err(BusFault);
        }
        self.log.borrow_mut().push(Event::Write(words.to_vec()));
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), BusFault> {
        read.fill(0);
        self.write(write)
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), BusFault> {
        let copy = words.to_vec();
        self.write(&copy)
    }

    fn flush(&mut self) -> Result<(), BusFault> {
        self.log.borrow_mut().push(Event::Flush);
        Ok(())
    }
}

/// Output line that logs its level changes.
pub struct RecordingPin {
    log: Log,
    low: Event,
    high: Event,
}

impl RecordingPin {
    pub fn cs(log: Log) -> Self {
        Self {
            log,
            low: Event::CsLow,
            high: Event::CsHigh,
        }
    }

    pub fn dc(log: Log) -> Self {
        Self {
            log,
            low: Event::DcLow,
            high: Event::DcHigh,
        }
    }

    pub fn rst(log: Log) -> Self {
        Self {
            log,
            low: Event::RstLow,
            high: Event::RstHigh,
        }
    }
}

impl digital::ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.log.borrow_mut().push(self.low.clone());
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.log.borrow_mut().push(self.high.clone());
        Ok(())
    }
}

pub struct RecordingDelay {
    log: Log,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.log.borrow_mut().push(Event::DelayMs(ms));
    }
}

pub type TestDriver =
    Ili9341<RecordingBus, RecordingPin, RecordingPin, RecordingPin, RecordingDelay>;

/// Builds a driver on `bus` without a reset line.
pub fn driver_with_bus(log: &Log, bus: RecordingBus, panel: Panel) -> TestDriver {
    Ili9341::new(
        bus,
        RecordingPin::cs(log.clone()),
        RecordingPin::dc(log.clone()),
        None,
        RecordingDelay { log: log.clone() },
        panel,
    )
}

pub fn driver(log: &Log, panel: Panel) -> TestDriver {
    driver_with_bus(log, RecordingBus::new(log.clone()), panel)
}

/// Builds and initializes a driver, then clears the log.
pub fn ready_driver(log: &Log, panel: Panel) -> TestDriver {
    let mut d = driver(log, panel);
    d.init().expect("init");
    log.borrow_mut().clear();
    d
}

/// Reassembles the log into (command, payload) pairs using the DC level.
pub fn transcript(log: &Log) -> Vec<(u8, Vec<u8>)> {
    let mut out: Vec<(u8, Vec<u8>)> = Vec::new();
    let mut data_mode = false;
    for event in log.borrow().iter() {
        match event {
            Event::DcLow => data_mode = false,
            Event::DcHigh => data_mode = true,
            Event::Write(bytes) if !data_mode => {
                for &b in bytes {
                    out.push((b, Vec::new()));
                }
            }
            Event::Write(bytes) => {
                if let Some(last) = out.last_mut() {
                    last.1.extend_from_slice(bytes);
                }
            }
            _ => {}
        }
    }
    out
}

/// Payload bytes written after the last memory-write command.
pub fn pixel_bytes(log: &Log) -> Vec<u8> {
    transcript(log)
        .into_iter()
        .rev()
        .find(|(cmd, _)| *cmd == 0x2C)
        .map(|(_, data)| data)
        .unwrap_or_default()
}

/// True if every chip-select assertion was released, with no nesting.
pub fn cs_balanced(log: &Log) -> bool {
    let mut selected = false;
    for event in log.borrow().iter() {
        match event {
            Event::CsLow if selected => return false,
            Event::CsLow => selected = true,
            Event::CsHigh if !selected => return false,
            Event::CsHigh => selected = false,
            _ => {}
        }
    }
    !selected
}

/// Builds a 24-bit bottom-up BMP. `pixel(x, y)` returns (r, g, b) for the
/// top-down coordinate.
pub fn bmp_bytes(
    width: u32,
    height: u32,
    bits_per_pixel: u16,
    pixel: impl Fn(u32, u32) -> (u8, u8, u8),
) -> Vec<u8> {
    let row_size = (width * 3).div_ceil(4) * 4;
    let data_len = row_size * height;
    let mut out = Vec::with_capacity(54 + data_len as usize);
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&(54 + data_len).to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&54u32.to_le_bytes());
    out.extend_from_slice(&40u32.to_le_bytes());
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&(height as i32).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&bits_per_pixel.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&data_len.to_le_bytes());
    out.extend_from_slice(&[0u8; 16]);
    assert_eq!(out.len(), 54);

    for y in (0..height).rev() {
        let start = out.len();
        for x in 0..width {
            let (r, g, b) = pixel(x, y);
            out.extend_from_slice(&[b, g, r]);
        }
        out.resize(start + row_size as usize, 0);
    }
    out
}

/// Splits packed big-endian bytes into words.
pub fn words(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|p| u16::from_be_bytes([p[0], p[1]]))
        .collect()
}
