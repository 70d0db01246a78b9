//! ILI9341 controller driver over embedded-hal SPI and GPIO.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;
use tracing::{debug, info};

use crate::panel::{AddressWindow, Panel};
use crate::{Error, Result};

use super::protocol::{address_payload, init_sequence, Command, RESET_PULSE_MS};
use super::sink::{PixelSink, PixelWrite};

/// Driver lifecycle. Pixel operations are only legal in `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Uninitialized,
    Resetting,
    Initializing,
    Ready,
}

impl std::fmt::Display for DriverState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriverState::Uninitialized => write!(f, "uninitialized"),
            DriverState::Resetting => write!(f, "resetting"),
            DriverState::Initializing => write!(f, "initializing"),
            DriverState::Ready => write!(f, "ready"),
        }
    }
}

/// Level of the data/command line for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameMode {
    Command,
    Data,
}

/// Placeholder for boards without a wired reset line.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPin;

impl embedded_hal::digital::ErrorType for NoPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> std::result::Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> std::result::Result<(), Self::Error> {
        Ok(())
    }
}

/// ILI9341 display controller.
///
/// Owns the SPI bus, the chip-select and data/command lines, an optional
/// reset line, and a delay source for the settle times between commands.
pub struct Ili9341<SPI, CS, DC, RST = NoPin, D = NoDelay> {
    spi: SPI,
    cs: CS,
    dc: DC,
    rst: Option<RST>,
    delay: D,
    panel: Panel,
    state: DriverState,
}

/// Delay that returns immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

impl<SPI, CS, DC, RST, D> Ili9341<SPI, CS, DC, RST, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
    RST: OutputPin,
    D: DelayNs,
{
    /// Creates an uninitialized driver. Call [`Ili9341::init`] before drawing.
    pub fn new(spi: SPI, cs: CS, dc: DC, rst: Option<RST>, delay: D, panel: Panel) -> Self {
        Self {
            spi,
            cs,
            dc,
            rst,
            delay,
            panel,
            state: DriverState::Uninitialized,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Runs the reset and register initialization sequence.
    ///
    /// On failure the driver returns to `Uninitialized`.
    pub fn init(&mut self) -> Result<()> {
        let result = self.run_init();
        match &result {
            Ok(()) => {
                self.state = DriverState::Ready;
                info!(
                    "Display initialized ({}x{}, MADCTL 0x{:02X})",
                    self.panel.width(),
                    self.panel.height(),
                    self.panel.madctl()
                );
            }
            Err(e) => {
                self.state = DriverState::Uninitialized;
                debug!("Display initialization failed: {}", e);
            }
        }
        result
    }

    fn run_init(&mut self) -> Result<()> {
        self.state = DriverState::Resetting;
        self.hardware_reset()?;

        self.state = DriverState::Initializing;
        for step in init_sequence(self.panel.madctl()) {
            self.command(step.command)?;
            if let Some(payload) = step.payload {
                self.data(&[payload])?;
            }
            if step.settle_ms > 0 {
                self.delay.delay_ms(step.settle_ms);
            }
        }
        Ok(())
    }

    fn hardware_reset(&mut self) -> Result<()> {
        let Some(rst) = self.rst.as_mut() else {
            debug!("No reset line wired, skipping hardware reset");
            return Ok(());
        };
        let [high_ms, low_ms, recover_ms] = RESET_PULSE_MS;
        rst.set_high().map_err(|e| Error::pin("rst", e))?;
        self.delay.delay_ms(high_ms);
        rst.set_low().map_err(|e| Error::pin("rst", e))?;
        self.delay.delay_ms(low_ms);
        rst.set_high().map_err(|e| Error::pin("rst", e))?;
        self.delay.delay_ms(recover_ms);
        debug!("Hardware reset pulse sent");
        Ok(())
    }

    /// Selects the chip and sets the data/command line.
    ///
    /// The returned frame releases chip-select when dropped.
    fn open_frame(&mut self, mode: FrameMode) -> Result<Frame<'_, SPI, CS>> {
        self.cs.set_low().map_err(|e| Error::pin("cs", e))?;
        let frame = Frame {
            spi: &mut self.spi,
            cs: &mut self.cs,
            open: true,
        };
        let level = match mode {
            FrameMode::Command => self.dc.set_low(),
            FrameMode::Data => self.dc.set_high(),
        };
        level.map_err(|e| Error::pin("dc", e))?;
        Ok(frame)
    }

    fn command(&mut self, command: Command) -> Result<()> {
        let mut frame = self.open_frame(FrameMode::Command)?;
        frame.write(&[command as u8])?;
        frame.close()
    }

    fn data(&mut self, bytes: &[u8]) -> Result<()> {
        let mut frame = self.open_frame(FrameMode::Data)?;
        frame.write(bytes)?;
        frame.close()
    }

    /// Programs the address window and opens a pixel transfer into it.
    ///
    /// Chip-select stays asserted in data mode until the writer is dropped
    /// or finished. The driver does not count bytes.
    pub fn set_window(&mut self, window: AddressWindow) -> Result<PixelWriter<'_, SPI, CS>> {
        if self.state != DriverState::Ready {
            return Err(Error::NotReady(self.state));
        }
        self.command(Command::ColumnAddressSet)?;
        self.data(&address_payload(window.x0(), window.x1()))?;
        self.command(Command::PageAddressSet)?;
        self.data(&address_payload(window.y0(), window.y1()))?;
        self.command(Command::MemoryWrite)?;

        let frame = self.open_frame(FrameMode::Data)?;
        Ok(PixelWriter { frame })
    }

    /// Panel this driver was built for.
    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    /// Consumes the driver and returns the bus, lines and delay.
    pub fn release(self) -> (SPI, CS, DC, Option<RST>, D) {
        (self.spi, self.cs, self.dc, self.rst, self.delay)
    }
}

impl<SPI, CS, DC, RST, D> PixelSink for Ili9341<SPI, CS, DC, RST, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
    RST: OutputPin,
    D: DelayNs,
{
    type Writer<'a>
        = PixelWriter<'a, SPI, CS>
    where
        Self: 'a;

    fn panel(&self) -> &Panel {
        &self.panel
    }

    fn set_window(&mut self, window: AddressWindow) -> Result<Self::Writer<'_>> {
        Ili9341::set_window(self, window)
    }
}

/// One chip-select assertion. Flushes and deselects on drop.
struct Frame<'a, SPI: SpiBus, CS: OutputPin> {
    spi: &'a mut SPI,
    cs: &'a mut CS,
    open: bool,
}

impl<SPI: SpiBus, CS: OutputPin> Frame<'_, SPI, CS> {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.spi.write(bytes).map_err(Error::spi)
    }

    fn close(mut self) -> Result<()> {
        self.open = false;
        let flushed = self.spi.flush().map_err(Error::spi);
        let released = self.cs.set_high().map_err(|e| Error::pin("cs", e));
        flushed.and(released)
    }
}

impl<SPI: SpiBus, CS: OutputPin> Drop for Frame<'_, SPI, CS> {
    fn drop(&mut self) {
        if self.open {
            let _ = self.spi.flush();
            let _ = self.cs.set_high();
        }
    }
}

/// Open memory-write transfer returned by [`Ili9341::set_window`].
pub struct PixelWriter<'a, SPI: SpiBus, CS: OutputPin> {
    frame: Frame<'a, SPI, CS>,
}

impl<SPI: SpiBus, CS: OutputPin> PixelWrite for PixelWriter<'_, SPI, CS> {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.frame.write(bytes)
    }

    fn finish(self) -> Result<()> {
        self.frame.close()
    }
}
