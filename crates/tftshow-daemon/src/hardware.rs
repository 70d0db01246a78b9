//! Linux bring-up: spidev bus and GPIO character-device lines.

use anyhow::{Context, Result};
use embedded_hal::digital::OutputPin;
use linux_embedded_hal::{
    gpio_cdev::{Chip, LineRequestFlags},
    spidev::{SpiModeFlags, SpidevOptions},
    CdevPin, Delay, SpidevBus,
};
use tftshow_hw::{Ili9341, Panel};
use tracing::{debug, info};

use crate::config::BusConfig;

/// Driver type on Linux hardware.
pub type PanelDriver = Ili9341<SpidevBus, CdevPin, CdevPin, CdevPin, Delay>;

/// Backlight enable line, lit while held.
pub struct Backlight(CdevPin);

impl Backlight {
    pub fn off(mut self) -> Result<()> {
        self.0
            .set_low()
            .map_err(|e| anyhow::anyhow!("backlight line: {:?}", e))
    }
}

fn request_output(chip: &mut Chip, offset: u32, level: u8, consumer: &str) -> Result<CdevPin> {
    let line = chip
        .get_line(offset)
        .with_context(|| format!("getting {} line {}", consumer, offset))?;
    let handle = line
        .request(LineRequestFlags::OUTPUT, level, consumer)
        .with_context(|| format!("requesting {} line {}", consumer, offset))?;
    CdevPin::new(handle).with_context(|| format!("creating {} pin", consumer))
}

/// Opens the bus and claims the control lines. The returned driver is not
/// yet initialized.
pub fn open(bus: &BusConfig, panel: Panel) -> Result<(PanelDriver, Option<Backlight>)> {
    let mut spi = SpidevBus::open(&bus.spi)
        .with_context(|| format!("opening SPI device {}", bus.spi))?;
    // Chip select is driven as a GPIO so it can stay asserted across writes.
    let options = SpidevOptions::new()
        .bits_per_word(8)
        .max_speed_hz(bus.speed_hz)
        .mode(SpiModeFlags::SPI_MODE_0 | SpiModeFlags::SPI_NO_CS)
        .build();
    spi.configure(&options).context("configuring SPI")?;
    debug!("SPI {} at {} Hz", bus.spi, bus.speed_hz);

    let mut chip = Chip::new(&bus.gpio_chip)
        .with_context(|| format!("opening GPIO chip {}", bus.gpio_chip))?;
    let cs = request_output(&mut chip, bus.cs, 1, "tftshow-cs")?;
    let dc = request_output(&mut chip, bus.dc, 0, "tftshow-dc")?;
    let rst = bus
        .rst
        .map(|offset| request_output(&mut chip, offset, 1, "tftshow-rst"))
        .transpose()?;
    let backlight = bus
        .backlight
        .map(|offset| request_output(&mut chip, offset, 1, "tftshow-bl").map(Backlight))
        .transpose()?;

    info!(
        "Opened {} (dc {}, cs {}, rst {:?}, backlight {:?})",
        bus.spi, bus.dc, bus.cs, bus.rst, bus.backlight
    );
    Ok((Ili9341::new(spi, cs, dc, rst, Delay {}, panel), backlight))
}
