//! Panel geometry and the addressing window.

use crate::codec::ChannelOrder;
use crate::orientation::Orientation;
use crate::{Error, Result, PANEL_HEIGHT, PANEL_WIDTH};

/// Fixed panel configuration, immutable once the driver is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panel {
    width: u16,
    height: u16,
    orientation: Orientation,
    channel_order: ChannelOrder,
}

impl Default for Panel {
    fn default() -> Self {
        Self::new(
            PANEL_WIDTH,
            PANEL_HEIGHT,
            Orientation::default(),
            ChannelOrder::default(),
        )
    }
}

impl Panel {
    /// Creates a panel from native (portrait) dimensions.
    ///
    /// Logical width and height follow the orientation.
    pub fn new(
        native_width: u16,
        native_height: u16,
        orientation: Orientation,
        channel_order: ChannelOrder,
    ) -> Self {
        let (width, height) = orientation.dimensions(native_width, native_height);
        Self {
            width,
            height,
            orientation,
            channel_order,
        }
    }

    /// Logical width in pixels.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Logical height in pixels.
    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn channel_order(&self) -> ChannelOrder {
        self.channel_order
    }

    /// Memory-access-control byte written during initialization.
    pub fn madctl(&self) -> u8 {
        self.orientation.madctl_bits() | self.channel_order.madctl_bit()
    }

    /// Pixel codec matching the channel order programmed into the controller.
    pub fn codec(&self) -> ChannelOrder {
        ChannelOrder::from_madctl(self.madctl())
    }

    /// Bytes in one packed scanline.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * 2
    }

    /// Bytes in a full-screen packed frame.
    pub fn frame_bytes(&self) -> usize {
        self.width as usize * self.height as usize * 2
    }

    /// Window covering the whole panel.
    pub fn full_window(&self) -> AddressWindow {
        AddressWindow {
            x0: 0,
            y0: 0,
            x1: self.width.saturating_sub(1),
            y1: self.height.saturating_sub(1),
        }
    }

    /// Builds a window, checking it lies within the panel.
    pub fn window(&self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<AddressWindow> {
        if x0 > x1 || y0 > y1 || x1 >= self.width || y1 >= self.height {
            return Err(Error::InvalidWindow {
                x0,
                y0,
                x1,
                y1,
                width: self.width,
                height: self.height,
            });
        }
        Ok(AddressWindow { x0, y0, x1, y1 })
    }

    /// Builds a window from an origin and a size.
    pub fn window_at(&self, x: u16, y: u16, width: u16, height: u16) -> Result<AddressWindow> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidWindow {
                x0: x,
                y0: y,
                x1: x,
                y1: y,
                width: self.width,
                height: self.height,
            });
        }
        let x1 = x.saturating_add(width - 1);
        let y1 = y.saturating_add(height - 1);
        self.window(x, y, x1, y1)
    }
}

/// Inclusive rectangle in panel coordinates.
///
/// Only [`Panel`] constructs these, so a window is always in bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressWindow {
    x0: u16,
    y0: u16,
    x1: u16,
    y1: u16,
}

impl AddressWindow {
    pub fn x0(&self) -> u16 {
        self.x0
    }

    pub fn y0(&self) -> u16 {
        self.y0
    }

    pub fn x1(&self) -> u16 {
        self.x1
    }

    pub fn y1(&self) -> u16 {
        self.y1
    }

    pub fn width(&self) -> u16 {
        self.x1 - self.x0 + 1
    }

    pub fn height(&self) -> u16 {
        self.y1 - self.y0 + 1
    }

    /// Pixel bytes the caller must stream to complete this window.
    pub fn byte_len(&self) -> usize {
        self.width() as usize * self.height() as usize * 2
    }
}
