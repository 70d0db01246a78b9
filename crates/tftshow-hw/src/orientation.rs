//! Display orientation support.
//!
//! The controller rotates in hardware through the MY/MX/MV bits of the
//! memory-access-control register. Landscape variants exchange rows and
//! columns, so the logical panel dimensions swap.

use crate::{Error, Result};
use std::str::FromStr;

/// MADCTL row address order.
pub const MADCTL_MY: u8 = 0x80;
/// MADCTL column address order.
pub const MADCTL_MX: u8 = 0x40;
/// MADCTL row/column exchange.
pub const MADCTL_MV: u8 = 0x20;

/// Display orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Portrait, native scan direction.
    #[default]
    Portrait,
    /// Landscape, rows and columns exchanged.
    Landscape,
    /// Portrait rotated 180°.
    PortraitFlipped,
    /// Landscape rotated 180°.
    LandscapeFlipped,
}

impl Orientation {
    /// Returns the MY/MX/MV bits of the memory-access-control byte.
    pub fn madctl_bits(&self) -> u8 {
        match self {
            Orientation::Portrait => 0x00,
            Orientation::Landscape => MADCTL_MV,
            Orientation::PortraitFlipped => MADCTL_MY | MADCTL_MX,
            Orientation::LandscapeFlipped => MADCTL_MV | MADCTL_MX | MADCTL_MY,
        }
    }

    /// Returns true if rows and columns are exchanged.
    pub fn is_landscape(&self) -> bool {
        matches!(
            self,
            Orientation::Landscape | Orientation::LandscapeFlipped
        )
    }

    /// Maps native (portrait) dimensions to the logical dimensions for this orientation.
    pub fn dimensions(&self, native_width: u16, native_height: u16) -> (u16, u16) {
        if self.is_landscape() {
            (native_height, native_width)
        } else {
            (native_width, native_height)
        }
    }
}

impl FromStr for Orientation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "portrait" => Ok(Orientation::Portrait),
            "landscape" => Ok(Orientation::Landscape),
            "portrait-flipped" | "portrait_flipped" => Ok(Orientation::PortraitFlipped),
            "landscape-flipped" | "landscape_flipped" => Ok(Orientation::LandscapeFlipped),
            _ => Err(Error::ConfigParse {
                line: 0,
                reason: format!("unknown orientation '{}'", s),
            }),
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Orientation::Portrait => write!(f, "portrait"),
            Orientation::Landscape => write!(f, "landscape"),
            Orientation::PortraitFlipped => write!(f, "portrait-flipped"),
            Orientation::LandscapeFlipped => write!(f, "landscape-flipped"),
        }
    }
}
