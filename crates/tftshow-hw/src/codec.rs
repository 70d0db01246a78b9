//! RGB888 to packed 565 color conversion.
//!
//! The controller takes 16-bit pixels on the wire, high byte first. Which
//! channel lands in the high 5-bit field depends on the BGR bit of the
//! memory-access-control register, so every conversion goes through a
//! [`ChannelOrder`] derived from the panel configuration. The on-device
//! decoders and the offline converter share these functions.

use std::str::FromStr;

/// MADCTL bit selecting BGR channel order.
pub const MADCTL_BGR: u8 = 0x08;

/// Which channel occupies the high 5-bit field of a packed pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelOrder {
    /// Red in bits 15..11, blue in bits 4..0.
    Rgb,
    /// Blue in bits 15..11, red in bits 4..0.
    #[default]
    Bgr,
}

impl ChannelOrder {
    /// Derives the packing order from a memory-access-control byte.
    pub fn from_madctl(madctl: u8) -> Self {
        if madctl & MADCTL_BGR != 0 {
            ChannelOrder::Bgr
        } else {
            ChannelOrder::Rgb
        }
    }

    /// Returns the MADCTL bit for this order.
    pub fn madctl_bit(&self) -> u8 {
        match self {
            ChannelOrder::Rgb => 0,
            ChannelOrder::Bgr => MADCTL_BGR,
        }
    }

    /// Packs an RGB triple into a 565 word using this order.
    #[inline]
    pub fn pack(&self, r: u8, g: u8, b: u8) -> u16 {
        match self {
            ChannelOrder::Rgb => pack565(r, g, b),
            ChannelOrder::Bgr => pack565(b, g, r),
        }
    }

    /// Expands a packed word back to an RGB triple.
    pub fn unpack(&self, pixel: u16) -> (u8, u8, u8) {
        let (hi, g, lo) = unpack565(pixel);
        match self {
            ChannelOrder::Rgb => (hi, g, lo),
            ChannelOrder::Bgr => (lo, g, hi),
        }
    }
}

impl FromStr for ChannelOrder {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "rgb" => Ok(ChannelOrder::Rgb),
            "bgr" => Ok(ChannelOrder::Bgr),
            _ => Err(crate::Error::ConfigParse {
                line: 0,
                reason: format!("unknown channel order '{}'", s),
            }),
        }
    }
}

impl std::fmt::Display for ChannelOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelOrder::Rgb => write!(f, "rgb"),
            ChannelOrder::Bgr => write!(f, "bgr"),
        }
    }
}

#[inline]
const fn pack565(hi: u8, g: u8, lo: u8) -> u16 {
    (((hi & 0xF8) as u16) << 8) | (((g & 0xFC) as u16) << 3) | ((lo >> 3) as u16)
}

#[inline]
fn unpack565(pixel: u16) -> (u8, u8, u8) {
    let hi = ((pixel >> 11) & 0x1F) as u8;
    let g = ((pixel >> 5) & 0x3F) as u8;
    let lo = (pixel & 0x1F) as u8;
    ((hi << 3) | (hi >> 2), (g << 2) | (g >> 4), (lo << 3) | (lo >> 2))
}

/// Converts RGB888 to the default panel's packed word (BGR order).
#[inline]
pub const fn rgb888_to_panel565(r: u8, g: u8, b: u8) -> u16 {
    pack565(b, g, r)
}

/// Expands a default-panel packed word back to RGB888.
pub fn panel565_to_rgb888(pixel: u16) -> (u8, u8, u8) {
    ChannelOrder::Bgr.unpack(pixel)
}

/// Packs a row of R,G,B triples into big-endian 565 bytes.
///
/// Converts `min(rgb.len() / 3, out.len() / 2)` pixels and returns that count.
pub fn pack_rgb_row(rgb: &[u8], order: ChannelOrder, out: &mut [u8]) -> usize {
    let mut count = 0;
    for (px, dst) in rgb.chunks_exact(3).zip(out.chunks_exact_mut(2)) {
        dst.copy_from_slice(&order.pack(px[0], px[1], px[2]).to_be_bytes());
        count += 1;
    }
    count
}

/// Packs a row of B,G,R triples (bitmap storage order) into big-endian 565 bytes.
pub fn pack_bgr_row(bgr: &[u8], order: ChannelOrder, out: &mut [u8]) -> usize {
    let mut count = 0;
    for (px, dst) in bgr.chunks_exact(3).zip(out.chunks_exact_mut(2)) {
        dst.copy_from_slice(&order.pack(px[2], px[1], px[0]).to_be_bytes());
        count += 1;
    }
    count
}

/// Parses a `#RRGGBB` hex string into a packed word for the given order.
pub fn parse_hex_color(hex: &str, order: ChannelOrder) -> Option<u16> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(order.pack(r, g, b))
}
