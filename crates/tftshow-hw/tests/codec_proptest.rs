//! Property tests for the 565 packing rules.

use tftshow_hw::codec::{pack_bgr_row, pack_rgb_row, rgb888_to_panel565};
use tftshow_hw::ChannelOrder;

proptest::proptest! {
    /// Conversion is deterministic and only depends on the kept high bits.
    #[test]
    fn conversion_ignores_dropped_low_bits(r in 0u8..=255, g in 0u8..=255, b in 0u8..=255) {
        let word = rgb888_to_panel565(r, g, b);
        assert_eq!(word, rgb888_to_panel565(r, g, b));
        assert_eq!(word, rgb888_to_panel565(r | 0x07, g | 0x03, b | 0x07));
    }

    /// The default panel packs blue high and red low.
    #[test]
    fn panel_fields_hold_swapped_channels(r in 0u8..=255, g in 0u8..=255, b in 0u8..=255) {
        let word = rgb888_to_panel565(r, g, b);
        assert_eq!((word >> 11) as u8, b >> 3);
        assert_eq!(((word >> 5) & 0x3F) as u8, g >> 2);
        assert_eq!((word & 0x1F) as u8, r >> 3);
    }

    /// RGB and BGR orders differ only by swapping the outer fields.
    #[test]
    fn orders_are_mirror_images(r in 0u8..=255, g in 0u8..=255, b in 0u8..=255) {
        assert_eq!(ChannelOrder::Rgb.pack(r, g, b), ChannelOrder::Bgr.pack(b, g, r));
    }

    /// Unpacking then repacking is stable.
    #[test]
    fn unpack_repack_is_identity(word in 0u16..=u16::MAX) {
        for order in [ChannelOrder::Rgb, ChannelOrder::Bgr] {
            let (r, g, b) = order.unpack(word);
            assert_eq!(order.pack(r, g, b), word);
        }
    }

    /// Row helpers agree with the per-pixel rule regardless of storage order.
    #[test]
    fn row_helpers_agree(pixels in proptest::collection::vec(proptest::prelude::any::<(u8, u8, u8)>(), 1..64)) {
        let rgb: Vec<u8> = pixels.iter().flat_map(|&(r, g, b)| [r, g, b]).collect();
        let bgr: Vec<u8> = pixels.iter().flat_map(|&(r, g, b)| [b, g, r]).collect();
        let mut a = vec![0u8; pixels.len() * 2];
        let mut c = vec![0u8; pixels.len() * 2];
        assert_eq!(pack_rgb_row(&rgb, ChannelOrder::Bgr, &mut a), pixels.len());
        assert_eq!(pack_bgr_row(&bgr, ChannelOrder::Bgr, &mut c), pixels.len());
        assert_eq!(&a, &c);
        for (i, &(r, g, b)) in pixels.iter().enumerate() {
            assert_eq!(u16::from_be_bytes([a[2 * i], a[2 * i + 1]]), rgb888_to_panel565(r, g, b));
        }
    }
}
