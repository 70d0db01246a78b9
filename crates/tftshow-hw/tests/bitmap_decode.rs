//! BMP decoding through the driver, using files on disk.

mod common;

use std::path::PathBuf;

use common::*;
use tftshow_hw::codec::rgb888_to_panel565;
use tftshow_hw::formats::BitmapDecoder;
use tftshow_hw::{ChannelOrder, Error, ImageSource, Orientation, Panel, RowBuffers};

fn write_file(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn test_white_4x4_decodes_to_all_ones() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "white.bmp", &bmp_bytes(4, 4, 24, |_, _| (255, 255, 255)));
    let panel = Panel::default();
    let mut buffers = RowBuffers::new(&panel);

    let mut decoder = BitmapDecoder::open(&path, &panel).unwrap();
    let mut packed = Vec::new();
    while let Some(row) = decoder.next_row(&mut buffers).unwrap() {
        assert_eq!(row.len(), 8);
        packed.extend(words(row));
    }
    assert_eq!(packed, vec![0xFFFF; 16]);

    // Exhausted after a single pass.
    assert!(decoder.next_row(&mut buffers).unwrap().is_none());
}

#[test]
fn test_rows_come_out_top_to_bottom() {
    let dir = tempfile::tempdir().unwrap();
    // Row y is filled with red = y * 40.
    let bytes = bmp_bytes(3, 4, 24, |_, y| ((y * 40) as u8, 0, 0));
    let path = write_file(&dir, "rows.bmp", &bytes);
    let log = new_log();
    let panel = Panel::default();
    let mut d = ready_driver(&log, panel);
    let mut buffers = RowBuffers::new(&panel);

    ImageSource::Bitmap { path }
        .show(&mut d, &mut buffers)
        .unwrap();

    let t = transcript(&log);
    assert_eq!(t[0], (0x2A, vec![0, 0, 0, 2]));
    assert_eq!(t[1], (0x2B, vec![0, 0, 0, 3]));

    let pixels = words(&pixel_bytes(&log));
    assert_eq!(pixels.len(), 12);
    for (y, row) in pixels.chunks(3).enumerate() {
        let expected = rgb888_to_panel565((y * 40) as u8, 0, 0);
        assert!(row.iter().all(|&w| w == expected), "row {}", y);
    }
    assert!(cs_balanced(&log));
}

#[test]
fn test_padding_bytes_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    // Width 5 -> 15 data bytes + 1 padding byte per row.
    let bytes = bmp_bytes(5, 2, 24, |x, _| (0, 0, (x * 50) as u8));
    let path = write_file(&dir, "pad.bmp", &bytes);
    let panel = Panel::default();
    let mut buffers = RowBuffers::new(&panel);

    let mut decoder = BitmapDecoder::open(&path, &panel).unwrap();
    let row = words(decoder.next_row(&mut buffers).unwrap().unwrap());
    let expected: Vec<u16> = (0..5)
        .map(|x| rgb888_to_panel565(0, 0, (x * 50) as u8))
        .collect();
    assert_eq!(row, expected);
}

#[test]
fn test_reversed_signature_fails_before_any_row() {
    let dir = tempfile::tempdir().unwrap();
    let mut bytes = bmp_bytes(4, 4, 24, |_, _| (1, 2, 3));
    bytes[0] = 0x4D;
    bytes[1] = 0x42;
    let path = write_file(&dir, "bad.bmp", &bytes);
    let log = new_log();
    let panel = Panel::default();
    let mut d = ready_driver(&log, panel);
    let mut buffers = RowBuffers::new(&panel);

    let err = ImageSource::Bitmap { path }
        .show(&mut d, &mut buffers)
        .unwrap_err();
    assert!(matches!(err, Error::Format { .. }));
    assert!(log.borrow().is_empty());
}

#[test]
fn test_16bpp_is_unsupported_with_zero_transfers() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "deep.bmp", &bmp_bytes(4, 4, 16, |_, _| (0, 0, 0)));
    let log = new_log();
    let panel = Panel::default();
    let mut d = ready_driver(&log, panel);
    let mut buffers = RowBuffers::new(&panel);

    let err = ImageSource::Bitmap { path: path.clone() }
        .show(&mut d, &mut buffers)
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat { .. }));
    let message = err.to_string();
    assert!(message.contains("deep.bmp"));
    assert!(message.contains("16 bits per pixel"));
    assert!(log.borrow().is_empty());
}

#[test]
fn test_truncated_pixel_data_is_rejected_up_front() {
    let dir = tempfile::tempdir().unwrap();
    let mut bytes = bmp_bytes(4, 4, 24, |_, _| (9, 9, 9));
    bytes.truncate(bytes.len() - 5);
    let path = write_file(&dir, "short.bmp", &bytes);
    let log = new_log();
    let panel = Panel::default();
    let mut d = ready_driver(&log, panel);
    let mut buffers = RowBuffers::new(&panel);

    let err = ImageSource::Bitmap { path }
        .show(&mut d, &mut buffers)
        .unwrap_err();
    assert!(err.to_string().contains("truncated pixel data"));
    assert!(log.borrow().is_empty());
}

#[test]
fn test_missing_file_is_not_found() {
    let panel = Panel::default();
    let err = BitmapDecoder::open(std::path::Path::new("/nonexistent/a.bmp"), &panel);
    assert!(matches!(err, Err(Error::NotFound(_))));
}

#[test]
fn test_large_image_is_clipped_to_panel() {
    let dir = tempfile::tempdir().unwrap();
    let bytes = bmp_bytes(6, 5, 24, |x, y| ((x * 10) as u8, (y * 10) as u8, 0));
    let path = write_file(&dir, "big.bmp", &bytes);
    let log = new_log();
    let panel = Panel::new(4, 3, Orientation::Portrait, ChannelOrder::Rgb);
    let mut d = ready_driver(&log, panel);
    let mut buffers = RowBuffers::new(&panel);

    let drawn = ImageSource::Bitmap { path }
        .show(&mut d, &mut buffers)
        .unwrap();
    assert_eq!(drawn, (4, 3));

    let t = transcript(&log);
    assert_eq!(t[0], (0x2A, vec![0, 0, 0, 3]));
    assert_eq!(t[1], (0x2B, vec![0, 0, 0, 2]));

    let pixels = words(&pixel_bytes(&log));
    assert_eq!(pixels.len(), 12);
    for y in 0..3u32 {
        for x in 0..4u32 {
            let expected = ChannelOrder::Rgb.pack((x * 10) as u8, (y * 10) as u8, 0);
            assert_eq!(pixels[(y * 4 + x) as usize], expected, "({}, {})", x, y);
        }
    }
}

#[test]
fn test_each_row_is_one_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "w.bmp", &bmp_bytes(7, 3, 24, |_, _| (5, 5, 5)));
    let log = new_log();
    let panel = Panel::default();
    let mut d = ready_driver(&log, panel);
    let mut buffers = RowBuffers::new(&panel);

    ImageSource::Bitmap { path }
        .show(&mut d, &mut buffers)
        .unwrap();

    let row_writes = log
        .borrow()
        .iter()
        .filter(|e| matches!(e, Event::Write(b) if b.len() == 14))
        .count();
    assert_eq!(row_writes, 3);
}

#[test]
fn test_row_buffers_are_reused_across_images() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_file(&dir, "a.bmp", &bmp_bytes(240, 320, 24, |_, _| (1, 1, 1)));
    let b = write_file(&dir, "b.bmp", &bmp_bytes(100, 50, 24, |_, _| (2, 2, 2)));
    let log = new_log();
    let panel = Panel::default();
    let mut d = ready_driver(&log, panel);
    let mut buffers = RowBuffers::new(&panel);
    let before = buffers.lens();

    ImageSource::Bitmap { path: a }
        .show(&mut d, &mut buffers)
        .unwrap();
    ImageSource::Bitmap { path: b }
        .show(&mut d, &mut buffers)
        .unwrap();

    assert_eq!(buffers.lens(), before);
}
