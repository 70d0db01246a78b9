//! Image to raw container conversion.

use anyhow::{Context, Result};
use image::imageops::{self, FilterType};
use image::RgbImage;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tftshow_hw::formats::raw::{encode_rgb888, expected_len};
use tftshow_hw::ChannelOrder;
use tracing::{debug, info, warn};

/// Extensions picked up in directory mode.
const INPUT_EXTENSIONS: [&str; 4] = ["bmp", "png", "jpg", "jpeg"];

/// Target geometry and packing.
#[derive(Debug, Clone, Copy)]
pub struct ConvertOptions {
    pub width: u16,
    pub height: u16,
    pub order: ChannelOrder,
}

/// Outcome of a directory conversion.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub converted: usize,
    pub failed: usize,
}

/// Resizes (if needed) and packs an image.
pub fn encode(image: RgbImage, opts: &ConvertOptions) -> Vec<u8> {
    let (width, height) = (opts.width as u32, opts.height as u32);
    let image = if image.dimensions() == (width, height) {
        image
    } else {
        debug!(
            "Resizing {}x{} to {}x{}",
            image.width(),
            image.height(),
            width,
            height
        );
        imageops::resize(&image, width, height, FilterType::Lanczos3)
    };

    let mut packed = Vec::with_capacity(expected_len(opts.width, opts.height) as usize);
    encode_rgb888(image.as_raw(), opts.order, &mut packed);
    packed
}

/// Converts one image file and returns the packed bytes written.
pub fn convert_file(input: &Path, output: &Path, opts: &ConvertOptions) -> Result<Vec<u8>> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    let image = image::open(input)
        .with_context(|| format!("Failed to decode {}", input.display()))?
        .to_rgb8();
    info!(
        "Loaded {} ({}x{})",
        input.display(),
        image.width(),
        image.height()
    );

    let packed = encode(image, opts);
    std::fs::write(output, &packed)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!("Wrote {} ({} bytes)", output.display(), packed.len());
    Ok(packed)
}

/// Returns true if `path` has an extension converted in directory mode.
pub fn is_convertible(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| INPUT_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Converts every image in `input` into `<stem>.raw` files in `output`.
///
/// Failures are logged and counted; the batch continues.
pub fn convert_dir(input: &Path, output: &Path, opts: &ConvertOptions) -> Result<BatchReport> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(input)
        .with_context(|| format!("Failed to read directory {}", input.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_convertible(path))
        .collect();
    files.sort();

    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;

    let mut report = BatchReport::default();
    for file in &files {
        let Some(stem) = file.file_stem() else {
            continue;
        };
        let mut name = stem.to_os_string();
        name.push(".raw");
        let target = output.join(name);
        match convert_file(file, &target, opts) {
            Ok(_) => {
                println!("{} -> {}", file.display(), target.display());
                report.converted += 1;
            }
            Err(e) => {
                warn!("{:#}", e);
                report.failed += 1;
            }
        }
    }
    Ok(report)
}

/// Writes a PNG of the packed data as the panel would show it.
pub fn write_preview(packed: &[u8], opts: &ConvertOptions, path: &Path) -> Result<()> {
    let rgb: Vec<u8> = packed
        .chunks_exact(2)
        .flat_map(|p| {
            let (r, g, b) = opts.order.unpack(u16::from_be_bytes([p[0], p[1]]));
            [r, g, b]
        })
        .collect();

    let file = File::create(path).context("Failed to create preview file")?;
    let mut encoder = png::Encoder::new(
        BufWriter::new(file),
        opts.width as u32,
        opts.height as u32,
    );
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&rgb)?;
    Ok(())
}
