//! tftshow image converter
//!
//! Turns ordinary images into headerless packed-565 `.raw` files that the
//! daemon streams straight to the panel.

mod convert;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tftshow_hw::{ChannelOrder, PANEL_HEIGHT, PANEL_WIDTH};
use tracing_subscriber::EnvFilter;

use convert::ConvertOptions;

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum CliChannelOrder {
    /// Blue in the high bits (MADCTL BGR set)
    #[default]
    Bgr,
    /// Red in the high bits
    Rgb,
}

impl From<CliChannelOrder> for ChannelOrder {
    fn from(order: CliChannelOrder) -> Self {
        match order {
            CliChannelOrder::Bgr => ChannelOrder::Bgr,
            CliChannelOrder::Rgb => ChannelOrder::Rgb,
        }
    }
}

#[derive(Parser)]
#[command(name = "tftconv")]
#[command(about = "Convert images to raw RGB565 for tftshow")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Source image, or a directory of images
    input: PathBuf,

    /// Output .raw file, or a directory in directory mode
    output: PathBuf,

    /// Output width in pixels
    #[arg(long, default_value_t = PANEL_WIDTH, value_parser = clap::value_parser!(u16).range(1..))]
    width: u16,

    /// Output height in pixels
    #[arg(long, default_value_t = PANEL_HEIGHT, value_parser = clap::value_parser!(u16).range(1..))]
    height: u16,

    /// Channel order of the target panel
    #[arg(long, default_value = "bgr", value_enum)]
    channel_order: CliChannelOrder,

    /// Also write a PNG showing the converted colors
    #[arg(long, value_name = "PNG")]
    preview: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let opts = ConvertOptions {
        width: cli.width,
        height: cli.height,
        order: cli.channel_order.into(),
    };

    if cli.input.is_dir() {
        if cli.preview.is_some() {
            anyhow::bail!("--preview only applies to single-file conversion");
        }
        let report = convert::convert_dir(&cli.input, &cli.output, &opts)?;
        println!(
            "Converted {} images, {} failed",
            report.converted, report.failed
        );
        if report.failed > 0 {
            anyhow::bail!("{} images could not be converted", report.failed);
        }
        return Ok(());
    }

    let packed = convert::convert_file(&cli.input, &cli.output, &opts)?;
    println!(
        "Converted {} -> {} ({}x{}, {} bytes)",
        cli.input.display(),
        cli.output.display(),
        opts.width,
        opts.height,
        packed.len()
    );

    if let Some(preview) = &cli.preview {
        convert::write_preview(&packed, &opts, preview)?;
        println!("Preview saved to: {}", preview.display());
    }

    Ok(())
}
