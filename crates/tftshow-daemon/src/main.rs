//! tftshow daemon
//!
//! Cycles through the images on a mounted card and draws them on an ILI9341
//! panel over spidev.

mod config;
mod hardware;
mod settings;
mod slideshow;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tftshow_hw::PixelSink;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;
use settings::SlideshowSettings;
use slideshow::{ConsolePresenter, PanelPresenter, Slideshow};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Setup logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/default.toml".to_string());

    let config = if Path::new(&config_path).exists() {
        let config = Config::load(&config_path).context("Failed to load configuration")?;
        info!("Loaded configuration from: {}", config_path);
        config
    } else {
        info!("No configuration at {}, using defaults", config_path);
        Config::default()
    };

    let panel = config.panel.build()?;
    let sources = slideshow::scan(&config.images, &panel)
        .with_context(|| format!("Failed to list images in {}", config.images.display()))?;
    let settings = SlideshowSettings::with_delay(config.delay).load(&config.images);
    let mut show = Slideshow::new(sources, settings);
    if show.is_empty() {
        anyhow::bail!("No .raw or .bmp images in {}", config.images.display());
    }
    info!("Found {} images", show.len());

    let stop = Arc::new(AtomicBool::new(false));
    let task_stop = stop.clone();

    // The output is chosen once; a display that fails to come up is fatal.
    let mut task = if config.display.enable {
        let (mut driver, backlight) = hardware::open(&config.bus, panel)?;
        driver.init().context("Display initialization failed")?;
        let background = config.display.clear_color(&panel)?;
        driver.fill(background).context("Failed to clear display")?;

        let mut presenter = PanelPresenter::new(driver, background);
        tokio::task::spawn_blocking(move || {
            let shown = show.run(&mut presenter, &task_stop)?;
            if let Some(backlight) = backlight {
                backlight.off()?;
            }
            Ok::<_, anyhow::Error>(shown)
        })
    } else {
        info!("Display disabled, logging images only");
        tokio::task::spawn_blocking(move || {
            Ok::<_, anyhow::Error>(show.run(&mut ConsolePresenter, &task_stop)?)
        })
    };

    // Setup Unix signal handlers
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;

    tokio::select! {
        result = &mut task => {
            let shown = result.context("Slideshow task panicked")??;
            warn!("Slideshow ended on its own after {} images", shown);
            return Ok(());
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down");
        }
    }

    stop.store(true, Ordering::Relaxed);
    let shown = task.await.context("Slideshow task panicked")??;
    info!("Shown {} images", shown);
    Ok(())
}
