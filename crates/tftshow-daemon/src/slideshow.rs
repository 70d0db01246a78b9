//! Image discovery and the display loop.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tftshow_hw::{Error, ImageFormat, ImageSource, Panel, PixelSink, Result, RowBuffers};
use tracing::{debug, info, warn};

use crate::settings::SlideshowSettings;

/// Longest uninterrupted sleep while waiting between images.
const STOP_POLL: Duration = Duration::from_millis(50);

/// Lists the images to show from `dir`.
///
/// If any `.raw` files are present only those are used, otherwise the `.bmp`
/// files. Names are sorted so the order is stable across restarts.
pub fn scan(dir: &Path, panel: &Panel) -> Result<Vec<ImageSource>> {
    let entries = std::fs::read_dir(dir).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(dir.to_path_buf()),
        _ => Error::Io(e),
    })?;

    let mut raw = Vec::new();
    let mut bitmap = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        match ImageFormat::from_path(&path) {
            Some(ImageFormat::Raw) => raw.push(path),
            Some(ImageFormat::Bitmap) => bitmap.push(path),
            None => {}
        }
    }

    let (mut chosen, format) = if raw.is_empty() {
        (bitmap, ImageFormat::Bitmap)
    } else {
        (raw, ImageFormat::Raw)
    };
    chosen.sort();
    info!("Using {} {} files from {}", chosen.len(), format, dir.display());

    Ok(chosen
        .into_iter()
        .filter_map(|path| ImageSource::from_path(path, panel))
        .collect())
}

/// Output side of the slideshow.
pub trait Presenter {
    /// Shows one image. Errors other than per-image ones stop the slideshow.
    fn present(&mut self, source: &ImageSource) -> Result<()>;
}

/// Draws images on the panel.
pub struct PanelPresenter<S: PixelSink> {
    sink: S,
    buffers: RowBuffers,
    background: u16,
}

impl<S: PixelSink> PanelPresenter<S> {
    /// Wraps an initialized sink. `background` fills the area an image does
    /// not cover.
    pub fn new(sink: S, background: u16) -> Self {
        let buffers = RowBuffers::new(sink.panel());
        Self {
            sink,
            buffers,
            background,
        }
    }

    #[cfg(test)]
    fn sink(&self) -> &S {
        &self.sink
    }

    fn letterbox(&mut self, (width, height): (u16, u16)) -> Result<()> {
        let panel = *self.sink.panel();
        if width < panel.width() {
            let right = panel.window_at(width, 0, panel.width() - width, height)?;
            self.sink.fill_rect(right, self.background)?;
        }
        if height < panel.height() {
            let below = panel.window_at(0, height, panel.width(), panel.height() - height)?;
            self.sink.fill_rect(below, self.background)?;
        }
        Ok(())
    }
}

impl<S: PixelSink> Presenter for PanelPresenter<S> {
    fn present(&mut self, source: &ImageSource) -> Result<()> {
        let drawn = source.show(&mut self.sink, &mut self.buffers)?;
        self.letterbox(drawn)
    }
}

/// Logs image names without driving any hardware.
#[derive(Debug, Default)]
pub struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn present(&mut self, source: &ImageSource) -> Result<()> {
        info!("Display disabled, skipping {}", source.path().display());
        Ok(())
    }
}

/// Cycles through a fixed set of images.
pub struct Slideshow {
    sources: Vec<ImageSource>,
    settings: SlideshowSettings,
    index: usize,
}

impl Slideshow {
    pub fn new(sources: Vec<ImageSource>, settings: SlideshowSettings) -> Self {
        Self {
            sources,
            settings,
            index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Shows images until `stop` is set. Returns how many were attempted.
    pub fn run<P: Presenter>(&mut self, presenter: &mut P, stop: &AtomicBool) -> Result<usize> {
        if self.sources.is_empty() {
            return Ok(0);
        }

        let count = self.sources.len();
        let interval = self.settings.interval();
        let mut shown = 0;
        info!("Slideshow started: {} images, {}s apart", count, self.settings.delay);

        while !stop.load(Ordering::Relaxed) {
            let source = &self.sources[self.index];
            info!("[{}/{}] {}", self.index + 1, count, source.path().display());

            let started = Instant::now();
            match presenter.present(source) {
                Ok(()) => debug!("Shown in {:?}", started.elapsed()),
                Err(e) if e.is_per_image() => {
                    warn!("Skipping {}: {}", source.path().display(), e);
                }
                Err(e) => return Err(e),
            }
            shown += 1;

            wait(interval, stop);
            self.index = (self.index + 1) % count;
        }

        info!("Slideshow stopped after {} images", shown);
        Ok(shown)
    }
}

/// Sleeps for `interval`, returning early once `stop` is set.
fn wait(interval: Duration, stop: &AtomicBool) {
    // A deadline past what `Instant` can represent means waiting for `stop`.
    let deadline = Instant::now().checked_add(interval);
    loop {
        if stop.load(Ordering::Relaxed) {
            return;
        }
        let remaining = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return;
                }
                deadline - now
            }
            None => STOP_POLL,
        };
        std::thread::sleep(remaining.min(STOP_POLL));
    }
}
