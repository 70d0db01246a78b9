//! On-card slideshow settings (`config.txt`).
//!
//! A plain `key=value` file next to the images. Only `delay` (seconds) is
//! recognized. Bad lines are reported and skipped so a typo on the card
//! never stops the slideshow.

use std::path::Path;
use std::time::Duration;

use tftshow_hw::Error;
use tracing::{debug, info, warn};

/// File name looked up in the image directory.
pub const SETTINGS_FILE: &str = "config.txt";

/// Seconds between images when nothing else is configured.
pub const DEFAULT_DELAY: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideshowSettings {
    /// Seconds between images, non-negative.
    pub delay: f64,
}

impl Default for SlideshowSettings {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
        }
    }
}

impl SlideshowSettings {
    pub fn with_delay(delay: f64) -> Self {
        Self { delay }
    }

    /// Parses `config.txt` contents over the built-in defaults.
    #[cfg(test)]
    pub fn parse(text: &str) -> Self {
        let mut settings = Self::default();
        settings.apply(text);
        settings
    }

    /// Applies `config.txt` contents on top of the current values.
    ///
    /// Malformed lines are logged and leave the current value in place.
    pub fn apply(&mut self, text: &str) {
        for (index, line) in text.lines().enumerate() {
            if let Err(e) = self.apply_line(index + 1, line) {
                warn!("{}: {}, keeping delay {}", SETTINGS_FILE, e, self.delay);
            }
        }
    }

    fn apply_line(&mut self, line_no: usize, line: &str) -> Result<(), Error> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(Error::ConfigParse {
                line: line_no,
                reason: format!("expected key=value, got '{}'", line),
            });
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();

        match key.as_str() {
            "delay" => {
                let delay: f64 = value.parse().map_err(|_| Error::ConfigParse {
                    line: line_no,
                    reason: format!("delay '{}' is not a number", value),
                })?;
                if Duration::try_from_secs_f64(delay).is_err() {
                    return Err(Error::ConfigParse {
                        line: line_no,
                        reason: format!("delay {} is not a usable number of seconds", value),
                    });
                }
                self.delay = delay;
            }
            other => debug!("{}: ignoring unknown key '{}'", SETTINGS_FILE, other),
        }
        Ok(())
    }

    /// Reads `config.txt` from `dir`, falling back to `self` when absent.
    pub fn load(self, dir: &Path) -> Self {
        let path = dir.join(SETTINGS_FILE);
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                let mut settings = self;
                settings.apply(&text);
                info!("Loaded {} (delay {}s)", path.display(), settings.delay);
                settings
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No {}, using delay {}s", path.display(), self.delay);
                self
            }
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                self
            }
        }
    }

    /// Delay as a duration; values no duration can hold saturate.
    pub fn interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay).unwrap_or(Duration::MAX)
    }
}
