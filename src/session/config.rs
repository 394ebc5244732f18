use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;

use crate::encode::sink::{ReadyPoll, SinkConfig};
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{LapseError, LapseResult};

/// Bounded readiness wait between frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BackpressureConfig {
    /// Sleep between readiness checks, in milliseconds.
    pub poll_interval_ms: u64,
    /// Give up waiting after this many milliseconds.
    pub timeout_ms: u64,
}

impl Default for BackpressureConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 5,
            timeout_ms: 30_000,
        }
    }
}

/// Settings for one export.
///
/// Every field has a default, so `{}` is a valid JSON config.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Output canvas in pixels.
    pub canvas: Canvas,
    /// Output frame rate; one of [`Fps::MENU`].
    pub fps: u32,
    /// Eye-align photos after the reference is established.
    pub align: bool,
    /// Straight RGBA8 colour that transparent pixels are flattened onto.
    pub background_rgba: [u8; 4],
    /// Replace an existing output file.
    pub overwrite: bool,
    /// Encoder readiness polling.
    pub backpressure: BackpressureConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            fps: 30,
            align: true,
            background_rgba: [0, 0, 0, 255],
            overwrite: true,
            backpressure: BackpressureConfig::default(),
        }
    }
}

impl ExportConfig {
    /// Parse a config from JSON and validate it.
    pub fn from_json_str(s: &str) -> LapseResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| LapseError::serde(format!("invalid export config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse, and validate a JSON config file.
    pub fn from_path(path: &Path) -> LapseResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    /// Check the canvas, frame rate, and polling settings.
    pub fn validate(&self) -> LapseResult<()> {
        self.canvas.validate()?;
        Fps::from_menu(self.fps)?;
        if self.backpressure.poll_interval_ms == 0 {
            return Err(LapseError::validation(
                "backpressure.poll_interval_ms must be > 0",
            ));
        }
        if self.backpressure.timeout_ms < self.backpressure.poll_interval_ms {
            return Err(LapseError::validation(
                "backpressure.timeout_ms must be >= poll_interval_ms",
            ));
        }
        Ok(())
    }

    /// Validated output frame rate.
    pub fn fps(&self) -> LapseResult<Fps> {
        Fps::from_menu(self.fps)
    }

    /// Readiness polling parameters for the encoder.
    pub fn ready_poll(&self) -> ReadyPoll {
        ReadyPoll {
            interval: Duration::from_millis(self.backpressure.poll_interval_ms),
            timeout: Duration::from_millis(self.backpressure.timeout_ms),
        }
    }

    /// Sink configuration for this export.
    pub fn sink_config(&self) -> LapseResult<SinkConfig> {
        Ok(SinkConfig {
            width: self.canvas.width,
            height: self.canvas.height,
            fps: self.fps()?,
            bg_rgba: self.background_rgba,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/config.rs"]
mod tests;
