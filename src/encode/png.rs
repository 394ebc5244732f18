use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::encode::ffmpeg::flatten_premul_over_bg_to_opaque_rgba8;
use crate::encode::sink::{PresentationTime, SinkConfig, SinkStatus, VideoSink};
use crate::foundation::error::{LapseError, LapseResult};
use crate::render::frame::FrameRGBA;

/// Sink writing each frame as `frame_NNNNNN.png` into a directory.
///
/// Frames are flattened over the configured background, matching what the MP4 path encodes.
/// Useful for inspecting alignment without `ffmpeg`.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    cfg: Option<SinkConfig>,
    written: u64,
}

impl PngSequenceSink {
    /// Write frames into `dir`, creating it on `begin`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cfg: None,
            written: 0,
        }
    }

    /// Path of the file written for frame `index`.
    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("frame_{index:06}.png"))
    }

    /// Number of frames written so far.
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl VideoSink for PngSequenceSink {
    fn begin(&mut self, cfg: &SinkConfig) -> LapseResult<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create frame directory '{}'", self.dir.display()))
            .map_err(|e| LapseError::encode(format!("{e:#}")))?;
        self.cfg = Some(cfg.clone());
        self.written = 0;
        Ok(())
    }

    fn is_ready(&mut self) -> bool {
        self.cfg.is_some()
    }

    fn push_frame(&mut self, pts: PresentationTime, frame: &FrameRGBA) -> LapseResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| LapseError::encode("png sink not started"))?;

        write_png(&self.frame_path(pts.index.0), frame, cfg.bg_rgba)?;
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> LapseResult<SinkStatus> {
        if self.cfg.take().is_none() {
            return Err(LapseError::encode("png sink not started"));
        }
        Ok(SinkStatus::Completed)
    }

    fn abort(&mut self) {
        self.cfg = None;
    }

    fn output_path(&self) -> Option<&Path> {
        Some(&self.dir)
    }
}

/// Flatten `frame` over `bg_rgba` and write it as an opaque PNG.
pub fn write_png(path: &Path, frame: &FrameRGBA, bg_rgba: [u8; 4]) -> LapseResult<()> {
    let mut opaque = vec![0u8; frame.data.len()];
    flatten_premul_over_bg_to_opaque_rgba8(&mut opaque, &frame.data, bg_rgba)?;
    image::save_buffer_with_format(
        path,
        &opaque,
        frame.width,
        frame.height,
        image::ExtendedColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|e| LapseError::encode(format!("failed to write '{}': {e}", path.display())))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
