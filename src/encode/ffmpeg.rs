use std::io::{Read, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{SyncSender, sync_channel};
use std::thread::JoinHandle;

use crate::encode::sink::{PresentationTime, ReadyPoll, SinkConfig, SinkStatus, VideoSink};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{LapseError, LapseResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::frame::FrameRGBA;

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Frames buffered between the encode worker and the `ffmpeg` writer thread.
    pub channel_capacity: usize,
}

impl FfmpegSinkOpts {
    /// Create options for outputting an MP4 to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            channel_capacity: 4,
        }
    }
}

struct FrameWriter {
    tx: Option<SyncSender<Vec<u8>>>,
    handle: Option<JoinHandle<std::io::Result<()>>>,
}

impl FrameWriter {
    fn spawn(mut stdin: ChildStdin, capacity: usize) -> LapseResult<Self> {
        let (tx, rx) = sync_channel::<Vec<u8>>(capacity.max(1));
        let handle = std::thread::Builder::new()
            .name("facelapse-ffmpeg-writer".to_string())
            .spawn(move || {
                for buf in rx {
                    stdin.write_all(&buf)?;
                }
                stdin.flush()
            })
            .map_err(|e| LapseError::encode(format!("failed to spawn ffmpeg writer: {e}")))?;
        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
        })
    }

    fn is_alive(&self) -> bool {
        self.tx.is_some() && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Close the channel and collect the writer's IO result.
    fn close(&mut self) -> LapseResult<()> {
        drop(self.tx.take());
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| LapseError::encode("ffmpeg writer thread panicked"))?
                .map_err(|e| LapseError::encode(format!("failed to write frames to ffmpeg: {e}"))),
            None => Ok(()),
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to its stdin.
///
/// Frames are handed to a writer thread over a bounded channel: when `ffmpeg` falls behind the
/// channel fills and `push_frame` blocks until a slot frees up.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    writer: Option<FrameWriter>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,

    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            writer: None,
            stderr_drain: None,
            cfg: None,
            last_idx: None,
        }
    }

    fn collect_stderr(&mut self) -> LapseResult<Vec<u8>> {
        match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| LapseError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| LapseError::encode(format!("ffmpeg stderr read failed: {e}"))),
            None => Ok(Vec::new()),
        }
    }
}

impl VideoSink for FfmpegSink {
    fn begin(&mut self, cfg: &SinkConfig) -> LapseResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(LapseError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(LapseError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(LapseError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p mp4 output)",
            ));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(LapseError::encode(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(LapseError::encode(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if self.opts.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        // Input: opaque RGBA8 (flattened in push_frame). Output: h264 + yuv420p.
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args([
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-preset",
            "medium",
            "-crf",
            "20",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ]);
        cmd.arg(&self.opts.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            LapseError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| LapseError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| LapseError::encode("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        let writer = match FrameWriter::spawn(stdin, self.opts.channel_capacity) {
            Ok(w) => w,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }
        };

        self.child = Some(child);
        self.writer = Some(writer);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg.clone());
        self.last_idx = None;
        Ok(())
    }

    fn is_ready(&mut self) -> bool {
        self.writer.as_ref().is_some_and(FrameWriter::is_alive)
    }

    fn wait_ready(&mut self, _poll: &ReadyPoll) -> LapseResult<()> {
        // The bounded channel in `push_frame` blocks until the writer drains a slot.
        if self.is_ready() {
            Ok(())
        } else {
            Err(LapseError::encode("ffmpeg writer is no longer accepting frames"))
        }
    }

    fn push_frame(&mut self, pts: PresentationTime, frame: &FrameRGBA) -> LapseResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| LapseError::encode("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && pts.index.0 <= last.0
        {
            return Err(LapseError::encode(
                "ffmpeg sink received out-of-order frame index",
            ));
        }

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(LapseError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }

        let mut opaque = vec![0u8; frame.data.len()];
        flatten_premul_over_bg_to_opaque_rgba8(&mut opaque, &frame.data, cfg.bg_rgba)?;

        let tx = self
            .writer
            .as_ref()
            .and_then(|w| w.tx.as_ref())
            .ok_or_else(|| LapseError::encode("ffmpeg sink is already finalized"))?;
        if tx.send(opaque).is_err() {
            // The writer hung up; surface its IO error if it has one.
            let cause = match self.writer.as_mut().map(FrameWriter::close) {
                Some(Err(e)) => e.to_string(),
                _ => "writer thread exited".to_string(),
            };
            return Err(LapseError::encode(format!(
                "failed to hand frame to ffmpeg: {cause}"
            )));
        }
        self.last_idx = Some(pts.index);
        Ok(())
    }

    fn end(&mut self) -> LapseResult<SinkStatus> {
        let write_result = match self.writer.take() {
            Some(mut w) => w.close(),
            None => Ok(()),
        };
        let mut child = self
            .child
            .take()
            .ok_or_else(|| LapseError::encode("ffmpeg sink not started"))?;

        let status = child.wait().map_err(|e| {
            LapseError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = self.collect_stderr()?;
        self.cfg = None;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Ok(SinkStatus::Failed(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        if let Err(e) = write_result {
            return Ok(SinkStatus::Failed(e.to_string()));
        }
        Ok(SinkStatus::Completed)
    }

    fn abort(&mut self) {
        if let Some(mut w) = self.writer.take() {
            drop(w.tx.take());
        }
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
            let _ = std::fs::remove_file(&self.opts.out_path);
        }
        let _ = self.collect_stderr();
        self.cfg = None;
    }

    fn output_path(&self) -> Option<&Path> {
        Some(&self.opts.out_path)
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` before `-i` sets the input framerate.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

pub(crate) fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> LapseResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(LapseError::validation(
            "flatten_premul_over_bg_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = bg_rgba[0] as u16;
    let bg_g = bg_rgba[1] as u16;
    let bg_b = bg_rgba[2] as u16;

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = s[3] as u16;
        if a == 255 {
            d.copy_from_slice(s);
            d[3] = 255;
            continue;
        }

        let inv = 255u16 - a;
        let r = s[0] as u16 + mul_div255_u16(bg_r, inv);
        let g = s[1] as u16 + mul_div255_u16(bg_g, inv);
        let b = s[2] as u16 + mul_div255_u16(bg_b, inv);

        d[0] = r.min(255) as u8;
        d[1] = g.min(255) as u8;
        d[2] = b.min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> LapseResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
