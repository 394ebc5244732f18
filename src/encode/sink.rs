use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{LapseError, LapseResult};
use crate::render::frame::FrameRGBA;

/// Configuration provided to a [`VideoSink`] when a session opens.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Background used to flatten transparent pixels (straight RGBA8).
    pub bg_rgba: [u8; 4],
}

/// Presentation timestamp of an appended frame: `index * den / num` seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PresentationTime {
    /// Count of frames appended before this one.
    pub index: FrameIndex,
    /// Timeline rate.
    pub fps: Fps,
}

impl PresentationTime {
    /// Timestamp in seconds.
    pub fn secs(self) -> f64 {
        self.fps.frames_to_secs(self.index.0)
    }
}

/// Bounded poll-and-sleep parameters for [`VideoSink::wait_ready`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadyPoll {
    /// Sleep between readiness checks.
    pub interval: Duration,
    /// Give up after this long without the sink becoming ready.
    pub timeout: Duration,
}

impl Default for ReadyPoll {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(5),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Final status reported by a sink after its input is marked finished.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SinkStatus {
    /// The output is complete and playable.
    Completed,
    /// The sink could not finalize the output.
    Failed(String),
}

/// Consumer of composited frames, in presentation order.
///
/// Call order: `begin` once, then any number of `wait_ready`/`push_frame` pairs, then either
/// `end` or `abort`.
pub trait VideoSink: Send {
    /// Create the output stream and start the write session.
    fn begin(&mut self, cfg: &SinkConfig) -> LapseResult<()>;

    /// Return `true` when the sink can accept another frame without dropping it.
    fn is_ready(&mut self) -> bool;

    /// Block until [`VideoSink::is_ready`] holds.
    ///
    /// The default implementation polls with a short sleep and fails once `poll.timeout` elapses.
    /// Sinks with a native readiness notification override this.
    fn wait_ready(&mut self, poll: &ReadyPoll) -> LapseResult<()> {
        let start = Instant::now();
        loop {
            if self.is_ready() {
                return Ok(());
            }
            if start.elapsed() >= poll.timeout {
                return Err(LapseError::encode(format!(
                    "encoder was not ready for more data within {:?}",
                    poll.timeout
                )));
            }
            std::thread::sleep(poll.interval);
        }
    }

    /// Submit one frame at `pts`.
    fn push_frame(&mut self, pts: PresentationTime, frame: &FrameRGBA) -> LapseResult<()>;

    /// Mark the input finished, wait for the output to flush, and report its status.
    fn end(&mut self) -> LapseResult<SinkStatus>;

    /// Tear down without finalizing. Partial output may be removed.
    fn abort(&mut self) {}

    /// File written by this sink, if it writes one.
    fn output_path(&self) -> Option<&Path> {
        None
    }
}

/// In-memory sink for tests and debugging.
///
/// Readiness and the final status can be scripted to exercise backpressure and failed
/// finalization.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(PresentationTime, FrameRGBA)>,
    busy_polls_per_frame: u32,
    busy_left: u32,
    ready_checks: u64,
    fail_begin: bool,
    final_status: Option<SinkStatus>,
    aborted: bool,
    ended: bool,
    out_path: Option<PathBuf>,
}

impl InMemorySink {
    /// Create a new in-memory sink that is always ready and always completes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report "not ready" this many times before accepting each frame.
    pub fn with_busy_polls(mut self, polls: u32) -> Self {
        self.busy_polls_per_frame = polls;
        self.busy_left = polls;
        self
    }

    /// Report `status` from [`VideoSink::end`].
    pub fn with_final_status(mut self, status: SinkStatus) -> Self {
        self.final_status = Some(status);
        self
    }

    /// Make [`VideoSink::begin`] fail.
    pub fn failing_begin(mut self) -> Self {
        self.fail_begin = true;
        self
    }

    /// Pretend to write `path`.
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.out_path = Some(path.into());
        self
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(PresentationTime, FrameRGBA)] {
        &self.frames
    }

    /// Number of readiness checks performed so far.
    pub fn ready_checks(&self) -> u64 {
        self.ready_checks
    }

    /// Return `true` once `abort` has been called.
    pub fn was_aborted(&self) -> bool {
        self.aborted
    }

    /// Return `true` once `end` has been called.
    pub fn was_ended(&self) -> bool {
        self.ended
    }
}

impl VideoSink for InMemorySink {
    fn begin(&mut self, cfg: &SinkConfig) -> LapseResult<()> {
        if self.fail_begin {
            return Err(LapseError::encode("in-memory sink refused to start"));
        }
        self.cfg = Some(cfg.clone());
        self.frames.clear();
        Ok(())
    }

    fn is_ready(&mut self) -> bool {
        self.ready_checks += 1;
        if self.busy_left > 0 {
            self.busy_left -= 1;
            return false;
        }
        true
    }

    fn push_frame(&mut self, pts: PresentationTime, frame: &FrameRGBA) -> LapseResult<()> {
        if self.cfg.is_none() {
            return Err(LapseError::encode("in-memory sink not started"));
        }
        self.frames.push((pts, frame.clone()));
        self.busy_left = self.busy_polls_per_frame;
        Ok(())
    }

    fn end(&mut self) -> LapseResult<SinkStatus> {
        self.ended = true;
        Ok(self.final_status.clone().unwrap_or(SinkStatus::Completed))
    }

    fn abort(&mut self) {
        self.aborted = true;
    }

    fn output_path(&self) -> Option<&Path> {
        self.out_path.as_deref()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
