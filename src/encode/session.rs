use std::path::PathBuf;

use crate::encode::sink::{PresentationTime, ReadyPoll, SinkConfig, SinkStatus, VideoSink};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{LapseError, LapseResult};
use crate::render::frame::FrameRGBA;

/// Lifecycle of an [`EncodeSession`]. Transitions only move forward:
/// `Idle -> Writing -> Finished` or `Idle -> Writing -> Failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncodeStatus {
    /// Created, sink not started yet.
    Idle,
    /// Sink started; frames may be appended.
    Writing,
    /// Output finalized successfully.
    Finished,
    /// Output abandoned or finalization failed.
    Failed,
}

/// Result of a successfully finished session.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedOutput {
    /// File written by the sink, if any.
    pub path: Option<PathBuf>,
    /// Number of frames appended.
    pub frames: u64,
    /// Output duration in seconds (`frames / fps`).
    pub duration_secs: f64,
}

/// Sequential encoder session over a [`VideoSink`].
///
/// Presentation time is driven by the count of appended frames, so photos skipped upstream do
/// not leave gaps. The session is used for one export and never reused; dropping it while
/// `Writing` aborts the sink.
pub struct EncodeSession<'a> {
    sink: &'a mut dyn VideoSink,
    cfg: SinkConfig,
    poll: ReadyPoll,
    status: EncodeStatus,
    appended: u64,
}

impl<'a> EncodeSession<'a> {
    /// Start the sink and return a session in the `Writing` state.
    ///
    /// Failure to create the stream, attach the frame input, or start writing is returned as-is
    /// and is fatal to the export.
    pub fn open(
        sink: &'a mut dyn VideoSink,
        cfg: SinkConfig,
        poll: ReadyPoll,
    ) -> LapseResult<Self> {
        let mut session = Self {
            sink,
            cfg,
            poll,
            status: EncodeStatus::Idle,
            appended: 0,
        };
        session.sink.begin(&session.cfg)?;
        session.status = EncodeStatus::Writing;
        tracing::info!(
            width = session.cfg.width,
            height = session.cfg.height,
            fps = session.cfg.fps.as_f64(),
            "encode session opened"
        );
        Ok(session)
    }

    /// Current lifecycle state.
    pub fn status(&self) -> EncodeStatus {
        self.status
    }

    /// Number of frames successfully appended.
    pub fn frames_appended(&self) -> u64 {
        self.appended
    }

    /// Timestamp the next appended frame will receive.
    pub fn next_presentation_time(&self) -> PresentationTime {
        PresentationTime {
            index: FrameIndex(self.appended),
            fps: self.cfg.fps,
        }
    }

    /// Append one canvas-sized frame, blocking until the sink is ready for it.
    ///
    /// Sink failures move the session to `Failed`. A wrongly sized frame is rejected without
    /// touching the session.
    pub fn append_frame(&mut self, frame: &FrameRGBA) -> LapseResult<PresentationTime> {
        self.expect_writing("append_frame")?;
        if frame.width != self.cfg.width
            || frame.height != self.cfg.height
            || frame.data.len() != (self.cfg.width as usize) * (self.cfg.height as usize) * 4
        {
            return Err(LapseError::frame(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.cfg.width, self.cfg.height
            )));
        }

        if let Err(e) = self.sink.wait_ready(&self.poll) {
            self.fail();
            return Err(e);
        }

        let pts = self.next_presentation_time();
        if let Err(e) = self.sink.push_frame(pts, frame) {
            self.fail();
            return Err(e);
        }
        self.appended += 1;
        Ok(pts)
    }

    /// Mark input finished, wait for the sink to flush, and require a completed status.
    pub fn finish(&mut self) -> LapseResult<EncodedOutput> {
        self.expect_writing("finish")?;
        match self.sink.end() {
            Ok(SinkStatus::Completed) => {
                self.status = EncodeStatus::Finished;
                let out = EncodedOutput {
                    path: self.sink.output_path().map(PathBuf::from),
                    frames: self.appended,
                    duration_secs: self.cfg.fps.frames_to_secs(self.appended),
                };
                tracing::info!(
                    frames = out.frames,
                    duration_secs = out.duration_secs,
                    "encode session finished"
                );
                Ok(out)
            }
            Ok(SinkStatus::Failed(msg)) => {
                self.status = EncodeStatus::Failed;
                Err(LapseError::encode(format!(
                    "encoder did not complete: {msg}"
                )))
            }
            Err(e) => {
                self.status = EncodeStatus::Failed;
                Err(e)
            }
        }
    }

    /// Abandon the output. No-op once the session has finished or failed.
    pub fn abort(&mut self) {
        if self.status == EncodeStatus::Writing {
            self.fail();
        }
    }

    fn fail(&mut self) {
        self.sink.abort();
        self.status = EncodeStatus::Failed;
    }

    fn expect_writing(&self, op: &str) -> LapseResult<()> {
        if self.status != EncodeStatus::Writing {
            return Err(LapseError::encode(format!(
                "{op} called on a {:?} encode session",
                self.status
            )));
        }
        Ok(())
    }
}

impl Drop for EncodeSession<'_> {
    fn drop(&mut self) {
        if self.status == EncodeStatus::Writing {
            tracing::warn!("encode session dropped while writing; aborting output");
            self.fail();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/session.rs"]
mod tests;
