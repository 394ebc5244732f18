//! Encoding sinks and the sequential encode session.
//!
//! Sinks consume composited frames in presentation order; [`session::EncodeSession`] drives one
//! of them for a single export.

/// `ffmpeg`-based sink (MP4 output via system `ffmpeg`).
pub mod ffmpeg;
/// PNG image-sequence sink.
pub mod png;
/// Sequential encoder state machine.
pub mod session;
/// Generic video sink trait and the in-memory sink.
pub mod sink;
