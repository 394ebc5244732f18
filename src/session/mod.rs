//! Export orchestration: configuration, progress, and the photo-to-video pipeline.

/// Export configuration.
pub mod config;
/// Photo-to-video orchestration.
pub mod pipeline;
/// Progress reporting and cancellation.
pub mod progress;
