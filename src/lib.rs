//! Facelapse turns a chronological series of portrait photos into an eye-aligned video montage.
//!
//! The pipeline is sequential and offline:
//!
//! - Load [`SourcePhoto`]s through a [`PhotoLoader`] and sort them by timestamp
//! - Locate eyes with an [`EyeLocator`] and anchor a [`CanvasEyeReference`] on the first hit
//! - Composite each photo with [`FrameCompositor`] (aspect-fit, or aligned via [`solve`])
//! - Stream frames through an [`EncodeSession`] into a [`VideoSink`] such as [`FfmpegSink`]
//!
//! [`run_export`] drives all of it; [`spawn_export`] runs it on a worker thread.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Eye alignment.
pub mod align;
/// Photo records, loading, and decoding.
pub mod assets;
/// Eye location.
pub mod detect;
/// Encoding sinks and the encode session.
pub mod encode;
/// Frame compositing.
pub mod render;
/// Export orchestration.
pub mod session;

pub use crate::foundation::core::{Affine, Canvas, Fps, FrameIndex, Point, Size, Vec2};
pub use crate::foundation::error::{LapseError, LapseResult};

pub use crate::align::reference::EyeReference;
pub use crate::align::solver::{AlignmentSkip, CanvasEyeReference, SimilarityTransform, solve};
pub use crate::assets::decode::{DecodedImage, decode_image};
pub use crate::assets::manifest::{ManifestEntry, ManifestEyes, PhotoManifest};
pub use crate::assets::photos::{FsPhotoLoader, PhotoLoader, SourcePhoto};
pub use crate::detect::locator::{DetectError, EyeLocations, EyeLocator};
pub use crate::detect::manifest::ManifestEyeLocator;
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::png::{PngSequenceSink, write_png};
pub use crate::encode::session::{EncodeSession, EncodeStatus, EncodedOutput};
pub use crate::encode::sink::{
    InMemorySink, PresentationTime, ReadyPoll, SinkConfig, SinkStatus, VideoSink,
};
pub use crate::render::compositor::{FitRect, FrameCompositor, Placement};
pub use crate::render::frame::FrameRGBA;
pub use crate::session::config::{BackpressureConfig, ExportConfig};
pub use crate::session::pipeline::{
    ExportOptions, ExportOutcome, ExportReport, FrameDisposition, FrameRecord, preview_frame,
    run_export, spawn_export,
};
pub use crate::session::progress::{CancelFlag, ProgressReporter};
