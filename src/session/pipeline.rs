use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;

use crate::align::reference::{EyeReference, reference_from_fit};
use crate::align::solver::{
    CanvasEyeReference, eye_distance_px, is_usable_eye_distance, solve,
};
use crate::assets::decode::DecodedImage;
use crate::assets::photos::{PhotoLoader, SourcePhoto, sort_chronological};
use crate::detect::locator::EyeLocator;
use crate::encode::session::EncodeSession;
use crate::encode::sink::VideoSink;
use crate::foundation::core::Canvas;
use crate::foundation::error::{LapseError, LapseResult};
use crate::render::compositor::{FitRect, FrameCompositor, Placement};
use crate::render::frame::FrameRGBA;
use crate::session::config::ExportConfig;
use crate::session::progress::{CancelFlag, ProgressReporter};

/// Caller-side knobs for one export.
#[derive(Debug, Default)]
pub struct ExportOptions {
    /// Export settings.
    pub config: ExportConfig,
    /// Receives progress fractions after each appended frame.
    pub progress: Option<Sender<f64>>,
    /// Checked between frames; when set the export is abandoned.
    pub cancel: Option<CancelFlag>,
}

impl ExportOptions {
    /// Options with `config` and no progress or cancellation.
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            progress: None,
            cancel: None,
        }
    }

    /// Send progress into `tx`.
    pub fn with_progress(mut self, tx: Sender<f64>) -> Self {
        self.progress = Some(tx);
        self
    }

    /// Poll `flag` between frames.
    pub fn with_cancel(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }
}

/// What happened to one source photo.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameDisposition {
    /// Drawn through a solved alignment transform.
    Aligned,
    /// Aspect-fit; its detection established the eye reference.
    Reference,
    /// Aspect-fit without alignment.
    Fit,
    /// Not appended (decode or compositing failure).
    Skipped,
}

/// Per-photo outcome, in export order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRecord {
    /// Photo identifier.
    pub photo_id: String,
    /// How the photo was handled.
    pub disposition: FrameDisposition,
}

/// Summary of a finished export.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportReport {
    /// File or directory written by the sink, if any.
    pub output_path: Option<PathBuf>,
    /// Frames appended to the encoder.
    pub frames_appended: u64,
    /// Photos that produced no frame.
    pub frames_skipped: u64,
    /// Frames drawn through an alignment transform.
    pub frames_aligned: u64,
    /// Frames drawn with aspect-fit (including the reference frame).
    pub frames_fit: u64,
    /// Output duration in seconds.
    pub duration_secs: f64,
    /// Eye anchor used for the run, if any photo produced a detection.
    pub reference: Option<CanvasEyeReference>,
    /// Per-photo outcomes.
    pub records: Vec<FrameRecord>,
}

/// Terminal result of [`run_export`].
#[derive(Clone, Debug, PartialEq)]
pub enum ExportOutcome {
    /// The output was finalized.
    Written(ExportReport),
    /// The photo list was empty; no encoder was opened.
    NothingToExport,
}

/// Decides how each photo is placed, carrying the eye reference from frame to frame.
struct PlacementPlanner {
    canvas: Canvas,
    align: bool,
    reference: EyeReference,
}

impl PlacementPlanner {
    fn new(canvas: Canvas, align: bool) -> Self {
        Self {
            canvas,
            align,
            reference: EyeReference::Unset,
        }
    }

    fn plan(
        &mut self,
        locator: &mut dyn EyeLocator,
        photo: &SourcePhoto,
        image: &DecodedImage,
    ) -> (Placement, FrameDisposition) {
        if !self.align {
            return (Placement::Fit, FrameDisposition::Fit);
        }

        let eyes = match locator.detect(photo, image) {
            Ok(eyes) => eyes,
            Err(e) => {
                tracing::warn!(photo = %photo.id, reason = %e, "eye detection failed; using fit");
                return (Placement::Fit, FrameDisposition::Fit);
            }
        };

        let Some(reference) = self.reference.get().copied() else {
            let fit = FitRect::compute(image.size(), self.canvas);
            let anchor = reference_from_fit(&eyes, &fit);
            let distance = eye_distance_px(&eyes);
            if !is_usable_eye_distance(distance)
                || !is_usable_eye_distance(anchor.delta().hypot())
            {
                tracing::warn!(
                    photo = %photo.id,
                    distance,
                    "eyes too close to anchor the reference; using fit"
                );
                return (Placement::Fit, FrameDisposition::Fit);
            }
            self.reference = self.reference.establish(anchor);
            tracing::info!(
                photo = %photo.id,
                left = ?anchor.left,
                right = ?anchor.right,
                "eye reference established"
            );
            return (Placement::Fit, FrameDisposition::Reference);
        };

        match solve(&reference, &eyes) {
            Ok(t) => (Placement::Aligned(t), FrameDisposition::Aligned),
            Err(skip) => {
                tracing::warn!(photo = %photo.id, reason = %skip, "alignment skipped; using fit");
                (Placement::Fit, FrameDisposition::Fit)
            }
        }
    }
}

/// Composite `photos` in chronological order and encode them into `sink`.
///
/// Per-photo failures (decode, detection, degenerate alignment, compositing) cost at most that
/// photo's frame. Encoder failures, cancellation, and an export that appends no frames at all
/// are terminal; in those cases the sink is aborted rather than finalized.
#[tracing::instrument(skip_all, fields(photos = photos.len()))]
pub fn run_export(
    mut photos: Vec<SourcePhoto>,
    loader: &dyn PhotoLoader,
    locator: &mut dyn EyeLocator,
    sink: &mut dyn VideoSink,
    opts: ExportOptions,
) -> LapseResult<ExportOutcome> {
    let ExportOptions {
        config,
        progress,
        cancel,
    } = opts;
    config.validate()?;

    sort_chronological(&mut photos);
    if photos.is_empty() {
        tracing::info!("no photos; nothing to export");
        return Ok(ExportOutcome::NothingToExport);
    }

    let mut compositor = FrameCompositor::new(config.canvas)?;
    let mut planner = PlacementPlanner::new(config.canvas, config.align);
    let mut progress = progress.map(ProgressReporter::new).unwrap_or_default();
    let mut session = EncodeSession::open(sink, config.sink_config()?, config.ready_poll())?;

    let total = photos.len();
    let mut records = Vec::with_capacity(total);
    let (mut aligned, mut fit) = (0u64, 0u64);

    for (i, photo) in photos.iter().enumerate() {
        if cancel.as_ref().is_some_and(CancelFlag::is_cancelled) {
            tracing::info!(appended = session.frames_appended(), "export cancelled");
            session.abort();
            return Err(LapseError::Cancelled);
        }

        let composed = compose_photo(&mut compositor, &mut planner, loader, locator, photo);
        let disposition = match composed {
            Ok((frame, disposition)) => {
                let pts = session.append_frame(&frame)?;
                tracing::debug!(photo = %photo.id, pts = pts.secs(), ?disposition, "frame appended");
                progress.report((i + 1) as f64 / total as f64);
                disposition
            }
            Err(e) if e.is_recoverable() => {
                tracing::warn!(photo = %photo.id, error = %e, "skipping photo");
                FrameDisposition::Skipped
            }
            Err(e) => return Err(e),
        };
        match disposition {
            FrameDisposition::Aligned => aligned += 1,
            FrameDisposition::Reference | FrameDisposition::Fit => fit += 1,
            FrameDisposition::Skipped => {}
        }
        records.push(FrameRecord {
            photo_id: photo.id.clone(),
            disposition,
        });
    }

    if session.frames_appended() == 0 {
        session.abort();
        return Err(LapseError::NoFramesWritten);
    }

    progress.finish_at_one();
    let out = session.finish()?;

    Ok(ExportOutcome::Written(ExportReport {
        output_path: out.path,
        frames_appended: out.frames,
        frames_skipped: total as u64 - out.frames,
        frames_aligned: aligned,
        frames_fit: fit,
        duration_secs: out.duration_secs,
        reference: planner.reference.get().copied(),
        records,
    }))
}

/// Decode, place, and composite one photo. The decoded image is dropped before returning.
fn compose_photo(
    compositor: &mut FrameCompositor,
    planner: &mut PlacementPlanner,
    loader: &dyn PhotoLoader,
    locator: &mut dyn EyeLocator,
    photo: &SourcePhoto,
) -> LapseResult<(FrameRGBA, FrameDisposition)> {
    let image = loader.load(photo).map_err(|e| match e {
        LapseError::Frame(_) => e,
        other => LapseError::frame(other.to_string()),
    })?;
    let (placement, disposition) = planner.plan(locator, photo, &image);
    let frame = compositor.composite(&image, placement)?;
    Ok((frame, disposition))
}

/// Run [`run_export`] on a dedicated worker thread.
///
/// Progress and cancellation flow through `opts`; the thread owns every collaborator.
pub fn spawn_export<L, E, S>(
    photos: Vec<SourcePhoto>,
    loader: L,
    mut locator: E,
    mut sink: S,
    opts: ExportOptions,
) -> LapseResult<JoinHandle<LapseResult<ExportOutcome>>>
where
    L: PhotoLoader + 'static,
    E: EyeLocator + 'static,
    S: VideoSink + 'static,
{
    std::thread::Builder::new()
        .name("facelapse-export".to_string())
        .spawn(move || run_export(photos, &loader, &mut locator, &mut sink, opts))
        .map_err(|e| LapseError::Other(anyhow::anyhow!("failed to spawn export worker: {e}")))
}

/// Composite the photo at `index` (in chronological order) exactly as an export would.
///
/// Earlier photos are decoded and run through the locator until the eye reference is
/// established, so an aligned preview matches the corresponding video frame.
pub fn preview_frame(
    mut photos: Vec<SourcePhoto>,
    index: usize,
    loader: &dyn PhotoLoader,
    locator: &mut dyn EyeLocator,
    config: &ExportConfig,
) -> LapseResult<FrameRGBA> {
    config.validate()?;
    sort_chronological(&mut photos);
    if index >= photos.len() {
        return Err(LapseError::validation(format!(
            "photo index {index} out of range ({} photos)",
            photos.len()
        )));
    }

    let mut compositor = FrameCompositor::new(config.canvas)?;
    let mut planner = PlacementPlanner::new(config.canvas, config.align);
    for photo in &photos[..index] {
        if !config.align || planner.reference.is_established() {
            break;
        }
        match loader.load(photo) {
            Ok(image) => {
                let _ = planner.plan(locator, photo, &image);
            }
            Err(e) => tracing::warn!(photo = %photo.id, error = %e, "skipping photo"),
        }
    }

    let (frame, _) = compose_photo(&mut compositor, &mut planner, loader, locator, &photos[index])?;
    Ok(frame)
}

#[cfg(test)]
#[path = "../../tests/unit/session/pipeline.rs"]
mod tests;
