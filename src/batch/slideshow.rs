//! Slideshow frames: each record held on screen for a fixed time, streamed frame by frame.

use crate::batch::cancel::CancelToken;
use crate::batch::runner::{BatchJob, RecordStatus, render_job_record};
use crate::batch::sink::{FrameSink, StreamInfo};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{FieldcastError, FieldcastResult};
use crate::render::frame::FrameRGBA;
use crate::text::fonts::FontBook;

/// Slideshow timing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlideshowOpts {
    /// Output frame rate.
    pub fps: Fps,
    /// How long each record stays on screen.
    pub seconds_per_slide: f64,
    /// Push the previous frame again instead of re-rendering while the record is unchanged.
    pub static_frame_elision: bool,
}

impl Default for SlideshowOpts {
    fn default() -> Self {
        Self {
            fps: Fps { num: 30, den: 1 },
            seconds_per_slide: 3.0,
            static_frame_elision: true,
        }
    }
}

impl SlideshowOpts {
    /// Frames each slide occupies (at least one).
    pub fn frames_per_slide(&self) -> FieldcastResult<u64> {
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(FieldcastError::validation("slideshow fps must be > 0"));
        }
        if !self.seconds_per_slide.is_finite() || self.seconds_per_slide <= 0.0 {
            return Err(FieldcastError::validation(
                "seconds_per_slide must be finite and > 0",
            ));
        }
        Ok(self.fps.secs_to_frames_floor(self.seconds_per_slide).max(1))
    }
}

/// Summary of a slideshow run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlideshowReport {
    /// Frames the full slideshow has.
    pub frames_total: u64,
    /// Frames pushed to the sink.
    pub frames_pushed: u64,
    /// Frames rasterized.
    pub frames_rendered: u64,
    /// Frames pushed again without rendering.
    pub frames_reused: u64,
    /// Whether the run stopped because of cancellation.
    pub cancelled: bool,
    /// Outcome of each slide that was reached.
    pub statuses: Vec<RecordStatus>,
}

/// Record shown at `frame` when every slide lasts `frames_per_slide` frames.
pub fn record_index_for_frame(frame: FrameIndex, frames_per_slide: u64) -> usize {
    (frame.0 / frames_per_slide.max(1)) as usize
}

/// Render the slideshow of `job` into `sink`.
///
/// Each output frame shows record `frame / frames_per_slide`. A slide whose record fails is
/// shown as the clear color and reported; missing fonts and sink errors abort. `end` is called
/// on the sink after the last frame and after cancellation.
#[tracing::instrument(skip_all, fields(records = job.records.len()))]
pub fn render_slideshow(
    job: &BatchJob,
    fonts: &mut FontBook,
    opts: &SlideshowOpts,
    cancel: &CancelToken,
    sink: &mut dyn FrameSink,
) -> FieldcastResult<SlideshowReport> {
    let per_slide = opts.frames_per_slide()?;
    job.preflight(fonts)?;

    let frames_total = per_slide * job.records.len() as u64;
    let mut report = SlideshowReport {
        frames_total,
        ..SlideshowReport::default()
    };
    sink.begin(&StreamInfo {
        surface: job.surface,
        fps: opts.fps,
        total_frames: frames_total,
    })?;

    let blank = FrameRGBA::filled(job.surface, job.render.clear_premul());
    let mut current: Option<(usize, FrameRGBA)> = None;
    for f in 0..frames_total {
        if cancel.is_cancelled() {
            report.cancelled = true;
            break;
        }
        let frame_index = FrameIndex(f);
        let record = record_index_for_frame(frame_index, per_slide);
        let first_of_slide = f % per_slide == 0;

        let reusable = opts.static_frame_elision
            && current.as_ref().is_some_and(|(shown, _)| *shown == record);
        if !reusable {
            let frame = match render_job_record(job, record, fonts)? {
                Ok(frame) => {
                    if first_of_slide {
                        report.statuses.push(RecordStatus::Rendered);
                    }
                    frame
                }
                Err(msg) => {
                    if first_of_slide {
                        report.statuses.push(RecordStatus::Failed(msg));
                    }
                    blank.clone()
                }
            };
            report.frames_rendered += 1;
            current = Some((record, frame));
        } else {
            report.frames_reused += 1;
        }

        if cancel.is_cancelled() {
            report.cancelled = true;
            break;
        }
        if let Some((_, frame)) = &current {
            sink.push_frame(frame_index, frame)?;
            report.frames_pushed += 1;
        }
    }

    sink.end()?;
    tracing::info!(
        frames = report.frames_pushed,
        rendered = report.frames_rendered,
        reused = report.frames_reused,
        cancelled = report.cancelled,
        "slideshow finished"
    );
    Ok(report)
}

#[cfg(test)]
#[path = "../../tests/unit/batch/slideshow.rs"]
mod tests;
