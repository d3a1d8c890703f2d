//! Batch rendering of many records against one immutable template snapshot.

use std::sync::Arc;

use rayon::prelude::*;

use crate::batch::cancel::CancelToken;
use crate::batch::sink::RecordSink;
use crate::foundation::core::Surface;
use crate::foundation::error::{FieldcastError, FieldcastResult};
use crate::model::record::Record;
use crate::model::template::Template;
use crate::render::frame::{BackgroundImage, FrameRGBA, RenderOpts, decode_background};
use crate::render::orchestrator::render_record_with;
use crate::text::fonts::{FontBook, FontLibrary};
use crate::text::measure::FontSpec;

/// Provides the background for each record.
pub trait BackgroundSource: Send + Sync {
    /// Background for record `index`; an error fails only that record.
    fn background(&self, index: usize) -> FieldcastResult<Arc<BackgroundImage>>;
}

/// The same decoded background for every record.
#[derive(Clone, Debug)]
pub struct SharedBackground(pub Arc<BackgroundImage>);

impl BackgroundSource for SharedBackground {
    fn background(&self, _index: usize) -> FieldcastResult<Arc<BackgroundImage>> {
        Ok(Arc::clone(&self.0))
    }
}

/// One encoded image per record, decoded when that record is rendered.
#[derive(Clone, Debug, Default)]
pub struct EncodedBackgrounds(pub Vec<Arc<[u8]>>);

impl BackgroundSource for EncodedBackgrounds {
    fn background(&self, index: usize) -> FieldcastResult<Arc<BackgroundImage>> {
        let bytes = self
            .0
            .get(index)
            .ok_or_else(|| FieldcastError::decode(format!("no background for record {index}")))?;
        decode_background(bytes).map(Arc::new)
    }
}

/// Everything a batch reads, captured at batch start.
#[derive(Clone)]
pub struct BatchJob {
    /// Template snapshot; edits made after the batch starts are not observed.
    pub template: Arc<Template>,
    /// Records in output order.
    pub records: Arc<[Record]>,
    /// Output size.
    pub surface: Surface,
    /// Per-record backgrounds.
    pub backgrounds: Arc<dyn BackgroundSource>,
    /// Raster options.
    pub render: RenderOpts,
}

impl std::fmt::Debug for BatchJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchJob")
            .field("records", &self.records.len())
            .field("surface", &self.surface)
            .field("render", &self.render)
            .finish_non_exhaustive()
    }
}

impl BatchJob {
    /// Job over a template snapshot and records, rendered at `surface`.
    pub fn new(
        template: Arc<Template>,
        records: impl Into<Arc<[Record]>>,
        surface: Surface,
        backgrounds: Arc<dyn BackgroundSource>,
    ) -> Self {
        Self {
            template,
            records: records.into(),
            surface,
            backgrounds,
            render: RenderOpts::default(),
        }
    }

    /// Replace the raster options.
    pub fn with_render_opts(mut self, render: RenderOpts) -> Self {
        self.render = render;
        self
    }

    /// Checks that fail the whole batch before anything is rendered: template validity, output
    /// size and font availability for every column style.
    pub fn preflight(&self, fonts: &FontBook) -> FieldcastResult<()> {
        self.template.validate()?;
        self.surface.validate_raster()?;
        for name in &self.template.columns {
            if let Some(style) = self.template.field_style(name) {
                fonts.ensure_available(&FontSpec::from_style(style, 1.0))?;
            }
        }
        Ok(())
    }
}

/// Execution options for [`run_batch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchOpts {
    /// Render records on a `rayon` pool.
    pub parallel: bool,
    /// Pool size; `None` uses rayon's default.
    pub threads: Option<usize>,
    /// Records rendered per parallel round; frames of a round are held until delivered.
    pub chunk_size: usize,
}

impl Default for BatchOpts {
    fn default() -> Self {
        Self {
            parallel: false,
            threads: None,
            chunk_size: 16,
        }
    }
}

/// Outcome of one record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordStatus {
    /// Frame delivered to the sink.
    Rendered,
    /// Record skipped; the batch continued.
    Failed(String),
}

/// Summary of a batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Number of records in the job.
    pub requested: usize,
    /// Records processed (rendered or failed) before the batch ended.
    pub completed: usize,
    /// Whether the batch stopped because of cancellation.
    pub cancelled: bool,
    /// Per-record outcome for the first `completed` records.
    pub statuses: Vec<RecordStatus>,
}

impl BatchReport {
    /// Frames delivered.
    pub fn rendered(&self) -> usize {
        self.statuses
            .iter()
            .filter(|s| matches!(s, RecordStatus::Rendered))
            .count()
    }

    /// Records that failed.
    pub fn failed(&self) -> usize {
        self.completed - self.rendered()
    }

    fn push(&mut self, status: RecordStatus) {
        self.statuses.push(status);
        self.completed += 1;
    }
}

/// Render record `index` of `job`.
///
/// The outer error aborts the batch (fonts not ready); the inner one fails only this record.
pub(crate) fn render_job_record(
    job: &BatchJob,
    index: usize,
    fonts: &mut FontBook,
) -> FieldcastResult<Result<FrameRGBA, String>> {
    let Some(record) = job.records.get(index) else {
        return Err(FieldcastError::validation(format!(
            "record index {index} out of range"
        )));
    };
    let rendered = job.backgrounds.background(index).and_then(|bg| {
        render_record_with(&bg, job.surface, &job.template, record, fonts, &job.render)
    });
    match rendered {
        Ok(frame) => Ok(Ok(frame)),
        Err(e) if e.is_precondition() => Err(e),
        Err(e) => {
            tracing::warn!(record = index, error = %e, "record failed");
            Ok(Err(e.to_string()))
        }
    }
}

/// Render every record of `job` into `sink`, in record order.
///
/// Cancellation is checked between records; a frame rendered after cancellation is discarded.
/// Per-record failures (e.g. an undecodable background) are reported and skipped; missing fonts
/// and sink errors abort the batch.
#[tracing::instrument(skip_all, fields(records = job.records.len(), parallel = opts.parallel))]
pub fn run_batch(
    job: &BatchJob,
    fonts: &mut FontBook,
    opts: &BatchOpts,
    cancel: &CancelToken,
    sink: &mut dyn RecordSink,
) -> FieldcastResult<BatchReport> {
    job.preflight(fonts)?;

    let mut report = BatchReport {
        requested: job.records.len(),
        ..BatchReport::default()
    };
    if opts.parallel {
        run_parallel(job, fonts.library(), opts, cancel, sink, &mut report)?;
    } else {
        run_sequential(job, fonts, cancel, sink, &mut report)?;
    }

    tracing::info!(
        requested = report.requested,
        rendered = report.rendered(),
        failed = report.failed(),
        cancelled = report.cancelled,
        "batch finished"
    );
    Ok(report)
}

fn run_sequential(
    job: &BatchJob,
    fonts: &mut FontBook,
    cancel: &CancelToken,
    sink: &mut dyn RecordSink,
    report: &mut BatchReport,
) -> FieldcastResult<()> {
    for index in 0..job.records.len() {
        if cancel.is_cancelled() {
            report.cancelled = true;
            return Ok(());
        }
        let outcome = render_job_record(job, index, fonts)?;
        if cancel.is_cancelled() {
            report.cancelled = true;
            return Ok(());
        }
        deliver(index, outcome, sink, report)?;
    }
    Ok(())
}

fn run_parallel(
    job: &BatchJob,
    library: &FontLibrary,
    opts: &BatchOpts,
    cancel: &CancelToken,
    sink: &mut dyn RecordSink,
    report: &mut BatchReport,
) -> FieldcastResult<()> {
    let pool = build_thread_pool(opts.threads)?;
    let chunk_size = opts.chunk_size.max(1);
    let total = job.records.len();

    let mut chunk_start = 0;
    while chunk_start < total {
        if cancel.is_cancelled() {
            report.cancelled = true;
            return Ok(());
        }
        let chunk_end = (chunk_start + chunk_size).min(total);
        let rendered = pool.install(|| {
            (chunk_start..chunk_end)
                .into_par_iter()
                .map_init(
                    || FontBook::from_library(library),
                    |worker_fonts, index| -> FieldcastResult<Option<Result<FrameRGBA, String>>> {
                        if cancel.is_cancelled() {
                            return Ok(None);
                        }
                        let fonts = worker_fonts.as_mut().map_err(|e| {
                            FieldcastError::render(format!("worker font setup failed: {e}"))
                        })?;
                        render_job_record(job, index, fonts).map(Some)
                    },
                )
                .collect::<Vec<_>>()
        });

        for (index, item) in (chunk_start..chunk_end).zip(rendered) {
            let outcome = item?;
            match outcome {
                Some(outcome) if !cancel.is_cancelled() => deliver(index, outcome, sink, report)?,
                _ => {
                    report.cancelled = true;
                    return Ok(());
                }
            }
        }
        chunk_start = chunk_end;
    }
    Ok(())
}

fn deliver(
    index: usize,
    outcome: Result<FrameRGBA, String>,
    sink: &mut dyn RecordSink,
    report: &mut BatchReport,
) -> FieldcastResult<()> {
    match outcome {
        Ok(frame) => {
            sink.accept(index, frame)?;
            report.push(RecordStatus::Rendered);
        }
        Err(msg) => report.push(RecordStatus::Failed(msg)),
    }
    Ok(())
}

fn build_thread_pool(threads: Option<usize>) -> FieldcastResult<rayon::ThreadPool> {
    if threads == Some(0) {
        return Err(FieldcastError::validation(
            "batch 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| FieldcastError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/batch/runner.rs"]
mod tests;
