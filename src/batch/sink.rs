//! Consumers of rendered frames: per-record stills and ordered video frame streams.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::core::{Fps, FrameIndex, Surface};
use crate::foundation::error::FieldcastResult;
use crate::render::frame::FrameRGBA;

/// Receives one frame per successfully rendered record, in record order.
pub trait RecordSink {
    /// Take ownership of the frame for record `index` (0-based).
    fn accept(&mut self, index: usize, frame: FrameRGBA) -> FieldcastResult<()>;
}

/// Keeps every frame in memory.
#[derive(Debug, Default)]
pub struct InMemoryRecordSink {
    /// Record index and frame, in delivery order.
    pub frames: Vec<(usize, FrameRGBA)>,
}

impl RecordSink for InMemoryRecordSink {
    fn accept(&mut self, index: usize, frame: FrameRGBA) -> FieldcastResult<()> {
        self.frames.push((index, frame));
        Ok(())
    }
}

/// File name for record `index` (0-based) of a batch of `total` records.
///
/// Names are 1-based and zero-padded to at least three digits, or more when `total` needs them,
/// so a directory listing sorts in record order: `001.png`, ..., `1000.png`.
pub fn png_file_name(index: usize, total: usize) -> String {
    let digits = total.max(1).to_string().len().max(3);
    format!("{:0digits$}.png", index + 1)
}

/// Writes each frame as an un-premultiplied PNG into a directory.
#[derive(Debug)]
pub struct PngDirSink {
    dir: PathBuf,
    total: usize,
    written: Vec<PathBuf>,
}

impl PngDirSink {
    /// Sink for a batch of `total` records; creates `dir` if needed.
    pub fn new(dir: impl Into<PathBuf>, total: usize) -> FieldcastResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create output directory {}", dir.display()))?;
        Ok(Self {
            dir,
            total,
            written: Vec::new(),
        })
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl RecordSink for PngDirSink {
    fn accept(&mut self, index: usize, frame: FrameRGBA) -> FieldcastResult<()> {
        let path = self.dir.join(png_file_name(index, self.total));
        frame
            .to_rgba_image()?
            .save(&path)
            .with_context(|| format!("write {}", path.display()))?;
        self.written.push(path);
        Ok(())
    }
}

/// Shape of a frame stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamInfo {
    /// Frame size.
    pub surface: Surface,
    /// Frame rate.
    pub fps: Fps,
    /// Number of frames that will be pushed unless cancelled.
    pub total_frames: u64,
}

/// Ordered frame consumer, e.g. a video encoder collaborator.
pub trait FrameSink {
    /// Called once before the first frame.
    fn begin(&mut self, info: &StreamInfo) -> FieldcastResult<()>;
    /// Called once per output frame, in order.
    fn push_frame(&mut self, index: FrameIndex, frame: &FrameRGBA) -> FieldcastResult<()>;
    /// Called once after the last frame, also after cancellation.
    fn end(&mut self) -> FieldcastResult<()>;
}

/// Collects a frame stream in memory.
#[derive(Debug, Default)]
pub struct InMemorySink {
    /// Stream shape passed to `begin`.
    pub info: Option<StreamInfo>,
    /// Frames in push order.
    pub frames: Vec<(FrameIndex, FrameRGBA)>,
    /// Whether `end` was called.
    pub ended: bool,
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, info: &StreamInfo) -> FieldcastResult<()> {
        self.info = Some(*info);
        Ok(())
    }

    fn push_frame(&mut self, index: FrameIndex, frame: &FrameRGBA) -> FieldcastResult<()> {
        self.frames.push((index, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> FieldcastResult<()> {
        self.ended = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/sink.rs"]
mod tests;
