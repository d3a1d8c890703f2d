//! fieldcast places record values into percentage-based text boxes over a background image and
//! renders them.
//!
//! The same layout feeds both outputs:
//!
//! - an interactive preview ([`PreviewAdapter`]) where boxes are dragged, resized and rotated
//! - the CPU renderer ([`render_record`]) used for batch stills ([`run_batch`]) and slideshow
//!   frames ([`render_slideshow`])
//!
//! Boxes live in percent of the surface, fonts are sized against the template's reference
//! resolution, so one template renders consistently at any output size.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Batch stills, slideshow frames and their sinks.
pub mod batch;
/// Box geometry and pointer interaction.
pub mod geometry;
/// Field boxes, styles, records and templates.
pub mod model;
/// Pointer-event glue for an interactive preview.
pub mod preview;
/// Render plans and the CPU rasterizer.
pub mod render;
/// Measurement, wrapping and alignment of text.
pub mod text;

pub use crate::foundation::color::Color;
pub use crate::foundation::core::{Affine, Fps, FrameIndex, Point, Rect, Surface, Vec2};
pub use crate::foundation::error::{FieldcastError, FieldcastResult};

pub use crate::batch::cancel::CancelToken;
pub use crate::batch::runner::{
    BackgroundSource, BatchJob, BatchOpts, BatchReport, EncodedBackgrounds, RecordStatus,
    SharedBackground, run_batch,
};
pub use crate::batch::sink::{
    FrameSink, InMemoryRecordSink, InMemorySink, PngDirSink, RecordSink, StreamInfo,
};
pub use crate::batch::slideshow::{SlideshowOpts, SlideshowReport, render_slideshow};
pub use crate::geometry::interaction::{Interaction, InteractionController};
pub use crate::geometry::transform::{Handle, PixelRect};
pub use crate::model::field::{FieldBox, FieldStyle};
pub use crate::model::record::{FieldValue, Record};
pub use crate::model::template::{Project, StyleEdit, Template};
pub use crate::preview::adapter::{Hit, HitTarget, PreviewAdapter};
pub use crate::render::cpu::CpuSurface;
pub use crate::render::frame::{BackgroundImage, FrameRGBA, RenderOpts, decode_background};
pub use crate::render::orchestrator::{render_record, render_record_with};
pub use crate::text::fonts::{FontBook, FontLibrary};
pub use crate::text::measure::{FontSpec, TextMeasure};
pub use crate::text::rich::{RichText, Span};

#[cfg(test)]
#[path = "../tests/unit/support/mod.rs"]
mod test_support;
