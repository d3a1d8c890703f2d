//! Rendering: records are compiled into a [`plan::RecordPlan`] and drawn onto a
//! [`surface::DrawSurface`], by default the `vello_cpu` backed [`cpu::CpuSurface`].

/// Gaussian blur for shadows.
pub mod blur;
/// Premultiplied source-over compositing.
pub mod composite;
/// `vello_cpu` draw surface.
pub mod cpu;
/// Frames, backgrounds and render options.
pub mod frame;
/// Drawing a plan onto a surface.
pub mod orchestrator;
/// Backend-agnostic layout.
pub mod plan;
/// Drawing capability trait.
pub mod surface;
