//! Glue between pointer events on a preview and the geometry/layout core.
//!
//! Pointer moves only touch geometry. Text layout happens in [`PreviewAdapter::nodes`], which
//! reuses the render plan so the preview shows the same lines the rasterizer draws.

use std::sync::Arc;

use crate::foundation::core::{Point, Surface, Vec2};
use crate::foundation::error::FieldcastResult;
use crate::geometry::interaction::{FieldUpdate, InteractionController};
use crate::geometry::transform::{self, Handle, PixelRect};
use crate::model::record::Record;
use crate::model::template::{StyleEdit, Template};
use crate::render::plan::{FieldPlan, compile_record};
use crate::text::measure::TextMeasure;

/// Pick radius around each resize handle, in preview pixels.
pub const HANDLE_HIT_RADIUS_PX: f64 = 8.0;
/// Distance of the rotation knob above the box's top edge (box-local up).
pub const ROTATE_KNOB_OFFSET_PX: f64 = 24.0;
/// Pick radius of the rotation knob.
pub const ROTATE_KNOB_RADIUS_PX: f64 = 8.0;

/// Part of a field under the pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitTarget {
    /// Inside the box.
    Body,
    /// On a resize handle.
    Handle(Handle),
    /// On the rotation knob.
    RotateKnob,
}

/// Result of [`PreviewAdapter::hit_test`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hit {
    /// Field name.
    pub field: String,
    /// What was hit.
    pub target: HitTarget,
}

/// Geometry-only view of a field, cheap enough to rebuild on every pointer move.
#[derive(Clone, Debug, PartialEq)]
pub struct BoxNode {
    /// Field name.
    pub field: String,
    /// Box in preview pixels.
    pub rect: PixelRect,
    /// Part of the selection.
    pub selected: bool,
    /// Currently being dragged, resized or rotated.
    pub active: bool,
}

/// Declarative node for one field: the shared render plan plus editor state.
#[derive(Clone, Debug, PartialEq)]
pub struct PreviewNode {
    /// Layout, identical to what the rasterizer receives for the same surface.
    pub plan: FieldPlan,
    /// Part of the selection.
    pub selected: bool,
}

/// Editor-side state for one preview: live template, gesture and selection.
#[derive(Clone, Debug)]
pub struct PreviewAdapter {
    template: Template,
    controller: InteractionController,
    selection: Vec<String>,
}

impl PreviewAdapter {
    /// Adapter for a preview of `surface` pixels.
    pub fn new(template: Template, surface: Surface) -> Self {
        Self {
            template,
            controller: InteractionController::new(surface),
            selection: Vec::new(),
        }
    }

    /// Live template, including the box of an in-progress gesture.
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Give the template back.
    pub fn into_template(self) -> Template {
        self.template
    }

    /// Preview size.
    pub fn surface(&self) -> Surface {
        self.controller.surface()
    }

    /// Update the preview size.
    pub fn set_surface(&mut self, surface: Surface) {
        self.controller.set_surface(surface);
    }

    /// The gesture state machine.
    pub fn interaction(&self) -> &InteractionController {
        &self.controller
    }

    /// Selected field names, in selection order.
    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    /// Replace the selection with `field`, or clear it.
    pub fn select(&mut self, field: Option<&str>) {
        self.selection.clear();
        if let Some(f) = field
            && self.template.field_box(f).is_some()
        {
            self.selection.push(f.to_string());
        }
    }

    /// Add `field` to the selection, or remove it if already selected.
    pub fn toggle_select(&mut self, field: &str) {
        if let Some(i) = self.selection.iter().position(|s| s == field) {
            self.selection.remove(i);
        } else if self.template.field_box(field).is_some() {
            self.selection.push(field.to_string());
        }
    }

    /// Adopt a new column list, dropping selection and gestures of removed columns.
    pub fn sync_columns<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.template.sync_columns(names);
        let template = &self.template;
        self.selection.retain(|s| template.field_box(s).is_some());
        let dropped = self
            .controller
            .state()
            .gesture()
            .is_some_and(|g| template.field_box(&g.field).is_none());
        if dropped {
            self.controller.cancel();
        }
    }

    /// Topmost field part under `p`.
    ///
    /// Handles and the knob of selected fields win over bodies; among bodies the field drawn
    /// last (latest column) wins.
    pub fn hit_test(&self, p: Point) -> Option<Hit> {
        let surface = self.surface();
        for name in self.selection.iter().rev() {
            let Some(b) = self.template.field_box(name).filter(|b| b.visible) else {
                continue;
            };
            let rect = transform::to_pixels(b, surface);
            if (rotate_knob_point(&rect) - p).hypot() <= ROTATE_KNOB_RADIUS_PX {
                return Some(Hit {
                    field: name.clone(),
                    target: HitTarget::RotateKnob,
                });
            }
            let handle = Handle::ALL.into_iter().find(|h| {
                (transform::handle_point(b, *h, surface) - p).hypot() <= HANDLE_HIT_RADIUS_PX
            });
            if let Some(h) = handle {
                return Some(Hit {
                    field: name.clone(),
                    target: HitTarget::Handle(h),
                });
            }
        }

        self.template.columns.iter().rev().find_map(|name| {
            let b = self.template.field_box(name).filter(|b| b.visible)?;
            transform::to_pixels(b, surface)
                .contains(p, 0.0)
                .then(|| Hit {
                    field: name.clone(),
                    target: HitTarget::Body,
                })
        })
    }

    /// Start a gesture at `p`. A miss clears the selection.
    pub fn pointer_down(&mut self, p: Point) -> Option<Hit> {
        let Some(hit) = self.hit_test(p) else {
            self.selection.clear();
            return None;
        };
        let snapshot = *self.template.field_box(&hit.field)?;
        if !self.selection.contains(&hit.field) {
            self.select(Some(&hit.field));
        }
        match hit.target {
            HitTarget::Body => self.controller.begin_drag(&hit.field, snapshot, p),
            HitTarget::Handle(h) => self.controller.begin_resize(&hit.field, snapshot, h, p),
            HitTarget::RotateKnob => self.controller.begin_rotate(&hit.field, snapshot, p),
        }
        Some(hit)
    }

    /// Track the pointer; the live template shows the new box.
    pub fn pointer_move(&mut self, p: Point) -> FieldcastResult<Option<FieldUpdate>> {
        let Some(update) = self.controller.pointer_move(p) else {
            return Ok(None);
        };
        self.template.set_box(&update.field, update.field_box)?;
        Ok(Some(update))
    }

    /// End the gesture and commit the settled box.
    pub fn pointer_up(&mut self, p: Point) -> FieldcastResult<Option<FieldUpdate>> {
        let Some(update) = self.controller.pointer_up(p) else {
            return Ok(None);
        };
        self.template.set_box(&update.field, update.field_box)?;
        tracing::debug!(field = %update.field, "gesture committed");
        Ok(Some(update))
    }

    /// Abort the gesture and restore the pointer-down box.
    pub fn cancel(&mut self) -> FieldcastResult<Option<FieldUpdate>> {
        let Some(update) = self.controller.cancel() else {
            return Ok(None);
        };
        self.template.set_box(&update.field, update.field_box)?;
        Ok(Some(update))
    }

    /// Apply `edit` to every selected field at once.
    pub fn apply_style(&mut self, edit: &StyleEdit) -> FieldcastResult<usize> {
        let selection = &self.selection;
        self.template
            .apply_style(selection.iter().map(String::as_str), edit)
    }

    /// Box geometry for every visible field, in draw order.
    pub fn boxes(&self) -> Vec<BoxNode> {
        let surface = self.surface();
        let active = self.controller.state().gesture().map(|g| g.field.as_str());
        self.template
            .columns
            .iter()
            .filter_map(|name| {
                let b = self.template.field_box(name).filter(|b| b.visible)?;
                Some(BoxNode {
                    field: name.clone(),
                    rect: transform::to_pixels(b, surface),
                    selected: self.selection.contains(name),
                    active: active == Some(name.as_str()),
                })
            })
            .collect()
    }

    /// Text nodes for `record`, laid out exactly as the renderer would at the preview size.
    pub fn nodes<M: TextMeasure + ?Sized>(
        &self,
        record: &Record,
        measure: &mut M,
    ) -> FieldcastResult<Vec<PreviewNode>> {
        let plan = compile_record(&self.template, record, self.surface(), measure)?;
        Ok(plan
            .fields
            .into_iter()
            .map(|f| PreviewNode {
                selected: self.selection.contains(&f.name),
                plan: f,
            })
            .collect())
    }

    /// Immutable copy of the template for a batch.
    pub fn snapshot(&self) -> Arc<Template> {
        self.template.snapshot()
    }
}

/// Screen position of the rotation knob: above the top edge in the box's own frame.
pub fn rotate_knob_point(rect: &PixelRect) -> Point {
    rect.local_to_screen(Vec2::new(0.0, -rect.height / 2.0 - ROTATE_KNOB_OFFSET_PX))
}

#[cfg(test)]
#[path = "../../tests/unit/preview/adapter.rs"]
mod tests;
