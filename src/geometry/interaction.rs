use crate::foundation::core::{Point, Surface};
use crate::geometry::transform::{self, Handle};
use crate::model::field::FieldBox;

/// Pointer-down state shared by every gesture.
#[derive(Clone, Debug, PartialEq)]
pub struct Gesture {
    /// Field being edited.
    pub field: String,
    /// Box as it was at pointer-down.
    pub snapshot: FieldBox,
    /// Pointer position at pointer-down, surface pixels.
    pub origin: Point,
}

/// Current pointer interaction.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Interaction {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Moving the box.
    Dragging(Gesture),
    /// Dragging one of the resize handles.
    Resizing {
        /// Handle being dragged.
        handle: Handle,
        /// Gesture state.
        gesture: Gesture,
    },
    /// Turning the box with the rotation knob.
    Rotating(Gesture),
}

impl Interaction {
    /// Gesture state unless idle.
    pub fn gesture(&self) -> Option<&Gesture> {
        match self {
            Interaction::Idle => None,
            Interaction::Dragging(g) | Interaction::Rotating(g) => Some(g),
            Interaction::Resizing { gesture, .. } => Some(gesture),
        }
    }
}

/// New box for the field under the pointer.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldUpdate {
    /// Field name.
    pub field: String,
    /// Box to display (or commit).
    pub field_box: FieldBox,
}

/// Interaction state machine over immutable pointer-down snapshots.
///
/// Every move recomputes the box from the snapshot and the total pointer offset, so rounding
/// never accumulates across events. Starting a gesture while another is active replaces it.
#[derive(Clone, Debug, Default)]
pub struct InteractionController {
    state: Interaction,
    surface: Surface,
}

impl InteractionController {
    /// Idle controller for a preview of `surface` pixels.
    pub fn new(surface: Surface) -> Self {
        Self {
            state: Interaction::Idle,
            surface,
        }
    }

    /// Current state.
    pub fn state(&self) -> &Interaction {
        &self.state
    }

    /// Whether a gesture is in progress.
    pub fn is_active(&self) -> bool {
        !matches!(self.state, Interaction::Idle)
    }

    /// Preview surface.
    pub fn surface(&self) -> Surface {
        self.surface
    }

    /// Update the preview size (e.g. after a layout pass).
    pub fn set_surface(&mut self, surface: Surface) {
        self.surface = surface;
    }

    /// Start moving `field`.
    pub fn begin_drag(&mut self, field: impl Into<String>, snapshot: FieldBox, origin: Point) {
        self.state = Interaction::Dragging(Gesture {
            field: field.into(),
            snapshot,
            origin,
        });
    }

    /// Start resizing `field` from `handle`.
    pub fn begin_resize(
        &mut self,
        field: impl Into<String>,
        snapshot: FieldBox,
        handle: Handle,
        origin: Point,
    ) {
        self.state = Interaction::Resizing {
            handle,
            gesture: Gesture {
                field: field.into(),
                snapshot,
                origin,
            },
        };
    }

    /// Start rotating `field`.
    pub fn begin_rotate(&mut self, field: impl Into<String>, snapshot: FieldBox, origin: Point) {
        self.state = Interaction::Rotating(Gesture {
            field: field.into(),
            snapshot,
            origin,
        });
    }

    /// Box for the pointer at `p`; `None` when idle.
    pub fn pointer_move(&self, p: Point) -> Option<FieldUpdate> {
        let surface = self.surface;
        let (gesture, field_box) = match &self.state {
            Interaction::Idle => return None,
            Interaction::Dragging(g) => {
                let (dx, dy) = pct_delta(g, p, surface);
                (g, transform::apply_drag(&g.snapshot, dx, dy, surface))
            }
            Interaction::Resizing { handle, gesture } => {
                let (dx, dy) = pct_delta(gesture, p, surface);
                let b = transform::apply_resize(
                    &gesture.snapshot,
                    dx,
                    dy,
                    *handle,
                    gesture.snapshot.rotation,
                    surface,
                );
                (gesture, b)
            }
            Interaction::Rotating(g) => {
                let center = transform::to_pixels(&g.snapshot, surface).center;
                let a0 = (g.origin - center).atan2();
                let a1 = (p - center).atan2();
                let delta = (a1 - a0).to_degrees();
                let b = FieldBox {
                    rotation: transform::rotate(g.snapshot.rotation, delta),
                    ..g.snapshot
                };
                (g, b)
            }
        };
        Some(FieldUpdate {
            field: gesture.field.clone(),
            field_box,
        })
    }

    /// Finish the gesture at `p`, returning the settled box to commit.
    pub fn pointer_up(&mut self, p: Point) -> Option<FieldUpdate> {
        let update = self.pointer_move(p);
        self.state = Interaction::Idle;
        update.map(|u| FieldUpdate {
            field_box: transform::settle(&u.field_box, self.surface),
            field: u.field,
        })
    }

    /// Abort the gesture, returning the pointer-down snapshot to restore.
    pub fn cancel(&mut self) -> Option<FieldUpdate> {
        let state = std::mem::take(&mut self.state);
        state.gesture().map(|g| FieldUpdate {
            field: g.field.clone(),
            field_box: g.snapshot,
        })
    }
}

fn pct_delta(g: &Gesture, p: Point, surface: Surface) -> (f64, f64) {
    (
        surface.px_to_pct_x(p.x - g.origin.x),
        surface.px_to_pct_y(p.y - g.origin.y),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/interaction.rs"]
mod tests;
