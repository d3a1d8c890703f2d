use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::foundation::color::Color;
use crate::foundation::core::Surface;
use crate::foundation::error::{FieldcastError, FieldcastResult};
use crate::geometry::transform::{is_at_rest, settle};
use crate::model::field::{
    FieldBox, FieldStyle, FontStyle, FontWeight, ShadowStyle, StrokeStyle, TextAlign,
    TextDecoration, VerticalAlign,
};
use crate::model::record::Record;

const DEFAULT_BOX_X: f64 = 10.0;
const DEFAULT_BOX_WIDTH: f64 = 30.0;
const DEFAULT_BOX_HEIGHT: f64 = 10.0;
const DEFAULT_BOX_TOP: f64 = 10.0;
const DEFAULT_BOX_STEP: f64 = 12.0;
const DEFAULT_BOX_SPAN: f64 = 80.0;

fn default_reference_surface() -> Surface {
    Surface::new(800, 600)
}

/// Box placed for the `index`-th column: stacked downwards in steps, wrapping to the top.
pub fn default_box(index: usize) -> FieldBox {
    let y = DEFAULT_BOX_TOP + (index as f64 * DEFAULT_BOX_STEP) % DEFAULT_BOX_SPAN;
    FieldBox::new(DEFAULT_BOX_X, y, DEFAULT_BOX_WIDTH, DEFAULT_BOX_HEIGHT)
}

/// One edit from the style panel.
#[derive(Clone, Debug, PartialEq)]
pub enum StyleEdit {
    /// Replace the family.
    FontFamily(String),
    /// Replace the reference font size.
    FontSize(f64),
    /// Replace the weight.
    FontWeight(FontWeight),
    /// Replace the slant.
    FontStyle(FontStyle),
    /// Replace the fill color.
    Color(Color),
    /// Replace horizontal alignment.
    TextAlign(TextAlign),
    /// Replace vertical alignment.
    VerticalAlign(VerticalAlign),
    /// Replace the decoration.
    TextDecoration(TextDecoration),
    /// Replace the line-height multiplier.
    LineHeight(f64),
    /// Replace the outline settings.
    Stroke(StrokeStyle),
    /// Replace the shadow settings.
    Shadow(ShadowStyle),
}

impl StyleEdit {
    /// Apply this edit to `style`.
    pub fn apply(&self, style: &mut FieldStyle) {
        match self {
            Self::FontFamily(v) => style.font_family = v.clone(),
            Self::FontSize(v) => style.font_size = *v,
            Self::FontWeight(v) => style.font_weight = *v,
            Self::FontStyle(v) => style.font_style = *v,
            Self::Color(v) => style.color = *v,
            Self::TextAlign(v) => style.text_align = *v,
            Self::VerticalAlign(v) => style.vertical_align = *v,
            Self::TextDecoration(v) => style.text_decoration = *v,
            Self::LineHeight(v) => style.line_height = *v,
            Self::Stroke(v) => style.stroke = v.clone(),
            Self::Shadow(v) => style.shadow = v.clone(),
        }
    }
}

/// Editable field configuration: which columns exist and how each one is placed and styled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Column names in record order; fields are drawn in this order.
    #[serde(default)]
    pub columns: Vec<String>,
    /// Box per column.
    #[serde(default)]
    pub field_positions: BTreeMap<String, FieldBox>,
    /// Style per column.
    #[serde(default)]
    pub field_styles: BTreeMap<String, FieldStyle>,
    /// Resolution at which `fontSize` values were authored.
    #[serde(default = "default_reference_surface")]
    pub reference_surface: Surface,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            field_positions: BTreeMap::new(),
            field_styles: BTreeMap::new(),
            reference_surface: default_reference_surface(),
        }
    }
}

impl Template {
    /// Template with default boxes and styles for `columns`.
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut t = Self::default();
        for c in columns {
            t.add_column(c);
        }
        t
    }

    /// Append a column with a default box and style. Existing names are left untouched.
    pub fn add_column(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.columns.contains(&name) {
            return;
        }
        let index = self.columns.len();
        self.field_positions
            .entry(name.clone())
            .or_insert_with(|| default_box(index));
        self.field_styles.entry(name.clone()).or_default();
        self.columns.push(name);
    }

    /// Remove a column together with its box and style. Returns whether it existed.
    pub fn remove_column(&mut self, name: &str) -> bool {
        let before = self.columns.len();
        self.columns.retain(|c| c != name);
        self.field_positions.remove(name);
        self.field_styles.remove(name);
        self.columns.len() != before
    }

    /// Adopt a new column list, keeping configuration for surviving names.
    pub fn sync_columns<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut next: Vec<String> = Vec::new();
        for n in names {
            let n = n.into();
            if !next.contains(&n) {
                next.push(n);
            }
        }

        self.field_positions.retain(|k, _| next.contains(k));
        self.field_styles.retain(|k, _| next.contains(k));
        for (index, name) in next.iter().enumerate() {
            self.field_positions
                .entry(name.clone())
                .or_insert_with(|| default_box(index));
            self.field_styles.entry(name.clone()).or_default();
        }
        self.columns = next;
    }

    /// Box for a field.
    pub fn field_box(&self, name: &str) -> Option<&FieldBox> {
        self.field_positions.get(name)
    }

    /// Style for a field.
    pub fn field_style(&self, name: &str) -> Option<&FieldStyle> {
        self.field_styles.get(name)
    }

    /// Mutable style for a field.
    pub fn style_mut(&mut self, name: &str) -> Option<&mut FieldStyle> {
        self.field_styles.get_mut(name)
    }

    /// Replace the box of an existing column.
    pub fn set_box(&mut self, name: &str, b: FieldBox) -> FieldcastResult<()> {
        if !self.columns.iter().any(|c| c == name) {
            return Err(FieldcastError::validation(format!(
                "unknown column '{name}'"
            )));
        }
        self.field_positions.insert(name.to_string(), b);
        Ok(())
    }

    /// Apply one edit to every selected field that has a style.
    ///
    /// The edit is validated against every target first; on failure no style changes. Returns the
    /// number of styles updated.
    pub fn apply_style<'a, I>(&mut self, selection: I, edit: &StyleEdit) -> FieldcastResult<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut updated = Vec::new();
        for name in selection {
            let Some(style) = self.field_styles.get(name) else {
                continue;
            };
            let mut next = style.clone();
            edit.apply(&mut next);
            next.validate()?;
            updated.push((name.to_string(), next));
        }
        let count = updated.len();
        for (name, style) in updated {
            self.field_styles.insert(name, style);
        }
        Ok(count)
    }

    /// Check every box and style.
    pub fn validate(&self) -> FieldcastResult<()> {
        for (name, b) in &self.field_positions {
            b.validate()
                .map_err(|e| FieldcastError::validation(format!("field '{name}': {e}")))?;
        }
        for (name, s) in &self.field_styles {
            s.validate()
                .map_err(|e| FieldcastError::validation(format!("field '{name}': {e}")))?;
        }
        Ok(())
    }

    /// Settle every box that is not at rest against the reference surface; returns how many
    /// boxes changed.
    pub fn settle_boxes(&mut self) -> usize {
        let surface = self.reference_surface;
        let mut changed = 0;
        for (name, b) in self.field_positions.iter_mut() {
            if is_at_rest(b, surface) {
                continue;
            }
            let settled = settle(b, surface);
            tracing::debug!(field = %name, from = ?b, to = ?settled, "box settled");
            *b = settled;
            changed += 1;
        }
        changed
    }

    /// Immutable copy for a batch; later edits do not affect it.
    pub fn snapshot(&self) -> Arc<Template> {
        Arc::new(self.clone())
    }
}

/// Persisted project: a template plus its records.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Field configuration.
    #[serde(flatten)]
    pub template: Template,
    /// Rows to render.
    #[serde(default)]
    pub records: Vec<Record>,
}

impl Project {
    /// Parse a project from JSON.
    ///
    /// Invalid boxes and styles are rejected; boxes that are merely off-surface or carry an
    /// unnormalized rotation are settled against the reference surface.
    pub fn from_json(s: &str) -> FieldcastResult<Self> {
        let mut p: Self =
            serde_json::from_str(s).map_err(|e| FieldcastError::serde(e.to_string()))?;
        p.template.validate()?;
        p.template.settle_boxes();
        Ok(p)
    }

    /// Serialize as pretty JSON.
    pub fn to_json(&self) -> FieldcastResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| FieldcastError::serde(e.to_string()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/template.rs"]
mod tests;
