use crate::foundation::error::FieldcastResult;
use crate::text::measure::{FontSpec, TextMeasure};

/// Greedy word wrap against a measured width.
///
/// Each line starts with one word; the next word is appended when `line + " " + word` still
/// fits in `max_width_px`, otherwise the line is committed and a new one starts with that word.
/// A word wider than `max_width_px` stays alone on its line (no hyphenation, no truncation).
///
/// `\n` is a hard break. Runs of whitespace collapse to one space, blank paragraphs produce empty
/// lines, and trailing newlines are ignored. Blank input yields no lines.
pub fn wrap_text<M: TextMeasure + ?Sized>(
    text: &str,
    max_width_px: f32,
    font: &FontSpec,
    measure: &mut M,
) -> FieldcastResult<Vec<String>> {
    let text = text.trim_end_matches(['\n', '\r']);
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut words = paragraph.split_whitespace();
        let Some(first) = words.next() else {
            lines.push(String::new());
            continue;
        };

        let mut current = first.to_string();
        for word in words {
            let candidate = format!("{current} {word}");
            let width = measure.measure(&candidate, font)?;
            if width > max_width_px && !current.is_empty() {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            } else {
                current = candidate;
            }
        }
        lines.push(current);
    }
    Ok(lines)
}

#[cfg(test)]
#[path = "../../tests/unit/text/wrap.rs"]
mod tests;
