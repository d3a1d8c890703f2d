//! Formatted text as a flat list of styled spans.
//!
//! Markup is never interpreted here: an external, narrowly scoped parser produces [`RichText`]
//! and this module only wraps and measures it.

use serde::{Deserialize, Serialize};

use crate::foundation::color::Color;
use crate::foundation::error::FieldcastResult;
use crate::text::measure::{FontSpec, TextMeasure};

/// Run of text sharing one set of inline overrides.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Span {
    /// Text content; may contain spaces and `\n`.
    pub text: String,
    /// Render with a bold face.
    pub bold: bool,
    /// Render with an italic face.
    pub italic: bool,
    /// Underline this run.
    pub underline: bool,
    /// Override the field's fill color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl Span {
    /// Unstyled span.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Bold span.
    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
            ..Self::default()
        }
    }

    fn style(&self) -> SpanStyle {
        SpanStyle {
            bold: self.bold,
            italic: self.italic,
            underline: self.underline,
            color: self.color,
        }
    }
}

/// Formatted text tree (one level deep: a sequence of spans).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RichText {
    /// Spans in reading order.
    pub spans: Vec<Span>,
}

impl RichText {
    /// Build from spans.
    pub fn new(spans: Vec<Span>) -> Self {
        Self { spans }
    }

    /// Concatenated text with formatting dropped.
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Inline overrides carried by a wrapped segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SpanStyle {
    /// Bold face.
    pub bold: bool,
    /// Italic face.
    pub italic: bool,
    /// Underlined.
    pub underline: bool,
    /// Fill color override.
    pub color: Option<Color>,
}

/// Contiguous same-style text on one wrapped line.
#[derive(Clone, Debug, PartialEq)]
pub struct RichSegment {
    /// Text, including inter-word spaces.
    pub text: String,
    /// Inline overrides.
    pub style: SpanStyle,
    /// Measured advance in pixels.
    pub width: f32,
}

/// One wrapped line of formatted text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RichLine {
    /// Segments in reading order.
    pub segments: Vec<RichSegment>,
    /// Sum of segment widths.
    pub width: f32,
}

impl RichLine {
    /// Concatenated segment text.
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

type Piece = (SpanStyle, String);

enum Token {
    Word(Vec<Piece>),
    Break,
}

/// Greedy wrap over styled words; same rules as [`crate::text::wrap::wrap_text`].
///
/// A word may cross span boundaries ("**Hel**lo" is one word). Line widths are the sum of the
/// per-segment measurements, each measured with `base` emphasized by the segment's overrides.
pub fn wrap_rich<M: TextMeasure + ?Sized>(
    rich: &RichText,
    max_width_px: f32,
    base: &FontSpec,
    measure: &mut M,
) -> FieldcastResult<Vec<RichLine>> {
    let mut tokens = tokenize(rich);
    while matches!(tokens.last(), Some(Token::Break)) {
        tokens.pop();
    }
    if !tokens.iter().any(|t| matches!(t, Token::Word(_))) {
        return Ok(Vec::new());
    }

    let mut lines = Vec::new();
    for paragraph in tokens.split(|t| matches!(t, Token::Break)) {
        let mut words = paragraph.iter().filter_map(|t| match t {
            Token::Word(pieces) => Some(pieces),
            Token::Break => None,
        });
        let Some(first) = words.next() else {
            lines.push(RichLine::default());
            continue;
        };

        let mut current: Vec<Piece> = Vec::new();
        append_pieces(&mut current, first);
        for word in words {
            let mut candidate = current.clone();
            let space_style = candidate.last().map(|(s, _)| *s).unwrap_or_default();
            append_piece(&mut candidate, space_style, " ");
            append_pieces(&mut candidate, word);

            let width = pieces_width(&candidate, base, measure)?;
            if width > max_width_px && !current.is_empty() {
                lines.push(finish_line(std::mem::take(&mut current), base, measure)?);
                append_pieces(&mut current, word);
            } else {
                current = candidate;
            }
        }
        lines.push(finish_line(current, base, measure)?);
    }
    Ok(lines)
}

fn tokenize(rich: &RichText) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word: Vec<Piece> = Vec::new();

    fn flush(word: &mut Vec<Piece>, tokens: &mut Vec<Token>) {
        if !word.is_empty() {
            tokens.push(Token::Word(std::mem::take(word)));
        }
    }

    for span in &rich.spans {
        let style = span.style();
        for ch in span.text.chars() {
            if ch == '\n' {
                flush(&mut word, &mut tokens);
                tokens.push(Token::Break);
            } else if ch.is_whitespace() {
                flush(&mut word, &mut tokens);
            } else {
                let mut buf = [0u8; 4];
                append_piece(&mut word, style, ch.encode_utf8(&mut buf));
            }
        }
    }
    flush(&mut word, &mut tokens);
    tokens
}

fn append_piece(pieces: &mut Vec<Piece>, style: SpanStyle, text: &str) {
    match pieces.last_mut() {
        Some((s, t)) if *s == style => t.push_str(text),
        _ => pieces.push((style, text.to_string())),
    }
}

fn append_pieces(pieces: &mut Vec<Piece>, more: &[Piece]) {
    for (style, text) in more {
        append_piece(pieces, *style, text);
    }
}

fn pieces_width<M: TextMeasure + ?Sized>(
    pieces: &[Piece],
    base: &FontSpec,
    measure: &mut M,
) -> FieldcastResult<f32> {
    let mut total = 0.0;
    for (style, text) in pieces {
        total += measure.measure(text, &base.emphasized(style.bold, style.italic))?;
    }
    Ok(total)
}

fn finish_line<M: TextMeasure + ?Sized>(
    pieces: Vec<Piece>,
    base: &FontSpec,
    measure: &mut M,
) -> FieldcastResult<RichLine> {
    let mut line = RichLine::default();
    for (style, text) in pieces {
        let width = measure.measure(&text, &base.emphasized(style.bold, style.italic))?;
        line.width += width;
        line.segments.push(RichSegment { text, style, width });
    }
    Ok(line)
}

#[cfg(test)]
#[path = "../../tests/unit/text/rich.rs"]
mod tests;
