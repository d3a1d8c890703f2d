/// Convenience result type used across fieldcast.
pub type FieldcastResult<T> = Result<T, FieldcastError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum FieldcastError {
    /// Invalid user-provided template, style or record data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Font metrics for a family are not available yet.
    ///
    /// This is a precondition signal rather than a data error: the caller should wait for the
    /// fonts to load and retry the whole batch instead of skipping the field.
    #[error("fonts unavailable: no face registered for family '{family}'")]
    FontsUnavailable {
        /// Requested family name.
        family: String,
    },

    /// Errors while decoding a background image.
    #[error("decode error: {0}")]
    Decode(String),

    /// Errors while rasterizing a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FieldcastError {
    /// Build a [`FieldcastError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FieldcastError::FontsUnavailable`] value.
    pub fn fonts_unavailable(family: impl Into<String>) -> Self {
        Self::FontsUnavailable {
            family: family.into(),
        }
    }

    /// Build a [`FieldcastError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`FieldcastError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`FieldcastError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether this error means "retry later" rather than "bad input".
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::FontsUnavailable { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
