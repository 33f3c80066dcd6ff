/// Convenience result type used across letterer.
pub type LettererResult<T> = Result<T, LettererError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Only malformed input and rendering failures halt a panel. A missing bubble or text that
/// does not fit are reported through flags on the result, never through this type.
#[derive(thiserror::Error, Debug)]
pub enum LettererError {
    /// Malformed or zero-dimension raster, or an otherwise unusable argument.
    #[error("input error: {0}")]
    Input(String),

    /// The font asset or its glyph set cannot render the requested text.
    #[error("render error: {0}")]
    Render(String),

    /// Configuration values out of range or unparsable.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LettererError {
    /// Build a [`LettererError::Input`] value.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Build a [`LettererError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`LettererError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
