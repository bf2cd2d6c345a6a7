/// Convenience result type used across snapframe.
pub type SnapResult<T> = Result<T, SnapError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Most variants degrade a single image or operation; see [`SnapError::is_recoverable`].
/// Two failure classes are not errors and are reported as outcome values instead:
/// an empty decoration candidate set, and async results that arrive after a newer request or
/// after the surface was disposed.
#[derive(thiserror::Error, Debug)]
pub enum SnapError {
    /// Image bytes could not be turned into a bitmap.
    #[error("decode error: {0}")]
    Decode(String),

    /// A zero-size or otherwise degenerate viewport/image rectangle.
    #[error("geometry error: {0}")]
    Geometry(String),

    /// Invalid user-provided data or an operation that is not valid in the current state.
    #[error("validation error: {0}")]
    Validation(String),

    /// The caption service (or another external collaborator) failed.
    #[error("collaborator error: {0}")]
    Collaborator(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SnapError {
    /// Build a [`SnapError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`SnapError::Geometry`] value.
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    /// Build a [`SnapError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SnapError::Collaborator`] value.
    pub fn collaborator(msg: impl Into<String>) -> Self {
        Self::Collaborator(msg.into())
    }

    /// Build a [`SnapError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether the failure only affects the current image/operation and the caller may go on.
    ///
    /// IO and other wrapped dependency failures are not.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<serde_json::Error> for SnapError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
