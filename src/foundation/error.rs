/// Convenience result type used across facelapse.
pub type LapseResult<T> = Result<T, LapseError>;

/// Top-level error taxonomy used by the export pipeline.
///
/// `Frame` is the only recoverable variant: the orchestrator logs it and moves on to the next
/// photo. Everything else terminates the export.
#[derive(thiserror::Error, Debug)]
pub enum LapseError {
    /// Invalid configuration or caller-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// The encoder could not be opened, fed, or finalized.
    #[error("encode error: {0}")]
    Encode(String),

    /// A single frame could not be decoded or composited.
    #[error("frame error: {0}")]
    Frame(String),

    /// Every photo was skipped, so the encoder never received a frame.
    #[error("no frames were written to the encoder")]
    NoFramesWritten,

    /// The export was cancelled between frames.
    #[error("export cancelled")]
    Cancelled,

    /// Errors when serializing or deserializing manifests and configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LapseError {
    /// Build a [`LapseError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LapseError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`LapseError::Frame`] value.
    pub fn frame(msg: impl Into<String>) -> Self {
        Self::Frame(msg.into())
    }

    /// Build a [`LapseError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for failures that only cost the current frame.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Frame(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
