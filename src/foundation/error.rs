/// Convenience result type used across scenecraft.
pub type ScenecraftResult<T> = Result<T, ScenecraftError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum ScenecraftError {
    /// Invalid configuration: sizes, rates, time windows, missing resources, encoder state.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while building tween curves or animators.
    #[error("animation error: {0}")]
    Animation(String),

    /// Errors while rendering a frame.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Malformed input data (GIF without frames, missing timing, undecodable media).
    #[error("decode error: {0}")]
    Decode(String),

    /// Errors reported by an encoder sink.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScenecraftError {
    /// Build a [`ScenecraftError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ScenecraftError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`ScenecraftError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`ScenecraftError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`ScenecraftError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`ScenecraftError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
