/// Convenience result type used across pixelscene.
pub type SceneResult<T> = Result<T, SceneError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Decode and import failures are returned to callers. Structural and history replay failures
/// are mostly recovered internally (the offending entry is skipped and logged); the variants
/// exist so the helpers that detect them can report what went wrong.
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    /// Malformed font or image source.
    #[error("decode error: {0}")]
    Decode(String),

    /// Rejected tree mutation: cycles, unknown layer kinds, dangling ids.
    #[error("structural error: {0}")]
    Structural(String),

    /// A recorded change can no longer be replayed against the tree.
    #[error("history replay error: {0}")]
    HistoryReplay(String),

    /// Malformed or unsupported project container.
    #[error("import error: {0}")]
    Import(String),

    /// Invalid caller-provided parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SceneError {
    /// Build a [`SceneError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`SceneError::Structural`] value.
    pub fn structural(msg: impl Into<String>) -> Self {
        Self::Structural(msg.into())
    }

    /// Build a [`SceneError::HistoryReplay`] value.
    pub fn history_replay(msg: impl Into<String>) -> Self {
        Self::HistoryReplay(msg.into())
    }

    /// Build a [`SceneError::Import`] value.
    pub fn import(msg: impl Into<String>) -> Self {
        Self::Import(msg.into())
    }

    /// Build a [`SceneError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SceneError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
