use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the billiard engine and its scene/config collaborators.
///
/// Construction-time problems (bad masses, degenerate segments, empty
/// walls) surface here instead of corrupting later divisions. A running
/// step has no transient failure modes.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid user or API parameter.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// A scene text record could not be parsed.
    #[error("scene line {line}: {msg}")]
    Scene {
        /// 1-based line number in the scene text.
        line: usize,
        /// What went wrong on that line.
        msg: String,
    },

    /// A diagnostic found values it cannot work with (NaN/inf, empty selection).
    #[error("diagnostic error: {0}")]
    Diagnostic(String),

    /// Propagated I/O errors (scene files, config files).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed YAML configuration.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}
