use thiserror::Error;

/// Library error type for room-preview operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration file parsed but describes an unusable scene.
    #[error("invalid scene configuration: {0}")]
    BadConfig(String),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML/serde configuration error.
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),

    /// Rendering/display error from the viewer.
    #[error("render error: {0}")]
    Render(anyhow::Error),
}
