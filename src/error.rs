//! Error types for the renderer

use thiserror::Error;

/// Result type alias for renderer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring, loading or rendering a page
#[derive(Error, Debug)]
pub enum Error {
    /// Wrong number or shape of command-line arguments
    #[error("Invalid usage: {0}")]
    Usage(String),

    /// Invalid configuration derived from otherwise well-formed arguments
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Failed to launch the browser or create a page
    #[error("Engine initialization failed: {0}")]
    InitializationError(String),

    /// The address could not be handed to the engine at all
    #[error("Failed to load URL: {0}")]
    LoadError(String),

    /// Page load did not finish in time
    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    /// Failed to capture the page
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Failed to write the output file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CDP-specific error
    #[cfg(feature = "cdp")]
    #[error("CDP error: {0}")]
    CdpError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the error should be reported with the usage text
    pub fn is_usage(&self) -> bool {
        matches!(self, Error::Usage(_) | Error::ConfigError(_))
    }
}

#[cfg(feature = "cdp")]
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::CdpError(err.to_string())
    }
}
