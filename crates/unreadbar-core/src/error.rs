use thiserror::Error;

/// Everything that can stop unreadbar outright
///
/// Per-request failures during a report run never end up here; they go to
/// the run's `ErrorLog` and get rendered instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Missing token")]
    MissingToken,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
