use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    /// The creator input could not be read or has the wrong shape
    #[error("Input error: {0}")]
    Input(String),

    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),
}

pub type Result<T> = std::result::Result<T, SyncError>;
