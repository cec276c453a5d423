use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Storage error for {key}: {source}")]
    Storage {
        key: String,
        #[source]
        source: BridgeError,
    },

    #[error("Record update failed on {table}: {source}")]
    Record {
        table: String,
        #[source]
        source: BridgeError,
    },

    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, LibraryError>;
