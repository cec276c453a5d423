use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Image decode failed: {0}")]
    Decode(String),

    #[error("Image encode failed: {0}")]
    Encode(String),

    #[error("Fetch failed for {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: BridgeError,
    },

    #[error("Source {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Source {url} returned {size} bytes, below the {min} byte threshold")]
    ImplausiblePayload { url: String, size: usize, min: usize },

    #[error("Source {url} returned non-image content type {content_type}")]
    UnexpectedContentType { url: String, content_type: String },

    #[error("Artifact error: {0}")]
    Artifact(#[from] core_library::LibraryError),
}

pub type Result<T> = std::result::Result<T, MetadataError>;
