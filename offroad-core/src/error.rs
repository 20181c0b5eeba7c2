use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    #[error("No features matched the selection criteria of leg '{leg}'")]
    NoMatch { leg: String },
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),
    #[error("Projection failed: {0}")]
    Projection(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
}
