use thiserror::Error;

/// Errors raised while loading the grid or searching the catalog. All of them
/// end up as a status line on the page.
#[derive(Error, Debug)]
pub enum Error {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed: {status}")]
    Status { status: reqwest::StatusCode },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No files found in the zip archive")]
    EmptyArchive,

    #[error("No GeoJSON file found in the zip archive")]
    NoGeoJson,

    #[error("grid cell has no '{property}' property")]
    MissingCellId { property: String },
}

/// Map engine rejections. These mirror the errors MapLibre throws when a
/// source or layer is added twice or a missing layer is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("source '{0}' already exists")]
    DuplicateSource(String),

    #[error("layer '{0}' already exists")]
    DuplicateLayer(String),

    #[error("source '{0}' does not exist")]
    MissingSource(String),

    #[error("layer '{0}' does not exist")]
    MissingLayer(String),
}

pub type Result<T> = std::result::Result<T, Error>;
