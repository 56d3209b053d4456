use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the service clients
#[derive(Debug, Error)]
pub enum Error {
    /// No source was given for an input role (`image` or `mask`)
    #[error("Either an in-memory {0} or a {0} path must be provided")]
    MissingInput(&'static str),

    #[error("RUNPOD_API_KEY is not set")]
    MissingCredential,

    /// Token contains characters not allowed in an HTTP header
    #[error("RUNPOD_API_KEY is not a valid header value")]
    InvalidCredential,

    #[error("Invalid endpoint id: {0:?}")]
    InvalidEndpoint(String),

    /// In-memory raster with no pixels
    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("No output image in the response")]
    EmptyResult,

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid url: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    pub fn decode<E: std::fmt::Display>(e: E) -> Self {
        Error::Decode(e.to_string())
    }

    /// Status code carried by an [`Error::Http`]
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::IoError(e) => Error::Io(e),
            e => Error::decode(e),
        }
    }
}

impl From<base64::DecodeError> for Error {
    fn from(e: base64::DecodeError) -> Self {
        Error::decode(e)
    }
}
