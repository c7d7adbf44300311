//! Error types for FireWS

use thiserror::Error;

/// Result type alias for FireWS protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// FireWS protocol error types
#[derive(Error, Debug)]
pub enum Error {
    /// Underlying stream failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Stream reached EOF before a complete frame was read
    #[error("connection closed")]
    ConnectionClosed,

    /// Declared frame length exceeds the configured maximum
    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// JSON encoding error
    #[error("encode error: {0}")]
    EncodeError(String),

    /// JSON decoding error
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Algorithm name outside the supported set
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Token is not three decodable segments
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// Token header carries an empty `alg`
    #[error("token header has no algorithm")]
    MissingAlgorithm,

    /// Signature does not match the signing input
    #[error("signature verification failed")]
    SignatureMismatch,

    /// Key unusable for the requested algorithm
    #[error("invalid key: {0}")]
    InvalidKey(String),
}

impl Error {
    /// Map an io error raised mid-frame, folding EOF into `ConnectionClosed`
    pub(crate) fn from_read(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::UnexpectedEof => Error::ConnectionClosed,
            _ => Error::Io(e),
        }
    }
}
