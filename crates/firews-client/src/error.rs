//! Client error types

use firews_core::ServerError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    /// The socket could not be established. `code` is the OS error number.
    #[error("connection failed: {message}")]
    ConnectionFailed { message: String, code: Option<i32> },

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Raised before any I/O when a token cannot be generated
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    /// Server refused `registerNameSpace` or `auth`
    #[error("namespace error {code}: {reason}")]
    NameSpace { reason: String, code: i64 },

    #[error("protocol error: {0}")]
    Protocol(#[from] firews_core::Error),
}

impl ClientError {
    pub(crate) fn connection_failed(err: &std::io::Error) -> Self {
        ClientError::ConnectionFailed {
            message: err.to_string(),
            code: err.raw_os_error(),
        }
    }
}

impl From<ServerError> for ClientError {
    fn from(err: ServerError) -> Self {
        ClientError::NameSpace {
            reason: err.reason,
            code: err.code,
        }
    }
}
