use thiserror::Error;

/// type alias for all operations in this crate that could fail with a [`BookishError`]
pub type Result<T> = std::result::Result<T, BookishError>;

/// The Error variants used by the catalog.
///
/// The first three variants are produced by request handlers and are turned into an error
/// envelope by the server. [`BookishError::Persistence`] is only ever logged, and
/// [`BookishError::Remote`] is what the client hands back for any non-2xx envelope.
#[derive(Error, Debug)]
pub enum BookishError {
    /// a requested entity or route does not exist
    #[error("{0}")]
    NotFound(String),

    /// login failures
    #[error("{0}")]
    Unauthorized(String),

    /// the request was understood but rejected, e.g. a duplicate username or a malformed body
    #[error("{0}")]
    BadRequest(String),

    /// the durable storage could not be read or written
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// a non-2xx envelope decoded by the client
    #[error("{message}")]
    Remote {
        /// status code of the envelope
        status: u16,
        /// server provided message, or a status derived one
        message: String,
    },

    /// variant for errors caused from file IO
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serde Error
    #[error(transparent)]
    Serde(#[from] serde_json::Error),

    /// errors raised by the sled storage engine
    #[error(transparent)]
    Sled(#[from] sled::Error),

    /// errors raised by the http client of the recommendation service
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl BookishError {
    /// the status code an error envelope carries for this error
    pub fn status(&self) -> u16 {
        match self {
            BookishError::NotFound(_) => 404,
            BookishError::Unauthorized(_) => 401,
            BookishError::BadRequest(_) => 400,
            BookishError::Remote { status, .. } => *status,
            _ => 500,
        }
    }
}
