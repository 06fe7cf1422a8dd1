//! The error taxonomy shared by all rdfkb crates.
use std::error::Error as StdError;

/// Boxed cause, kept for diagnostic chaining.
pub type Cause = Box<dyn StdError + Send + Sync + 'static>;

/// Type alias for results produced by rdfkb.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error type produced by every rdfkb operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The operation is not supported by the backing kind of the store,
    /// or a format name was not recognized.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The query uses a SPARQL feature that the local engine does not evaluate.
    #[error("SPARQL feature not supported by the local engine: {0}")]
    Unsupported(String),

    /// Malformed RDF or SPARQL input.
    #[error("parse error: {message}")]
    Parse {
        /// What was being parsed
        message: String,
        /// The error raised by the underlying parser, if any
        #[source]
        source: Option<Cause>,
    },

    /// Failure while talking to a remote server.
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// An "exactly one expected" lookup matched nothing.
    #[error("no match for {0}")]
    NotFound(String),

    /// An "exactly one expected" lookup matched more than once.
    #[error("{count} matches for {what}, expected exactly one")]
    MultipleMatch {
        /// The lookup that was performed
        what: String,
        /// How many results it produced
        count: usize,
    },

    /// The disk backing of a store failed.
    #[error("storage error: {message}")]
    Storage {
        /// What the store was doing
        message: String,
        /// The error raised by the storage engine
        #[source]
        source: Cause,
    },

    /// A local file could not be read.
    #[error("i/o error on {path}: {source}")]
    Io {
        /// The file that was accessed
        path: String,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Build a [`Error::Parse`] without an underlying cause.
    pub fn parse<M: Into<String>>(message: M) -> Self {
        Error::Parse {
            message: message.into(),
            source: None,
        }
    }

    /// Build a [`Error::Parse`] keeping `source` as its cause.
    pub fn parse_with<M, E>(message: M, source: E) -> Self
    where
        M: Into<String>,
        E: StdError + Send + Sync + 'static,
    {
        Error::Parse {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Build a [`Error::Storage`] keeping `source` as its cause.
    pub fn storage<M, E>(message: M, source: E) -> Self
    where
        M: Into<String>,
        E: StdError + Send + Sync + 'static,
    {
        Error::Storage {
            message: message.into(),
            source: Box::new(source),
        }
    }

    /// Whether this error is a host-resolution failure.
    pub fn is_unknown_host(&self) -> bool {
        matches!(self, Error::Network(NetworkError::UnknownHost { .. }))
    }
}

/// Failures of HTTP exchanges (remote queries and imports).
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// The server answered with a status other than 200.
    #[error("{url} answered {code} {reason}")]
    Status {
        /// The requested URL
        url: String,
        /// The HTTP status code
        code: u16,
        /// The reason phrase of the status
        reason: String,
    },

    /// The host name of the URL could not be resolved.
    #[error("unknown host: {host}")]
    UnknownHost {
        /// The host name that failed to resolve
        host: String,
    },

    /// The connect or read timeout expired.
    #[error("timeout while requesting {url}")]
    Timeout {
        /// The requested URL
        url: String,
    },

    /// A redirection response carried no usable `Location` header.
    #[error("{url} redirected without a valid Location header")]
    Redirect {
        /// The requested URL
        url: String,
    },

    /// Any other transport failure.
    #[error("error while requesting {url}: {source}")]
    Transport {
        /// The requested URL
        url: String,
        /// The underlying error
        #[source]
        source: Cause,
    },
}
