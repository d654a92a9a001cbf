//! Error types and handling for quran-core operations.
//!
//! Every fallible operation in the crate returns [`Result<T>`]. Errors are
//! grouped into a few families:
//!
//! - **Input errors**: [`Error::InvalidAddress`], [`Error::InvalidQuery`].
//!   These are raised before any network call and are never retried.
//! - **Transport errors**: [`Error::Timeout`], [`Error::Network`]. These are
//!   transient and retried by the fetcher until its budget runs out.
//! - **Upstream errors**: [`Error::HttpError`], [`Error::InvalidResponse`].
//!   The upstream answered, but not with usable data. Surfaced immediately.
//! - **Local errors**: configuration, storage and serialization failures.
//!
//! The query façade is the translation boundary: transport and upstream
//! errors leaving [`crate::QuranClient`] are folded into
//! [`Error::Service`] carrying one of the [`ServiceFailure`] kinds, each with
//! a fixed user-facing message.
//!
//! ```rust
//! use quran_core::{Error, ServiceFailure};
//!
//! let err = Error::HttpError { status: 404 };
//! assert!(!err.is_recoverable());
//! assert_eq!(ServiceFailure::from_error(&err), ServiceFailure::NotFound);
//! ```

use thiserror::Error;

/// The main error type for quran-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A chapter, verse or global verse number is out of range.
    ///
    /// Programmer or input error. Raised by the verse index before any
    /// network call is made.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// A search query is too short to be sent upstream.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// A request exceeded its deadline.
    ///
    /// Retried by the fetcher according to its retry policy.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The upstream answered with a non-2xx HTTP status.
    ///
    /// Not retried: a well-formed error response is not transient.
    #[error("HTTP error: status {status}")]
    HttpError {
        /// HTTP status code returned by the upstream.
        status: u16,
    },

    /// The upstream answered 2xx but the body was not a successful envelope.
    ///
    /// Covers non-JSON bodies, envelopes whose `code` is not 200, envelopes
    /// without `data`, and payloads whose shape the normalizer rejects.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Transport-level failure (DNS, connection refused, reset, ...).
    ///
    /// Retried by the fetcher according to its retry policy.
    #[error("Network error: {0}")]
    Network(String),

    /// A fetch failure translated for display at the façade boundary.
    #[error("{}", .0.message())]
    Service(ServiceFailure),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local persisted state could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if let Some(status) = err.status() {
            Self::HttpError {
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl Error {
    /// Check if the error might go away if the same request is retried.
    ///
    /// Only deadline and transport failures qualify. HTTP error statuses,
    /// malformed envelopes and input errors are permanent for a given
    /// request.
    ///
    /// ```rust
    /// use quran_core::Error;
    ///
    /// assert!(Error::Timeout("deadline".into()).is_recoverable());
    /// assert!(Error::Network("reset".into()).is_recoverable());
    /// assert!(!Error::HttpError { status: 500 }.is_recoverable());
    /// assert!(!Error::InvalidAddress("0:1".into()).is_recoverable());
    /// ```
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Network(_))
    }

    /// Check if the error comes from validating caller input.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidAddress(_) | Self::InvalidQuery(_))
    }

    /// Get the error category as a stable string identifier for logging.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::InvalidAddress(_) => "invalid_address",
            Self::InvalidQuery(_) => "invalid_query",
            Self::Timeout(_) => "timeout",
            Self::HttpError { .. } => "http",
            Self::InvalidResponse(_) => "invalid_response",
            Self::Network(_) => "network",
            Self::Service(_) => "service",
            Self::Config(_) => "config",
            Self::Storage(_) => "storage",
            Self::Serialization(_) => "serialization",
            Self::Io(_) => "io",
        }
    }

    /// Fold a fetch failure into its user-facing form.
    ///
    /// Input errors and errors that are already [`Error::Service`] pass
    /// through unchanged.
    #[must_use]
    pub fn into_service(self) -> Self {
        if self.is_input_error() || matches!(self, Self::Service(_)) {
            return self;
        }
        Self::Service(ServiceFailure::from_error(&self))
    }
}

/// User-facing failure kinds produced by the query façade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceFailure {
    /// The upstream could not be reached.
    Network,
    /// The upstream did not answer in time.
    Timeout,
    /// The requested chapter or verse does not exist upstream.
    NotFound,
    /// Any other upstream or local failure.
    Server,
}

impl ServiceFailure {
    /// Classify an internal error.
    #[must_use]
    pub const fn from_error(err: &Error) -> Self {
        match err {
            Error::Network(_) => Self::Network,
            Error::Timeout(_) => Self::Timeout,
            Error::HttpError { status: 404 } => Self::NotFound,
            Error::Service(kind) => *kind,
            _ => Self::Server,
        }
    }

    /// Message suitable for a notification shown to the reader.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Network => {
                "Could not connect to the internet. Please check your connection."
            },
            Self::Timeout => "The request timed out. Please try again.",
            Self::NotFound => "The requested chapter or verse was not found.",
            Self::Server => "Could not retrieve data from the server. Please try again.",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
