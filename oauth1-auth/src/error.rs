//! Error types for the `oauth1-auth` crate.
//!
//! Follows the same pattern as the rest of the workspace: a root Error struct
//! holding an error kind tree and an optional source for error chaining.
//!
//! Failures that are reported to the host application as the outcome of a
//! login attempt are carried as [`ErrorKind::Failure`] with a [`FailureKind`].
//! The transport never raises those directly: it reports a
//! [`TransportErrorKind`], and [`FailureKind::from`] maps one to the other.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for oauth1-auth crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in oauth1-auth.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    /// A login attempt failed. The kind is what the host gets to see.
    Failure(FailureKind),
    Session(SessionErrorKind),
    Http(HttpErrorKind),
    Config,
}

/// Terminal outcomes of a failed login attempt. None of them is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// An outbound call exceeded its deadline.
    Timeout,
    /// Transport-fatal error, 5xx from the provider, or a TLS/certificate failure.
    ServiceUnavailable,
    /// The callback arrived but the session holds no request token for the provider.
    SessionExpired,
    /// The provider rejected the consumer or token credentials.
    InvalidCredentials,
    /// The provider answered with something that could not be decoded.
    InvalidResponse,
}

impl FailureKind {
    /// Get the failure identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Timeout => "timeout",
            FailureKind::ServiceUnavailable => "service_unavailable",
            FailureKind::SessionExpired => "session_expired",
            FailureKind::InvalidCredentials => "invalid_credentials",
            FailureKind::InvalidResponse => "invalid_response",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from session store operations.
#[derive(Debug, PartialEq)]
pub enum SessionErrorKind {
    /// The stored value does not have the expected shape.
    Corrupt,
    Storage,
}

/// Errors from HTTP client construction.
#[derive(Debug, PartialEq)]
pub enum HttpErrorKind {
    BuilderFailed,
}

/// Classification the OAuth1 transport attaches to every failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    Tls,
    /// Connection failure or 5xx response.
    Fatal,
    /// 4xx response from a token endpoint, 401 from a resource.
    Unauthorized,
    /// Response body could not be parsed.
    Malformed,
}

/// Error returned by [`crate::oauth1::Client`] operations.
#[derive(Debug)]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub source: Box<dyn StdError + Send + Sync>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self {
            kind,
            source: source.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "transport error ({:?}): {}", self.kind, self.source)
    }
}

impl StdError for TransportError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.source.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<TransportErrorKind> for FailureKind {
    fn from(kind: TransportErrorKind) -> Self {
        match kind {
            TransportErrorKind::Timeout => FailureKind::Timeout,
            TransportErrorKind::Tls | TransportErrorKind::Fatal => FailureKind::ServiceUnavailable,
            TransportErrorKind::Unauthorized => FailureKind::InvalidCredentials,
            TransportErrorKind::Malformed => FailureKind::InvalidResponse,
        }
    }
}

impl Error {
    /// The login failure kind, if this error is one.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self.error_kind {
            ErrorKind::Failure(kind) => Some(kind),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Failure(kind) => write!(f, "Authentication failure: {}", kind),
            ErrorKind::Session(kind) => write!(f, "Session error: {:?}", kind),
            ErrorKind::Http(kind) => write!(f, "HTTP error: {:?}", kind),
            ErrorKind::Config => write!(f, "Configuration error"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// The original cause is kept as the source so the host can inspect it.
impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        Error {
            error_kind: ErrorKind::Failure(err.kind.into()),
            source: Some(err.source),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Http(HttpErrorKind::BuilderFailed),
        }
    }
}

/// Helper function to create login failures.
pub fn failure(kind: FailureKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Failure(kind),
    }
}

/// Helper function to create session errors.
pub fn session_error(kind: SessionErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Session(kind),
    }
}

/// Helper function to create configuration errors.
pub fn config_error(message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Config,
    }
}
