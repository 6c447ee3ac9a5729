//! Error types for endpoint parsing and lookup backends.

use thiserror::Error;

/// Reason an endpoint string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// The input contains a character reserved for URL syntax
    /// (`/`, `?` or `#`).
    #[error("forbidden characters")]
    ForbiddenCharacters,
    /// The input does not split into a host and a port.
    #[error("{0}")]
    Syntax(url::ParseError),
    /// There is no host in front of the port separator.
    #[error("missing host")]
    MissingHost,
    /// There is no port after the host.
    #[error("missing port number")]
    MissingPort,
}

/// A rejected endpoint string, carrying the offending input and the reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid endpoint `{input}`: {kind}")]
pub struct ParseError {
    input: String,
    kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) fn new(input: impl Into<String>, kind: ParseErrorKind) -> Self {
        Self {
            input: input.into(),
            kind,
        }
    }

    /// The input that failed to parse.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Why the input was rejected.
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }
}

/// Failure reported by a [`DnsResolver`](crate::DnsResolver) lookup.
///
/// Endpoint resolution does not branch on the failure cause, so backends fold
/// their native errors into a message. The detail still reaches operators
/// through the log.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct LookupError(String);

impl LookupError {
    /// Wrap a backend failure message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
