//! Error types for the DNS backend.

use thiserror::Error;

/// Errors constructing the resolver backend.
///
/// Lookup failures are not represented here: once a backend exists, lookups
/// report through [`burrow_config::LookupError`].
#[derive(Debug, Error)]
pub enum DnsError {
    /// A custom nameserver configuration carried an empty server list.
    #[error("no nameservers configured")]
    NoNameservers,
    /// The system resolver configuration could not be read.
    #[error("failed to read system resolver configuration: {0}")]
    SystemConfig(String),
}

/// A specialized `Result` type for DNS backend construction.
pub type Result<T> = std::result::Result<T, DnsError>;
