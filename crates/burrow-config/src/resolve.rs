//! The lookup contract endpoint resolution depends on.

use std::net::IpAddr;

use crate::error::LookupError;

/// A single DNS service record, reduced to what resolution consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrvRecord {
    /// Hostname the service is reachable at.
    pub target: String,
    /// Port the service listens on.
    pub port: u16,
}

/// DNS lookups required by [`Endpoint::resolve`](crate::Endpoint::resolve).
///
/// Implementations decide the upstream servers and the transport; resolution
/// only cares about the answers. Failures are opaque: resolution folds every
/// error into an absent result and reports the detail through `tracing`, so
/// implementors should put anything diagnostic into the error message.
#[allow(async_fn_in_trait)]
pub trait DnsResolver {
    /// Look up SRV records for a service domain such as
    /// `_wg._udp.example.com`, in the order the backend returns them.
    async fn lookup_srv(&self, domain: &str) -> Result<Vec<SrvRecord>, LookupError>;

    /// Look up IPv4 and IPv6 addresses for a host name.
    async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>, LookupError>;
}
