//! Configuration primitives for Burrow tunnels.
//!
//! The centerpiece is [`Endpoint`], the host and port a tunnel peer is
//! reached at:
//!
//! - **Parsing**: `host:port` strings with IPv4, bracketed IPv6 or DNS name
//!   hosts, via [`FromStr`](std::str::FromStr)
//! - **Resolution**: DNS-backed, rate-limited to one attempt per minute per
//!   endpoint, with SRV service discovery when no port is given
//! - **Rendering**: [`Display`](std::fmt::Display) output that parses back
//!   to an equal endpoint
//!
//! # Parsing and rendering
//!
//! ```
//! use burrow_config::Endpoint;
//!
//! let peer: Endpoint = "vpn.example.com:51820".parse()?;
//! assert_eq!(peer.host(), "vpn.example.com");
//! assert_eq!(peer.port(), 51820);
//! assert_eq!(peer.to_string(), "vpn.example.com:51820");
//! # Ok::<(), burrow_config::ParseError>(())
//! ```
//!
//! # Resolution
//!
//! Name endpoints resolve through any [`DnsResolver`] implementation, such
//! as `burrow_dns::HickoryDnsResolver`:
//!
//! ```ignore
//! use burrow_config::Endpoint;
//! use burrow_dns::HickoryDnsResolver;
//!
//! let peer: Endpoint = "vpn.example.com:51820".parse()?;
//! let dns = HickoryDnsResolver::cloudflare()?;
//!
//! // Numeric host and port, or None if the name does not resolve.
//! if let Some(resolved) = peer.resolve(&dns).await {
//!     connect(resolved.socket_addr().unwrap());
//! }
//! ```
//!
//! A port of `0` is a request for SRV discovery: `resolve` queries
//! `_wg._udp.<host>` and takes the address and port the record advertises.
//!
//! # Features
//!
//! - `serde`: serialize and deserialize [`Endpoint`] as its string form

mod endpoint;
mod error;
mod resolve;

pub use endpoint::Endpoint;
pub use error::{LookupError, ParseError, ParseErrorKind};
pub use resolve::{DnsResolver, SrvRecord};
