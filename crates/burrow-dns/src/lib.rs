//! DNS backend for Burrow.
//!
//! [`HickoryDnsResolver`] implements the [`burrow_config::DnsResolver`]
//! lookup contract on top of [hickory-resolver], giving endpoint resolution
//! real SRV and address lookups with TTL-based answer caching.
//!
//! ```ignore
//! use burrow_config::Endpoint;
//! use burrow_dns::{DnsConfig, HickoryDnsResolver, IpStrategy};
//!
//! // System settings, a public preset, or full custom configuration.
//! let dns = HickoryDnsResolver::system()?;
//! let dns = HickoryDnsResolver::new(
//!     DnsConfig::cloudflare().ip_strategy(IpStrategy::Ipv4Only),
//! )?;
//!
//! let peer: Endpoint = "vpn.example.com:51820".parse()?;
//! if let Some(resolved) = peer.resolve(&dns).await {
//!     println!("Peer reachable at {}", resolved);
//! }
//! ```
//!
//! # Features
//!
//! - `doh`: adds DNS-over-HTTPS presets (Cloudflare, Google)
//!
//! [hickory-resolver]: https://github.com/hickory-dns/hickory-dns

mod config;
mod error;
mod resolver;

#[cfg(feature = "doh")]
pub use config::DohProvider;
pub use config::{DnsConfig, IpStrategy};
pub use error::{DnsError, Result};
pub use resolver::HickoryDnsResolver;
