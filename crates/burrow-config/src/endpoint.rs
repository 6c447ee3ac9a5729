//! Tunnel peer endpoints and their DNS-backed resolution.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use url::{Host, Url};

use crate::error::{ParseError, ParseErrorKind};
use crate::resolve::DnsResolver;

/// Characters that never occur in a host:port pair and are reserved for
/// URL syntax.
const FORBIDDEN_CHARACTERS: [char; 3] = ['/', '?', '#'];

/// Service label prepended to the host for SRV discovery.
const SRV_SERVICE: &str = "_wg._udp";

/// How long a resolution outcome, successful or not, is trusted before
/// `resolve` consults DNS again.
const STALENESS_WINDOW: Duration = Duration::from_secs(60);

const LOG_TARGET: &str = "burrow_config::endpoint";

/// An external endpoint (host and port) used to reach a tunnel peer.
///
/// The host and port never change after parsing. A name endpoint
/// additionally carries a resolution cache shared between clones, so clones
/// resolve cooperatively; the cache takes no part in equality, hashing or
/// display.
///
/// Port `0` on a name endpoint is not a wildcard: it asks [`resolve`] to
/// discover both the address and the real port from a DNS SRV record.
///
/// # Examples
///
/// ```
/// use burrow_config::Endpoint;
///
/// let endpoint: Endpoint = "[2607:f8b0::93]:51820".parse()?;
/// assert!(endpoint.is_numeric());
/// assert_eq!(endpoint.to_string(), "[2607:f8b0::93]:51820");
///
/// let endpoint: Endpoint = "vpn.example.com:51820".parse()?;
/// assert!(!endpoint.is_numeric());
/// # Ok::<(), burrow_config::ParseError>(())
/// ```
///
/// [`resolve`]: Endpoint::resolve
#[derive(Debug, Clone)]
pub struct Endpoint {
    host: String,
    port: u16,
    /// `Some` exactly when `host` is a DNS name. Literal addresses have
    /// nothing to resolve and carry no cache.
    cache: Option<Arc<Mutex<ResolutionCache>>>,
}

#[derive(Debug, Default)]
struct ResolutionCache {
    /// `None` until the first resolution attempt finishes. Set on failed
    /// attempts too, so a dead name is retried at the same cadence as a
    /// live one is refreshed.
    last_attempt: Option<Instant>,
    resolved: Option<Endpoint>,
}

impl Endpoint {
    fn numeric(address: IpAddr, port: u16) -> Self {
        Self {
            host: address.to_string(),
            port,
            cache: None,
        }
    }

    fn named(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            cache: Some(Arc::new(Mutex::new(ResolutionCache::default()))),
        }
    }

    /// The host as parsed: a DNS name, or the canonical text of an IP
    /// literal.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The port, `0` meaning "discover via SRV".
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether the host is an IP literal rather than a DNS name.
    pub fn is_numeric(&self) -> bool {
        self.cache.is_none()
    }

    /// The endpoint as a socket address, if the host is an IP literal.
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        let ip: IpAddr = self.host.parse().ok()?;
        Some(SocketAddr::new(ip, self.port))
    }

    /// Resolve this endpoint to a numeric one, consulting `dns` as needed.
    ///
    /// A numeric endpoint resolves to itself without locking or I/O. A name
    /// endpoint consults its cache first: lookups run at most once per
    /// minute, and both successes and failures are held for the full window.
    /// The window is a deliberately coarse trade-off. Record TTLs are not
    /// consulted and there is no way to force an earlier refresh.
    ///
    /// Without an explicit port (port `0`), resolution queries SRV records
    /// for `_wg._udp.<host>` and takes the first record's target and port;
    /// with a port, it looks the host up directly, preferring an IPv4
    /// answer, and keeps the configured port.
    ///
    /// Lookups run while holding the endpoint's lock, so concurrent callers
    /// for the same endpoint serialize: the second waits for the first and
    /// then reads the freshly written cache instead of re-resolving. Keep
    /// this off latency-sensitive tasks.
    ///
    /// Returns `None` when the attempt inside the current window produced no
    /// address, for any reason.
    pub async fn resolve(&self, dns: &impl DnsResolver) -> Option<Endpoint> {
        let cache = match &self.cache {
            None => return Some(self.clone()),
            Some(cache) => cache,
        };
        let mut cache = cache.lock().await;
        let stale = match cache.last_attempt {
            None => true,
            Some(at) => at.elapsed() > STALENESS_WINDOW,
        };
        if stale {
            cache.resolved = if self.port == 0 {
                self.discover_service(dns).await
            } else {
                self.lookup_direct(dns).await
            };
            cache.last_attempt = Some(Instant::now());
        }
        cache.resolved.clone()
    }

    /// SRV discovery: first usable record of `_wg._udp.<host>`, then the
    /// first address of that record's target, paired with the record's port.
    async fn discover_service(&self, dns: &impl DnsResolver) -> Option<Endpoint> {
        let domain = format!("{}.{}", SRV_SERVICE, self.host);
        tracing::info!(target: LOG_TARGET, "Looking up SRV record for {}", domain);
        let records = match dns.lookup_srv(&domain).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(target: LOG_TARGET, "SRV lookup for {} failed: {}", domain, e);
                return None;
            }
        };
        let record = match records.into_iter().next() {
            Some(record) => record,
            None => {
                tracing::warn!(target: LOG_TARGET, "No SRV record found for {}", domain);
                return None;
            }
        };
        tracing::info!(
            target: LOG_TARGET,
            "SRV record found for {}: target {}, port {}",
            domain,
            record.target,
            record.port
        );
        let addresses = match dns.lookup_ip(&record.target).await {
            Ok(addresses) => addresses,
            Err(e) => {
                tracing::warn!(
                    target: LOG_TARGET,
                    "Address lookup for {} failed: {}",
                    record.target,
                    e
                );
                return None;
            }
        };
        match addresses.into_iter().next() {
            Some(address) => {
                tracing::info!(
                    target: LOG_TARGET,
                    "Resolved {} to {}:{}",
                    self.host,
                    address,
                    record.port
                );
                Some(Endpoint::numeric(address, record.port))
            }
            None => {
                tracing::warn!(target: LOG_TARGET, "No address record found for {}", record.target);
                None
            }
        }
    }

    /// Direct address lookup, keeping the configured port. IPv4 answers are
    /// preferred to sidestep broken IPv6 NAT and DNS64 deployments.
    async fn lookup_direct(&self, dns: &impl DnsResolver) -> Option<Endpoint> {
        tracing::debug!(target: LOG_TARGET, "Looking up addresses for {}", self.host);
        let addresses = match dns.lookup_ip(&self.host).await {
            Ok(addresses) => addresses,
            Err(e) => {
                tracing::warn!(target: LOG_TARGET, "Address lookup for {} failed: {}", self.host, e);
                return None;
            }
        };
        let preferred = addresses
            .iter()
            .copied()
            .find(IpAddr::is_ipv4)
            .or_else(|| addresses.first().copied());
        match preferred {
            Some(address) => Some(Endpoint::numeric(address, self.port)),
            None => {
                tracing::warn!(target: LOG_TARGET, "No address record found for {}", self.host);
                None
            }
        }
    }
}

impl FromStr for Endpoint {
    type Err = ParseError;

    /// Parses forms like `192.0.2.1:51820`, `[2001:db8::1]:51820` and
    /// `vpn.example.com:51820`.
    ///
    /// The port is mandatory. `0` is accepted and selects SRV discovery at
    /// resolution time.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains(FORBIDDEN_CHARACTERS) {
            return Err(ParseError::new(s, ParseErrorKind::ForbiddenCharacters));
        }
        // Borrow the URL authority grammar (including bracketed IPv6 and
        // port range checks) by prefixing a synthetic scheme.
        let url = Url::parse(&format!("wg://{}", s))
            .map_err(|e| ParseError::new(s, ParseErrorKind::Syntax(e)))?;
        let port = match url.port() {
            Some(port) => port,
            None => return Err(ParseError::new(s, ParseErrorKind::MissingPort)),
        };
        match url.host() {
            Some(Host::Ipv4(address)) => Ok(Self::numeric(IpAddr::V4(address), port)),
            Some(Host::Ipv6(address)) => Ok(Self::numeric(IpAddr::V6(address), port)),
            // The synthetic scheme is not "special" to the URL parser, so
            // IPv4 literals still arrive here as opaque domain text.
            Some(Host::Domain(name)) if !name.is_empty() => match name.parse::<IpAddr>() {
                Ok(address) => Ok(Self::numeric(address, port)),
                Err(_) => Ok(Self::named(name, port)),
            },
            _ => Err(ParseError::new(s, ParseErrorKind::MissingHost)),
        }
    }
}

impl fmt::Display for Endpoint {
    /// Renders `host:port`, bracketing bare IPv6 literals so the port
    /// separator stays unambiguous. The output parses back to an equal
    /// endpoint.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_numeric() && self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Compares host and port only; resolution state is ignored.
impl PartialEq for Endpoint {
    fn eq(&self, other: &Self) -> bool {
        self.host == other.host && self.port == other.port
    }
}

impl Eq for Endpoint {}

/// Hashes host and port only, consistent with [`PartialEq`].
impl Hash for Endpoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.host.hash(state);
        self.port.hash(state);
    }
}

impl From<SocketAddr> for Endpoint {
    fn from(address: SocketAddr) -> Self {
        Self::numeric(address.ip(), address.port())
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Endpoint;

    impl Serialize for Endpoint {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_str(self)
        }
    }

    impl<'de> Deserialize<'de> for Endpoint {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let raw = String::deserialize(deserializer)?;
            raw.parse().map_err(D::Error::custom)
        }
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::Endpoint;

    #[test]
    fn test_json_round_trip() {
        let endpoint: Endpoint = "[2001:db8::1]:51820".parse().unwrap();
        let json = serde_json::to_string(&endpoint).unwrap();
        assert_eq!(json, "\"[2001:db8::1]:51820\"");
        let back: Endpoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, endpoint);
    }

    #[test]
    fn test_deserialize_rejects_invalid() {
        assert!(serde_json::from_str::<Endpoint>("\"no-port.example\"").is_err());
        assert!(serde_json::from_str::<Endpoint>("\"a/b:1\"").is_err());
    }
}
