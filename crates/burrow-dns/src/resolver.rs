//! DNS lookups through hickory-resolver.

use std::net::IpAddr;

use burrow_config::{DnsResolver, LookupError, SrvRecord};
use hickory_resolver::config::{NameServerConfig, ResolveHosts, ResolverConfig, ResolverOpts};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::xfer::Protocol;
use hickory_resolver::{Resolver, TokioResolver};

#[cfg(feature = "doh")]
use crate::config::DohProvider;
use crate::config::{DnsConfig, IpStrategy};
use crate::error::DnsError;

const LOG_TARGET: &str = "burrow_dns::resolver";

/// [`DnsResolver`] backend built on hickory's caching stub resolver.
///
/// Lookup results are cached internally according to record TTLs, capped by
/// the [`DnsConfig`] limits, so repeated lookups of stable names are cheap.
///
/// # Example
///
/// ```ignore
/// use burrow_config::Endpoint;
/// use burrow_dns::HickoryDnsResolver;
///
/// let dns = HickoryDnsResolver::system()?;
/// let peer: Endpoint = "vpn.example.com:51820".parse()?;
/// let resolved = peer.resolve(&dns).await;
/// ```
pub struct HickoryDnsResolver {
    resolver: TokioResolver,
}

impl HickoryDnsResolver {
    /// Create a resolver backend with the given configuration.
    pub fn new(config: DnsConfig) -> Result<Self, DnsError> {
        let resolver = build_resolver(&config)?;
        Ok(Self { resolver })
    }

    /// Create a resolver backend using system DNS settings.
    ///
    /// On Unix, this reads `/etc/resolv.conf`.
    pub fn system() -> Result<Self, DnsError> {
        Self::new(DnsConfig::system())
    }

    /// Create a resolver backend using Google's public DNS servers.
    pub fn google() -> Result<Self, DnsError> {
        Self::new(DnsConfig::google())
    }

    /// Create a resolver backend using Cloudflare's public DNS servers.
    pub fn cloudflare() -> Result<Self, DnsError> {
        Self::new(DnsConfig::cloudflare())
    }

    /// Clear the lookup cache, forcing subsequent lookups to query the
    /// nameservers again.
    pub fn clear_cache(&self) {
        self.resolver.clear_cache();
    }
}

impl DnsResolver for HickoryDnsResolver {
    async fn lookup_srv(&self, domain: &str) -> Result<Vec<SrvRecord>, LookupError> {
        let lookup = self
            .resolver
            .srv_lookup(domain)
            .await
            .map_err(|e| LookupError::new(e.to_string()))?;
        Ok(lookup
            .iter()
            .map(|record| SrvRecord {
                // Targets come back fully qualified; drop the root dot.
                target: record.target().to_utf8().trim_end_matches('.').to_string(),
                port: record.port(),
            })
            .collect())
    }

    async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>, LookupError> {
        let lookup = self
            .resolver
            .lookup_ip(host)
            .await
            .map_err(|e| LookupError::new(e.to_string()))?;
        Ok(lookup.iter().collect())
    }
}

/// Build the hickory resolver from our configuration.
fn build_resolver(config: &DnsConfig) -> Result<TokioResolver, DnsError> {
    #[cfg(feature = "doh")]
    if let Some(provider) = config.doh_provider {
        tracing::debug!(target: LOG_TARGET, "Using DNS-over-HTTPS provider {:?}", provider);
        let resolver_config = match provider {
            DohProvider::Cloudflare => ResolverConfig::cloudflare_https(),
            DohProvider::Google => ResolverConfig::google_https(),
        };
        return Ok(Resolver::builder_with_config(
            resolver_config,
            TokioConnectionProvider::default(),
        )
        .with_options(build_opts(config))
        .build());
    }

    if config.use_system_config {
        tracing::debug!(target: LOG_TARGET, "Using system resolver configuration");
        let builder =
            Resolver::builder_tokio().map_err(|e| DnsError::SystemConfig(e.to_string()))?;
        return Ok(builder.with_options(build_opts(config)).build());
    }

    if config.nameservers.is_empty() {
        return Err(DnsError::NoNameservers);
    }

    tracing::debug!(
        target: LOG_TARGET,
        "Using {} custom nameservers",
        config.nameservers.len()
    );
    let mut resolver_config = ResolverConfig::new();
    for addr in &config.nameservers {
        resolver_config.add_name_server(NameServerConfig::new(*addr, Protocol::Udp));
        resolver_config.add_name_server(NameServerConfig::new(*addr, Protocol::Tcp));
    }
    Ok(Resolver::builder_with_config(
        resolver_config,
        TokioConnectionProvider::default(),
    )
    .with_options(build_opts(config))
    .build())
}

/// Map our options onto hickory's.
fn build_opts(config: &DnsConfig) -> ResolverOpts {
    let mut opts = ResolverOpts::default();

    opts.cache_size = config.cache_size;
    opts.positive_max_ttl = Some(config.max_positive_ttl);
    opts.negative_max_ttl = Some(config.max_negative_ttl);

    opts.use_hosts_file = if config.use_hosts_file {
        ResolveHosts::Auto
    } else {
        ResolveHosts::Never
    };
    opts.attempts = config.attempts;
    opts.timeout = config.timeout;

    opts.ip_strategy = match config.ip_strategy {
        IpStrategy::Ipv4Only => hickory_resolver::config::LookupIpStrategy::Ipv4Only,
        IpStrategy::Ipv6Only => hickory_resolver::config::LookupIpStrategy::Ipv6Only,
        IpStrategy::Ipv4ThenIpv6 => hickory_resolver::config::LookupIpStrategy::Ipv4thenIpv6,
        IpStrategy::Ipv6ThenIpv4 => hickory_resolver::config::LookupIpStrategy::Ipv6thenIpv4,
        IpStrategy::Ipv4AndIpv6 => hickory_resolver::config::LookupIpStrategy::Ipv4AndIpv6,
    };

    opts
}
