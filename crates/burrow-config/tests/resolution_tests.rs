//! Endpoint resolution tests against a scripted DNS backend.

use std::net::IpAddr;
use std::sync::Mutex;
use std::time::Duration;

use burrow_config::{DnsResolver, Endpoint, LookupError, SrvRecord};

/// Scripted lookup backend that records every query it serves.
#[derive(Default)]
struct ScriptedDns {
    srv_answers: Vec<SrvRecord>,
    ip_answers: Vec<IpAddr>,
    srv_error: bool,
    ip_error: bool,
    /// Artificial lookup latency, to widen race windows.
    delay: Option<Duration>,
    srv_queries: Mutex<Vec<String>>,
    ip_queries: Mutex<Vec<String>>,
}

impl ScriptedDns {
    fn srv_query_count(&self) -> usize {
        self.srv_queries.lock().unwrap().len()
    }

    fn ip_query_count(&self) -> usize {
        self.ip_queries.lock().unwrap().len()
    }
}

impl DnsResolver for ScriptedDns {
    async fn lookup_srv(&self, domain: &str) -> Result<Vec<SrvRecord>, LookupError> {
        self.srv_queries.lock().unwrap().push(domain.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.srv_error {
            return Err(LookupError::new("scripted SRV failure"));
        }
        Ok(self.srv_answers.clone())
    }

    async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>, LookupError> {
        self.ip_queries.lock().unwrap().push(host.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.ip_error {
            return Err(LookupError::new("scripted lookup failure"));
        }
        Ok(self.ip_answers.clone())
    }
}

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

#[tokio::test]
async fn test_numeric_endpoint_skips_dns() {
    let dns = ScriptedDns::default();
    let endpoint: Endpoint = "192.0.2.1:51820".parse().unwrap();

    let resolved = endpoint.resolve(&dns).await;

    assert_eq!(resolved, Some(endpoint));
    assert_eq!(dns.srv_query_count(), 0);
    assert_eq!(dns.ip_query_count(), 0);
}

#[tokio::test]
async fn test_numeric_endpoint_with_port_zero_skips_discovery() {
    let dns = ScriptedDns::default();
    let endpoint: Endpoint = "[2001:db8::1]:0".parse().unwrap();

    let resolved = endpoint.resolve(&dns).await;

    assert_eq!(resolved, Some(endpoint));
    assert_eq!(dns.srv_query_count(), 0);
}

#[tokio::test]
async fn test_direct_lookup_prefers_ipv4() {
    let dns = ScriptedDns {
        ip_answers: vec![ip("2001:db8::1"), ip("192.0.2.7")],
        ..Default::default()
    };
    let endpoint: Endpoint = "vpn.example.com:51820".parse().unwrap();

    let resolved = endpoint.resolve(&dns).await.unwrap();

    assert!(resolved.is_numeric());
    assert_eq!(resolved.host(), "192.0.2.7");
    assert_eq!(resolved.port(), 51820);
    assert_eq!(*dns.ip_queries.lock().unwrap(), vec!["vpn.example.com"]);
}

#[tokio::test]
async fn test_direct_lookup_falls_back_to_first_address() {
    let dns = ScriptedDns {
        ip_answers: vec![ip("2001:db8::1"), ip("2001:db8::2")],
        ..Default::default()
    };
    let endpoint: Endpoint = "vpn.example.com:51820".parse().unwrap();

    let resolved = endpoint.resolve(&dns).await.unwrap();

    assert_eq!(resolved.to_string(), "[2001:db8::1]:51820");
}

#[tokio::test]
async fn test_direct_lookup_without_addresses_is_none() {
    let dns = ScriptedDns::default();
    let endpoint: Endpoint = "vpn.example.com:51820".parse().unwrap();

    assert_eq!(endpoint.resolve(&dns).await, None);
    assert_eq!(dns.ip_query_count(), 1);
}

#[tokio::test]
async fn test_port_zero_discovers_srv_service() {
    let dns = ScriptedDns {
        srv_answers: vec![SrvRecord {
            target: "node1.example.com".to_string(),
            port: 51821,
        }],
        ip_answers: vec![ip("203.0.113.5")],
        ..Default::default()
    };
    let endpoint: Endpoint = "example.com:0".parse().unwrap();

    let resolved = endpoint.resolve(&dns).await.unwrap();

    assert!(resolved.is_numeric());
    assert_eq!(resolved.host(), "203.0.113.5");
    assert_eq!(resolved.port(), 51821);
    assert_eq!(*dns.srv_queries.lock().unwrap(), vec!["_wg._udp.example.com"]);
    assert_eq!(*dns.ip_queries.lock().unwrap(), vec!["node1.example.com"]);
}

#[tokio::test]
async fn test_srv_discovery_commits_to_first_record() {
    let dns = ScriptedDns {
        srv_answers: vec![
            SrvRecord {
                target: "dead.example.com".to_string(),
                port: 1,
            },
            SrvRecord {
                target: "live.example.com".to_string(),
                port: 2,
            },
        ],
        // The chosen target has no addresses; later records must not be
        // tried anyway.
        ip_answers: Vec::new(),
        ..Default::default()
    };
    let endpoint: Endpoint = "example.com:0".parse().unwrap();

    let resolved = endpoint.resolve(&dns).await;

    assert_eq!(resolved, None);
    assert_eq!(*dns.ip_queries.lock().unwrap(), vec!["dead.example.com"]);
}

#[tokio::test]
async fn test_srv_discovery_takes_first_address() {
    let dns = ScriptedDns {
        srv_answers: vec![SrvRecord {
            target: "node1.example.com".to_string(),
            port: 51821,
        }],
        ip_answers: vec![ip("2001:db8::1"), ip("192.0.2.7")],
        ..Default::default()
    };
    let endpoint: Endpoint = "example.com:0".parse().unwrap();

    let resolved = endpoint.resolve(&dns).await.unwrap();

    // Unlike direct lookups, discovery takes the addresses as ordered.
    assert_eq!(resolved.to_string(), "[2001:db8::1]:51821");
}

#[tokio::test]
async fn test_srv_discovery_without_records_is_none() {
    let dns = ScriptedDns::default();
    let endpoint: Endpoint = "example.com:0".parse().unwrap();

    assert_eq!(endpoint.resolve(&dns).await, None);
    assert_eq!(dns.srv_query_count(), 1);
    assert_eq!(dns.ip_query_count(), 0);
}

#[tokio::test]
async fn test_lookup_errors_fold_to_none() {
    let dns = ScriptedDns {
        ip_error: true,
        ..Default::default()
    };
    let endpoint: Endpoint = "vpn.example.com:51820".parse().unwrap();
    assert_eq!(endpoint.resolve(&dns).await, None);

    let dns = ScriptedDns {
        srv_error: true,
        ..Default::default()
    };
    let endpoint: Endpoint = "example.com:0".parse().unwrap();
    assert_eq!(endpoint.resolve(&dns).await, None);
}

#[tokio::test]
async fn test_repeat_resolution_is_served_from_cache() {
    let dns = ScriptedDns {
        ip_answers: vec![ip("192.0.2.7")],
        ..Default::default()
    };
    let endpoint: Endpoint = "vpn.example.com:51820".parse().unwrap();

    let first = endpoint.resolve(&dns).await;
    let second = endpoint.resolve(&dns).await;

    assert_eq!(first, second);
    assert_eq!(dns.ip_query_count(), 1);
}

#[tokio::test]
async fn test_failed_resolution_is_cached_too() {
    let dns = ScriptedDns {
        ip_error: true,
        ..Default::default()
    };
    let endpoint: Endpoint = "vpn.example.com:51820".parse().unwrap();

    assert_eq!(endpoint.resolve(&dns).await, None);
    assert_eq!(endpoint.resolve(&dns).await, None);
    // The failure is held for the full window; no immediate retry.
    assert_eq!(dns.ip_query_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stale_cache_triggers_fresh_lookup() {
    let dns = ScriptedDns {
        ip_answers: vec![ip("192.0.2.7")],
        ..Default::default()
    };
    let endpoint: Endpoint = "vpn.example.com:51820".parse().unwrap();

    endpoint.resolve(&dns).await;
    tokio::time::advance(Duration::from_secs(59)).await;
    endpoint.resolve(&dns).await;
    assert_eq!(dns.ip_query_count(), 1, "Fresh cache must be served as is");

    tokio::time::advance(Duration::from_secs(2)).await;
    endpoint.resolve(&dns).await;
    assert_eq!(dns.ip_query_count(), 2, "Stale cache must be refreshed");
}

#[tokio::test(start_paused = true)]
async fn test_failure_is_retried_after_the_window() {
    let dns = ScriptedDns {
        ip_error: true,
        ..Default::default()
    };
    let endpoint: Endpoint = "vpn.example.com:51820".parse().unwrap();

    assert_eq!(endpoint.resolve(&dns).await, None);
    tokio::time::advance(Duration::from_secs(61)).await;
    assert_eq!(endpoint.resolve(&dns).await, None);

    assert_eq!(dns.ip_query_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_resolution_runs_one_lookup() {
    let dns = ScriptedDns {
        ip_answers: vec![ip("192.0.2.7")],
        delay: Some(Duration::from_millis(50)),
        ..Default::default()
    };
    let endpoint: Endpoint = "vpn.example.com:51820".parse().unwrap();

    let (first, second) = tokio::join!(endpoint.resolve(&dns), endpoint.resolve(&dns));

    assert!(first.is_some());
    assert_eq!(first, second);
    // The loser of the lock race reads the winner's result.
    assert_eq!(dns.ip_query_count(), 1);
}

#[tokio::test]
async fn test_clones_share_the_resolution_cache() {
    let dns = ScriptedDns {
        ip_answers: vec![ip("192.0.2.7")],
        ..Default::default()
    };
    let endpoint: Endpoint = "vpn.example.com:51820".parse().unwrap();
    let clone = endpoint.clone();

    let first = clone.resolve(&dns).await;
    let second = endpoint.resolve(&dns).await;

    assert_eq!(first, second);
    assert_eq!(dns.ip_query_count(), 1);
}

#[tokio::test]
async fn test_resolution_does_not_affect_equality() {
    let dns = ScriptedDns {
        ip_answers: vec![ip("192.0.2.7")],
        ..Default::default()
    };
    let resolved_once: Endpoint = "vpn.example.com:51820".parse().unwrap();
    let never_resolved: Endpoint = "vpn.example.com:51820".parse().unwrap();

    resolved_once.resolve(&dns).await;

    assert_eq!(resolved_once, never_resolved);
}
