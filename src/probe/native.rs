//! Native ICMP echo probe.
//!
//! Sends one ICMP echo request through a `surge-ping` socket and measures the
//! round-trip time. Needs either an unprivileged ICMP datagram socket or raw
//! socket access, which is why [`super::select_prober`] checks for it first.

use std::net::IpAddr;
use std::time::Duration;

use surge_ping::{Client, Config, ICMP, PingIdentifier, PingSequence};
use tokio::time::timeout;

use crate::probe::{Measurement, ProbeError, Prober};

/// ICMP echo probe backed by `surge-ping`.
pub struct NativeProber {
    v4: Client,
    v6: Option<Client>,
    timeout: Duration,
}

impl NativeProber {
    /// Create the ICMP clients.
    ///
    /// # Errors
    /// Returns `ProbeError::Construction` when an IPv4 ICMP socket cannot be
    /// opened (typically missing privileges). An unavailable IPv6 socket is
    /// tolerated; IPv6 targets then probe as unavailable.
    pub fn new(timeout: Duration) -> Result<Self, ProbeError> {
        let v4 = Client::new(&Config::default())
            .map_err(|e| ProbeError::Construction(format!("icmpv4 socket: {e}")))?;

        let v6 = match Client::new(&Config::builder().kind(ICMP::V6).build()) {
            Ok(c) => Some(c),
            Err(e) => {
                tracing::debug!(error = %e, "ICMPv6 socket unavailable");
                None
            }
        };

        Ok(Self { v4, v6, timeout })
    }

    fn client_for(&self, ip: IpAddr) -> Result<&Client, ProbeError> {
        match ip {
            IpAddr::V4(_) => Ok(&self.v4),
            IpAddr::V6(_) => self
                .v6
                .as_ref()
                .ok_or_else(|| ProbeError::Construction("icmpv6 socket unavailable".into())),
        }
    }
}

impl std::fmt::Debug for NativeProber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeProber")
            .field("ipv6", &self.v6.is_some())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Resolve hostname to IP address.
pub(crate) async fn resolve_host(host: &str) -> Result<IpAddr, std::io::Error> {
    // First, try to parse as an IP address directly
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }

    let addrs = tokio::net::lookup_host(format!("{host}:0")).await?;
    addrs
        .into_iter()
        .next()
        .map(|addr| addr.ip())
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses found"))
}

#[async_trait::async_trait]
impl Prober for NativeProber {
    fn name(&self) -> &'static str {
        "native"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn measure(&self, host: &str) -> Result<Measurement, ProbeError> {
        let ip = resolve_host(host)
            .await
            .map_err(|e| ProbeError::Construction(format!("resolve {host}: {e}")))?;

        let client = self.client_for(ip)?;
        let mut pinger = client.pinger(ip, PingIdentifier(rand::random())).await;
        pinger.timeout(self.timeout);

        match timeout(self.timeout, pinger.ping(PingSequence(0), &[])).await {
            Ok(Ok((_, rtt))) => Ok(Measurement::single(rtt.as_secs_f64() * 1000.0)),
            Ok(Err(e)) => {
                tracing::trace!(host = %host, error = %e, "Echo failed");
                Err(ProbeError::TimeoutOrLoss)
            }
            Err(_) => Err(ProbeError::TimeoutOrLoss),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_host_ipv4() {
        let ip = resolve_host("127.0.0.1").await.unwrap();
        assert_eq!(ip, IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)));
    }

    #[tokio::test]
    async fn test_resolve_host_ipv6() {
        let ip = resolve_host("::1").await.unwrap();
        assert_eq!(ip, IpAddr::V6(std::net::Ipv6Addr::LOCALHOST));
    }

    #[tokio::test]
    async fn test_resolve_host_invalid() {
        assert!(resolve_host("definitely not a host name").await.is_err());
    }
}
