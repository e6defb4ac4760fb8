//! Localhost reachability probing
//!
//! Services the operator runs natively are only routed when a TCP connect to
//! their port succeeds. The gateway reaches them through the container bridge
//! host, which is detected here as well.

pub mod ports;

use std::time::Duration;

use async_trait::async_trait;
use config::{DOCKER_BRIDGE_GATEWAY, DOCKER_HOST_ALIAS};
use tokio::net::{lookup_host, TcpStream};

pub use ports::{ProbeError, ProbeResult, ReachabilityProber};

#[cfg(any(test, feature = "test-mocks"))]
pub use ports::MockReachabilityProber;

/// Probes by opening (and immediately dropping) a TCP connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProber;

impl TcpProber {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReachabilityProber for TcpProber {
    async fn probe(&self, host: &str, port: u16, timeout: Duration) -> Result<bool, ProbeError> {
        if port == 0 {
            return Err(ProbeError::InvalidPort {
                host: host.to_string(),
            });
        }

        let reachable = match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await
        {
            Ok(Ok(_stream)) => true,
            Ok(Err(e)) => {
                tracing::debug!(host = %host, port, error = %e, "Probe connection failed");
                false
            }
            Err(_) => {
                tracing::debug!(
                    host = %host,
                    port,
                    timeout_ms = timeout.as_millis() as u64,
                    "Probe timed out"
                );
                false
            }
        };

        Ok(reachable)
    }
}

/// Host the gateway container uses to reach the operator's machine.
///
/// An explicit override wins. Otherwise `host.docker.internal` is used when it
/// resolves (always the case on Docker Desktop), falling back to the default
/// bridge gateway on Linux engines.
pub async fn detect_bridge_host(override_host: Option<&str>) -> String {
    if let Some(host) = override_host {
        tracing::debug!(bridge_host = %host, "Using configured bridge host");
        return host.to_string();
    }

    if !cfg!(target_os = "linux") {
        return DOCKER_HOST_ALIAS.to_string();
    }

    let lookup = tokio::time::timeout(
        Duration::from_secs(1),
        lookup_host((DOCKER_HOST_ALIAS, 80)),
    )
    .await;

    let host = match lookup {
        Ok(Ok(mut addrs)) => {
            if addrs.next().is_some() {
                DOCKER_HOST_ALIAS
            } else {
                DOCKER_BRIDGE_GATEWAY
            }
        }
        _ => DOCKER_BRIDGE_GATEWAY,
    };
    tracing::debug!(bridge_host = %host, "Detected bridge host");
    host.to_string()
}
