use std::time::Duration;

use async_trait::async_trait;

#[cfg(any(test, feature = "test-mocks"))]
use mockall::automock;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProbeError {
    #[error("Port 0 cannot be probed on {host}")]
    InvalidPort { host: String },
}

/// Outcome of probing one localhost service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub host: String,
    pub port: u16,
    pub reachable: bool,
}

/// Decides whether something is listening on a host's TCP port.
///
/// Implementations never retry and keep no cache: every call is a fresh
/// attempt bounded by `timeout`. Refused, unresolvable and timed-out attempts
/// are all reported as `Ok(false)`.
#[cfg_attr(any(test, feature = "test-mocks"), automock)]
#[async_trait]
pub trait ReachabilityProber: Send + Sync {
    async fn probe(&self, host: &str, port: u16, timeout: Duration) -> Result<bool, ProbeError>;
}
