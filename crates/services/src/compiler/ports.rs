use std::fmt;

use config::{ConfigError, ServiceId};
use domain::{KongDocument, RouteError};

use crate::{
    probe::{ProbeError, ProbeResult},
    writer::WriteError,
};

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Probe(#[from] ProbeError),
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error("Generated gateway document is invalid:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Why a catalogued service has no route in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Disabled,
    /// Served by a hosted API, nothing to proxy.
    HostedApi,
    /// Localhost mode, but nothing answered on the probed port.
    Unreachable { host: String, port: u16 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "disabled"),
            Self::HostedApi => write!(f, "served by a hosted API"),
            Self::Unreachable { host, port } => write!(f, "not reachable on {host}:{port}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedService {
    pub service: ServiceId,
    pub reason: SkipReason,
}

/// Result of one compiler run.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub document: KongDocument,
    /// Services without a route, in canonical order.
    pub skipped: Vec<SkippedService>,
    /// Every probe performed, in canonical order.
    pub probes: Vec<ProbeResult>,
}

impl Compilation {
    pub fn skipped_reason(&self, service: ServiceId) -> Option<&SkipReason> {
        self.skipped
            .iter()
            .find(|s| s.service == service)
            .map(|s| &s.reason)
    }
}
