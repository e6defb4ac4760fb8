//! Environment resolver: `<SERVICE>_SOURCE` values to ServiceSourceSetting records.

use url::Url;

use crate::{
    catalog::{PortSetting, ServiceId},
    env::EnvSnapshot,
    source::{DeploymentMode, SourceSelection},
    ConfigError,
};

/// Where the gateway should send traffic for a service, as far as the
/// environment alone can tell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    /// Well-known address inside the stack network.
    InNetwork(String),
    /// Operator-supplied URL, kept verbatim.
    External(String),
    /// Upstream behind the loopback bridge; only routable once a probe of
    /// `port` on the operator's machine succeeds.
    PendingProbe { upstream: String, port: u16 },
    /// Disabled or served by a hosted API.
    Unrouted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSourceSetting {
    pub service: ServiceId,
    pub selection: SourceSelection,
    pub target: ResolvedTarget,
}

impl ServiceSourceSetting {
    pub fn mode(&self) -> DeploymentMode {
        self.selection.mode()
    }
}

/// Resolve every catalogued service in canonical order. Stops at the first
/// configuration error.
pub fn resolve_sources(
    env: &EnvSnapshot,
    bridge_host: &str,
) -> Result<Vec<ServiceSourceSetting>, ConfigError> {
    ServiceId::ALL
        .iter()
        .map(|service| resolve_service(env, *service, bridge_host))
        .collect()
}

pub fn resolve_service(
    env: &EnvSnapshot,
    service: ServiceId,
    bridge_host: &str,
) -> Result<ServiceSourceSetting, ConfigError> {
    let descriptor = service.descriptor();

    let selection = match env.get_non_empty(descriptor.source_variable) {
        Some(raw) => service
            .parse_source(raw)
            .map_err(|_| ConfigError::InvalidSource {
                variable: descriptor.source_variable,
                value: raw.to_string(),
                accepted: service.accepted_sources(),
            })?,
        None => service.default_source(),
    };

    let unsupported = || ConfigError::InvalidSource {
        variable: descriptor.source_variable,
        value: selection.as_str().to_string(),
        accepted: service.accepted_sources(),
    };

    let target = match selection.mode() {
        DeploymentMode::Container | DeploymentMode::ContainerGpu => {
            ResolvedTarget::InNetwork(descriptor.container_upstream.to_string())
        }
        DeploymentMode::External => {
            let variable = descriptor.external_url_variable.ok_or_else(unsupported)?;
            let url = env
                .get_non_empty(variable)
                .ok_or(ConfigError::MissingExternalUrl {
                    variable,
                    source_variable: descriptor.source_variable,
                })?;
            validate_http_url(variable, url)?;
            ResolvedTarget::External(url.to_string())
        }
        DeploymentMode::Localhost => {
            let setting = descriptor.localhost_port.ok_or_else(unsupported)?;
            let port = resolve_port(env, setting)?;
            let upstream = format!("http://{bridge_host}:{port}/");
            validate_http_url(descriptor.source_variable, &upstream)?;
            ResolvedTarget::PendingProbe { upstream, port }
        }
        DeploymentMode::HostedApi | DeploymentMode::Disabled => ResolvedTarget::Unrouted,
    };

    tracing::debug!(
        service = %service,
        source = %selection,
        upstream = ?target,
        "Resolved service source"
    );

    Ok(ServiceSourceSetting {
        service,
        selection,
        target,
    })
}

fn resolve_port(env: &EnvSnapshot, setting: PortSetting) -> Result<u16, ConfigError> {
    let invalid = |value: &str| ConfigError::InvalidPort {
        variable: setting.variable.to_string(),
        value: value.to_string(),
    };

    let port = match env.get_non_empty(setting.variable) {
        Some(raw) => raw.parse::<u16>().map_err(|_| invalid(raw))?,
        None => setting.default,
    };

    if port == 0 {
        return Err(invalid(&port.to_string()));
    }
    Ok(port)
}

/// Accept only absolute `http`/`https` URLs with a host.
pub fn validate_http_url(variable: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        variable: variable.to_string(),
        value: value.to_string(),
        reason,
    };

    let url = Url::parse(value).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!(
            "scheme must be http or https, got '{}'",
            url.scheme()
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(())
}
