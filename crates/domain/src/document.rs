//! Kong declarative configuration (DB-less `kong.yml`, format 2.1).
//!
//! Field order in these structs is the key order in the emitted YAML, so it
//! must not be rearranged.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::route::RouteDefinition;

pub const FORMAT_VERSION: &str = "2.1";

/// First line of every generated file.
pub const GENERATED_HEADER: &str =
    "# Generated from the stack environment at startup. Manual edits are overwritten.\n";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KongDocument {
    #[serde(rename = "_format_version")]
    pub format_version: String,
    #[serde(rename = "_transform")]
    pub transform: bool,
    pub consumers: Vec<Consumer>,
    pub services: Vec<KongService>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consumer {
    pub username: String,
    pub basicauth_credentials: Vec<BasicAuthCredential>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicAuthCredential {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KongService {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<Protocol>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_timeout: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_timeout: Option<u32>,
    pub routes: Vec<KongRoute>,
    pub plugins: Vec<Plugin>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Ws,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KongRoute {
    pub name: String,
    pub strip_path: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preserve_host: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plugin {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<PluginConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginConfig {
    KeyAuth {
        key_names: Vec<String>,
    },
    Acl {
        allow: Vec<String>,
    },
    RateLimiting {
        minute: u32,
        hour: u32,
        policy: String,
    },
    RequestTransformer {
        add: RequestTransformerAdd,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestTransformerAdd {
    pub headers: Vec<String>,
}

impl Plugin {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            config: None,
        }
    }

    pub fn cors() -> Self {
        Self::named("cors")
    }

    pub fn with_config(name: &str, config: PluginConfig) -> Self {
        Self {
            name: name.to_string(),
            config: Some(config),
        }
    }
}

impl KongDocument {
    /// Assemble the document: core routes first, then conditional routes, each
    /// in the order given.
    pub fn assemble(
        consumers: Vec<Consumer>,
        core: Vec<RouteDefinition>,
        conditional: Vec<RouteDefinition>,
    ) -> Self {
        Self {
            format_version: FORMAT_VERSION.to_string(),
            transform: true,
            consumers,
            services: core
                .into_iter()
                .chain(conditional)
                .map(KongService::from)
                .collect(),
        }
    }

    /// Serialize with the generated-file header. Output depends only on the
    /// document contents.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        let body = serde_yaml::to_string(self)?;
        Ok(format!("{GENERATED_HEADER}{body}"))
    }

    pub fn service(&self, name: &str) -> Option<&KongService> {
        self.services.iter().find(|s| s.name == name)
    }

    /// Virtual hosts referenced by any route, sorted.
    pub fn virtual_hosts(&self) -> Vec<String> {
        self.services
            .iter()
            .flat_map(|s| s.routes.iter())
            .flat_map(|r| r.hosts.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Structural checks the gateway would otherwise reject at load time.
    /// Returns every problem found, empty when the document is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.format_version.is_empty() {
            errors.push("Missing required field: _format_version".to_string());
        }

        let mut service_names = HashSet::new();
        let mut route_names = HashSet::new();

        for (index, service) in self.services.iter().enumerate() {
            let label = if service.name.is_empty() {
                errors.push(format!("Service {index} missing name"));
                index.to_string()
            } else {
                service.name.clone()
            };

            if !service_names.insert(service.name.as_str()) && !service.name.is_empty() {
                errors.push(format!("Duplicate service name: {label}"));
            }

            if service.url.is_empty() {
                errors.push(format!("Service {label} missing URL"));
            } else if let Err(reason) = check_upstream(&service.url) {
                errors.push(format!("Service {label} has invalid URL '{}': {reason}", service.url));
            }

            if service.routes.is_empty() {
                errors.push(format!("Service {label} has no routes"));
            }

            for route in &service.routes {
                if !route_names.insert(route.name.as_str()) {
                    errors.push(format!("Duplicate route name: {}", route.name));
                }
                if route.paths.is_empty() && route.hosts.is_empty() {
                    errors.push(format!(
                        "Route {} of service {label} matches neither paths nor hosts",
                        route.name
                    ));
                }
            }

            if !service.plugins.iter().any(|p| p.name == "cors") {
                errors.push(format!("Service {label} is missing the cors plugin"));
            }
        }

        errors
    }
}

/// Upstreams must be absolute http(s) or ws(s) URLs with a host.
pub(crate) fn check_upstream(value: &str) -> Result<(), String> {
    let url = Url::parse(value).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https" | "ws" | "wss") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err("missing host".to_string());
    }
    Ok(())
}
