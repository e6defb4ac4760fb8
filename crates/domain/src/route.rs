use thiserror::Error;

use crate::document::{
    check_upstream, KongRoute, KongService, Plugin, PluginConfig, Protocol, RequestTransformerAdd,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("Route {service} has an invalid upstream '{url}': {reason}")]
    InvalidUpstream {
        service: String,
        url: String,
        reason: String,
    },
    #[error("Route {service} must match at least one path or host")]
    EmptyMatch { service: String },
}

/// Fixed request budget for public, unauthenticated services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub per_minute: u32,
    pub per_hour: u32,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            per_minute: 60,
            per_hour: 1000,
        }
    }
}

/// Cross-cutting behavior the gateway applies on a route. CORS is implied for
/// every route and is not listed here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteBehavior {
    /// Require an `apikey` credential and forward it upstream.
    ApiKeyPassThrough,
    /// Basic auth restricted to the dashboard consumer group.
    DashboardOnly,
    /// In-memory (`policy: local`) rate limiting.
    RateLimited(RateLimit),
    /// Add an `X-Forwarded-Host` header for apps that build absolute URLs.
    ForwardedHost(String),
}

impl RouteBehavior {
    fn plugins(&self) -> Vec<Plugin> {
        match self {
            Self::ApiKeyPassThrough => vec![Plugin::with_config(
                "key-auth",
                PluginConfig::KeyAuth {
                    key_names: vec!["apikey".to_string()],
                },
            )],
            Self::DashboardOnly => vec![
                Plugin::named("basic-auth"),
                Plugin::with_config(
                    "acl",
                    PluginConfig::Acl {
                        allow: vec![crate::core::DASHBOARD_CONSUMER.to_string()],
                    },
                ),
            ],
            Self::RateLimited(limit) => vec![Plugin::with_config(
                "rate-limiting",
                PluginConfig::RateLimiting {
                    minute: limit.per_minute,
                    hour: limit.per_hour,
                    policy: "local".to_string(),
                },
            )],
            Self::ForwardedHost(host) => vec![Plugin::with_config(
                "request-transformer",
                PluginConfig::RequestTransformer {
                    add: RequestTransformerAdd {
                        headers: vec![format!("X-Forwarded-Host: {host}")],
                    },
                },
            )],
        }
    }
}

/// How requests are matched to a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub paths: Vec<String>,
    pub hosts: Vec<String>,
    pub strip_path: bool,
    pub preserve_host: bool,
}

impl RouteMatch {
    /// Path-prefix match; the prefix is stripped before forwarding.
    pub fn path(prefix: &str) -> Self {
        Self {
            paths: vec![prefix.to_string()],
            hosts: Vec::new(),
            strip_path: true,
            preserve_host: false,
        }
    }

    /// Virtual host match; the full path is forwarded.
    pub fn host(host: &str) -> Self {
        Self {
            paths: Vec::new(),
            hosts: vec![host.to_string()],
            strip_path: false,
            preserve_host: false,
        }
    }

    pub fn with_path(mut self, prefix: &str) -> Self {
        self.paths.push(prefix.to_string());
        self
    }

    pub fn strip_path(mut self, strip: bool) -> Self {
        self.strip_path = strip;
        self
    }

    pub fn preserve_host(mut self) -> Self {
        self.preserve_host = true;
        self
    }
}

/// Upstream timeouts in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamTimeouts {
    pub connect: u32,
    pub write: u32,
    pub read: u32,
}

impl UpstreamTimeouts {
    pub fn uniform(millis: u32) -> Self {
        Self {
            connect: millis,
            write: millis,
            read: millis,
        }
    }
}

/// One externally reachable mapping: a gateway service with its route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDefinition {
    pub service_name: String,
    pub route_name: String,
    pub upstream: String,
    /// Emitted as the service `protocol` key only when set.
    pub protocol: Option<Protocol>,
    pub matcher: RouteMatch,
    pub timeouts: Option<UpstreamTimeouts>,
    pub behaviors: Vec<RouteBehavior>,
}

impl RouteDefinition {
    /// Build a definition, checking the upstream URL and match rules. The route
    /// is named `<service>-all` unless renamed.
    pub fn new(service_name: &str, upstream: &str, matcher: RouteMatch) -> Result<Self, RouteError> {
        if upstream.trim().is_empty() {
            return Err(RouteError::InvalidUpstream {
                service: service_name.to_string(),
                url: upstream.to_string(),
                reason: "upstream is empty".to_string(),
            });
        }
        check_upstream(upstream).map_err(|reason| RouteError::InvalidUpstream {
            service: service_name.to_string(),
            url: upstream.to_string(),
            reason,
        })?;
        if matcher.paths.is_empty() && matcher.hosts.is_empty() {
            return Err(RouteError::EmptyMatch {
                service: service_name.to_string(),
            });
        }

        Ok(Self {
            service_name: service_name.to_string(),
            route_name: format!("{service_name}-all"),
            upstream: upstream.to_string(),
            protocol: None,
            matcher,
            timeouts: None,
            behaviors: Vec::new(),
        })
    }

    pub fn named(mut self, route_name: &str) -> Self {
        self.route_name = route_name.to_string();
        self
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    pub fn with_timeouts(mut self, timeouts: UpstreamTimeouts) -> Self {
        self.timeouts = Some(timeouts);
        self
    }

    pub fn with_behavior(mut self, behavior: RouteBehavior) -> Self {
        self.behaviors.push(behavior);
        self
    }
}

impl From<RouteDefinition> for KongService {
    fn from(def: RouteDefinition) -> Self {
        let mut plugins = vec![Plugin::cors()];
        plugins.extend(def.behaviors.iter().flat_map(RouteBehavior::plugins));

        KongService {
            name: def.service_name,
            url: def.upstream,
            protocol: def.protocol,
            connect_timeout: def.timeouts.map(|t| t.connect),
            write_timeout: def.timeouts.map(|t| t.write),
            read_timeout: def.timeouts.map(|t| t.read),
            routes: vec![KongRoute {
                name: def.route_name,
                strip_path: def.matcher.strip_path,
                preserve_host: def.matcher.preserve_host.then_some(true),
                paths: def.matcher.paths,
                hosts: def.matcher.hosts,
            }],
            plugins,
        }
    }
}
