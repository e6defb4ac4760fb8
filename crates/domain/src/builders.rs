//! Per-service route builders and the registry that maps each catalogued
//! service to its builder.
//!
//! Builders are pure: they read only the [`ServiceSourceSetting`] handed to
//! them. Services resolved to [`ResolvedTarget::Unrouted`] produce no routes.
//! Localhost targets are only passed in after a successful probe.

use config::{ResolvedTarget, ServiceId, ServiceSourceSetting};

use crate::{
    document::Protocol,
    route::{RateLimit, RouteBehavior, RouteDefinition, RouteError, RouteMatch, UpstreamTimeouts},
};

pub type RouteBuilder = fn(&ServiceSourceSetting) -> Result<Vec<RouteDefinition>, RouteError>;

/// Builder for every service, in canonical order.
pub const ROUTE_BUILDERS: [(ServiceId, RouteBuilder); 12] = [
    (ServiceId::LlmProvider, build_llm_provider),
    (ServiceId::ComfyUi, build_comfyui),
    (ServiceId::Weaviate, build_weaviate),
    (ServiceId::N8n, build_n8n),
    (ServiceId::SearxNg, build_searxng),
    (ServiceId::JupyterHub, build_jupyterhub),
    (ServiceId::SttProvider, build_stt_provider),
    (ServiceId::TtsProvider, build_tts_provider),
    (ServiceId::DocProcessor, build_doc_processor),
    (ServiceId::Backend, build_backend),
    (ServiceId::OpenWebUi, build_open_web_ui),
    (ServiceId::LocalDeepResearcher, build_local_deep_researcher),
];

pub fn builder_for(service: ServiceId) -> Option<RouteBuilder> {
    ROUTE_BUILDERS
        .iter()
        .find(|(id, _)| *id == service)
        .map(|(_, builder)| *builder)
}

/// Run the registered builder for a setting.
pub fn build_routes(setting: &ServiceSourceSetting) -> Result<Vec<RouteDefinition>, RouteError> {
    match builder_for(setting.service) {
        Some(builder) => builder(setting),
        None => Ok(Vec::new()),
    }
}

fn upstream(setting: &ServiceSourceSetting) -> Option<&str> {
    match &setting.target {
        ResolvedTarget::InNetwork(url) | ResolvedTarget::External(url) => Some(url),
        ResolvedTarget::PendingProbe { upstream, .. } => Some(upstream),
        ResolvedTarget::Unrouted => None,
    }
}

/// Single host-matched route, the shape most optional services use.
fn host_route(
    setting: &ServiceSourceSetting,
    service_name: &str,
    host: &str,
) -> Result<Option<RouteDefinition>, RouteError> {
    upstream(setting)
        .map(|url| RouteDefinition::new(service_name, url, RouteMatch::host(host)))
        .transpose()
}

fn build_llm_provider(setting: &ServiceSourceSetting) -> Result<Vec<RouteDefinition>, RouteError> {
    Ok(host_route(setting, "ollama-api", "ollama.localhost")?
        .into_iter()
        .collect())
}

fn build_comfyui(setting: &ServiceSourceSetting) -> Result<Vec<RouteDefinition>, RouteError> {
    Ok(host_route(setting, "comfyui-api", "comfyui.localhost")?
        .into_iter()
        .collect())
}

fn build_weaviate(setting: &ServiceSourceSetting) -> Result<Vec<RouteDefinition>, RouteError> {
    Ok(host_route(setting, "weaviate-api", "weaviate.localhost")?
        .into_iter()
        .collect())
}

fn build_n8n(setting: &ServiceSourceSetting) -> Result<Vec<RouteDefinition>, RouteError> {
    let Some(url) = upstream(setting) else {
        return Ok(Vec::new());
    };

    // n8n builds webhook URLs from the forwarded host; the port placeholder is
    // filled in by the gateway entrypoint.
    Ok(vec![RouteDefinition::new(
        "n8n-api",
        url,
        RouteMatch::host("n8n.localhost").preserve_host(),
    )?
    .with_timeouts(UpstreamTimeouts::uniform(60_000))
    .with_behavior(RouteBehavior::ForwardedHost(
        "n8n.localhost:${KONG_HTTP_PORT}".to_string(),
    ))])
}

fn build_searxng(setting: &ServiceSourceSetting) -> Result<Vec<RouteDefinition>, RouteError> {
    Ok(host_route(setting, "searxng-api", "search.localhost")?
        .map(|route| route.with_behavior(RouteBehavior::RateLimited(RateLimit::default())))
        .into_iter()
        .collect())
}

fn build_jupyterhub(setting: &ServiceSourceSetting) -> Result<Vec<RouteDefinition>, RouteError> {
    Ok(host_route(setting, "jupyterhub-api", "jupyter.localhost")?
        .into_iter()
        .collect())
}

fn build_stt_provider(setting: &ServiceSourceSetting) -> Result<Vec<RouteDefinition>, RouteError> {
    Ok(host_route(setting, "stt-api", "stt.localhost")?
        .into_iter()
        .collect())
}

fn build_tts_provider(setting: &ServiceSourceSetting) -> Result<Vec<RouteDefinition>, RouteError> {
    Ok(host_route(setting, "tts-api", "tts.localhost")?
        .into_iter()
        .collect())
}

fn build_doc_processor(setting: &ServiceSourceSetting) -> Result<Vec<RouteDefinition>, RouteError> {
    Ok(host_route(setting, "doc-processor-api", "docs.localhost")?
        .into_iter()
        .collect())
}

fn build_backend(setting: &ServiceSourceSetting) -> Result<Vec<RouteDefinition>, RouteError> {
    Ok(host_route(setting, "backend-api", "api.localhost")?
        .into_iter()
        .collect())
}

fn build_open_web_ui(setting: &ServiceSourceSetting) -> Result<Vec<RouteDefinition>, RouteError> {
    let Some(url) = upstream(setting) else {
        return Ok(Vec::new());
    };

    let socket_url = format!("{}/ws/socket.io", url.trim_end_matches('/'));
    Ok(vec![
        RouteDefinition::new("openwebui-api", url, RouteMatch::host("chat.localhost"))?,
        RouteDefinition::new(
            "openwebui-ws",
            &socket_url,
            RouteMatch::host("chat.localhost")
                .with_path("/ws/socket.io")
                .strip_path(true),
        )?
        .with_protocol(Protocol::Ws),
    ])
}

fn build_local_deep_researcher(
    setting: &ServiceSourceSetting,
) -> Result<Vec<RouteDefinition>, RouteError> {
    Ok(host_route(setting, "deep-researcher-api", "research.localhost")?
        .into_iter()
        .collect())
}
