use std::sync::Arc;

use config::{CompilerSettings, ConfigError, EnvSnapshot, ServiceId};
use domain::PluginConfig;

use super::*;
use crate::probe::{MockReachabilityProber, ProbeError};

const BRIDGE: &str = "host.docker.internal";

fn compiler(prober: MockReachabilityProber) -> RouteCompiler {
    RouteCompiler::new(Arc::new(prober), &CompilerSettings::default())
}

fn no_probes() -> MockReachabilityProber {
    let mut prober = MockReachabilityProber::new();
    prober.expect_probe().never();
    prober
}

fn env(pairs: &[(&str, &str)]) -> EnvSnapshot {
    EnvSnapshot::from_pairs(pairs.iter().copied())
}

#[tokio::test]
async fn test_container_llm_needs_no_probe() {
    let compilation = compiler(no_probes())
        .compile(&env(&[("LLM_PROVIDER_SOURCE", "ollama-container-cpu")]), BRIDGE)
        .await
        .unwrap();

    let ollama = compilation.document.service("ollama-api").unwrap();
    assert_eq!(ollama.url, "http://ollama:11434/");
    assert!(compilation.probes.is_empty());
}

#[tokio::test]
async fn test_unreachable_localhost_llm_is_skipped() {
    let mut prober = MockReachabilityProber::new();
    prober
        .expect_probe()
        .withf(|host, port, _| host == "localhost" && *port == 11434)
        .times(1)
        .returning(|_, _, _| Ok(false));

    let compilation = compiler(prober)
        .compile(&env(&[("LLM_PROVIDER_SOURCE", "ollama-localhost")]), BRIDGE)
        .await
        .unwrap();

    assert!(compilation.document.service("ollama-api").is_none());
    assert_eq!(
        compilation.skipped_reason(ServiceId::LlmProvider),
        Some(&SkipReason::Unreachable {
            host: "localhost".to_string(),
            port: 11434
        })
    );
    assert_eq!(compilation.probes.len(), 1);
    assert!(!compilation.probes[0].reachable);
}

#[tokio::test]
async fn test_reachable_localhost_routes_through_bridge() {
    let mut prober = MockReachabilityProber::new();
    prober
        .expect_probe()
        .withf(|_, port, _| *port == 9000)
        .times(1)
        .returning(|_, _, _| Ok(true));

    let compilation = compiler(prober)
        .compile(
            &env(&[
                ("COMFYUI_SOURCE", "localhost"),
                ("COMFYUI_LOCALHOST_PORT", "9000"),
            ]),
            BRIDGE,
        )
        .await
        .unwrap();

    let comfyui = compilation.document.service("comfyui-api").unwrap();
    assert_eq!(comfyui.url, "http://host.docker.internal:9000/");
    assert_eq!(compilation.skipped_reason(ServiceId::ComfyUi), None);
}

#[tokio::test]
async fn test_probe_results_follow_canonical_order() {
    let mut prober = MockReachabilityProber::new();
    prober
        .expect_probe()
        .times(3)
        .returning(|_, port, _| Ok(port != 8080));

    let compilation = compiler(prober)
        .compile(
            &env(&[
                ("DOC_PROCESSOR_SOURCE", "docling-localhost"),
                ("WEAVIATE_SOURCE", "localhost"),
                ("LLM_PROVIDER_SOURCE", "ollama-localhost"),
            ]),
            BRIDGE,
        )
        .await
        .unwrap();

    let ports: Vec<_> = compilation.probes.iter().map(|p| p.port).collect();
    assert_eq!(ports, vec![11434, 8080, 63021]);
    assert!(compilation.document.service("ollama-api").is_some());
    assert!(compilation.document.service("weaviate-api").is_none());
    assert!(compilation.document.service("doc-processor-api").is_some());
}

#[tokio::test]
async fn test_probe_error_is_fatal() {
    let mut prober = MockReachabilityProber::new();
    prober.expect_probe().returning(|host, _, _| {
        Err(ProbeError::InvalidPort {
            host: host.to_string(),
        })
    });

    let result = compiler(prober)
        .compile(&env(&[("WEAVIATE_SOURCE", "localhost")]), BRIDGE)
        .await;
    assert!(matches!(result, Err(CompileError::Probe(_))));
}

#[tokio::test]
async fn test_external_comfyui_url_is_verbatim() {
    let compilation = compiler(no_probes())
        .compile(
            &env(&[
                ("COMFYUI_SOURCE", "external"),
                ("COMFYUI_EXTERNAL_URL", "https://example.com/comfy"),
            ]),
            BRIDGE,
        )
        .await
        .unwrap();

    assert_eq!(
        compilation.document.service("comfyui-api").unwrap().url,
        "https://example.com/comfy"
    );
}

#[tokio::test]
async fn test_searxng_carries_default_rate_limit() {
    let compilation = compiler(no_probes())
        .compile(&env(&[("SEARXNG_SOURCE", "container")]), BRIDGE)
        .await
        .unwrap();

    let searxng = compilation.document.service("searxng-api").unwrap();
    let limit = searxng
        .plugins
        .iter()
        .find(|p| p.name == "rate-limiting")
        .and_then(|p| p.config.clone());
    assert_eq!(
        limit,
        Some(PluginConfig::RateLimiting {
            minute: 60,
            hour: 1000,
            policy: "local".to_string(),
        })
    );
}

#[tokio::test]
async fn test_invalid_source_fails_before_probing() {
    let result = compiler(no_probes())
        .compile(
            &env(&[
                ("WEAVIATE_SOURCE", "localhost"),
                ("N8N_SOURCE", "sometimes"),
            ]),
            BRIDGE,
        )
        .await;

    match result {
        Err(CompileError::Config(ConfigError::InvalidSource {
            variable, value, ..
        })) => {
            assert_eq!(variable, "N8N_SOURCE");
            assert_eq!(value, "sometimes");
        }
        other => panic!("expected invalid source, got {other:?}"),
    }
}

#[tokio::test]
async fn test_skipped_reports_disabled_and_hosted() {
    let compilation = compiler(no_probes())
        .compile(
            &env(&[("LLM_PROVIDER_SOURCE", "api"), ("N8N_SOURCE", "disabled")]),
            BRIDGE,
        )
        .await
        .unwrap();

    assert_eq!(
        compilation.skipped_reason(ServiceId::LlmProvider),
        Some(&SkipReason::HostedApi)
    );
    assert_eq!(
        compilation.skipped_reason(ServiceId::N8n),
        Some(&SkipReason::Disabled)
    );
    // STT, TTS and document processing default to disabled.
    assert_eq!(
        compilation.skipped_reason(ServiceId::SttProvider),
        Some(&SkipReason::Disabled)
    );
}

#[tokio::test]
async fn test_core_routes_precede_conditional_routes() {
    let compilation = compiler(no_probes())
        .compile(&EnvSnapshot::default(), BRIDGE)
        .await
        .unwrap();

    let names: Vec<_> = compilation
        .document
        .services
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(names.first(), Some(&"auth-v1-open"));
    assert_eq!(names[10], "dashboard");
    assert_eq!(
        &names[11..],
        &[
            "ollama-api",
            "comfyui-api",
            "weaviate-api",
            "n8n-api",
            "searxng-api",
            "jupyterhub-api",
            "backend-api",
            "openwebui-api",
            "openwebui-ws",
            "deep-researcher-api",
        ]
    );
}
