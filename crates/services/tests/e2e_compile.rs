// End-to-end tests for compiling and writing the gateway document.

mod common;

use std::sync::Arc;

use common::{
    closed_port, env, init_test_tracing, scripted_compiler, tcp_compiler, ScriptedProber, BRIDGE,
};
use config::{ConfigError, ServiceId};
use domain::{KongDocument, PluginConfig, Protocol};
use services::{CompileError, SkipReason};

const CORE_SERVICES: [&str; 11] = [
    "auth-v1-open",
    "auth-v1-open-callback",
    "auth-v1-open-authorize",
    "auth-v1",
    "rest-v1",
    "graphql-v1",
    "realtime-v1-ws",
    "realtime-v1-rest",
    "storage-v1",
    "meta",
    "dashboard",
];

fn all_disabled() -> Vec<(&'static str, &'static str)> {
    ServiceId::ALL
        .iter()
        .map(|service| (service.source_variable(), "disabled"))
        .collect()
}

fn service_names(document: &KongDocument) -> Vec<&str> {
    document.services.iter().map(|s| s.name.as_str()).collect()
}

#[tokio::test]
async fn test_all_disabled_leaves_only_core_routes() {
    init_test_tracing();
    let prober = Arc::new(ScriptedProber::default());

    let compilation = scripted_compiler(prober.clone())
        .compile(&env(&all_disabled()), BRIDGE)
        .await
        .unwrap();

    assert_eq!(service_names(&compilation.document), CORE_SERVICES.to_vec());
    assert_eq!(compilation.skipped.len(), ServiceId::ALL.len());
    assert!(compilation
        .skipped
        .iter()
        .all(|s| s.reason == SkipReason::Disabled));
    assert!(prober.calls().is_empty());
}

#[tokio::test]
async fn test_core_routes_present_for_any_sources() {
    let cases: Vec<Vec<(&str, &str)>> = vec![
        vec![],
        all_disabled(),
        vec![
            ("LLM_PROVIDER_SOURCE", "api"),
            ("COMFYUI_SOURCE", "container-gpu"),
            ("STT_PROVIDER_SOURCE", "parakeet-container-gpu"),
        ],
    ];

    for pairs in cases {
        let compilation = scripted_compiler(Arc::new(ScriptedProber::default()))
            .compile(&env(&pairs), BRIDGE)
            .await
            .unwrap();
        let names = service_names(&compilation.document);
        assert_eq!(&names[..CORE_SERVICES.len()], &CORE_SERVICES[..]);
    }
}

#[tokio::test]
async fn test_disabled_service_has_no_route_in_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("kong.yml");

    scripted_compiler(Arc::new(ScriptedProber::default()))
        .generate(
            &env(&[("OPEN_WEB_UI_SOURCE", "disabled"), ("N8N_SOURCE", "DISABLED")]),
            BRIDGE,
            &output,
        )
        .await
        .unwrap();

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(!written.contains("openwebui"));
    assert!(!written.contains("chat.localhost"));
    assert!(!written.contains("n8n"));
    assert!(written.contains("searxng-api"));
}

#[tokio::test]
async fn test_container_llm_route_without_probe() {
    let prober = Arc::new(ScriptedProber::default());

    let compilation = scripted_compiler(prober.clone())
        .compile(&env(&[("LLM_PROVIDER_SOURCE", "ollama-container-cpu")]), BRIDGE)
        .await
        .unwrap();

    let ollama = compilation.document.service("ollama-api").unwrap();
    assert_eq!(ollama.url, "http://ollama:11434/");
    assert_eq!(ollama.routes[0].hosts, vec!["ollama.localhost"]);
    assert!(prober.calls().is_empty());
}

#[tokio::test]
async fn test_unreachable_localhost_llm_still_writes_document() {
    init_test_tracing();
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("kong.yml");
    let prober = Arc::new(ScriptedProber::new(&[(11434, false)]));

    let compilation = scripted_compiler(prober.clone())
        .generate(&env(&[("LLM_PROVIDER_SOURCE", "ollama-localhost")]), BRIDGE, &output)
        .await
        .unwrap();

    assert_eq!(prober.calls(), vec![("localhost".to_string(), 11434)]);
    assert!(compilation.document.service("ollama-api").is_none());
    assert!(matches!(
        compilation.skipped_reason(ServiceId::LlmProvider),
        Some(SkipReason::Unreachable { port: 11434, .. })
    ));

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(!written.contains("ollama"));
    assert!(written.contains("rest-v1"));
}

#[tokio::test]
async fn test_tcp_probe_against_real_listener() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let open = listener.local_addr().unwrap().port().to_string();
    let closed = closed_port().await.to_string();

    let compilation = tcp_compiler()
        .compile(
            &env(&[
                ("COMFYUI_SOURCE", "localhost"),
                ("COMFYUI_LOCALHOST_PORT", open.as_str()),
                ("LLM_PROVIDER_SOURCE", "ollama-localhost"),
                ("OLLAMA_LOCALHOST_PORT", closed.as_str()),
            ]),
            BRIDGE,
        )
        .await
        .unwrap();

    let comfyui = compilation.document.service("comfyui-api").unwrap();
    assert_eq!(comfyui.url, format!("http://{BRIDGE}:{open}/"));
    assert!(compilation.document.service("ollama-api").is_none());
    assert_eq!(compilation.probes.len(), 2);
}

#[tokio::test]
async fn test_external_url_emitted_verbatim() {
    let compilation = scripted_compiler(Arc::new(ScriptedProber::default()))
        .compile(
            &env(&[
                ("COMFYUI_SOURCE", "external"),
                ("COMFYUI_EXTERNAL_URL", "https://example.com/comfy"),
                ("LLM_PROVIDER_SOURCE", "ollama-external"),
                ("OLLAMA_EXTERNAL_URL", "http://gpu-box.lan:11434"),
            ]),
            BRIDGE,
        )
        .await
        .unwrap();

    assert_eq!(
        compilation.document.service("comfyui-api").unwrap().url,
        "https://example.com/comfy"
    );
    assert_eq!(
        compilation.document.service("ollama-api").unwrap().url,
        "http://gpu-box.lan:11434"
    );
}

#[tokio::test]
async fn test_searxng_rate_limit_budget() {
    let compilation = scripted_compiler(Arc::new(ScriptedProber::default()))
        .compile(&env(&[("SEARXNG_SOURCE", "container")]), BRIDGE)
        .await
        .unwrap();

    let searxng = compilation.document.service("searxng-api").unwrap();
    let names: Vec<_> = searxng.plugins.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["cors", "rate-limiting"]);
    assert_eq!(
        searxng.plugins[1].config,
        Some(PluginConfig::RateLimiting {
            minute: 60,
            hour: 1000,
            policy: "local".to_string(),
        })
    );
}

#[tokio::test]
async fn test_open_web_ui_websocket_service() {
    let compilation = scripted_compiler(Arc::new(ScriptedProber::default()))
        .compile(&env(&[]), BRIDGE)
        .await
        .unwrap();

    let ws = compilation.document.service("openwebui-ws").unwrap();
    assert_eq!(ws.protocol, Some(Protocol::Ws));
    assert_eq!(ws.routes[0].paths, vec!["/ws/socket.io"]);
}

#[tokio::test]
async fn test_generation_is_byte_identical_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("kong.yml");
    let pairs = [
        ("LLM_PROVIDER_SOURCE", "ollama-localhost"),
        ("WEAVIATE_SOURCE", "localhost"),
        ("TTS_PROVIDER_SOURCE", "xtts-localhost"),
        ("COMFYUI_SOURCE", "external"),
        ("COMFYUI_EXTERNAL_URL", "https://example.com/comfy"),
    ];
    let reachable = [(11434, true), (8080, true), (63023, true)];

    scripted_compiler(Arc::new(ScriptedProber::new(&reachable)))
        .generate(&env(&pairs), BRIDGE, &output)
        .await
        .unwrap();
    let first = std::fs::read(&output).unwrap();

    scripted_compiler(Arc::new(ScriptedProber::new(&reachable)))
        .generate(&env(&pairs), BRIDGE, &output)
        .await
        .unwrap();
    let second = std::fs::read(&output).unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_environment_order_does_not_affect_output() {
    let forward = [
        ("N8N_SOURCE", "container"),
        ("BACKEND_SOURCE", "disabled"),
        ("SEARXNG_SOURCE", "container"),
    ];
    let mut reversed = forward;
    reversed.reverse();

    let render = |pairs: Vec<(&'static str, &'static str)>| async move {
        scripted_compiler(Arc::new(ScriptedProber::default()))
            .compile(&env(&pairs), BRIDGE)
            .await
            .unwrap()
            .document
            .to_yaml()
            .unwrap()
    };

    assert_eq!(render(forward.to_vec()).await, render(reversed.to_vec()).await);
}

#[tokio::test]
async fn test_invalid_source_leaves_existing_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("kong.yml");
    std::fs::write(&output, "previous: document\n").unwrap();

    let err = scripted_compiler(Arc::new(ScriptedProber::default()))
        .generate(&env(&[("COMFYUI_SOURCE", "cloud")]), BRIDGE, &output)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CompileError::Config(ConfigError::InvalidSource {
            variable: "COMFYUI_SOURCE",
            ..
        })
    ));
    assert!(err.to_string().contains("container-cpu"));
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "previous: document\n"
    );
}

#[tokio::test]
async fn test_missing_external_url_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("api/kong.yml");

    let err = scripted_compiler(Arc::new(ScriptedProber::default()))
        .generate(&env(&[("LLM_PROVIDER_SOURCE", "ollama-external")]), BRIDGE, &output)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CompileError::Config(ConfigError::MissingExternalUrl {
            variable: "OLLAMA_EXTERNAL_URL",
            ..
        })
    ));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_written_document_parses_as_kong_config() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("kong.yml");

    let compilation = scripted_compiler(Arc::new(ScriptedProber::default()))
        .generate(&env(&[]), BRIDGE, &output)
        .await
        .unwrap();

    let written = std::fs::read_to_string(&output).unwrap();
    let parsed: KongDocument = serde_yaml::from_str(&written).unwrap();
    assert_eq!(parsed, compilation.document);
    assert_eq!(parsed.format_version, "2.1");
    assert!(parsed.transform);
    assert_eq!(parsed.consumers[0].username, "dashboard_user");
}
