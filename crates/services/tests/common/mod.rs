// Shared helpers for compiler integration tests.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use config::{CompilerSettings, EnvSnapshot};
use services::{ProbeError, ReachabilityProber, RouteCompiler, TcpProber};

pub const BRIDGE: &str = "host.docker.internal";

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::level_filters::LevelFilter::DEBUG)
        .try_init();
}

pub fn env(pairs: &[(&str, &str)]) -> EnvSnapshot {
    EnvSnapshot::from_pairs(pairs.iter().copied())
}

/// Prober answering from a fixed port table and recording every call.
/// Ports missing from the table are unreachable.
#[derive(Default)]
pub struct ScriptedProber {
    reachable: HashMap<u16, bool>,
    calls: Mutex<Vec<(String, u16)>>,
}

impl ScriptedProber {
    pub fn new(reachable: &[(u16, bool)]) -> Self {
        Self {
            reachable: reachable.iter().copied().collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, u16)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReachabilityProber for ScriptedProber {
    async fn probe(&self, host: &str, port: u16, _timeout: Duration) -> Result<bool, ProbeError> {
        self.calls.lock().unwrap().push((host.to_string(), port));
        Ok(self.reachable.get(&port).copied().unwrap_or(false))
    }
}

pub fn scripted_compiler(prober: Arc<ScriptedProber>) -> RouteCompiler {
    RouteCompiler::new(prober, &CompilerSettings::default())
}

/// Compiler backed by real TCP connects against 127.0.0.1.
pub fn tcp_compiler() -> RouteCompiler {
    let settings = CompilerSettings {
        probe_host: "127.0.0.1".to_string(),
        probe_timeout: Duration::from_millis(500),
        ..CompilerSettings::default()
    };
    RouteCompiler::new(Arc::new(TcpProber::new()), &settings)
}

/// A port on 127.0.0.1 with nothing listening.
pub async fn closed_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}
