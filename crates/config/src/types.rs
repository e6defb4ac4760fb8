use std::{collections::HashMap, env, path::PathBuf, time::Duration};

use crate::EnvSnapshot;

/// Where the compiled document goes, relative to the stack root unless absolute.
pub const DEFAULT_OUTPUT_PATH: &str = "volumes/api/kong-dynamic.yml";

/// Hostname Docker Desktop provides for reaching the host from a container.
pub const DOCKER_HOST_ALIAS: &str = "host.docker.internal";

/// Default bridge gateway on Linux engines where the alias does not resolve.
pub const DOCKER_BRIDGE_GATEWAY: &str = "172.17.0.1";

/// Upper bound for a single reachability probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Settings for one compiler run, read from the stack environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerSettings {
    pub output_path: PathBuf,
    /// Overrides bridge host detection when set.
    pub bridge_host: Option<String>,
    /// Host the prober dials on the operator's machine.
    pub probe_host: String,
    pub probe_timeout: Duration,
}

impl CompilerSettings {
    pub fn from_env(vars: &EnvSnapshot) -> Self {
        Self {
            output_path: vars
                .get_non_empty("KONG_CONFIG_OUTPUT")
                .unwrap_or(DEFAULT_OUTPUT_PATH)
                .into(),
            bridge_host: vars
                .get_non_empty("LOCALHOST_BRIDGE_HOST")
                .map(str::to_string),
            probe_host: vars
                .get_non_empty("LOCALHOST_PROBE_HOST")
                .unwrap_or("localhost")
                .to_string(),
            probe_timeout: PROBE_TIMEOUT,
        }
    }
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self::from_env(&EnvSnapshot::default())
    }
}

/// Logging Configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub modules: HashMap<String, String>,
}

impl LoggingConfig {
    /// Load from process environment variables
    pub fn from_env() -> Self {
        let mut modules = HashMap::new();

        // Load module-specific log levels
        if let Ok(level) = env::var("LOG_MODULE_CONFIG") {
            modules.insert("config".to_string(), level);
        }
        if let Ok(level) = env::var("LOG_MODULE_DOMAIN") {
            modules.insert("domain".to_string(), level);
        }
        if let Ok(level) = env::var("LOG_MODULE_SERVICES") {
            modules.insert("services".to_string(), level);
        }

        Self {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: env::var("LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()),
            modules,
        }
    }

    /// Filter directive for `tracing_subscriber::EnvFilter`, modules in sorted order.
    pub fn filter_directive(&self) -> String {
        let mut modules: Vec<_> = self.modules.iter().collect();
        modules.sort();

        let mut filter = self.level.clone();
        for (module, level) in modules {
            filter.push_str(&format!(",{module}={level}"));
        }
        filter
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
            modules: HashMap::new(),
        }
    }
}
