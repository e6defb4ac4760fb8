// Configuration Management
//
// This crate turns the stack's flat `.env` environment into typed settings for
// the gateway configuration compiler. It provides:
// - An immutable environment snapshot loaded once per run
// - Closed SOURCE enumerations, one per configurable service
// - The service catalog (in-network upstreams, localhost ports, external URL variables)
// - The environment resolver producing one ServiceSourceSetting per service
//
// Nothing in here performs network I/O; reachability is decided by the services crate.

use std::path::PathBuf;
use thiserror::Error;

pub mod catalog;
pub mod env;
pub mod resolver;
pub mod source;
pub mod types;

// Re-export all configuration types
pub use catalog::{PortSetting, ServiceDescriptor, ServiceId};
pub use env::{resolve_env_file_path, EnvSnapshot};
pub use resolver::{resolve_service, resolve_sources, ResolvedTarget, ServiceSourceSetting};
pub use source::{DeploymentMode, SourceSelection};
pub use types::*;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{variable}='{value}' is invalid. Valid options: {}", accepted.join(", "))]
    InvalidSource {
        variable: &'static str,
        value: String,
        accepted: &'static [&'static str],
    },

    #[error("{source_variable} is set to 'external' but {variable} is not provided")]
    MissingExternalUrl {
        variable: &'static str,
        source_variable: &'static str,
    },

    #[error("{variable}='{value}' is not a valid URL: {reason}")]
    InvalidUrl {
        variable: String,
        value: String,
        reason: String,
    },

    #[error("{variable}='{value}' is not a valid port number (expected 1-65535)")]
    InvalidPort { variable: String, value: String },

    #[error("Failed to read environment file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
}
