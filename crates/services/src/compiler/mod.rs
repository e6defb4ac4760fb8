//! Route Configuration Compiler
//!
//! Turns an environment snapshot into a validated gateway document:
//! resolve every SOURCE setting, probe localhost services, run the route
//! builders in canonical order and assemble them after the core routes.

pub mod ports;

#[cfg(test)]
mod tests;

use std::{path::Path, sync::Arc, time::Duration};

use config::{
    resolve_sources, CompilerSettings, DeploymentMode, EnvSnapshot, ResolvedTarget,
    ServiceSourceSetting,
};
use domain::{build_routes, consumers, core_routes, KongDocument};
use futures::future::join_all;

pub use ports::{Compilation, CompileError, SkipReason, SkippedService};

use crate::{
    probe::{ProbeResult, ReachabilityProber},
    writer,
};

pub struct RouteCompiler {
    prober: Arc<dyn ReachabilityProber>,
    probe_host: String,
    probe_timeout: Duration,
}

impl RouteCompiler {
    pub fn new(prober: Arc<dyn ReachabilityProber>, settings: &CompilerSettings) -> Self {
        Self {
            prober,
            probe_host: settings.probe_host.clone(),
            probe_timeout: settings.probe_timeout,
        }
    }

    /// Compile the document without touching the filesystem.
    ///
    /// Configuration errors abort before any probe runs. Unreachable localhost
    /// services are reported in `skipped` and do not fail the run.
    pub async fn compile(
        &self,
        env: &EnvSnapshot,
        bridge_host: &str,
    ) -> Result<Compilation, CompileError> {
        let settings = resolve_sources(env, bridge_host)?;
        let probes = self.probe_pending(&settings).await?;

        let mut conditional = Vec::new();
        let mut skipped = Vec::new();

        for setting in &settings {
            if let Some(reason) = self.skip_reason(setting, &probes) {
                skipped.push(SkippedService {
                    service: setting.service,
                    reason,
                });
                continue;
            }
            conditional.extend(build_routes(setting)?);
        }

        let document = KongDocument::assemble(consumers(), core_routes()?, conditional);

        let problems = document.validate();
        if !problems.is_empty() {
            return Err(CompileError::Validation(problems));
        }

        tracing::debug!(
            services = document.services.len(),
            skipped = skipped.len(),
            probes = probes.len(),
            "Compiled gateway document"
        );

        Ok(Compilation {
            document,
            skipped,
            probes,
        })
    }

    /// Compile, then atomically replace `output`. Nothing is written when
    /// compilation fails.
    pub async fn generate(
        &self,
        env: &EnvSnapshot,
        bridge_host: &str,
        output: &Path,
    ) -> Result<Compilation, CompileError> {
        let compilation = self.compile(env, bridge_host).await?;
        writer::write_document(&compilation.document, output)?;

        tracing::info!(
            path = %output.display(),
            services = compilation.document.services.len(),
            "Gateway configuration written"
        );
        Ok(compilation)
    }

    /// Probe every localhost-mode service concurrently. Results come back in
    /// canonical order regardless of completion order.
    async fn probe_pending(
        &self,
        settings: &[ServiceSourceSetting],
    ) -> Result<Vec<ProbeResult>, CompileError> {
        let pending = settings.iter().filter_map(|setting| match &setting.target {
            ResolvedTarget::PendingProbe { port, .. } => Some(*port),
            _ => None,
        });

        let attempts = pending.map(|port| async move {
            let reachable = self
                .prober
                .probe(&self.probe_host, port, self.probe_timeout)
                .await?;
            Ok::<_, CompileError>(ProbeResult {
                host: self.probe_host.clone(),
                port,
                reachable,
            })
        });

        join_all(attempts).await.into_iter().collect()
    }

    fn skip_reason(
        &self,
        setting: &ServiceSourceSetting,
        probes: &[ProbeResult],
    ) -> Option<SkipReason> {
        match &setting.target {
            ResolvedTarget::Unrouted => Some(match setting.mode() {
                DeploymentMode::HostedApi => SkipReason::HostedApi,
                _ => SkipReason::Disabled,
            }),
            ResolvedTarget::PendingProbe { port, .. } => {
                let reachable = probes
                    .iter()
                    .any(|probe| probe.port == *port && probe.reachable);
                if reachable {
                    return None;
                }

                let descriptor = setting.service.descriptor();
                tracing::warn!(
                    service = %setting.service,
                    host = %self.probe_host,
                    port = *port,
                    "{} is set to '{}' but nothing is listening on {}:{}; its route will be \
                     unavailable until it is started and the stack is restarted",
                    descriptor.display_name,
                    setting.selection,
                    self.probe_host,
                    port
                );
                Some(SkipReason::Unreachable {
                    host: self.probe_host.clone(),
                    port: *port,
                })
            }
            ResolvedTarget::InNetwork(_) | ResolvedTarget::External(_) => None,
        }
    }
}
