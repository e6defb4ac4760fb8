use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use config::{resolve_env_file_path, CompilerSettings, EnvSnapshot};
use services::{detect_bridge_host, writer, Compilation, RouteCompiler, TcpProber};
use tracing::info;

use crate::args::Cli;

/// Load the environment, compile the gateway document and write it (or print
/// it with `--stdout`).
pub async fn run(cli: Cli) -> Result<()> {
    let home = std::env::var("HOME").ok();
    let env_path = resolve_env_file_path(&cli.root, cli.env_file.as_deref(), home.as_deref());

    let env = EnvSnapshot::load_from_file(&env_path)
        .with_context(|| format!("Failed to load environment from {}", env_path.display()))?
        .with_overrides(cli.sources.pairs());
    info!(path = %env_path.display(), variables = env.len(), "Environment loaded");

    let settings = CompilerSettings::from_env(&env);
    let bridge_host = detect_bridge_host(settings.bridge_host.as_deref()).await;
    let compiler = RouteCompiler::new(Arc::new(TcpProber::new()), &settings);

    if cli.stdout {
        let compilation = compiler.compile(&env, &bridge_host).await?;
        print!("{}", writer::render(&compilation.document)?);
        report(&compilation);
        return Ok(());
    }

    let configured = cli.output.as_deref().unwrap_or(&settings.output_path);
    let output = resolve_output_path(&cli.root, configured);
    let compilation = compiler.generate(&env, &bridge_host, &output).await?;
    report(&compilation);

    Ok(())
}

/// Relative output paths are taken from the stack root.
pub fn resolve_output_path(root: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        root.join(configured)
    }
}

fn report(compilation: &Compilation) {
    for service in &compilation.document.services {
        info!(service = %service.name, upstream = %service.url, "Routed");
    }

    for skipped in &compilation.skipped {
        info!(service = %skipped.service, reason = %skipped.reason, "Not routed");
    }

    let hosts = compilation.document.virtual_hosts();
    if !hosts.is_empty() {
        info!(
            hosts = %hosts.join(" "),
            "Virtual hosts served by the gateway; they must resolve to 127.0.0.1 on this machine"
        );
    }
}
