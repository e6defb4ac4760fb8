use clap::Parser;
use cli::Cli;
use config::LoggingConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logging settings come from the process environment, not the stack `.env`
    init_tracing(&LoggingConfig::from_env());

    if let Err(e) = cli::run(cli).await {
        tracing::error!(error = %format!("{e:#}"), "Gateway configuration was not generated");
        std::process::exit(1);
    }
}

fn init_tracing(logging_config: &LoggingConfig) {
    let filter = logging_config.filter_directive();

    // Logs go to stderr so `--stdout` output stays a clean document
    match logging_config.format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        "pretty" => {
            tracing_subscriber::fmt()
                .pretty()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .compact()
                .with_target(false)
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
