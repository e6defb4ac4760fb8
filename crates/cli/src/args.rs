use clap::{Args, Parser};
use config::ServiceId;
use std::path::PathBuf;

/// Compile the Kong gateway configuration from the stack environment
#[derive(Debug, Parser)]
#[command(name = "kong-config")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Stack root; the default `.env` and relative output paths resolve against it
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Environment file to read instead of `<root>/.env`
    #[arg(long, env = "GENAI_ENV_FILE")]
    pub env_file: Option<String>,

    /// Where to write the document (overrides KONG_CONFIG_OUTPUT)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the document to stdout instead of writing it
    #[arg(long)]
    pub stdout: bool,

    #[command(flatten)]
    pub sources: SourceOverrides,
}

/// Per-invocation SOURCE overrides. Values are validated by the resolver and
/// never written back to the env file.
#[derive(Debug, Default, Args)]
#[command(next_help_heading = "Service sources")]
pub struct SourceOverrides {
    #[arg(long, value_name = "MODE")]
    pub llm_provider_source: Option<String>,
    #[arg(long, value_name = "MODE")]
    pub comfyui_source: Option<String>,
    #[arg(long, value_name = "MODE")]
    pub weaviate_source: Option<String>,
    #[arg(long, value_name = "MODE")]
    pub n8n_source: Option<String>,
    #[arg(long, value_name = "MODE")]
    pub searxng_source: Option<String>,
    #[arg(long, value_name = "MODE")]
    pub jupyterhub_source: Option<String>,
    #[arg(long, value_name = "MODE")]
    pub stt_provider_source: Option<String>,
    #[arg(long, value_name = "MODE")]
    pub tts_provider_source: Option<String>,
    #[arg(long, value_name = "MODE")]
    pub doc_processor_source: Option<String>,
    #[arg(long, value_name = "MODE")]
    pub backend_source: Option<String>,
    #[arg(long, value_name = "MODE")]
    pub open_web_ui_source: Option<String>,
    #[arg(long, value_name = "MODE")]
    pub local_deep_researcher_source: Option<String>,
}

impl SourceOverrides {
    fn get(&self, service: ServiceId) -> Option<&String> {
        match service {
            ServiceId::LlmProvider => self.llm_provider_source.as_ref(),
            ServiceId::ComfyUi => self.comfyui_source.as_ref(),
            ServiceId::Weaviate => self.weaviate_source.as_ref(),
            ServiceId::N8n => self.n8n_source.as_ref(),
            ServiceId::SearxNg => self.searxng_source.as_ref(),
            ServiceId::JupyterHub => self.jupyterhub_source.as_ref(),
            ServiceId::SttProvider => self.stt_provider_source.as_ref(),
            ServiceId::TtsProvider => self.tts_provider_source.as_ref(),
            ServiceId::DocProcessor => self.doc_processor_source.as_ref(),
            ServiceId::Backend => self.backend_source.as_ref(),
            ServiceId::OpenWebUi => self.open_web_ui_source.as_ref(),
            ServiceId::LocalDeepResearcher => self.local_deep_researcher_source.as_ref(),
        }
    }

    /// `(SOURCE variable, value)` for every flag given, in canonical order.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        ServiceId::ALL
            .iter()
            .filter_map(|service| {
                self.get(*service)
                    .map(|value| (service.source_variable(), value.clone()))
            })
            .collect()
    }
}
