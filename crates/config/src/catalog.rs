//! Fixed per-service facts: SOURCE variable, in-network upstream, localhost port
//! and external URL variable.

use std::fmt;

use crate::source::{
    ComfyUiSource, ContainerOnlySource, DocProcessorSource, LlmProviderSource, SourceSelection,
    SttProviderSource, TtsProviderSource, UnknownSource, WeaviateSource,
};

/// SOURCE-configurable services. Declaration order is the canonical emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceId {
    LlmProvider,
    ComfyUi,
    Weaviate,
    N8n,
    SearxNg,
    JupyterHub,
    SttProvider,
    TtsProvider,
    DocProcessor,
    Backend,
    OpenWebUi,
    LocalDeepResearcher,
}

/// Port used when a service runs on the operator's machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortSetting {
    pub variable: &'static str,
    pub default: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// Human readable name used in warnings.
    pub display_name: &'static str,
    pub source_variable: &'static str,
    /// Well-known upstream inside the stack network for container modes.
    pub container_upstream: &'static str,
    pub localhost_port: Option<PortSetting>,
    pub external_url_variable: Option<&'static str>,
}

impl ServiceId {
    pub const ALL: [ServiceId; 12] = [
        ServiceId::LlmProvider,
        ServiceId::ComfyUi,
        ServiceId::Weaviate,
        ServiceId::N8n,
        ServiceId::SearxNg,
        ServiceId::JupyterHub,
        ServiceId::SttProvider,
        ServiceId::TtsProvider,
        ServiceId::DocProcessor,
        ServiceId::Backend,
        ServiceId::OpenWebUi,
        ServiceId::LocalDeepResearcher,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LlmProvider => "llm-provider",
            Self::ComfyUi => "comfyui",
            Self::Weaviate => "weaviate",
            Self::N8n => "n8n",
            Self::SearxNg => "searxng",
            Self::JupyterHub => "jupyterhub",
            Self::SttProvider => "stt-provider",
            Self::TtsProvider => "tts-provider",
            Self::DocProcessor => "doc-processor",
            Self::Backend => "backend",
            Self::OpenWebUi => "open-web-ui",
            Self::LocalDeepResearcher => "local-deep-researcher",
        }
    }

    pub fn descriptor(&self) -> ServiceDescriptor {
        match self {
            Self::LlmProvider => ServiceDescriptor {
                display_name: "Ollama",
                source_variable: "LLM_PROVIDER_SOURCE",
                container_upstream: "http://ollama:11434/",
                localhost_port: Some(PortSetting {
                    variable: "OLLAMA_LOCALHOST_PORT",
                    default: 11434,
                }),
                external_url_variable: Some("OLLAMA_EXTERNAL_URL"),
            },
            Self::ComfyUi => ServiceDescriptor {
                display_name: "ComfyUI",
                source_variable: "COMFYUI_SOURCE",
                container_upstream: "http://comfyui:18188/",
                localhost_port: Some(PortSetting {
                    variable: "COMFYUI_LOCALHOST_PORT",
                    default: 8000,
                }),
                external_url_variable: Some("COMFYUI_EXTERNAL_URL"),
            },
            Self::Weaviate => ServiceDescriptor {
                display_name: "Weaviate",
                source_variable: "WEAVIATE_SOURCE",
                container_upstream: "http://weaviate:8080/",
                localhost_port: Some(PortSetting {
                    variable: "WEAVIATE_LOCALHOST_PORT",
                    default: 8080,
                }),
                external_url_variable: None,
            },
            Self::N8n => container_only("n8n", "N8N_SOURCE", "http://n8n:5678/"),
            Self::SearxNg => container_only("SearxNG", "SEARXNG_SOURCE", "http://searxng:8080/"),
            Self::JupyterHub => container_only(
                "JupyterHub",
                "JUPYTERHUB_SOURCE",
                "http://jupyterhub:8888/",
            ),
            Self::SttProvider => ServiceDescriptor {
                display_name: "Parakeet STT",
                source_variable: "STT_PROVIDER_SOURCE",
                container_upstream: "http://stt-provider:8000/",
                localhost_port: Some(PortSetting {
                    variable: "STT_PROVIDER_PORT",
                    default: 63022,
                }),
                external_url_variable: None,
            },
            Self::TtsProvider => ServiceDescriptor {
                display_name: "XTTS TTS",
                source_variable: "TTS_PROVIDER_SOURCE",
                container_upstream: "http://tts-provider:8000/",
                localhost_port: Some(PortSetting {
                    variable: "TTS_PROVIDER_PORT",
                    default: 63023,
                }),
                external_url_variable: None,
            },
            Self::DocProcessor => ServiceDescriptor {
                display_name: "Docling Document Processor",
                source_variable: "DOC_PROCESSOR_SOURCE",
                container_upstream: "http://doc-processor:8000/",
                localhost_port: Some(PortSetting {
                    variable: "DOC_PROCESSOR_PORT",
                    default: 63021,
                }),
                external_url_variable: None,
            },
            Self::Backend => container_only("Backend API", "BACKEND_SOURCE", "http://backend:8000/"),
            Self::OpenWebUi => container_only(
                "Open WebUI",
                "OPEN_WEB_UI_SOURCE",
                "http://open-web-ui:8080/",
            ),
            Self::LocalDeepResearcher => container_only(
                "Local Deep Researcher",
                "LOCAL_DEEP_RESEARCHER_SOURCE",
                "http://local-deep-researcher:2024/",
            ),
        }
    }

    pub fn source_variable(&self) -> &'static str {
        self.descriptor().source_variable
    }

    pub fn accepted_sources(&self) -> &'static [&'static str] {
        match self {
            Self::LlmProvider => LlmProviderSource::ACCEPTED,
            Self::ComfyUi => ComfyUiSource::ACCEPTED,
            Self::Weaviate => WeaviateSource::ACCEPTED,
            Self::SttProvider => SttProviderSource::ACCEPTED,
            Self::TtsProvider => TtsProviderSource::ACCEPTED,
            Self::DocProcessor => DocProcessorSource::ACCEPTED,
            Self::N8n
            | Self::SearxNg
            | Self::JupyterHub
            | Self::Backend
            | Self::OpenWebUi
            | Self::LocalDeepResearcher => ContainerOnlySource::ACCEPTED,
        }
    }

    pub fn default_source(&self) -> SourceSelection {
        match self {
            Self::LlmProvider => SourceSelection::LlmProvider(LlmProviderSource::DEFAULT),
            Self::ComfyUi => SourceSelection::ComfyUi(ComfyUiSource::DEFAULT),
            Self::Weaviate => SourceSelection::Weaviate(WeaviateSource::DEFAULT),
            Self::SttProvider => SourceSelection::SttProvider(SttProviderSource::DEFAULT),
            Self::TtsProvider => SourceSelection::TtsProvider(TtsProviderSource::DEFAULT),
            Self::DocProcessor => SourceSelection::DocProcessor(DocProcessorSource::DEFAULT),
            Self::N8n
            | Self::SearxNg
            | Self::JupyterHub
            | Self::Backend
            | Self::OpenWebUi
            | Self::LocalDeepResearcher => {
                SourceSelection::ContainerOnly(ContainerOnlySource::DEFAULT)
            }
        }
    }

    /// Parse a raw SOURCE literal against this service's accepted set.
    pub fn parse_source(&self, raw: &str) -> Result<SourceSelection, UnknownSource> {
        Ok(match self {
            Self::LlmProvider => SourceSelection::LlmProvider(raw.parse()?),
            Self::ComfyUi => SourceSelection::ComfyUi(raw.parse()?),
            Self::Weaviate => SourceSelection::Weaviate(raw.parse()?),
            Self::SttProvider => SourceSelection::SttProvider(raw.parse()?),
            Self::TtsProvider => SourceSelection::TtsProvider(raw.parse()?),
            Self::DocProcessor => SourceSelection::DocProcessor(raw.parse()?),
            Self::N8n
            | Self::SearxNg
            | Self::JupyterHub
            | Self::Backend
            | Self::OpenWebUi
            | Self::LocalDeepResearcher => SourceSelection::ContainerOnly(raw.parse()?),
        })
    }
}

fn container_only(
    display_name: &'static str,
    source_variable: &'static str,
    container_upstream: &'static str,
) -> ServiceDescriptor {
    ServiceDescriptor {
        display_name,
        source_variable,
        container_upstream,
        localhost_port: None,
        external_url_variable: None,
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
