//! SOURCE selections.
//!
//! Every configurable service gets its own closed enumeration of accepted
//! `<SERVICE>_SOURCE` literals. Each literal maps onto a [`DeploymentMode`],
//! which is what the resolver and route builders branch on.

use std::{fmt, str::FromStr};

/// Where a service runs for this stack start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeploymentMode {
    /// Container inside the stack network (CPU image).
    Container,
    /// Container inside the stack network with GPU reservations.
    ContainerGpu,
    /// Process on the operator's machine, reached through the loopback bridge.
    Localhost,
    /// Operator-supplied URL outside the stack.
    External,
    /// Hosted API used directly by the applications; nothing to route.
    HostedApi,
    Disabled,
}

impl DeploymentMode {
    /// Whether the gateway should carry a route for this mode at all.
    pub fn is_routable(&self) -> bool {
        !matches!(self, Self::HostedApi | Self::Disabled)
    }
}

/// Returned when a literal is not one of a service's accepted SOURCE values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownSource;

macro_rules! source_enum {
    (
        $(#[$meta:meta])*
        $name:ident (default $default:ident) {
            $($variant:ident = $literal:literal => $mode:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ACCEPTED: &'static [&'static str] = &[$($literal),+];
            pub const DEFAULT: Self = Self::$default;

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $literal),+
                }
            }

            pub fn mode(&self) -> DeploymentMode {
                match self {
                    $(Self::$variant => DeploymentMode::$mode),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownSource;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                $(
                    if s.eq_ignore_ascii_case($literal) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(UnknownSource)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

source_enum! {
    /// `LLM_PROVIDER_SOURCE`
    LlmProviderSource (default OllamaContainerCpu) {
        OllamaContainerCpu = "ollama-container-cpu" => Container,
        OllamaContainerGpu = "ollama-container-gpu" => ContainerGpu,
        OllamaLocalhost = "ollama-localhost" => Localhost,
        OllamaExternal = "ollama-external" => External,
        Api = "api" => HostedApi,
        Disabled = "disabled" => Disabled,
    }
}

source_enum! {
    /// `COMFYUI_SOURCE`
    ComfyUiSource (default ContainerCpu) {
        ContainerCpu = "container-cpu" => Container,
        ContainerGpu = "container-gpu" => ContainerGpu,
        Localhost = "localhost" => Localhost,
        External = "external" => External,
        Disabled = "disabled" => Disabled,
    }
}

source_enum! {
    /// `WEAVIATE_SOURCE`
    WeaviateSource (default Container) {
        Container = "container" => Container,
        Localhost = "localhost" => Localhost,
        Disabled = "disabled" => Disabled,
    }
}

source_enum! {
    /// `STT_PROVIDER_SOURCE`
    SttProviderSource (default Disabled) {
        ParakeetContainerGpu = "parakeet-container-gpu" => ContainerGpu,
        ParakeetLocalhost = "parakeet-localhost" => Localhost,
        Disabled = "disabled" => Disabled,
    }
}

source_enum! {
    /// `TTS_PROVIDER_SOURCE`
    TtsProviderSource (default Disabled) {
        XttsContainerGpu = "xtts-container-gpu" => ContainerGpu,
        XttsLocalhost = "xtts-localhost" => Localhost,
        Disabled = "disabled" => Disabled,
    }
}

source_enum! {
    /// `DOC_PROCESSOR_SOURCE`
    DocProcessorSource (default Disabled) {
        DoclingContainerGpu = "docling-container-gpu" => ContainerGpu,
        DoclingLocalhost = "docling-localhost" => Localhost,
        Disabled = "disabled" => Disabled,
    }
}

source_enum! {
    /// Services that only ever run as a stack container: n8n, SearxNG,
    /// JupyterHub, the backend API, Open WebUI and the deep researcher.
    ContainerOnlySource (default Container) {
        Container = "container" => Container,
        Disabled = "disabled" => Disabled,
    }
}

/// A validated SOURCE value, tagged with the service it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceSelection {
    LlmProvider(LlmProviderSource),
    ComfyUi(ComfyUiSource),
    Weaviate(WeaviateSource),
    SttProvider(SttProviderSource),
    TtsProvider(TtsProviderSource),
    DocProcessor(DocProcessorSource),
    ContainerOnly(ContainerOnlySource),
}

impl SourceSelection {
    pub fn mode(&self) -> DeploymentMode {
        match self {
            Self::LlmProvider(s) => s.mode(),
            Self::ComfyUi(s) => s.mode(),
            Self::Weaviate(s) => s.mode(),
            Self::SttProvider(s) => s.mode(),
            Self::TtsProvider(s) => s.mode(),
            Self::DocProcessor(s) => s.mode(),
            Self::ContainerOnly(s) => s.mode(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LlmProvider(s) => s.as_str(),
            Self::ComfyUi(s) => s.as_str(),
            Self::Weaviate(s) => s.as_str(),
            Self::SttProvider(s) => s.as_str(),
            Self::TtsProvider(s) => s.as_str(),
            Self::DocProcessor(s) => s.as_str(),
            Self::ContainerOnly(s) => s.as_str(),
        }
    }
}

impl fmt::Display for SourceSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
