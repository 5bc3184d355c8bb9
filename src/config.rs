//! Environment configuration.

use crate::domain::error::DomainError;
use crate::domain::values::launch_strategy::{HealthPolicy, LaunchStrategy};
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_COLLECTION: &str = "documents";
pub const DEFAULT_DATA_DIR: &str = "./chroma_data";
pub const DEFAULT_CONTAINER_NAME: &str = "chromadb";
/// Pinned to the last release line that serves the `/api/v1` REST API the
/// client speaks; 1.x images answer only on `/api/v2`.
pub const DEFAULT_CONTAINER_IMAGE: &str = "chromadb/chroma:0.5.23";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
    DashScope,
    OpenAi,
}

impl EmbeddingBackend {
    /// Environment variable holding this backend's credential.
    pub fn credential_var(&self) -> &'static str {
        match self {
            EmbeddingBackend::DashScope => "DASHSCOPE_API_KEY",
            EmbeddingBackend::OpenAi => "OPENAI_API_KEY",
        }
    }
}

impl FromStr for EmbeddingBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dashscope" => Ok(EmbeddingBackend::DashScope),
            "openai" => Ok(EmbeddingBackend::OpenAi),
            _ => Err(format!("Unknown embedding provider: {s}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmbeddingSettings {
    pub backend: EmbeddingBackend,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub url: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub strategies: Vec<LaunchStrategy>,
    pub health: HealthPolicy,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub collection: String,
    pub engine: EngineSettings,
    pub embedding: EmbeddingSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, DomainError> {
        let project_root = std::env::current_dir()
            .map_err(|e| DomainError::Configuration(format!("cannot resolve working directory: {e}")))?;
        Self::from_lookup(|key| std::env::var(key).ok(), &project_root)
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F, project_root: &Path) -> Result<Self, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or_default = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let port = match var("CHROMA_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                DomainError::Configuration(format!("Failed to parse CHROMA_PORT '{raw}': {e}"))
            })?,
            None => DEFAULT_PORT,
        };
        let url = var("CHROMA_SERVER_URL").unwrap_or_else(|| format!("http://localhost:{port}"));

        let data_dir = PathBuf::from(or_default("CHROMA_DATA_PATH", DEFAULT_DATA_DIR));
        let data_dir = if data_dir.is_absolute() {
            data_dir
        } else {
            let relative: PathBuf = data_dir
                .components()
                .filter(|c| !matches!(c, Component::CurDir))
                .collect();
            project_root.join(relative)
        };

        let home = var("HOME").or_else(|| var("USERPROFILE")).map(PathBuf::from);
        let strategies = LaunchStrategy::defaults(
            home.as_deref(),
            project_root,
            &or_default("DOCVEC_CONTAINER_NAME", DEFAULT_CONTAINER_NAME),
            &or_default("DOCVEC_CONTAINER_IMAGE", DEFAULT_CONTAINER_IMAGE),
        );

        let backend: EmbeddingBackend = or_default("DOCVEC_EMBEDDING_PROVIDER", "dashscope")
            .parse()
            .map_err(DomainError::Configuration)?;

        Ok(Self {
            collection: or_default("DOCVEC_COLLECTION", DEFAULT_COLLECTION),
            engine: EngineSettings {
                url,
                port,
                data_dir,
                strategies,
                health: HealthPolicy::default(),
            },
            embedding: EmbeddingSettings {
                backend,
                api_key: var(backend.credential_var()),
                model: var("DOCVEC_EMBEDDING_MODEL"),
                base_url: var("DOCVEC_EMBEDDING_BASE_URL"),
            },
        })
    }
}
