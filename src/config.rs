use crate::store::{JsonFileStore, MemoryStore, PostgrestStore, RemoteStore};
use std::{env, path::PathBuf, sync::Arc};
use thiserror::Error;
use tokio::fs;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/practice.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid PORT '{0}'")]
    InvalidPort(String),

    #[error("unknown PRACTICE_STORE '{0}' (expected file, postgrest or memory)")]
    UnknownBackend(String),

    #[error("{0} must be set for the postgrest store")]
    Missing(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    File(PathBuf),
    Postgrest { url: String, api_key: String },
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub backend: StoreBackend,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(value.clone()))?,
            None => DEFAULT_PORT,
        };

        let url = lookup("PRACTICE_STORE_URL").filter(|value| !value.trim().is_empty());
        let kind = lookup("PRACTICE_STORE")
            .map(|value| value.trim().to_ascii_lowercase())
            .unwrap_or_else(|| {
                let default = if url.is_some() { "postgrest" } else { "file" };
                default.to_string()
            });

        let backend = match kind.as_str() {
            "file" => StoreBackend::File(
                lookup("APP_DATA_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH)),
            ),
            "postgrest" => StoreBackend::Postgrest {
                url: url.ok_or(ConfigError::Missing("PRACTICE_STORE_URL"))?,
                api_key: lookup("PRACTICE_STORE_KEY")
                    .filter(|value| !value.trim().is_empty())
                    .ok_or(ConfigError::Missing("PRACTICE_STORE_KEY"))?,
            },
            "memory" => StoreBackend::Memory,
            other => return Err(ConfigError::UnknownBackend(other.to_string())),
        };

        Ok(Self { port, backend })
    }

    pub async fn open_store(&self) -> Result<Arc<dyn RemoteStore>, ConfigError> {
        let store: Arc<dyn RemoteStore> = match &self.backend {
            StoreBackend::File(path) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).await?;
                }
                Arc::new(JsonFileStore::open(path).await)
            }
            StoreBackend::Postgrest { url, api_key } => {
                Arc::new(PostgrestStore::new(url.as_str(), api_key.as_str()))
            }
            StoreBackend::Memory => Arc::new(MemoryStore::default()),
        };
        Ok(store)
    }
}
