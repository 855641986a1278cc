use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "https://api.semanticscholar.org/graph/v1";
const DEFAULT_PAGE_DELAY_MS: u64 = 1000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found at {0}; copy config.example.toml to config.toml and fill it in")]
    Missing(PathBuf),
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// On-disk TOML configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub author: AuthorConfig,
    pub zotero: ZoteroConfig,
    pub paths: PathsConfig,
    #[serde(default)]
    pub api: ApiConfig,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorConfig {
    /// Semantic Scholar author id.
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZoteroConfig {
    pub db_path: PathBuf,
    /// Collection whose children each hold one authored publication.
    pub root_collection: String,
    /// Name of the sub-collection holding the works citing a publication.
    pub citations_collection: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    pub output_impact_graph: PathBuf,
    pub output_pubs: PathBuf,
    pub output_diet: PathBuf,
    pub venue_map: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub page_delay_ms: Option<u64>,
}

impl Config {
    /// Load the config at `path`. Relative paths inside it are taken relative to its directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.resolve(&self.zotero.db_path)
    }

    pub fn venue_map_path(&self) -> PathBuf {
        self.resolve(&self.paths.venue_map)
    }

    pub fn api_base(&self) -> &str {
        self.api
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/')
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.api.page_delay_ms.unwrap_or(DEFAULT_PAGE_DELAY_MS))
    }
}
