use crate::error::MusicMindError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Which embedding model implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Ollama HTTP API
    Ollama,
    /// Offline hashed bag-of-words
    Hash,
}

impl FromStr for EmbeddingBackend {
    type Err = MusicMindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "hash" => Ok(Self::Hash),
            other => Err(MusicMindError::config(format!(
                "Unknown embedding backend '{}' (expected 'ollama' or 'hash')",
                other
            ))),
        }
    }
}

/// MusicMind application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Song catalog JSON file
    pub catalog_path: PathBuf,

    /// Embedding backend
    pub embedding_backend: EmbeddingBackend,

    /// Ollama API base URL
    pub ollama_base_url: String,

    /// Embedding model name
    pub embedding_model: String,

    /// Vector dimension for the hash backend
    pub embedding_dim: usize,

    /// Number of results when a request does not ask for a specific count
    pub default_top_k: usize,

    /// Load the catalog at startup instead of on the first search
    pub preload_catalog: bool,

    /// Server bind address
    pub server_host: String,

    /// Server port
    pub server_port: u16,

    /// Log directory
    pub log_dir: PathBuf,

    /// Log level
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("./data/songs.json"),
            embedding_backend: EmbeddingBackend::Ollama,
            ollama_base_url: "http://localhost:11434".to_string(),
            embedding_model: "all-minilm".to_string(),
            embedding_dim: 384,
            default_top_k: 5,
            preload_catalog: false,
            server_host: "0.0.0.0".to_string(),
            server_port: 8000,
            log_dir: PathBuf::from("./log"),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self, MusicMindError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        let defaults = Self::default();

        let embedding_backend = match std::env::var("EMBEDDING_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => defaults.embedding_backend,
        };

        let config = Self {
            catalog_path: Self::get_env_path("CATALOG_PATH")
                .unwrap_or(defaults.catalog_path),
            embedding_backend,
            ollama_base_url: std::env::var("OLLAMA_BASE_URL")
                .unwrap_or(defaults.ollama_base_url),
            embedding_model: std::env::var("EMBEDDING_MODEL")
                .unwrap_or(defaults.embedding_model),
            embedding_dim: Self::get_env_parsed("EMBEDDING_DIM")
                .unwrap_or(defaults.embedding_dim),
            default_top_k: Self::get_env_parsed("DEFAULT_TOP_K")
                .unwrap_or(defaults.default_top_k),
            preload_catalog: std::env::var("PRELOAD_CATALOG")
                .ok()
                .and_then(|s| parse_bool(&s))
                .unwrap_or(defaults.preload_catalog),
            server_host: std::env::var("SERVER_HOST")
                .unwrap_or(defaults.server_host),
            server_port: Self::get_env_parsed("SERVER_PORT")
                .unwrap_or(defaults.server_port),
            log_dir: Self::get_env_path("LOG_DIR")
                .unwrap_or(defaults.log_dir),
            log_level: std::env::var("LOG_LEVEL")
                .unwrap_or(defaults.log_level),
        };

        config.validate()?;

        Ok(config)
    }

    /// Get PathBuf from environment variable
    fn get_env_path(key: &str) -> Option<PathBuf> {
        std::env::var(key).ok().map(PathBuf::from)
    }

    /// Get a parsed value from environment variable, ignoring unparsable values
    fn get_env_parsed<T: FromStr>(key: &str) -> Option<T> {
        std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
    }

    /// Get server bind address (host:port)
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), MusicMindError> {
        if self.embedding_model.trim().is_empty() {
            return Err(MusicMindError::config("Embedding model name cannot be empty"));
        }

        if self.embedding_backend == EmbeddingBackend::Ollama
            && !self.ollama_base_url.starts_with("http://")
            && !self.ollama_base_url.starts_with("https://")
        {
            return Err(MusicMindError::config(
                "Ollama base URL must start with http:// or https://",
            ));
        }

        if self.embedding_dim == 0 {
            return Err(MusicMindError::config("Embedding dimension cannot be 0"));
        }

        if self.default_top_k == 0 {
            return Err(MusicMindError::config("Default top_k cannot be 0"));
        }

        if self.server_port == 0 {
            return Err(MusicMindError::config("Server port cannot be 0"));
        }

        Ok(())
    }
}

/// Parse a boolean flag the way .env files usually spell them
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
