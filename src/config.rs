//! Configuration for the QA grader.
//!
//! Supports both environment variables and YAML config file.
//! Environment variables take precedence over config file values.

use crate::error::{GraderError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Ollama endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server (e.g., "http://localhost:11434")
    pub host: String,

    /// Context window hint passed to the model, allowing long combined
    /// prompt+context without truncation.
    #[serde(default = "default_num_ctx")]
    pub num_ctx: u32,
}

fn default_num_ctx() -> u32 {
    40950
}

fn default_host() -> String {
    "http://localhost:11434".to_string()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            num_ctx: default_num_ctx(),
        }
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Ollama settings
    pub ollama: OllamaConfig,
}

/// Configuration file structure (YAML format).
#[derive(Debug, Deserialize)]
struct ConfigFile {
    ollama: Option<OllamaFileSection>,
}

#[derive(Debug, Deserialize)]
struct OllamaFileSection {
    host: Option<String>,
    num_ctx: Option<u32>,
}

impl Config {
    /// Load configuration from environment variables and optional config file.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (OLLAMA_HOST, GRADER_NUM_CTX)
    /// 2. Config file (~/.config/qa-grader/config.yaml)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        // Try to load from config file first
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                config = Self::load_from_file(&config_path)?;
            }
        }

        // Override with environment variables
        if let Ok(host) = env::var("OLLAMA_HOST") {
            config.ollama.host = host;
        }

        if let Ok(num_ctx) = env::var("GRADER_NUM_CTX") {
            if let Ok(n) = num_ctx.parse() {
                config.ollama.num_ctx = n;
            }
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GraderError::io(path, e))?;

        let file_config: ConfigFile = serde_yaml::from_str(&content)
            .map_err(|e| GraderError::Config(format!("Failed to parse config file: {}", e)))?;

        let mut config = Config::default();

        if let Some(ollama) = file_config.ollama {
            if let Some(host) = ollama.host {
                config.ollama.host = host;
            }
            if let Some(num_ctx) = ollama.num_ctx {
                config.ollama.num_ctx = num_ctx;
            }
        }

        Ok(config)
    }

    /// Get the default config file path.
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "qa-grader")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Validate that required configuration is present.
    pub fn validate(&self) -> Result<()> {
        if self.ollama.host.is_empty() {
            return Err(GraderError::Config(
                "Ollama host is required. Set OLLAMA_HOST environment variable or add to config file.".to_string()
            ));
        }

        Ok(())
    }

    /// Create a config from explicit values (useful for testing).
    pub fn with_ollama(host: impl Into<String>, num_ctx: u32) -> Self {
        Self {
            ollama: OllamaConfig {
                host: host.into(),
                num_ctx,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ollama.host, "http://localhost:11434");
        assert_eq!(config.ollama.num_ctx, 40950);
    }

    #[test]
    fn test_validate_fails_without_host() {
        let config = Config::with_ollama("", 4096);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_with_ollama() {
        let config = Config::with_ollama("http://10.0.0.2:11434", 8192);
        assert_eq!(config.ollama.host, "http://10.0.0.2:11434");
        assert_eq!(config.ollama.num_ctx, 8192);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "ollama:\n  host: http://gpu-box:11434\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.ollama.host, "http://gpu-box:11434");
        // Unset fields fall back to defaults
        assert_eq!(config.ollama.num_ctx, 40950);
    }
}
