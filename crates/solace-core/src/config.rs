use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, SolaceError};
use crate::types::{Language, Partition};

/// Top-level configuration for the Solace application.
///
/// Loaded from `~/.solace/config.toml` by default. Every section falls back
/// to its defaults when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolaceConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

impl SolaceConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SolaceConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| SolaceError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory holding the snapshot cache database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.solace/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Remote content store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Base URL of the passage API. `None` runs from the local cache only.
    pub base_url: Option<String>,
    /// Passages requested per remote fetch, regardless of the caller's limit.
    pub prefetch_size: usize,
    /// Upper bound for a single remote call.
    pub timeout_ms: u64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            prefetch_size: 200,
            timeout_ms: 5_000,
        }
    }
}

/// Translation backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Inference API root; the model path is appended per target language.
    pub endpoint: String,
    /// Bearer token. Without one, translation is a pass-through.
    pub api_token: Option<String>,
    /// Upper bound for a single translation call.
    pub timeout_ms: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api-inference.huggingface.co/models".to_string(),
            api_token: None,
            timeout_ms: 8_000,
        }
    }
}

impl TranslationConfig {
    /// Token from `HUGGINGFACE_API_TOKEN` when set, otherwise the configured one.
    pub fn resolve_token(&self) -> Option<String> {
        std::env::var("HUGGINGFACE_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.api_token.clone().filter(|t| !t.trim().is_empty()))
    }
}

/// Conversation defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub default_partition: Partition,
    pub default_language: Language,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_partition: Partition::Mahabharata,
            default_language: Language::En,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = SolaceConfig::default();
        assert_eq!(config.general.data_dir, "~/.solace/data");
        assert_eq!(config.general.log_level, "info");
        assert!(config.content.base_url.is_none());
        assert_eq!(config.content.prefetch_size, 200);
        assert_eq!(config.content.timeout_ms, 5_000);
        assert_eq!(
            config.translation.endpoint,
            "https://api-inference.huggingface.co/models"
        );
        assert!(config.translation.api_token.is_none());
        assert_eq!(config.translation.timeout_ms, 8_000);
        assert_eq!(config.chat.default_partition, Partition::Mahabharata);
        assert_eq!(config.chat.default_language, Language::En);
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[general]
data_dir = "/tmp/solace"
log_level = "debug"

[content]
base_url = "http://localhost:8080"
prefetch_size = 50
timeout_ms = 1500

[translation]
api_token = "hf_abc"

[chat]
default_partition = "quran"
default_language = "ur"
"#;
        let file = create_temp_config(content);
        let config = SolaceConfig::load(file.path()).unwrap();

        assert_eq!(config.general.data_dir, "/tmp/solace");
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(
            config.content.base_url.as_deref(),
            Some("http://localhost:8080")
        );
        assert_eq!(config.content.prefetch_size, 50);
        assert_eq!(config.content.timeout_ms, 1500);
        assert_eq!(config.translation.api_token.as_deref(), Some("hf_abc"));
        assert_eq!(config.translation.timeout_ms, 8_000);
        assert_eq!(config.chat.default_partition, Partition::Quran);
        assert_eq!(config.chat.default_language, Language::Ur);
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let file = create_temp_config("[content]\nprefetch_size = 10\n");
        let config = SolaceConfig::load(file.path()).unwrap();
        assert_eq!(config.content.prefetch_size, 10);
        assert_eq!(config.content.timeout_ms, 5_000);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_load_unknown_partition_is_error() {
        let file = create_temp_config("[chat]\ndefault_partition = \"gita\"\n");
        let result = SolaceConfig::load(file.path());
        assert!(matches!(result, Err(SolaceError::Config(_))));
    }

    #[test]
    fn test_load_invalid_toml() {
        let file = create_temp_config("this is {{ not valid TOML");
        assert!(SolaceConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = SolaceConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.general.data_dir, "~/.solace/data");
    }

    #[test]
    fn test_save_creates_parent_dirs_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("dir").join("config.toml");

        let mut config = SolaceConfig::default();
        config.content.base_url = Some("https://passages.example".to_string());
        config.chat.default_language = Language::Te;
        config.save(&path).unwrap();

        assert!(path.exists());
        let reloaded = SolaceConfig::load(&path).unwrap();
        assert_eq!(
            reloaded.content.base_url.as_deref(),
            Some("https://passages.example")
        );
        assert_eq!(reloaded.chat.default_language, Language::Te);
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let file = create_temp_config("");
        let config = SolaceConfig::load(file.path()).unwrap();
        assert_eq!(config.content.prefetch_size, 200);
        assert_eq!(config.chat.default_partition, Partition::Mahabharata);
    }
}
