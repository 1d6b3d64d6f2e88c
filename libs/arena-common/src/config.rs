// Runtime configuration for the judge harness
use crate::types::Language;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_LANGUAGES_PATH: &str = "config/languages.json";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_ENTRY_POINT: &str = "solution";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("language config file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse languages.json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown language '{0}' in languages.json")]
    UnknownLanguage(String),
    #[error("no languages configured in languages.json")]
    Empty,
    #[error("no configuration found for language: {0}")]
    Missing(Language),
}

/// Sandbox runtime settings for one language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageConfig {
    pub name: String,
    pub version: String,
    /// File name the source is submitted under (e.g. Main.java)
    pub file_name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub compile_timeout_ms: u64,
    pub run_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguagesJson {
    pub languages: Vec<LanguageConfig>,
}

impl LanguagesJson {
    /// Runtime set written by `arena-cli init`
    pub fn builtin() -> Self {
        let entry = |language: Language, version: &str, file_name: &str, compile_ms: u64| {
            LanguageConfig {
                name: language.tag().to_string(),
                version: version.to_string(),
                file_name: file_name.to_string(),
                aliases: language.aliases().into_iter().map(String::from).collect(),
                compile_timeout_ms: compile_ms,
                run_timeout_ms: 3000,
            }
        };

        Self {
            languages: vec![
                entry(Language::Java, "15.0.2", "Main.java", 10000),
                entry(Language::Cpp, "10.2.0", "main.cpp", 10000),
                entry(Language::Python, "3.10.0", "main.py", 0),
                entry(Language::Javascript, "18.15.0", "main.js", 0),
            ],
        }
    }
}

/// Language configuration manager
#[derive(Debug, Clone)]
pub struct LanguageConfigManager {
    configs: HashMap<Language, LanguageConfig>,
}

impl LanguageConfigManager {
    /// Load language configurations from languages.json
    pub fn load(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::NotFound(config_path.to_path_buf()));
        }

        let content = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.to_path_buf(),
            source,
        })?;

        Self::from_json(&content)
    }

    /// Load with default path (config/languages.json)
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load(Path::new(DEFAULT_LANGUAGES_PATH))
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let languages_json: LanguagesJson = serde_json::from_str(content)?;
        Self::from_languages(languages_json)
    }

    pub fn from_languages(languages_json: LanguagesJson) -> Result<Self, ConfigError> {
        let mut configs = HashMap::new();
        for lang in languages_json.languages {
            let language = Language::from_alias(&lang.name)
                .ok_or_else(|| ConfigError::UnknownLanguage(lang.name.clone()))?;
            configs.insert(language, lang);
        }

        if configs.is_empty() {
            return Err(ConfigError::Empty);
        }

        Ok(Self { configs })
    }

    /// Get configuration for a specific language
    pub fn get_config(&self, language: Language) -> Result<&LanguageConfig, ConfigError> {
        self.configs
            .get(&language)
            .ok_or(ConfigError::Missing(language))
    }

    /// List all configured languages, in a stable order
    pub fn list_languages(&self) -> Vec<Language> {
        Language::ALL
            .into_iter()
            .filter(|language| self.configs.contains_key(language))
            .collect()
    }
}

/// Process settings read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: String,
    pub languages_path: PathBuf,
    pub entry_point: String,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            bind_addr: lookup("ARENA_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            languages_path: lookup("ARENA_LANGUAGES_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LANGUAGES_PATH)),
            entry_point: lookup("ARENA_ENTRY_POINT")
                .unwrap_or_else(|| DEFAULT_ENTRY_POINT.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_every_language() {
        let manager = LanguageConfigManager::from_languages(LanguagesJson::builtin()).unwrap();
        assert_eq!(manager.list_languages(), Language::ALL.to_vec());
        assert_eq!(manager.get_config(Language::Java).unwrap().file_name, "Main.java");
    }

    #[test]
    fn test_from_json_resolves_aliases() {
        let json = r#"{"languages": [
            {"name": "c++", "version": "10.2.0", "file_name": "main.cpp",
             "compile_timeout_ms": 10000, "run_timeout_ms": 3000}
        ]}"#;
        let manager = LanguageConfigManager::from_json(json).unwrap();
        assert_eq!(manager.list_languages(), vec![Language::Cpp]);
        assert!(manager.get_config(Language::Cpp).unwrap().aliases.is_empty());
        assert!(matches!(
            manager.get_config(Language::Python),
            Err(ConfigError::Missing(Language::Python))
        ));
    }

    #[test]
    fn test_unknown_language_rejected() {
        let json = r#"{"languages": [
            {"name": "ruby", "version": "3", "file_name": "main.rb",
             "compile_timeout_ms": 0, "run_timeout_ms": 3000}
        ]}"#;
        let err = LanguageConfigManager::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownLanguage(ref name) if name == "ruby"));
    }

    #[test]
    fn test_empty_config_rejected() {
        let err = LanguageConfigManager::from_json(r#"{"languages": []}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Empty));
    }

    #[test]
    fn test_missing_file() {
        let err = LanguageConfigManager::load(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(settings.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(settings.languages_path, PathBuf::from(DEFAULT_LANGUAGES_PATH));
        assert_eq!(settings.entry_point, "solution");
    }

    #[test]
    fn test_settings_overrides() {
        let settings = Settings::from_lookup(|key| match key {
            "ARENA_BIND_ADDR" => Some("127.0.0.1:8080".to_string()),
            "ARENA_ENTRY_POINT" => Some("threeSum".to_string()),
            _ => None,
        });
        assert_eq!(settings.bind_addr, "127.0.0.1:8080");
        assert_eq!(settings.entry_point, "threeSum");
    }
}
