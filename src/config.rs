/// Application configuration
///
/// Values are layered: built-in defaults, then an optional TOML file in the
/// user's config directory, then `IMAGE_EDITOR_*` environment variables, and
/// finally `UNSPLASH_ACCESS_KEY` for the provider key. The key is never
/// compiled into the binary.
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Environment variable holding the provider access key
pub const ACCESS_KEY_ENV: &str = "UNSPLASH_ACCESS_KEY";

/// Largest page size the provider accepts
pub const MAX_PAGE_SIZE: u32 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Unsplash "Client-ID" access key
    pub access_key: Option<String>,
    /// Search endpoint URL
    pub search_endpoint: String,
    /// Number of results requested per search
    pub page_size: u32,
    /// Drawing surface width in pixels
    pub surface_width: u32,
    /// Drawing surface height in pixels
    pub surface_height: u32,
    /// Suggested file name for exports
    pub export_file_name: String,
    /// Timeout for every outbound HTTP request
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            access_key: None,
            search_endpoint: "https://api.unsplash.com/search/photos".to_string(),
            page_size: 12,
            surface_width: 800,
            surface_height: 600,
            export_file_name: "edited-image.png".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Path of the optional config file
    ///
    /// - Linux: ~/.config/image-editor-pro/config.toml
    /// - macOS: ~/Library/Application Support/image-editor-pro/config.toml
    /// - Windows: %APPDATA%\image-editor-pro\config.toml
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::Message("Could not determine config directory".to_string())
        })?;

        Ok(config_dir.join("image-editor-pro").join("config.toml"))
    }

    /// Load the configuration, falling back to defaults on any error.
    ///
    /// A broken config file must not keep the application from starting.
    pub fn load() -> Self {
        match Self::try_load() {
            Ok(config) => config,
            Err(e) => {
                warn!("⚠️  Invalid configuration ({}), using defaults", e);
                Self::default().with_access_key(access_key_from_env())
            }
        }
    }

    /// Write the default settings to `path` unless a file is already there.
    ///
    /// Returns whether a file was written. The access key is never written.
    pub fn write_template(path: &Path) -> Result<bool, ConfigError> {
        if path.exists() {
            return Ok(false);
        }

        let template = Self {
            access_key: None,
            ..Self::default()
        };
        let body = toml::to_string_pretty(&template)
            .map_err(|e| ConfigError::Message(format!("Could not serialize defaults: {e}")))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Could not create {}: {e}", parent.display()))
            })?;
        }
        std::fs::write(path, body)
            .map_err(|e| ConfigError::Message(format!("Could not write {}: {e}", path.display())))?;

        info!("📁 Wrote default configuration to {}", path.display());
        Ok(true)
    }

    /// Load from the config file and environment, then validate
    pub fn try_load() -> Result<Self, ConfigError> {
        let path = Self::config_path().ok();
        if let Some(path) = path.as_deref() {
            if let Err(e) = Self::write_template(path) {
                warn!("⚠️  {}", e);
            }
        }
        let env = Environment::with_prefix("IMAGE_EDITOR").try_parsing(true);

        let config =
            Self::from_sources(path.as_deref(), Some(env))?.with_access_key(access_key_from_env());
        config.validate()?;

        info!(
            "⚙️  Configuration loaded (page size {}, surface {}x{}, access key {})",
            config.page_size,
            config.surface_width,
            config.surface_height,
            if config.access_key().is_some() { "set" } else { "missing" }
        );

        Ok(config)
    }

    /// Build a configuration from an optional TOML file and environment source
    pub fn from_sources(file: Option<&Path>, env: Option<Environment>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = file {
            builder = builder.add_source(
                File::from(path.to_path_buf())
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }
        if let Some(env) = env {
            builder = builder.add_source(env);
        }

        builder.build()?.try_deserialize()
    }

    /// Let a key from `UNSPLASH_ACCESS_KEY` replace whatever the other layers set.
    ///
    /// A missing or blank key leaves the current value alone.
    pub fn with_access_key(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|key| !key.trim().is_empty()) {
            self.access_key = Some(key);
        }
        self
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::Message(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.page_size
            )));
        }
        if self.surface_width == 0 || self.surface_height == 0 {
            return Err(ConfigError::Message(format!(
                "surface size must be non-zero, got {}x{}",
                self.surface_width, self.surface_height
            )));
        }
        if !self.export_file_name.to_ascii_lowercase().ends_with(".png") {
            return Err(ConfigError::Message(format!(
                "export_file_name must end in .png, got '{}'",
                self.export_file_name
            )));
        }
        Ok(())
    }

    /// The access key, if one is set and non-blank
    pub fn access_key(&self) -> Option<&str> {
        self.access_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

fn access_key_from_env() -> Option<String> {
    std::env::var(ACCESS_KEY_ENV).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.export_file_name, "edited-image.png");
        assert_eq!((config.surface_width, config.surface_height), (800, 600));
        assert!(config.access_key().is_none());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let config = AppConfig::from_sources(Some(&path), None).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "page_size = 4").unwrap();
        writeln!(file, "access_key = \"abc123\"").unwrap();

        let config = AppConfig::from_sources(Some(file.path()), None).unwrap();
        assert_eq!(config.page_size, 4);
        assert_eq!(config.access_key(), Some("abc123"));
        assert_eq!(config.surface_width, 800);
    }

    #[test]
    fn test_template_round_trips_and_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        assert!(AppConfig::write_template(&path).unwrap());
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("page_size = 12"));
        assert!(!written.contains("access_key"));

        let config = AppConfig::from_sources(Some(&path), None).unwrap();
        assert_eq!(config, AppConfig::default());

        std::fs::write(&path, "page_size = 5\n").unwrap();
        assert!(!AppConfig::write_template(&path).unwrap());
        assert_eq!(AppConfig::from_sources(Some(&path), None).unwrap().page_size, 5);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.page_size = 0;
        assert!(config.validate().is_err());

        config.page_size = MAX_PAGE_SIZE + 1;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.surface_height = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.export_file_name = "edited-image.jpg".to_string();
        assert!(config.validate().is_err());
    }

    fn env(vars: &[(&str, &str)]) -> Environment {
        let vars: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix("IMAGE_EDITOR")
            .try_parsing(true)
            .source(Some(vars))
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "page_size = 4").unwrap();
        writeln!(file, "surface_width = 640").unwrap();

        let config = AppConfig::from_sources(
            Some(file.path()),
            Some(env(&[
                ("IMAGE_EDITOR_PAGE_SIZE", "20"),
                ("IMAGE_EDITOR_EXPORT_FILE_NAME", "poster.png"),
                ("UNRELATED_PAGE_SIZE", "3"),
            ])),
        )
        .unwrap();

        assert_eq!(config.page_size, 20);
        assert_eq!(config.export_file_name, "poster.png");
        assert_eq!(config.surface_width, 640);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_environment_values_are_validated() {
        let config =
            AppConfig::from_sources(None, Some(env(&[("IMAGE_EDITOR_PAGE_SIZE", "99")]))).unwrap();
        assert_eq!(config.page_size, 99);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_access_key_variable_wins() {
        let config = AppConfig::from_sources(
            None,
            Some(env(&[("IMAGE_EDITOR_ACCESS_KEY", "from-prefixed-env")])),
        )
        .unwrap();
        assert_eq!(config.access_key(), Some("from-prefixed-env"));

        let config = config.with_access_key(Some("from-unsplash-env".to_string()));
        assert_eq!(config.access_key(), Some("from-unsplash-env"));

        // Unset or blank keeps the layered value
        let config = config
            .with_access_key(None)
            .with_access_key(Some("  ".to_string()));
        assert_eq!(config.access_key(), Some("from-unsplash-env"));
    }

    #[test]
    fn test_blank_access_key_is_missing() {
        let config = AppConfig {
            access_key: Some("   ".to_string()),
            ..AppConfig::default()
        };
        assert!(config.access_key().is_none());
    }
}
