//! Application-level configuration loading, including filesystem layout and the
//! preserved-key set.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SCORECAST_CONFIG_PATH";

/// Port written into a fresh document when none is configured yet.
pub const DEFAULT_PORT: u16 = 8008;
/// Template selected when the document does not name one.
pub const DEFAULT_TEMPLATE: &str = "default";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Path of the persisted scoreboard document.
    pub data_file: PathBuf,
    /// Directory containing one folder per overlay template.
    pub templates_root: PathBuf,
    /// Directory where roster artifacts (`characters_<key>.json`) land.
    pub characters_dir: PathBuf,
    /// Argv used to invoke the external roster scraper.
    pub scraper_command: Vec<String>,
    /// Path of the job input descriptor handed to the scraper.
    pub descriptor_file: PathBuf,
    /// Document keys a client-submitted update can never overwrite.
    pub preserved_keys: Vec<String>,
    /// Port used when the document does not carry a valid one.
    pub default_port: u16,
    /// Template name used when the document does not carry one.
    pub default_template: String,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to baked-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(path = %path.display(), "loaded configuration");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Keys that `save_preserving` protects against client-submitted updates.
    pub fn preserved_keys(&self) -> &[String] {
        &self.preserved_keys
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("data.json"),
            templates_root: PathBuf::from("templates"),
            characters_dir: PathBuf::from("characters"),
            scraper_command: vec![
                "python".to_string(),
                "scripts/scraper_gamechars.py".to_string(),
            ],
            descriptor_file: PathBuf::from("gamename.json"),
            preserved_keys: default_preserved_keys(),
            default_port: DEFAULT_PORT,
            default_template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
///
/// Every field is optional; omitted fields keep their default.
struct RawConfig {
    data_file: Option<PathBuf>,
    templates_root: Option<PathBuf>,
    characters_dir: Option<PathBuf>,
    scraper_command: Option<Vec<String>>,
    descriptor_file: Option<PathBuf>,
    preserved_keys: Option<Vec<String>>,
    default_port: Option<u16>,
    default_template: Option<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            data_file: raw.data_file.unwrap_or(defaults.data_file),
            templates_root: raw.templates_root.unwrap_or(defaults.templates_root),
            characters_dir: raw.characters_dir.unwrap_or(defaults.characters_dir),
            scraper_command: raw.scraper_command.unwrap_or(defaults.scraper_command),
            descriptor_file: raw.descriptor_file.unwrap_or(defaults.descriptor_file),
            preserved_keys: raw.preserved_keys.unwrap_or(defaults.preserved_keys),
            default_port: raw.default_port.unwrap_or(defaults.default_port),
            default_template: raw.default_template.unwrap_or(defaults.default_template),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Server-owned document keys protected by default.
fn default_preserved_keys() -> Vec<String> {
    vec!["port".to_string(), "active_template".to_string()]
}
