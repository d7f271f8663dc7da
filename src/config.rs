use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::DisplaySettings;
use crate::models::{FeatureSchema, PlayerPosition};
use crate::services::{ArtifactLocation, FileArtifactSource};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub models: ModelSettings,
    #[serde(default)]
    pub valuation: ValuationSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelSettings {
    /// Base directory for relative artifact paths
    #[serde(default = "default_model_dir")]
    pub dir: PathBuf,
    /// Load all position models before accepting requests
    #[serde(default = "default_preload")]
    pub preload: bool,
    pub defender: ArtifactSettings,
    pub midfielder: ArtifactSettings,
    pub attacker: ArtifactSettings,
}

/// One position's artifact file and the schema it must declare
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactSettings {
    pub path: PathBuf,
    #[serde(default)]
    pub schema: FeatureSchema,
}

fn default_model_dir() -> PathBuf { PathBuf::from("artifacts") }
fn default_preload() -> bool { true }

impl ModelSettings {
    pub fn for_position(&self, position: PlayerPosition) -> &ArtifactSettings {
        match position {
            PlayerPosition::Defender => &self.defender,
            PlayerPosition::Midfielder => &self.midfielder,
            PlayerPosition::Attacker => &self.attacker,
        }
    }

    /// Artifact path with the base directory applied
    pub fn resolve_path(&self, position: PlayerPosition) -> PathBuf {
        let path = &self.for_position(position).path;
        if path.is_absolute() {
            path.clone()
        } else {
            self.dir.join(path)
        }
    }

    /// Build the file-backed artifact source for all positions
    pub fn artifact_source(&self) -> FileArtifactSource {
        PlayerPosition::ALL
            .iter()
            .fold(FileArtifactSource::new(), |source, position| {
                source.with_location(
                    *position,
                    ArtifactLocation {
                        path: self.resolve_path(*position),
                        schema: self.for_position(*position).schema,
                    },
                )
            })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValuationSettings {
    #[serde(default = "default_label")]
    pub label: String,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

impl Default for ValuationSettings {
    fn default() -> Self {
        Self {
            label: default_label(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

impl From<&ValuationSettings> for DisplaySettings {
    fn from(settings: &ValuationSettings) -> Self {
        DisplaySettings {
            label: settings.label.clone(),
            currency_symbol: settings.currency_symbol.clone(),
        }
    }
}

fn default_label() -> String { "Estimated Market Value".to_string() }
fn default_currency_symbol() -> String { "€".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            other => Err(ConfigError::Message(format!("unknown log format '{}'", other))),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingSettings {
    /// Apply `LOG_LEVEL` / `LOG_FORMAT` on top of the configured values
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.overridden(std::env::var("LOG_LEVEL").ok(), std::env::var("LOG_FORMAT").ok())
    }

    fn overridden(mut self, level: Option<String>, format: Option<String>) -> Result<Self, ConfigError> {
        if let Some(level) = level.filter(|l| !l.trim().is_empty()) {
            self.level = level;
        }
        if let Some(format) = format.filter(|f| !f.trim().is_empty()) {
            self.format = format.parse()?;
        }
        Ok(self)
    }
}

fn default_log_level() -> String { "info".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with VALUATION__)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., VALUATION__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("VALUATION")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("VALUATION")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply shorthand environment overrides
///
/// `MODEL_DIR` replaces the artifact base directory, so deployments can mount
/// models anywhere without touching the config file.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    let mut builder = Config::builder().add_source(settings);

    if let Ok(dir) = std::env::var("MODEL_DIR") {
        builder = builder.set_override("models.dir", dir)?;
    }

    builder.build()
}
