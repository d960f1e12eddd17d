//! Shared configuration loader for folio.
//!
//! `defaults/folio.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`FolioConfig`].
//!
//! The CLI layers, lowest first: defaults, `./folio.toml`, `--config`, the
//! notebook's own `notebook.toml`, then `FOLIO_*` environment variables.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, ValueKind};
use folio_notebook::NotebookSettings;
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/folio.default.toml");

/// Top-level configuration consumed by folio applications.
#[derive(Debug, Clone, Deserialize)]
pub struct FolioConfig {
    pub notebook: NotebookConfig,
    pub logging: LoggingConfig,
    pub inspect: InspectConfig,
}

/// Per-notebook defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct NotebookConfig {
    pub default_file_format: String,
    pub default_file_extension: String,
    pub case_sensitive_links: bool,
}

impl From<NotebookConfig> for NotebookSettings {
    fn from(config: NotebookConfig) -> Self {
        NotebookSettings {
            default_dialect: config.default_file_format,
            default_extension: config.default_file_extension,
            case_sensitive_links: config.case_sensitive_links,
        }
    }
}

impl From<&NotebookConfig> for NotebookSettings {
    fn from(config: &NotebookConfig) -> Self {
        NotebookSettings {
            default_dialect: config.default_file_format.clone(),
            default_extension: config.default_file_extension.clone(),
            case_sensitive_links: config.case_sensitive_links,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// The filter string understood by `env_logger` and `RUST_LOG`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Controls inspect output.
#[derive(Debug, Clone, Deserialize)]
pub struct InspectConfig {
    pub pretty: bool,
}

/// Name of the settings file kept in a notebook's root folder.
pub const NOTEBOOK_FILE: &str = "notebook.toml";

/// Prefix of environment variables read by [`Loader::with_env`], e.g.
/// `FOLIO_NOTEBOOK__CASE_SENSITIVE_LINKS=true`.
pub const ENV_PREFIX: &str = "FOLIO";

/// Layers configuration sources over the built-in defaults. Later layers win.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.layer_file(path.as_ref(), true)
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Self {
        self.layer_file(path.as_ref(), false)
    }

    /// Layer the `notebook.toml` of the notebook at `root`, if it has one.
    pub fn with_notebook(self, root: impl AsRef<Path>) -> Self {
        self.layer_file(&root.as_ref().join(NOTEBOOK_FILE), false)
    }

    /// Layer `FOLIO_<SECTION>__<KEY>` environment variables.
    pub fn with_env(mut self) -> Self {
        let source = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<FolioConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }

    fn layer_file(mut self, path: &Path, required: bool) -> Self {
        let source = File::from(path)
            .format(FileFormat::Toml)
            .required(required);
        self.builder = self.builder.add_source(source);
        self
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<FolioConfig, ConfigError> {
    Loader::new().build()
}
