//! Converter configuration
//!
//! A conversion is configured in layers, later layers winning key by key:
//!
//!     1. the built-in table `defaults/md2aditor.default.toml` (compiled in)
//!     2. TOML files given with `--config`, in order
//!     3. single keys from command-line flags (`--base-path`, `--intercept`, `--offline`) and
//!        the notes settings' working directory
//!
//! Every key has a built-in value, so a user file only needs the keys it changes.

use crate::aditor::assets::{AssetResolver, HttpFetcher};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const DEFAULT_TOML: &str = include_str!("../../defaults/md2aditor.default.toml");

/// Top-level configuration of a conversion.
#[derive(Debug, Clone, Deserialize)]
pub struct ConverterConfig {
    pub assets: AssetsConfig,
    pub output: OutputConfig,
}

/// How image references are resolved.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetsConfig {
    pub base_path: String,
    pub intercept: String,
    pub fetch_remote: bool,
    pub fetch_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub aditor_version: String,
    pub egbenz_version: String,
    pub indent: usize,
}

impl ConverterConfig {
    /// Resolver matching the asset settings.
    pub fn asset_resolver(&self) -> AssetResolver {
        let (base_path, intercept) = (&self.assets.base_path, &self.assets.intercept);
        if self.assets.fetch_remote {
            let timeout = Duration::from_secs(self.assets.fetch_timeout_secs);
            AssetResolver::with_fetcher_for(base_path, intercept, HttpFetcher::new(timeout))
        } else {
            AssetResolver::offline(base_path, intercept)
        }
    }
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            assets: AssetsConfig {
                base_path: "/".to_string(),
                intercept: "static".to_string(),
                fetch_remote: true,
                fetch_timeout_secs: 10,
            },
            output: OutputConfig {
                aditor_version: "0.0.15".to_string(),
                egbenz_version: "0.0.7".to_string(),
                indent: 4,
            },
        }
    }
}

/// Stacks configuration layers and produces a [ConverterConfig].
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// A loader holding only the built-in table.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Add a TOML file on top of the current layers. [Loader::build] fails if it is absent.
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.with_toml(path.as_ref(), true)
    }

    /// Add a TOML file that is skipped when absent, such as a per-user file.
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Self {
        self.with_toml(path.as_ref(), false)
    }

    fn with_toml(mut self, path: &Path, required: bool) -> Self {
        let source = File::from(path).format(FileFormat::Toml).required(required);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Pin one dotted key (`assets.intercept`, `output.indent`, ...) above every file layer.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Merge the layers. Unknown keys are ignored; a value of the wrong type is an error.
    pub fn build(self) -> Result<ConverterConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The built-in configuration alone.
pub fn load_defaults() -> Result<ConverterConfig, ConfigError> {
    Loader::new().build()
}
