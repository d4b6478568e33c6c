//! Service Configuration
//!
//! Layered with the `config` crate: struct defaults, then an optional TOML
//! file (`config/estimator.toml`, or the path in `ESTIMATOR_CONFIG`), then
//! `ESTIMATOR__SECTION__KEY` environment variables.

use anyhow::Context;
use config::{Config, ConfigError, Environment, File, FileFormat};
use data_validator::{ValidationConfig, Validator};
use feature_engine::{FeatureEncoder, RegionCatalog};
use inference_engine::{LoadPolicy, ModelFormat, ModelLoader, ModelSpec, PriceEstimator};
use serde::Deserialize;
use std::path::PathBuf;

use crate::rate_limit::RateLimitConfig;

/// Default config file, without extension
pub const DEFAULT_CONFIG_FILE: &str = "config/estimator";

/// Top-level settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub model: ModelSettings,
    pub regions: RegionSettings,
    /// Per-field bounds and form defaults
    pub bounds: ValidationConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub path: PathBuf,
    pub format: ModelFormat,
    /// Column schema exported alongside the model
    pub schema_path: Option<PathBuf>,
    pub policy: LoadPolicy,
    /// Load at startup instead of on the first request
    pub warm_on_start: bool,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("model/house_price.onnx"),
            format: ModelFormat::Auto,
            schema_path: None,
            policy: LoadPolicy::Cached,
            warm_on_start: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegionSettings {
    /// Regions with model coverage, in indicator column order
    pub supported: Vec<String>,
    /// Selectable regions without coverage
    pub unsupported: Vec<String>,
}

impl Default for RegionSettings {
    fn default() -> Self {
        let catalog = RegionCatalog::default();
        Self {
            supported: catalog.supported().to_vec(),
            unsupported: catalog.unsupported().to_vec(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Load from the config file and environment
    pub fn load() -> Result<Self, ConfigError> {
        let file = std::env::var("ESTIMATOR_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        Config::builder()
            .add_source(File::with_name(&file).required(false))
            .add_source(
                Environment::with_prefix("ESTIMATOR")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("regions.supported")
                    .with_list_parse_key("regions.unsupported")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Parse settings from TOML text
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// Region catalog described by `[regions]`
    pub fn catalog(&self) -> anyhow::Result<RegionCatalog> {
        RegionCatalog::new(self.regions.supported.clone(), self.regions.unsupported.clone())
            .context("invalid [regions] configuration")
    }

    /// Assemble the estimator described by these settings
    pub fn build_estimator(&self) -> anyhow::Result<PriceEstimator> {
        self.bounds.check().context("invalid [bounds] configuration")?;
        let encoder = FeatureEncoder::new(self.catalog()?);

        let spec = ModelSpec {
            path: self.model.path.clone(),
            format: self.model.format,
            schema_path: self.model.schema_path.clone(),
            width: encoder.width(),
        };
        let loader = ModelLoader::new(spec, self.model.policy);

        Ok(PriceEstimator::new(
            Validator::new(self.bounds.clone()),
            encoder,
            loader,
        ))
    }
}
