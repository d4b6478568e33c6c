//! Model Loading and Caching

use crate::model::{LinearModel, Model};
use crate::onnx::OnnxModel;
use crate::InferenceError;
use feature_engine::FeatureSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// On-disk format of the model artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelFormat {
    /// Pick from the file extension: `.json` is linear, anything else ONNX
    #[default]
    Auto,
    Onnx,
    LinearJson,
}

impl ModelFormat {
    fn resolve(self, path: &std::path::Path) -> ModelFormat {
        match self {
            ModelFormat::Auto => match path.extension().and_then(|e| e.to_str()) {
                Some(ext) if ext.eq_ignore_ascii_case("json") => ModelFormat::LinearJson,
                _ => ModelFormat::Onnx,
            },
            other => other,
        }
    }
}

/// When the model artifact is read from disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadPolicy {
    /// Load once, keep for the process lifetime
    #[default]
    Cached,
    /// Load fresh for every prediction
    PerRequest,
}

/// Where and how to load a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub path: PathBuf,
    pub format: ModelFormat,
    /// Stored column schema shipped with the artifact
    pub schema_path: Option<PathBuf>,
    /// Feature row width the encoder produces
    pub width: usize,
}

impl ModelSpec {
    /// Read the artifact (and its schema, when configured) from disk
    pub fn load(&self) -> Result<LoadedModel, InferenceError> {
        let model: Box<dyn Model> = match self.format.resolve(&self.path) {
            ModelFormat::LinearJson => Box::new(LinearModel::load(&self.path)?),
            _ => Box::new(OnnxModel::load(&self.path, self.width)?),
        };

        let schema = match &self.schema_path {
            Some(path) => Some(FeatureSchema::from_json_file(path)?),
            None => None,
        };

        Ok(LoadedModel::new(model, schema))
    }
}

/// A model ready for inference plus the schema it was trained against
pub struct LoadedModel {
    model: Box<dyn Model>,
    schema: Option<FeatureSchema>,
}

impl LoadedModel {
    pub fn new(model: Box<dyn Model>, schema: Option<FeatureSchema>) -> Self {
        Self { model, schema }
    }

    pub fn model(&self) -> &dyn Model {
        self.model.as_ref()
    }

    /// Stored schema, if the artifact shipped one
    pub fn schema(&self) -> Option<&FeatureSchema> {
        self.schema.as_ref()
    }
}

enum Source {
    File(ModelSpec),
    Preloaded(Arc<LoadedModel>),
}

/// Hands out models according to a [`LoadPolicy`]
pub struct ModelLoader {
    source: Source,
    policy: LoadPolicy,
    cache: Mutex<Option<Arc<LoadedModel>>>,
}

impl ModelLoader {
    /// Create a loader reading `spec` from disk
    pub fn new(spec: ModelSpec, policy: LoadPolicy) -> Self {
        info!(
            "Creating model loader: path={}, policy={:?}",
            spec.path.display(),
            policy
        );
        Self {
            source: Source::File(spec),
            policy,
            cache: Mutex::new(None),
        }
    }

    /// Wrap a model that is already in memory
    pub fn preloaded(model: LoadedModel) -> Self {
        info!("Creating model loader for in-memory model: {}", model.model().describe());
        Self {
            source: Source::Preloaded(Arc::new(model)),
            policy: LoadPolicy::Cached,
            cache: Mutex::new(None),
        }
    }

    pub fn policy(&self) -> LoadPolicy {
        self.policy
    }

    /// Get a model, loading it if the policy requires
    ///
    /// A failed load is never cached; the next call tries again.
    pub fn acquire(&self) -> Result<Arc<LoadedModel>, InferenceError> {
        let spec = match &self.source {
            Source::Preloaded(model) => return Ok(model.clone()),
            Source::File(spec) => spec,
        };

        if self.policy == LoadPolicy::PerRequest {
            debug!("Loading model for this request");
            return spec.load().map(Arc::new).map_err(log_load_failure);
        }

        let mut cache = self
            .cache
            .lock()
            .map_err(|e| InferenceError::ModelLoadError(format!("Lock error: {}", e)))?;

        if let Some(model) = cache.as_ref() {
            return Ok(model.clone());
        }

        let model = Arc::new(spec.load().map_err(log_load_failure)?);
        info!("Model cached: {}", model.model().describe());
        *cache = Some(model.clone());
        Ok(model)
    }

    /// Load eagerly so the first request does not pay for it
    pub fn warm(&self) -> Result<(), InferenceError> {
        self.acquire().map(|_| ())
    }

    /// Whether a model is in memory right now
    pub fn is_loaded(&self) -> bool {
        match &self.source {
            Source::Preloaded(_) => true,
            Source::File(_) => self.cache.lock().map(|c| c.is_some()).unwrap_or(false),
        }
    }

    /// Description of the model in memory, if any
    pub fn describe(&self) -> Option<String> {
        match &self.source {
            Source::Preloaded(model) => Some(model.model().describe()),
            Source::File(_) => self
                .cache
                .lock()
                .ok()
                .and_then(|c| c.as_ref().map(|m| m.model().describe())),
        }
    }
}

fn log_load_failure(e: InferenceError) -> InferenceError {
    warn!("Model load failed: {}", e);
    e
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("loader-{}-{}", std::process::id(), name))
    }

    fn write_linear(path: &PathBuf, intercept: f64) {
        let model = LinearModel::new(intercept, BTreeMap::new());
        std::fs::write(path, serde_json::to_string(&model).unwrap()).unwrap();
    }

    fn spec(path: PathBuf) -> ModelSpec {
        ModelSpec {
            path,
            format: ModelFormat::Auto,
            schema_path: None,
            width: 30,
        }
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ModelFormat::Auto.resolve(std::path::Path::new("m/model.JSON")),
            ModelFormat::LinearJson
        );
        assert_eq!(
            ModelFormat::Auto.resolve(std::path::Path::new("m/model.onnx")),
            ModelFormat::Onnx
        );
        assert_eq!(
            ModelFormat::Onnx.resolve(std::path::Path::new("m/model.json")),
            ModelFormat::Onnx
        );
    }

    #[test]
    fn test_cached_policy_keeps_first_load() {
        let path = temp_path("cached.json");
        write_linear(&path, 1.0);
        let loader = ModelLoader::new(spec(path.clone()), LoadPolicy::Cached);
        assert!(!loader.is_loaded());

        let first = loader.acquire().unwrap();
        std::fs::remove_file(&path).unwrap();
        let second = loader.acquire().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(loader.is_loaded());
        assert_eq!(loader.describe().as_deref(), Some("linear(0 coefficients)"));
    }

    #[test]
    fn test_per_request_policy_rereads() {
        let path = temp_path("fresh.json");
        write_linear(&path, 1.0);
        let loader = ModelLoader::new(spec(path.clone()), LoadPolicy::PerRequest);

        let first = loader.acquire().unwrap();
        let second = loader.acquire().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(!loader.is_loaded());

        std::fs::remove_file(&path).unwrap();
        assert!(loader.acquire().is_err());
    }

    #[test]
    fn test_failed_load_is_retried() {
        let path = temp_path("late.json");
        let loader = ModelLoader::new(spec(path.clone()), LoadPolicy::Cached);
        assert!(matches!(loader.warm(), Err(InferenceError::ModelLoadError(_))));

        write_linear(&path, 2.0);
        assert!(loader.warm().is_ok());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_schema_fails_load() {
        let path = temp_path("with-schema.json");
        write_linear(&path, 0.0);
        let loader = ModelLoader::new(
            ModelSpec {
                schema_path: Some(temp_path("absent.schema.json")),
                ..spec(path.clone())
            },
            LoadPolicy::Cached,
        );
        assert!(matches!(loader.acquire(), Err(InferenceError::Schema(_))));
        std::fs::remove_file(&path).unwrap();
    }
}
