//! Externally trained artifacts and the capability traits around them.
//!
//! The pipeline depends on three opaque artifacts produced by the Python
//! training run: a preprocessing transformer, a classification model (both
//! ONNX exports), and a scalar decision threshold. They are loaded exactly
//! once at startup and are read-only for the life of the process.

pub mod loader;
pub mod model;
pub mod preprocessor;

use std::sync::Arc;

use crate::config::ArtifactsConfig;
use crate::error::{ArtifactError, PipelineError};
use crate::features::FeatureRecord;

pub use loader::ArtifactLoader;
pub use model::OnnxRiskModel;
pub use preprocessor::OnnxPreprocessor;

/// Preprocessing capability: turns a feature record into the numeric
/// vector the model consumes. The representation is owned by the trained
/// transformer and opaque to the rest of the pipeline.
pub trait FeatureTransform: Send + Sync {
    fn transform(&self, record: &FeatureRecord) -> Result<Vec<f32>, PipelineError>;
}

/// Prediction capability: probability of the positive (default) class for
/// a preprocessed feature vector.
pub trait RiskModel: Send + Sync {
    fn predict_proba(&self, vector: &[f32]) -> Result<f64, PipelineError>;
}

/// The three loaded artifacts. Constructed once in `main`, shared via
/// `Arc`, never reloaded.
pub struct Artifacts {
    pub preprocessor: Arc<OnnxPreprocessor>,
    pub model: Arc<OnnxRiskModel>,
    pub threshold: f64,
}

impl Artifacts {
    /// Load all three artifacts. Any failure here is fatal: the process
    /// cannot serve without a complete artifact set.
    pub fn load(config: &ArtifactsConfig) -> Result<Self, ArtifactError> {
        let loader = ArtifactLoader::with_threads(config.onnx_threads)?;

        let preprocessor = OnnxPreprocessor::load(&loader, &config.preprocessor_path)?;
        let model = OnnxRiskModel::load(&loader, &config.model_path)?;
        let threshold = loader.load_threshold(&config.threshold_path)?;

        Ok(Self {
            preprocessor: Arc::new(preprocessor),
            model: Arc::new(model),
            threshold,
        })
    }
}
