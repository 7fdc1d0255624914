//! ONNX session and threshold artifact loading

use std::fs;
use std::path::Path;

use ort::session::{builder::GraphOptimizationLevel, Session};
use serde::Deserialize;
use tracing::info;

use crate::error::ArtifactError;

/// Loader for the pipeline's startup artifacts.
pub struct ArtifactLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

/// Accepts both `0.35` and `{"threshold": 0.35}` on disk.
#[derive(Deserialize)]
#[serde(untagged)]
enum ThresholdFile {
    Bare(f64),
    Keyed { threshold: f64 },
}

impl ArtifactLoader {
    /// Create a loader with default settings (1 inference thread).
    pub fn new() -> Result<Self, ArtifactError> {
        Self::with_threads(1)
    }

    /// Create a loader with the given ONNX thread count.
    pub fn with_threads(onnx_threads: usize) -> Result<Self, ArtifactError> {
        ort::init().commit().map_err(ArtifactError::Runtime)?;
        info!(onnx_threads, "ONNX Runtime initialized");
        Ok(Self { onnx_threads })
    }

    /// Load an ONNX session from file.
    pub fn load_session<P: AsRef<Path>>(
        &self,
        path: P,
        name: &str,
    ) -> Result<Session, ArtifactError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ArtifactError::NotFound(path.to_path_buf()));
        }

        info!(artifact = %name, path = %path.display(), threads = self.onnx_threads, "Loading ONNX artifact");

        let session = Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.with_intra_threads(self.onnx_threads))
            .and_then(|b| b.commit_from_file(path))
            .map_err(|source| ArtifactError::Onnx {
                path: path.to_path_buf(),
                source,
            })?;

        info!(
            artifact = %name,
            inputs = session.inputs.len(),
            outputs = session.outputs.len(),
            "ONNX artifact loaded"
        );

        Ok(session)
    }

    /// Load the scalar decision threshold. The value must lie in [0, 1].
    pub fn load_threshold<P: AsRef<Path>>(&self, path: P) -> Result<f64, ArtifactError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ArtifactError::NotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let parsed: ThresholdFile =
            serde_json::from_str(&contents).map_err(|source| ArtifactError::ThresholdParse {
                path: path.to_path_buf(),
                source,
            })?;

        let threshold = match parsed {
            ThresholdFile::Bare(t) => t,
            ThresholdFile::Keyed { threshold } => threshold,
        };

        if !(0.0..=1.0).contains(&threshold) || !threshold.is_finite() {
            return Err(ArtifactError::ThresholdOutOfRange(threshold));
        }

        info!(threshold, path = %path.display(), "Decision threshold loaded");
        Ok(threshold)
    }
}
