//! Error types for artifact loading and the scoring pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Fatal startup errors. The process must not serve requests when any of
/// the three artifacts (model, preprocessor, threshold) fails to load.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact not found at {0}")]
    NotFound(PathBuf),

    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load ONNX artifact {path}: {source}")]
    Onnx {
        path: PathBuf,
        #[source]
        source: ort::Error,
    },

    #[error("failed to parse threshold artifact {path}: {source}")]
    ThresholdParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("threshold {0} is outside [0, 1]")]
    ThresholdOutOfRange(f64),

    #[error("failed to initialize ONNX runtime: {0}")]
    Runtime(#[source] ort::Error),
}

/// Request-level scoring failures. Surfaced to the caller, never retried;
/// the process keeps serving.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid applicant field {field}: {reason}")]
    InvalidInput {
        field: &'static str,
        reason: String,
    },

    #[error("preprocessor transform failed: {0}")]
    Transform(#[source] ort::Error),

    #[error("model prediction failed: {0}")]
    Predict(#[source] ort::Error),

    #[error("preprocessor produced no output tensor")]
    MissingTransformOutput,

    #[error("model output contained no probability for the default class")]
    MissingProbability,

    #[error("inference session unavailable: {0}")]
    SessionUnavailable(String),

    #[error("model returned non-finite probability {0}")]
    NonFiniteProbability(f64),
}

impl PipelineError {
    pub fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        PipelineError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}
