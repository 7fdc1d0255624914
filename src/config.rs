//! Configuration management for the credit risk pipeline

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub nats: NatsConfig,
    pub artifacts: ArtifactsConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

/// NATS connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NatsConfig {
    /// NATS server URL
    pub url: String,
    /// Subject for incoming applicant records
    pub applicant_subject: String,
    /// Subject for outgoing high-risk decisions
    pub decision_subject: String,
}

/// Paths to the externally trained artifacts
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    /// ONNX export of the trained classifier
    pub model_path: String,
    /// ONNX export of the fitted preprocessing transformer
    pub preprocessor_path: String,
    /// JSON file holding the scalar decision threshold
    pub threshold_path: String,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

fn default_onnx_threads() -> usize {
    1
}

/// Pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Number of concurrent scoring workers
    pub workers: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from the default file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nats: NatsConfig {
                url: "nats://localhost:4222".to_string(),
                applicant_subject: "applicants".to_string(),
                decision_subject: "risk.decisions".to_string(),
            },
            artifacts: ArtifactsConfig {
                model_path: "artifacts/xgb_model.onnx".to_string(),
                preprocessor_path: "artifacts/preprocessor.onnx".to_string(),
                threshold_path: "artifacts/decision_threshold.json".to_string(),
                onnx_threads: 1,
            },
            pipeline: PipelineConfig { workers: 4 },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
            },
        }
    }
}
