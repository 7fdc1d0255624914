//! Credit Risk Pipeline Library
//!
//! A credit default risk scoring service: applicant records in, engineered
//! features through externally trained ONNX artifacts, binary risk
//! decisions out.

pub mod artifacts;
pub mod config;
pub mod consumer;
pub mod engine;
pub mod error;
pub mod features;
pub mod metrics;
pub mod producer;
pub mod types;

pub use artifacts::{Artifacts, FeatureTransform, RiskModel};
pub use config::AppConfig;
pub use consumer::ApplicantConsumer;
pub use engine::DecisionEngine;
pub use error::{ArtifactError, PipelineError};
pub use features::{FeatureBuilder, FeatureRecord};
pub use producer::DecisionProducer;
pub use types::{ApplicantRecord, RiskLabel, ScoredResult};
