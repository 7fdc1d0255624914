//! ONNX-backed classification model

use std::path::Path;
use std::sync::Mutex;

use ort::memory::Allocator;
use ort::session::Session;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, Tensor};
use tracing::debug;

use crate::artifacts::loader::ArtifactLoader;
use crate::artifacts::RiskModel;
use crate::error::{ArtifactError, PipelineError};

/// The trained classifier. `predict_proba` returns the probability of the
/// positive (default) class.
///
/// Gradient-boosting exports differ in output layout: XGBoost-style
/// converters emit a `[1, 2]` probability tensor, while others emit
/// seq(map(int64, float)). Both are handled here.
pub struct OnnxRiskModel {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxRiskModel {
    /// Load the model artifact from file.
    pub fn load<P: AsRef<Path>>(
        loader: &ArtifactLoader,
        path: P,
    ) -> Result<Self, ArtifactError> {
        let session = loader.load_session(path, "model")?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob") || o.name.contains("output"))
            .map(|o| o.name.clone())
            .unwrap_or_else(|| {
                session
                    .outputs
                    .last()
                    .map(|o| o.name.clone())
                    .unwrap_or_else(|| "probabilities".to_string())
            });

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }

    /// Extract the positive-class probability from the session outputs.
    fn extract_probability(
        &self,
        outputs: &ort::session::SessionOutputs,
    ) -> Result<f64, PipelineError> {
        if let Some(output) = outputs.get(&self.output_name) {
            if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
                let dims: Vec<i64> = shape.iter().copied().collect();
                return Ok(positive_class_from_tensor(&dims, data));
            }

            if DynSequenceValueType::can_downcast(&output.dtype()) {
                if let Ok(prob) = extract_from_sequence_map(output) {
                    return Ok(prob);
                }
            }
        }

        // Fallback: scan every output, skipping the class-label tensor.
        for (name, output) in outputs.iter() {
            if name.contains("label") {
                continue;
            }

            if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
                let dims: Vec<i64> = shape.iter().copied().collect();
                debug!(output = %name, "Extracted probability from fallback output");
                return Ok(positive_class_from_tensor(&dims, data));
            }

            if DynSequenceValueType::can_downcast(&output.dtype()) {
                if let Ok(prob) = extract_from_sequence_map(&output) {
                    return Ok(prob);
                }
            }
        }

        Err(PipelineError::MissingProbability)
    }
}

impl RiskModel for OnnxRiskModel {
    fn predict_proba(&self, vector: &[f32]) -> Result<f64, PipelineError> {
        let shape = vec![1_i64, vector.len() as i64];
        let input_tensor =
            Tensor::from_array((shape, vector.to_vec())).map_err(PipelineError::Predict)?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| PipelineError::SessionUnavailable(e.to_string()))?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_tensor])
            .map_err(PipelineError::Predict)?;

        let probability = self.extract_probability(&outputs)?;

        if !probability.is_finite() {
            return Err(PipelineError::NonFiniteProbability(probability));
        }

        debug!(probability, "Model prediction complete");
        Ok(probability)
    }
}

/// Positive-class probability from a `[1, 2]`, `[2]`, or single-value
/// tensor layout.
fn positive_class_from_tensor(dims: &[i64], data: &[f32]) -> f64 {
    if dims.len() == 2 {
        let num_classes = dims[1] as usize;
        if num_classes >= 2 {
            return data[1] as f64;
        } else if num_classes == 1 {
            return data[0] as f64;
        }
    } else if dims.len() == 1 {
        let num_classes = dims[0] as usize;
        if num_classes >= 2 {
            return data[1] as f64;
        } else if num_classes == 1 {
            return data[0] as f64;
        }
    }

    data.last().map(|&v| v as f64).unwrap_or(0.5)
}

/// Positive-class probability from seq(map(int64, float)) output.
fn extract_from_sequence_map(output: &ort::value::DynValue) -> Result<f64, PipelineError> {
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(PipelineError::Predict)?;

    let maps = sequence
        .try_extract_sequence::<DynMapValueType>(&allocator)
        .map_err(PipelineError::Predict)?;

    // Single-row inference: only the first map matters.
    let map_value = maps.first().ok_or(PipelineError::MissingProbability)?;

    let kv_pairs = map_value
        .try_extract_key_values::<i64, f32>()
        .map_err(PipelineError::Predict)?;

    for (class_id, prob) in &kv_pairs {
        if *class_id == 1 {
            return Ok(*prob as f64);
        }
    }

    // Some exports only carry class 0; the complement is the default class.
    for (class_id, prob) in &kv_pairs {
        if *class_id == 0 {
            return Ok(1.0 - *prob as f64);
        }
    }

    Err(PipelineError::MissingProbability)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_class_two_column() {
        let prob = positive_class_from_tensor(&[1, 2], &[0.3, 0.7]);
        assert!((prob - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_positive_class_single_column() {
        let prob = positive_class_from_tensor(&[1, 1], &[0.42]);
        assert!((prob - 0.42).abs() < 1e-9);
    }

    #[test]
    fn test_positive_class_flat_vector() {
        let prob = positive_class_from_tensor(&[2], &[0.1, 0.9]);
        assert!((prob - 0.9).abs() < 1e-9);
    }
}
