//! ONNX-backed preprocessing transformer

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Tensor;
use tracing::debug;

use crate::artifacts::loader::ArtifactLoader;
use crate::artifacts::FeatureTransform;
use crate::error::{ArtifactError, PipelineError};
use crate::features::{FeatureRecord, COLUMN_COUNT};

/// The trained preprocessing transformer, exported to ONNX with a single
/// float input of shape `[1, COLUMN_COUNT]` in the feature schema's column
/// order.
pub struct OnnxPreprocessor {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxPreprocessor {
    /// Load the transformer artifact from file.
    pub fn load<P: AsRef<Path>>(
        loader: &ArtifactLoader,
        path: P,
    ) -> Result<Self, ArtifactError> {
        let session = loader.load_session(path, "preprocessor")?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "variable".to_string());

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }
}

impl FeatureTransform for OnnxPreprocessor {
    /// Run the record through the transformer and return the preprocessed
    /// vector in the model's expected representation.
    fn transform(&self, record: &FeatureRecord) -> Result<Vec<f32>, PipelineError> {
        let row = record.to_row();
        debug_assert_eq!(row.len(), COLUMN_COUNT);

        let shape = vec![1_i64, row.len() as i64];
        let input_tensor =
            Tensor::from_array((shape, row)).map_err(PipelineError::Transform)?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| PipelineError::SessionUnavailable(e.to_string()))?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_tensor])
            .map_err(PipelineError::Transform)?;

        let output = outputs
            .get(&self.output_name)
            .ok_or(PipelineError::MissingTransformOutput)?;

        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(PipelineError::Transform)?;

        debug!(
            columns = COLUMN_COUNT,
            transformed_len = data.len(),
            "Preprocessor transform complete"
        );

        Ok(data.to_vec())
    }
}
