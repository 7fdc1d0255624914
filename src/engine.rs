//! Decision engine: transform, predict, apply threshold.

use std::sync::Arc;

use tracing::debug;

use crate::artifacts::{Artifacts, FeatureTransform, RiskModel};
use crate::error::PipelineError;
use crate::features::{FeatureBuilder, FeatureRecord};
use crate::types::{ApplicantRecord, ScoredResult};

/// Single-pass scoring engine.
///
/// Holds the two loaded capabilities and the decision threshold. All three
/// are immutable for the process lifetime; concurrent scorings share the
/// engine through an `Arc`. Each call is single-shot: a failed transform
/// or prediction aborts that request only, with no retry.
pub struct DecisionEngine<T: FeatureTransform, M: RiskModel> {
    transform: Arc<T>,
    model: Arc<M>,
    threshold: f64,
    builder: FeatureBuilder,
}

impl<T: FeatureTransform, M: RiskModel> DecisionEngine<T, M> {
    /// Create an engine from already-loaded capabilities and threshold.
    pub fn new(transform: Arc<T>, model: Arc<M>, threshold: f64) -> Self {
        Self {
            transform,
            model,
            threshold,
            builder: FeatureBuilder::new(),
        }
    }

    /// The decision threshold in effect.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score a prepared feature record.
    pub fn score(&self, features: &FeatureRecord) -> Result<ScoredResult, PipelineError> {
        let vector = self.transform.transform(features)?;
        let probability = self.model.predict_proba(&vector)?;

        let result = ScoredResult::new(probability, self.threshold);
        debug!(
            probability,
            threshold = self.threshold,
            label = ?result.label,
            "Applicant scored"
        );
        Ok(result)
    }

    /// Validate, derive features, and score a raw applicant record.
    ///
    /// The request boundary enforces the range constraints; the checks
    /// here only catch negative magnitudes that would otherwise flow into
    /// the ratios and skew the score without any error.
    pub fn score_applicant(
        &self,
        applicant: &ApplicantRecord,
    ) -> Result<ScoredResult, PipelineError> {
        check_applicant(applicant)?;
        let features = self.builder.build(applicant);
        self.score(&features)
    }
}

fn check_applicant(applicant: &ApplicantRecord) -> Result<(), PipelineError> {
    if applicant.income < 0.0 || !applicant.income.is_finite() {
        return Err(PipelineError::invalid_input(
            "income",
            format!("must be a non-negative number, got {}", applicant.income),
        ));
    }
    if applicant.emp_length < 0.0 || !applicant.emp_length.is_finite() {
        return Err(PipelineError::invalid_input(
            "emp_length",
            format!("must be a non-negative number, got {}", applicant.emp_length),
        ));
    }
    if applicant.loan_amnt < 0.0 || !applicant.loan_amnt.is_finite() {
        return Err(PipelineError::invalid_input(
            "loan_amnt",
            format!("must be a non-negative number, got {}", applicant.loan_amnt),
        ));
    }
    if !applicant.int_rate.is_finite() {
        return Err(PipelineError::invalid_input(
            "int_rate",
            format!("must be finite, got {}", applicant.int_rate),
        ));
    }
    Ok(())
}

impl DecisionEngine<crate::artifacts::OnnxPreprocessor, crate::artifacts::OnnxRiskModel> {
    /// Wire the engine to the loaded artifact set.
    pub fn from_artifacts(artifacts: &Artifacts) -> Self {
        Self::new(
            artifacts.preprocessor.clone(),
            artifacts.model.clone(),
            artifacts.threshold,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::COLUMN_COUNT;
    use crate::types::RiskLabel;

    /// Pass-through transform for engine tests.
    struct IdentityTransform;

    impl FeatureTransform for IdentityTransform {
        fn transform(&self, record: &FeatureRecord) -> Result<Vec<f32>, PipelineError> {
            Ok(record.to_row())
        }
    }

    /// Model stub returning a fixed probability.
    struct FixedModel(f64);

    impl RiskModel for FixedModel {
        fn predict_proba(&self, vector: &[f32]) -> Result<f64, PipelineError> {
            assert_eq!(vector.len(), COLUMN_COUNT);
            Ok(self.0)
        }
    }

    /// Capability stubs that always fail.
    struct FailingTransform;

    impl FeatureTransform for FailingTransform {
        fn transform(&self, _record: &FeatureRecord) -> Result<Vec<f32>, PipelineError> {
            Err(PipelineError::MissingTransformOutput)
        }
    }

    struct FailingModel;

    impl RiskModel for FailingModel {
        fn predict_proba(&self, _vector: &[f32]) -> Result<f64, PipelineError> {
            Err(PipelineError::MissingProbability)
        }
    }

    fn engine(probability: f64, threshold: f64) -> DecisionEngine<IdentityTransform, FixedModel> {
        DecisionEngine::new(
            Arc::new(IdentityTransform),
            Arc::new(FixedModel(probability)),
            threshold,
        )
    }

    #[test]
    fn test_threshold_boundary_is_high_risk() {
        let result = engine(0.5, 0.5)
            .score_applicant(&ApplicantRecord::new(25, 50000.0, 10000.0))
            .unwrap();
        assert_eq!(result.label, RiskLabel::HighRisk);
        assert_eq!(result.probability, 0.5);
        assert_eq!(result.threshold, 0.5);
    }

    #[test]
    fn test_just_below_threshold_is_low_risk() {
        let result = engine(0.4999, 0.5)
            .score_applicant(&ApplicantRecord::new(25, 50000.0, 10000.0))
            .unwrap();
        assert_eq!(result.label, RiskLabel::LowRisk);
    }

    #[test]
    fn test_transform_failure_surfaces() {
        let engine = DecisionEngine::new(
            Arc::new(FailingTransform),
            Arc::new(FixedModel(0.1)),
            0.5,
        );
        let err = engine
            .score_applicant(&ApplicantRecord::new(25, 50000.0, 10000.0))
            .unwrap_err();
        assert!(matches!(err, PipelineError::MissingTransformOutput));
    }

    #[test]
    fn test_predict_failure_surfaces() {
        let engine = DecisionEngine::new(
            Arc::new(IdentityTransform),
            Arc::new(FailingModel),
            0.5,
        );
        let err = engine
            .score_applicant(&ApplicantRecord::new(25, 50000.0, 10000.0))
            .unwrap_err();
        assert!(matches!(err, PipelineError::MissingProbability));
    }

    #[test]
    fn test_negative_income_rejected() {
        let err = engine(0.1, 0.5)
            .score_applicant(&ApplicantRecord::new(25, -1.0, 10000.0))
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidInput { field: "income", .. }
        ));
    }

    #[test]
    fn test_negative_loan_amount_rejected() {
        let err = engine(0.1, 0.5)
            .score_applicant(&ApplicantRecord::new(25, 50000.0, -500.0))
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidInput {
                field: "loan_amnt",
                ..
            }
        ));
    }

    #[test]
    fn test_zero_income_scores_without_error() {
        // Boundary value, not an error: the epsilon guard keeps the ratios
        // finite and the engine must score it.
        let result = engine(0.9, 0.5)
            .score_applicant(&ApplicantRecord::new(25, 0.0, 10000.0))
            .unwrap();
        assert_eq!(result.label, RiskLabel::HighRisk);
    }
}
