use crate::core::ValuationError;
use crate::models::{FeatureRecord, PredictionResult};
use crate::services::ModelArtifact;

/// Apply an artifact's model to one feature record
///
/// The record's columns must equal the artifact's declared feature names in
/// order. The raw output is passed through the artifact's declared output
/// transform; the final value must be finite and non-negative.
pub fn predict(artifact: &ModelArtifact, record: &FeatureRecord) -> Result<PredictionResult, ValuationError> {
    let found = record.names();
    if found.len() != artifact.feature_names.len()
        || found
            .iter()
            .zip(&artifact.feature_names)
            .any(|(f, e)| *f != e.as_str())
    {
        tracing::warn!(
            "Schema mismatch for {} model '{}': expected {:?}, got {:?}",
            artifact.position,
            artifact.name,
            artifact.feature_names,
            found
        );
        return Err(ValuationError::SchemaMismatch {
            expected: artifact.feature_names.clone(),
            found: found.into_iter().map(str::to_string).collect(),
        });
    }

    let raw_output = artifact.model.predict(&record.values());
    let value = artifact.output_transform.apply(raw_output);

    if !value.is_finite() || value < 0.0 {
        tracing::warn!(
            "Model '{}' produced unusable value {} (raw {})",
            artifact.name,
            value,
            raw_output
        );
        return Err(ValuationError::InvalidPrediction(raw_output));
    }

    tracing::debug!(
        "Predicted {} with model '{}': raw={} value={}",
        artifact.position,
        artifact.name,
        raw_output,
        value
    );

    Ok(PredictionResult {
        position: artifact.position,
        schema: artifact.schema,
        raw_output,
        transform: artifact.output_transform,
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::regression::LinearRegressor;
    use crate::models::{FeatureSchema, OutputTransform, PlayerPosition};
    use std::sync::Arc;

    fn artifact(intercept: f64, transform: OutputTransform) -> ModelArtifact {
        let schema = FeatureSchema::IndexesWithCoreAttributes;
        ModelArtifact {
            name: "test_model".to_string(),
            position: PlayerPosition::Midfielder,
            schema,
            feature_names: schema.column_names().into_iter().map(String::from).collect(),
            output_transform: transform,
            model: Arc::new(LinearRegressor::new(intercept, vec![0.0; 8], 8).unwrap()),
        }
    }

    fn reference_record() -> FeatureRecord {
        let values = [78.0, 80.0, 70.0, 72.0, 68.0, 75.0, 74.0, 77.0];
        FeatureRecord {
            schema: FeatureSchema::IndexesWithCoreAttributes,
            columns: FeatureSchema::IndexesWithCoreAttributes
                .column_names()
                .into_iter()
                .zip(values)
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }

    #[test]
    fn test_exp_transform() {
        let result = predict(&artifact(13.5, OutputTransform::Exp), &reference_record()).unwrap();
        assert_eq!(result.raw_output, 13.5);
        assert!((result.value - 729_416.37).abs() < 0.01, "got {}", result.value);
    }

    #[test]
    fn test_exp_never_negative() {
        let result = predict(&artifact(-30.0, OutputTransform::Exp), &reference_record()).unwrap();
        assert!(result.value >= 0.0);
    }

    #[test]
    fn test_negative_identity_rejected() {
        let err = predict(&artifact(-5.0, OutputTransform::Identity), &reference_record()).unwrap_err();
        assert!(matches!(err, ValuationError::InvalidPrediction(_)));
    }

    #[test]
    fn test_overflow_rejected() {
        let err = predict(&artifact(1000.0, OutputTransform::Exp), &reference_record()).unwrap_err();
        assert!(matches!(err, ValuationError::InvalidPrediction(_)));
    }

    #[test]
    fn test_reordered_columns_rejected() {
        let mut record = reference_record();
        record.columns.swap(0, 1);
        let err = predict(&artifact(13.5, OutputTransform::Exp), &record).unwrap_err();
        assert!(matches!(err, ValuationError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_missing_column_rejected() {
        let mut record = reference_record();
        record.columns.pop();
        let err = predict(&artifact(13.5, OutputTransform::Exp), &record).unwrap_err();
        assert!(matches!(err, ValuationError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_prediction_is_deterministic() {
        let artifact = artifact(13.5, OutputTransform::Exp);
        let record = reference_record();
        assert_eq!(predict(&artifact, &record).unwrap(), predict(&artifact, &record).unwrap());
    }
}
