use crate::core::{features::assemble_with_indexes, format::format_currency, predictor::predict, ValuationError, ValuationInput};
use crate::models::{FeatureRecord, IndexSet, PredictionResult};
use crate::services::ModelArtifact;

/// How a valuation is rendered for display
#[derive(Debug, Clone)]
pub struct DisplaySettings {
    pub label: String,
    pub currency_symbol: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            label: "Estimated Market Value".to_string(),
            currency_symbol: "€".to_string(),
        }
    }
}

/// A completed valuation
#[derive(Debug, Clone)]
pub struct Valuation {
    pub prediction: PredictionResult,
    pub record: FeatureRecord,
    /// Index values that went into the record, when the schema uses them
    pub indexes: Option<IndexSet>,
    pub formatted_value: String,
    pub display: String,
}

/// Main valuation orchestrator
///
/// # Pipeline Stages
/// 1. Feature assembly for the artifact's declared schema
/// 2. Model inference and output transform
/// 3. Currency formatting
#[derive(Debug, Clone, Default)]
pub struct Valuator {
    display: DisplaySettings,
}

impl Valuator {
    pub fn new(display: DisplaySettings) -> Self {
        Self { display }
    }

    pub fn display_settings(&self) -> &DisplaySettings {
        &self.display
    }

    /// Run the full pipeline for one request against `artifact`
    pub fn value(&self, artifact: &ModelArtifact, input: &ValuationInput) -> Result<Valuation, ValuationError> {
        let (record, indexes) = assemble_with_indexes(artifact.schema, input)?;
        let prediction = predict(artifact, &record)?;

        let formatted_value = format_currency(prediction.value, &self.display.currency_symbol);
        let display = format!("{}: {}", self.display.label, formatted_value);

        Ok(Valuation {
            prediction,
            record,
            indexes,
            formatted_value,
            display,
        })
    }
}
