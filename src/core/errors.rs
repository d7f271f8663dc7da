use thiserror::Error;

use crate::models::{Attribute, FeatureSchema};
use crate::services::ArtifactError;

/// Errors that can occur while producing a valuation
///
/// Every variant is fatal for the request that raised it. There are no
/// retries and no partial results.
#[derive(Debug, Clone, Error)]
pub enum ValuationError {
    #[error("Unknown position '{0}': expected one of Defender, Midfielder, Attacker")]
    UnknownPosition(String),

    #[error("Missing attribute: {0}")]
    MissingAttribute(Attribute),

    #[error("Schema {schema} requires column '{column}' which was not supplied")]
    MissingFeature {
        schema: FeatureSchema,
        column: &'static str,
    },

    #[error("Feature columns {found:?} do not match model schema {expected:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Model produced an unusable value from raw output {0}")]
    InvalidPrediction(f64),

    #[error("Model artifact unavailable: {0}")]
    Artifact(#[from] ArtifactError),
}
