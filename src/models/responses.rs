use serde::{Deserialize, Serialize};

use crate::core::FormulaDescription;
use crate::models::domain::{FeatureSchema, IndexSet, OutputTransform, PlayerPosition};
use crate::services::CacheStats;

/// Response for the predict endpoint
#[derive(Debug, Clone, Serialize)]
pub struct PredictResponse {
    #[serde(rename = "requestId")]
    pub request_id: String,
    pub position: PlayerPosition,
    pub model: String,
    pub schema: FeatureSchema,
    #[serde(rename = "rawOutput")]
    pub raw_output: f64,
    pub value: f64,
    #[serde(rename = "formattedValue")]
    pub formatted_value: String,
    pub display: String,
    pub indexes: Option<IndexSet>,
}

/// Response for the index derivation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeriveIndexesResponse {
    pub indexes: IndexSet,
}

/// Index formula listing
#[derive(Debug, Clone, Serialize)]
pub struct FormulasResponse {
    pub formulas: Vec<FormulaDescription>,
}

/// Description of a loaded model artifact
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfoResponse {
    pub position: PlayerPosition,
    pub name: String,
    #[serde(rename = "modelType")]
    pub model_type: String,
    pub schema: FeatureSchema,
    #[serde(rename = "schemaVersion")]
    pub schema_version: u32,
    #[serde(rename = "featureNames")]
    pub feature_names: Vec<String>,
    #[serde(rename = "outputTransform")]
    pub output_transform: OutputTransform,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub models: CacheStats,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
