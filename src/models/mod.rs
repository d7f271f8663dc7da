// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Attribute, AttributeSet, FeatureColumn, FeatureRecord, FeatureSchema, Index, IndexSet,
    OutputTransform, PlayerPosition, PredictionResult,
};
pub use requests::{DeriveIndexesRequest, PredictRequest};
pub use responses::{
    DeriveIndexesResponse, ErrorResponse, FormulasResponse, HealthResponse, ModelInfoResponse,
    PredictResponse,
};
