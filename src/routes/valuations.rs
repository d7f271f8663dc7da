use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::core::{derive_indexes, formula_descriptions, ValuationError, ValuationInput, Valuator};
use crate::models::{
    DeriveIndexesRequest, DeriveIndexesResponse, ErrorResponse, FormulasResponse, HealthResponse,
    ModelInfoResponse, PlayerPosition, PredictRequest, PredictResponse,
};
use crate::services::{ArtifactError, ModelCache};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<ModelCache>,
    pub valuator: Valuator,
}

/// Configure all valuation-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/valuations/predict", web::post().to(predict_value))
        .route("/valuations/indexes", web::post().to(derive_index_values))
        .route("/valuations/formulas", web::get().to(list_formulas))
        .route("/models/{position}", web::get().to(model_info));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let stats = state.cache.stats();
    // Models load lazily unless preloaded, so a partial cache is not a failure
    let status = if stats.cached_models as usize >= PlayerPosition::ALL.len() {
        "healthy"
    } else {
        "warming"
    };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        models: stats,
    })
}

/// Map a pipeline failure to an HTTP error
fn error_response(err: &ValuationError) -> HttpResponse {
    let (error, status_code) = match err {
        ValuationError::UnknownPosition(_) => ("Unknown position", 400),
        ValuationError::MissingAttribute(_) => ("Missing attribute", 422),
        ValuationError::MissingFeature { .. } => ("Missing feature", 422),
        ValuationError::SchemaMismatch { .. } => ("Schema mismatch", 500),
        ValuationError::InvalidPrediction(_) => ("Invalid prediction", 500),
        ValuationError::Artifact(_) => ("Model unavailable", 503),
    };

    let body = ErrorResponse {
        error: error.to_string(),
        message: err.to_string(),
        status_code,
    };

    match status_code {
        400 => HttpResponse::BadRequest().json(body),
        422 => HttpResponse::UnprocessableEntity().json(body),
        503 => HttpResponse::ServiceUnavailable().json(body),
        _ => HttpResponse::InternalServerError().json(body),
    }
}

fn validation_failed(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message,
        status_code: 400,
    })
}

/// Predict market value endpoint
///
/// POST /api/v1/valuations/predict
///
/// Request body:
/// ```json
/// {
///   "position": "Midfielder",
///   "reactions": 78,
///   "composure": 80,
///   "age": 24,
///   "indexes": { "playmaker": 70.0, "finisher": 72.0, "defender": 68.0,
///                "physical": 75.0, "technical": 74.0, "speed": 77.0 }
/// }
/// ```
///
/// `indexes` may be replaced by `attributes` (snake_case attribute names to
/// ratings), in which case the indexes are derived.
async fn predict_value(
    state: web::Data<AppState>,
    req: web::Json<PredictRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for predict request: field_errors={:?}", errors);
        return validation_failed(errors.to_string());
    }

    let position: PlayerPosition = match req.position.parse() {
        Ok(position) => position,
        Err(e) => {
            tracing::info!("Rejected predict request: {}", e);
            return error_response(&e);
        }
    };

    let source = match req.index_source() {
        Some(source) => source,
        None => {
            return validation_failed(
                "Provide exactly one of 'indexes' or 'attributes'".to_string(),
            );
        }
    };

    let input = ValuationInput {
        reactions: req.reactions,
        composure: req.composure,
        age: req.age,
        source,
    };

    let artifact = match state.cache.get(position).await {
        Ok(artifact) => artifact,
        Err(e) => return error_response(&ValuationError::from(e)),
    };

    match state.valuator.value(&artifact, &input) {
        Ok(valuation) => {
            let request_id = uuid::Uuid::new_v4().to_string();

            tracing::info!(
                "Valuation {} for {}: {} (model '{}')",
                request_id,
                position,
                valuation.formatted_value,
                artifact.name
            );

            HttpResponse::Ok().json(PredictResponse {
                request_id,
                position,
                model: artifact.name.clone(),
                schema: valuation.prediction.schema,
                raw_output: valuation.prediction.raw_output,
                value: valuation.prediction.value,
                formatted_value: valuation.formatted_value,
                display: valuation.display,
                indexes: valuation.indexes,
            })
        }
        Err(e) => {
            tracing::error!("Valuation failed for {}: {}", position, e);
            error_response(&e)
        }
    }
}

/// Derive indexes from raw attributes
///
/// POST /api/v1/valuations/indexes
async fn derive_index_values(req: web::Json<DeriveIndexesRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors.to_string());
    }

    let req = req.into_inner();
    let input = ValuationInput::from_attributes(req.reactions, req.composure, req.attributes);
    let attributes = input.attribute_set().unwrap_or_default();

    match derive_indexes(&attributes) {
        Ok(indexes) => HttpResponse::Ok().json(DeriveIndexesResponse { indexes }),
        Err(e) => error_response(&e),
    }
}

/// Describe how each index is calculated
///
/// GET /api/v1/valuations/formulas?position={position}
async fn list_formulas(
    query: web::Query<std::collections::HashMap<String, String>>,
) -> impl Responder {
    let position = match query.get("position") {
        Some(raw) => match raw.parse::<PlayerPosition>() {
            Ok(position) => position,
            Err(e) => return error_response(&e),
        },
        None => PlayerPosition::Midfielder,
    };

    HttpResponse::Ok().json(FormulasResponse {
        formulas: formula_descriptions(position),
    })
}

/// Describe the model artifact serving a position
///
/// GET /api/v1/models/{position}
async fn model_info(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let position: PlayerPosition = match path.parse() {
        Ok(position) => position,
        Err(e) => return error_response(&e),
    };

    match state.cache.get(position).await {
        Ok(artifact) => HttpResponse::Ok().json(ModelInfoResponse {
            position,
            name: artifact.name.clone(),
            model_type: artifact.model.kind().to_string(),
            schema: artifact.schema,
            schema_version: crate::models::FeatureSchema::VERSION,
            feature_names: artifact.feature_names.clone(),
            output_transform: artifact.output_transform,
        }),
        Err(e @ ArtifactError::NotConfigured(_)) => HttpResponse::NotFound().json(ErrorResponse {
            error: "Model not configured".to_string(),
            message: e.to_string(),
            status_code: 404,
        }),
        Err(e) => error_response(&ValuationError::from(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        let unknown = error_response(&ValuationError::UnknownPosition("Goalkeeper".to_string()));
        assert_eq!(unknown.status().as_u16(), 400);

        let missing = error_response(&ValuationError::MissingAttribute(crate::models::Attribute::Curve));
        assert_eq!(missing.status().as_u16(), 422);

        let mismatch = error_response(&ValuationError::SchemaMismatch {
            expected: vec!["Age".to_string()],
            found: vec![],
        });
        assert_eq!(mismatch.status().as_u16(), 500);

        let unavailable = error_response(&ValuationError::Artifact(ArtifactError::NotConfigured(
            PlayerPosition::Attacker,
        )));
        assert_eq!(unavailable.status().as_u16(), 503);
    }
}
