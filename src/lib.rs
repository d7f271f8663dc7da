//! Player Valuation - market value estimation service for football players
//!
//! This library turns a player's attribute ratings (or pre-computed composite
//! indexes) into a position-specific feature row, runs it through the
//! pre-trained model artifact for that position and returns the estimated
//! market value.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{derive_indexes, format_currency, ValuationError, ValuationInput, Valuator};
pub use crate::models::{AttributeSet, FeatureSchema, IndexSet, PlayerPosition, PredictionResult};
pub use crate::services::{ModelArtifact, ModelCache};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        assert_eq!(format_currency(729_416.37, "€"), "€729,416");
        assert!("Goalkeeper".parse::<PlayerPosition>().is_err());
    }
}
