// Core valuation pipeline exports
pub mod errors;
pub mod features;
pub mod format;
pub mod indexes;
pub mod predictor;
pub mod regression;
pub mod valuator;

pub use errors::ValuationError;
pub use features::{assemble, assemble_with_indexes, IndexSource, ValuationInput};
pub use format::format_currency;
pub use indexes::{derive_indexes, formula_descriptions, FormulaDescription};
pub use predictor::predict;
pub use regression::{ModelSpec, RegressionModel};
pub use valuator::{DisplaySettings, Valuation, Valuator};
