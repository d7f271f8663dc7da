use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::core::IndexSource;
use crate::models::domain::{AttributeSet, Index, IndexSet};

/// Request to value a player
///
/// Exactly one of `indexes` (manual input) or `attributes` (indexes derived
/// from raw ratings) must be supplied.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PredictRequest {
    #[validate(length(min = 1))]
    pub position: String,
    #[validate(range(max = 100))]
    pub reactions: u8,
    #[validate(range(max = 100))]
    pub composure: u8,
    #[validate(range(min = 16, max = 45))]
    #[serde(default)]
    pub age: Option<u8>,
    #[validate(custom(function = "validate_index_set"))]
    #[serde(default)]
    pub indexes: Option<IndexSet>,
    #[validate(custom(function = "validate_attribute_set"))]
    #[serde(default)]
    pub attributes: Option<AttributeSet>,
}

impl PredictRequest {
    /// The index source, or None unless exactly one of the two inputs is present
    pub fn index_source(&self) -> Option<IndexSource> {
        match (&self.indexes, &self.attributes) {
            (Some(indexes), None) => Some(IndexSource::Manual(*indexes)),
            (None, Some(attributes)) => Some(IndexSource::Attributes(attributes.clone())),
            _ => None,
        }
    }
}

/// Request to derive indexes from raw attributes without valuing
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeriveIndexesRequest {
    #[validate(range(max = 100))]
    pub reactions: u8,
    #[validate(range(max = 100))]
    pub composure: u8,
    #[validate(custom(function = "validate_attribute_set"))]
    pub attributes: AttributeSet,
}

fn validate_index_set(indexes: &IndexSet) -> Result<(), ValidationError> {
    for index in Index::ALL {
        let value = indexes.get(index);
        if !(0.0..=100.0).contains(&value) {
            let mut err = ValidationError::new("index_range");
            err.message = Some(format!("{} must be between 0 and 100", index.column_name()).into());
            return Err(err);
        }
    }
    Ok(())
}

fn validate_attribute_set(attributes: &AttributeSet) -> Result<(), ValidationError> {
    for (attribute, value) in attributes.iter() {
        if value > 100 {
            let mut err = ValidationError::new("attribute_range");
            err.message = Some(format!("{} must be between 0 and 100", attribute.column_name()).into());
            return Err(err);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> PredictRequest {
        PredictRequest {
            position: "Defender".to_string(),
            reactions: 78,
            composure: 80,
            age: None,
            indexes: Some(IndexSet {
                playmaker: 70.0,
                finisher: 72.0,
                defender: 68.0,
                physical: 75.0,
                technical: 74.0,
                speed: 77.0,
            }),
            attributes: None,
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(base_request().validate().is_ok());
    }

    #[test]
    fn test_age_bounds() {
        for age in [16u8, 45] {
            let mut req = base_request();
            req.age = Some(age);
            assert!(req.validate().is_ok(), "age {} should be accepted", age);
        }
        for age in [15u8, 46] {
            let mut req = base_request();
            req.age = Some(age);
            assert!(req.validate().is_err(), "age {} should be rejected", age);
        }
    }

    #[test]
    fn test_index_range() {
        let mut req = base_request();
        if let Some(indexes) = req.indexes.as_mut() {
            indexes.speed = 100.5;
        }
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_rating_range() {
        let mut req = base_request();
        req.reactions = 101;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_index_source_requires_exactly_one() {
        let mut req = base_request();
        assert!(matches!(req.index_source(), Some(IndexSource::Manual(_))));

        req.attributes = Some(AttributeSet::new());
        assert!(req.index_source().is_none());

        req.indexes = None;
        assert!(matches!(req.index_source(), Some(IndexSource::Attributes(_))));

        req.attributes = None;
        assert!(req.index_source().is_none());
    }
}
