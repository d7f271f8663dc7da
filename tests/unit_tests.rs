// Unit tests for Player Valuation

use player_valuation::core::{
    assemble, derive_indexes, format_currency, predict,
    regression::{LinearRegressor, RegressionModel},
    ValuationError, ValuationInput,
};
use player_valuation::models::{
    Attribute, AttributeSet, FeatureSchema, IndexSet, OutputTransform, PlayerPosition,
};
use player_valuation::services::ModelArtifact;
use std::sync::Arc;

fn reference_indexes() -> IndexSet {
    IndexSet {
        playmaker: 70.0,
        finisher: 72.0,
        defender: 68.0,
        physical: 75.0,
        technical: 74.0,
        speed: 77.0,
    }
}

fn flat_artifact(schema: FeatureSchema, raw: f64) -> ModelArtifact {
    let n = schema.columns().len();
    ModelArtifact {
        name: "flat".to_string(),
        position: PlayerPosition::Defender,
        schema,
        feature_names: schema.column_names().into_iter().map(String::from).collect(),
        output_transform: OutputTransform::Exp,
        model: Arc::new(LinearRegressor::new(raw, vec![0.0; n], n).unwrap()),
    }
}

#[test]
fn test_playmaker_scenario() {
    let attributes: AttributeSet = Attribute::ALL
        .iter()
        .map(|a| (*a, 50))
        .chain([
            (Attribute::Vision, 75),
            (Attribute::ShortPassing, 78),
            (Attribute::LongPassing, 76),
            (Attribute::BallControl, 77),
            (Attribute::Composure, 80),
        ])
        .collect();

    let indexes = derive_indexes(&attributes).unwrap();
    assert!((indexes.playmaker - 77.2).abs() < 1e-9);
}

#[test]
fn test_index_is_order_independent() {
    let forward: AttributeSet = Attribute::ALL
        .iter()
        .enumerate()
        .map(|(i, a)| (*a, (i * 4) as u8))
        .collect();
    let reversed: AttributeSet = Attribute::ALL
        .iter()
        .enumerate()
        .rev()
        .map(|(i, a)| (*a, (i * 4) as u8))
        .collect();

    assert_eq!(derive_indexes(&forward).unwrap(), derive_indexes(&reversed).unwrap());
}

#[test]
fn test_indexes_within_bounds() {
    for seed in 0..20u32 {
        let attributes: AttributeSet = Attribute::ALL
            .iter()
            .enumerate()
            .map(|(i, a)| (*a, ((seed * 37 + i as u32 * 53) % 101) as u8))
            .collect();
        let indexes = derive_indexes(&attributes).unwrap();
        for value in [
            indexes.playmaker,
            indexes.finisher,
            indexes.defender,
            indexes.physical,
            indexes.technical,
            indexes.speed,
        ] {
            assert!((0.0..=100.0).contains(&value));
        }
    }
}

#[test]
fn test_missing_attribute_is_fatal() {
    let attributes = AttributeSet::new().with(Attribute::Vision, 70);
    assert!(matches!(
        derive_indexes(&attributes),
        Err(ValuationError::MissingAttribute(_))
    ));
}

#[test]
fn test_reference_prediction() {
    let input = ValuationInput::manual(78, 80, reference_indexes());
    let record = assemble(FeatureSchema::IndexesWithCoreAttributes, &input).unwrap();
    let result = predict(&flat_artifact(FeatureSchema::IndexesWithCoreAttributes, 13.5), &record).unwrap();

    assert_eq!(format_currency(result.value, "€"), "€729,416");
}

#[test]
fn test_exp_output_non_negative() {
    let input = ValuationInput::manual(78, 80, reference_indexes());
    let record = assemble(FeatureSchema::IndexesOnly, &input).unwrap();

    for raw in [-700.0, -20.0, 0.0, 3.0, 20.0] {
        let result = predict(&flat_artifact(FeatureSchema::IndexesOnly, raw), &record).unwrap();
        assert!(result.value >= 0.0);
    }
}

#[test]
fn test_record_for_wrong_schema_is_rejected() {
    let input = ValuationInput::manual(78, 80, reference_indexes());
    let record = assemble(FeatureSchema::IndexesOnly, &input).unwrap();

    let err = predict(&flat_artifact(FeatureSchema::IndexesWithCoreAttributes, 13.5), &record).unwrap_err();
    assert!(matches!(err, ValuationError::SchemaMismatch { .. }));
}

#[test]
fn test_age_boundaries_accepted() {
    for age in [16u8, 45] {
        let input = ValuationInput::manual(78, 80, reference_indexes()).with_age(age);
        let record = assemble(FeatureSchema::IndexesWithAge, &input).unwrap();
        assert_eq!(record.values()[0], age as f64);
    }
}

#[test]
fn test_unknown_position() {
    for raw in ["Goalkeeper", "", "striker"] {
        assert!(matches!(
            raw.parse::<PlayerPosition>(),
            Err(ValuationError::UnknownPosition(_))
        ));
    }
}

#[test]
fn test_linear_model_contract() {
    let model = LinearRegressor::new(2.0, vec![1.0, -1.0], 2).unwrap();
    assert_eq!(model.n_features(), 2);
    assert_eq!(model.kind(), "linear");
    assert!((model.predict(&[5.0, 3.0]) - 4.0).abs() < 1e-12);
}
