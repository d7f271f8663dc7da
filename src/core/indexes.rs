use serde::Serialize;

use crate::core::ValuationError;
use crate::models::{Attribute, AttributeSet, Index, IndexSet, PlayerPosition};

/// Attribute subset averaged into one composite index
#[derive(Debug, Clone, Copy)]
pub struct IndexFormula {
    pub index: Index,
    pub attributes: &'static [Attribute],
}

static STANDARD_FORMULAS: [IndexFormula; 6] = [
    IndexFormula {
        index: Index::Playmaker,
        attributes: &[
            Attribute::Vision,
            Attribute::ShortPassing,
            Attribute::LongPassing,
            Attribute::BallControl,
            Attribute::Composure,
        ],
    },
    IndexFormula {
        index: Index::Finisher,
        attributes: &[
            Attribute::Finishing,
            Attribute::ShotPower,
            Attribute::AttPosition,
            Attribute::Reactions,
            Attribute::Composure,
        ],
    },
    IndexFormula {
        index: Index::Defender,
        attributes: &[
            Attribute::Interceptions,
            Attribute::StandingTackle,
            Attribute::SlidingTackle,
            Attribute::DefAwareness,
            Attribute::Strength,
        ],
    },
    IndexFormula {
        index: Index::Physical,
        attributes: &[
            Attribute::Stamina,
            Attribute::Jumping,
            Attribute::Strength,
            Attribute::Aggression,
        ],
    },
    IndexFormula {
        index: Index::Technical,
        attributes: &[
            Attribute::Dribbling,
            Attribute::BallControl,
            Attribute::Curve,
            Attribute::FkAccuracy,
            Attribute::Vision,
            Attribute::Composure,
        ],
    },
    IndexFormula {
        index: Index::Speed,
        attributes: &[
            Attribute::Acceleration,
            Attribute::SprintSpeed,
            Attribute::Agility,
        ],
    },
];

/// Formula set used for a position. All positions currently share one set.
pub fn formulas_for(position: PlayerPosition) -> &'static [IndexFormula] {
    match position {
        PlayerPosition::Defender | PlayerPosition::Midfielder | PlayerPosition::Attacker => {
            &STANDARD_FORMULAS
        }
    }
}

/// Derive all six indexes using the standard formulas
///
/// Each index is the unweighted arithmetic mean of its attribute subset.
/// Inputs are assumed to be pre-scaled to 0-100, so no range checks happen
/// here.
///
/// # Errors
/// `MissingAttribute` naming the first attribute a formula needs that the
/// set does not contain.
pub fn derive_indexes(attributes: &AttributeSet) -> Result<IndexSet, ValuationError> {
    derive_with(&STANDARD_FORMULAS, attributes)
}

/// Derive indexes with the formula set selected for `position`
pub fn derive_for_position(
    position: PlayerPosition,
    attributes: &AttributeSet,
) -> Result<IndexSet, ValuationError> {
    derive_with(formulas_for(position), attributes)
}

fn derive_with(
    formulas: &[IndexFormula],
    attributes: &AttributeSet,
) -> Result<IndexSet, ValuationError> {
    let mut indexes = IndexSet {
        playmaker: 0.0,
        finisher: 0.0,
        defender: 0.0,
        physical: 0.0,
        technical: 0.0,
        speed: 0.0,
    };

    for formula in formulas {
        indexes.set(formula.index, mean_of(formula.attributes, attributes)?);
    }

    Ok(indexes)
}

#[inline]
fn mean_of(subset: &[Attribute], attributes: &AttributeSet) -> Result<f64, ValuationError> {
    let mut sum = 0.0;
    for attribute in subset {
        let value = attributes
            .get(*attribute)
            .ok_or(ValuationError::MissingAttribute(*attribute))?;
        sum += value as f64;
    }
    Ok(sum / subset.len() as f64)
}

/// Human readable formula, e.g. for an "what do the indexes mean" panel
#[derive(Debug, Clone, Serialize)]
pub struct FormulaDescription {
    pub index: Index,
    pub label: &'static str,
    pub column: &'static str,
    pub attributes: Vec<&'static str>,
    pub description: String,
}

pub fn formula_descriptions(position: PlayerPosition) -> Vec<FormulaDescription> {
    formulas_for(position)
        .iter()
        .map(|formula| {
            let attributes: Vec<&'static str> =
                formula.attributes.iter().map(|a| a.column_name()).collect();
            FormulaDescription {
                index: formula.index,
                label: formula.index.label(),
                column: formula.index.column_name(),
                description: format!("{} = avg of {}", formula.index.label(), attributes.join(", ")),
                attributes,
            }
        })
        .collect()
}
