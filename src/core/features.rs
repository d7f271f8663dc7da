use crate::core::{indexes::derive_indexes, ValuationError};
use crate::models::{Attribute, AttributeSet, FeatureColumn, FeatureRecord, FeatureSchema, IndexSet};

/// Where the six index values come from
#[derive(Debug, Clone, PartialEq)]
pub enum IndexSource {
    /// Entered directly
    Manual(IndexSet),
    /// Derived from raw attribute ratings
    Attributes(AttributeSet),
}

/// Everything a request can contribute to a feature row
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationInput {
    pub reactions: u8,
    pub composure: u8,
    pub age: Option<u8>,
    pub source: IndexSource,
}

impl ValuationInput {
    pub fn manual(reactions: u8, composure: u8, indexes: IndexSet) -> Self {
        Self {
            reactions,
            composure,
            age: None,
            source: IndexSource::Manual(indexes),
        }
    }

    pub fn from_attributes(reactions: u8, composure: u8, attributes: AttributeSet) -> Self {
        Self {
            reactions,
            composure,
            age: None,
            source: IndexSource::Attributes(attributes),
        }
    }

    pub fn with_age(mut self, age: u8) -> Self {
        self.age = Some(age);
        self
    }

    /// Raw attributes with Reactions and Composure folded in, if the input
    /// carries raw attributes at all
    pub fn attribute_set(&self) -> Option<AttributeSet> {
        match &self.source {
            IndexSource::Manual(_) => None,
            IndexSource::Attributes(attributes) => {
                let mut attributes = attributes.clone();
                attributes.insert(Attribute::Reactions, self.reactions);
                attributes.insert(Attribute::Composure, self.composure);
                Some(attributes)
            }
        }
    }

    /// Index values for this input, deriving them when raw attributes were given
    pub fn resolve_indexes(&self) -> Result<IndexSet, ValuationError> {
        match &self.source {
            IndexSource::Manual(indexes) => Ok(*indexes),
            IndexSource::Attributes(_) => {
                let attributes = self.attribute_set().unwrap_or_default();
                derive_indexes(&attributes)
            }
        }
    }
}

/// Build the single-row feature record for `schema`
///
/// Columns are emitted in exactly the order the schema declares. Index
/// values are derived at most once per call.
pub fn assemble(schema: FeatureSchema, input: &ValuationInput) -> Result<FeatureRecord, ValuationError> {
    assemble_with_indexes(schema, input).map(|(record, _)| record)
}

/// Like [`assemble`], also returning the index values the record was built
/// from (`None` when the schema has no index columns)
pub fn assemble_with_indexes(
    schema: FeatureSchema,
    input: &ValuationInput,
) -> Result<(FeatureRecord, Option<IndexSet>), ValuationError> {
    let columns = schema.columns();
    let attributes = input.attribute_set();

    let needs_indexes = columns.iter().any(|c| matches!(c, FeatureColumn::Index(_)));
    let indexes = if needs_indexes {
        Some(input.resolve_indexes()?)
    } else {
        None
    };

    let mut record = Vec::with_capacity(columns.len());

    for column in columns {
        let value = match column {
            FeatureColumn::Attribute(Attribute::Reactions) => input.reactions as f64,
            FeatureColumn::Attribute(Attribute::Composure) => input.composure as f64,
            FeatureColumn::Attribute(attribute) => match &attributes {
                Some(set) => set
                    .get(*attribute)
                    .ok_or(ValuationError::MissingAttribute(*attribute))? as f64,
                None => {
                    return Err(ValuationError::MissingFeature {
                        schema,
                        column: column.name(),
                    })
                }
            },
            FeatureColumn::Index(index) => match &indexes {
                Some(set) => set.get(*index),
                None => {
                    return Err(ValuationError::MissingFeature {
                        schema,
                        column: column.name(),
                    })
                }
            },
            FeatureColumn::Age => match input.age {
                Some(age) => age as f64,
                None => {
                    return Err(ValuationError::MissingFeature {
                        schema,
                        column: column.name(),
                    })
                }
            },
        };

        record.push((column.name().to_string(), value));
    }

    tracing::trace!("Assembled {} columns for schema {}", record.len(), schema);

    Ok((
        FeatureRecord {
            schema,
            columns: record,
        },
        indexes,
    ))
}
