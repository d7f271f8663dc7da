use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::core::ValuationError;

/// Player position. Each position has its own model artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerPosition {
    Defender,
    Midfielder,
    Attacker,
}

impl PlayerPosition {
    pub const ALL: [PlayerPosition; 3] = [
        PlayerPosition::Defender,
        PlayerPosition::Midfielder,
        PlayerPosition::Attacker,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerPosition::Defender => "Defender",
            PlayerPosition::Midfielder => "Midfielder",
            PlayerPosition::Attacker => "Attacker",
        }
    }

    /// Lowercase key used in configuration and artifact files
    pub fn key(&self) -> &'static str {
        match self {
            PlayerPosition::Defender => "defender",
            PlayerPosition::Midfielder => "midfielder",
            PlayerPosition::Attacker => "attacker",
        }
    }
}

impl fmt::Display for PlayerPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayerPosition {
    type Err = ValuationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "defender" => Ok(PlayerPosition::Defender),
            "midfielder" => Ok(PlayerPosition::Midfielder),
            "attacker" => Ok(PlayerPosition::Attacker),
            _ => Err(ValuationError::UnknownPosition(s.to_string())),
        }
    }
}

/// Raw attribute rating (0-100) describing one facet of a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Reactions,
    Composure,
    Vision,
    ShortPassing,
    LongPassing,
    BallControl,
    Finishing,
    ShotPower,
    AttPosition,
    Interceptions,
    StandingTackle,
    SlidingTackle,
    DefAwareness,
    Strength,
    Stamina,
    Jumping,
    Aggression,
    Dribbling,
    Curve,
    FkAccuracy,
    Acceleration,
    SprintSpeed,
    Agility,
}

impl Attribute {
    pub const ALL: [Attribute; 23] = [
        Attribute::Reactions,
        Attribute::Composure,
        Attribute::Vision,
        Attribute::ShortPassing,
        Attribute::LongPassing,
        Attribute::BallControl,
        Attribute::Finishing,
        Attribute::ShotPower,
        Attribute::AttPosition,
        Attribute::Interceptions,
        Attribute::StandingTackle,
        Attribute::SlidingTackle,
        Attribute::DefAwareness,
        Attribute::Strength,
        Attribute::Stamina,
        Attribute::Jumping,
        Attribute::Aggression,
        Attribute::Dribbling,
        Attribute::Curve,
        Attribute::FkAccuracy,
        Attribute::Acceleration,
        Attribute::SprintSpeed,
        Attribute::Agility,
    ];

    /// Column name as it appears in training data
    pub fn column_name(&self) -> &'static str {
        match self {
            Attribute::Reactions => "Reactions",
            Attribute::Composure => "Composure",
            Attribute::Vision => "Vision",
            Attribute::ShortPassing => "Short passing",
            Attribute::LongPassing => "Long passing",
            Attribute::BallControl => "Ball control",
            Attribute::Finishing => "Finishing",
            Attribute::ShotPower => "Shot power",
            Attribute::AttPosition => "Att. Position",
            Attribute::Interceptions => "Interceptions",
            Attribute::StandingTackle => "Standing tackle",
            Attribute::SlidingTackle => "Sliding tackle",
            Attribute::DefAwareness => "Def. awareness",
            Attribute::Strength => "Strength",
            Attribute::Stamina => "Stamina",
            Attribute::Jumping => "Jumping",
            Attribute::Aggression => "Aggression",
            Attribute::Dribbling => "Dribbling",
            Attribute::Curve => "Curve",
            Attribute::FkAccuracy => "FK Accuracy",
            Attribute::Acceleration => "Acceleration",
            Attribute::SprintSpeed => "Sprint speed",
            Attribute::Agility => "Agility",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Attribute ratings supplied for a single request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSet(BTreeMap<Attribute, u8>);

impl AttributeSet {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert
    pub fn with(mut self, attribute: Attribute, value: u8) -> Self {
        self.0.insert(attribute, value);
        self
    }

    pub fn insert(&mut self, attribute: Attribute, value: u8) {
        self.0.insert(attribute, value);
    }

    pub fn get(&self, attribute: Attribute) -> Option<u8> {
        self.0.get(&attribute).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attribute, u8)> + '_ {
        self.0.iter().map(|(a, v)| (*a, *v))
    }
}

impl FromIterator<(Attribute, u8)> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = (Attribute, u8)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Composite skill index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Index {
    Playmaker,
    Finisher,
    Defender,
    Physical,
    Technical,
    Speed,
}

impl Index {
    pub const ALL: [Index; 6] = [
        Index::Playmaker,
        Index::Finisher,
        Index::Defender,
        Index::Physical,
        Index::Technical,
        Index::Speed,
    ];

    pub fn column_name(&self) -> &'static str {
        match self {
            Index::Playmaker => "Playmaker_Index",
            Index::Finisher => "Finisher_Index",
            Index::Defender => "Defender_Index",
            Index::Physical => "Physical_Index",
            Index::Technical => "Technical_Index",
            Index::Speed => "Speed_Index",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Index::Playmaker => "Playmaker Index",
            Index::Finisher => "Finisher Index",
            Index::Defender => "Defender Index",
            Index::Physical => "Physical Index",
            Index::Technical => "Technical Index",
            Index::Speed => "Speed Index",
        }
    }
}

/// Six composite indexes, each in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexSet {
    pub playmaker: f64,
    pub finisher: f64,
    pub defender: f64,
    pub physical: f64,
    pub technical: f64,
    pub speed: f64,
}

impl IndexSet {
    pub fn get(&self, index: Index) -> f64 {
        match index {
            Index::Playmaker => self.playmaker,
            Index::Finisher => self.finisher,
            Index::Defender => self.defender,
            Index::Physical => self.physical,
            Index::Technical => self.technical,
            Index::Speed => self.speed,
        }
    }

    pub fn set(&mut self, index: Index, value: f64) {
        match index {
            Index::Playmaker => self.playmaker = value,
            Index::Finisher => self.finisher = value,
            Index::Defender => self.defender = value,
            Index::Physical => self.physical = value,
            Index::Technical => self.technical = value,
            Index::Speed => self.speed = value,
        }
    }
}

/// A single column in a feature schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureColumn {
    Attribute(Attribute),
    Index(Index),
    Age,
}

impl FeatureColumn {
    pub fn name(&self) -> &'static str {
        match self {
            FeatureColumn::Attribute(a) => a.column_name(),
            FeatureColumn::Index(i) => i.column_name(),
            FeatureColumn::Age => "Age",
        }
    }
}

const INDEXES_WITH_CORE_ATTRIBUTES: [FeatureColumn; 8] = [
    FeatureColumn::Attribute(Attribute::Reactions),
    FeatureColumn::Attribute(Attribute::Composure),
    FeatureColumn::Index(Index::Playmaker),
    FeatureColumn::Index(Index::Finisher),
    FeatureColumn::Index(Index::Defender),
    FeatureColumn::Index(Index::Physical),
    FeatureColumn::Index(Index::Technical),
    FeatureColumn::Index(Index::Speed),
];

const RAW_ATTRIBUTES: [FeatureColumn; 23] = {
    let mut columns = [FeatureColumn::Age; 23];
    let mut i = 0;
    while i < Attribute::ALL.len() {
        columns[i] = FeatureColumn::Attribute(Attribute::ALL[i]);
        i += 1;
    }
    columns
};

const INDEXES_WITH_AGE: [FeatureColumn; 7] = [
    FeatureColumn::Age,
    FeatureColumn::Index(Index::Playmaker),
    FeatureColumn::Index(Index::Finisher),
    FeatureColumn::Index(Index::Defender),
    FeatureColumn::Index(Index::Physical),
    FeatureColumn::Index(Index::Technical),
    FeatureColumn::Index(Index::Speed),
];

const INDEXES_ONLY: [FeatureColumn; 6] = [
    FeatureColumn::Index(Index::Playmaker),
    FeatureColumn::Index(Index::Finisher),
    FeatureColumn::Index(Index::Defender),
    FeatureColumn::Index(Index::Physical),
    FeatureColumn::Index(Index::Technical),
    FeatureColumn::Index(Index::Speed),
];

/// Named, versioned column layout a model artifact was trained on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSchema {
    #[default]
    IndexesWithCoreAttributes,
    RawAttributes,
    IndexesWithAge,
    IndexesOnly,
}

impl FeatureSchema {
    /// Version of the column layouts defined here. Artifacts declaring any
    /// other version are rejected at load time.
    pub const VERSION: u32 = 1;

    pub fn name(&self) -> &'static str {
        match self {
            FeatureSchema::IndexesWithCoreAttributes => "indexes_with_core_attributes",
            FeatureSchema::RawAttributes => "raw_attributes",
            FeatureSchema::IndexesWithAge => "indexes_with_age",
            FeatureSchema::IndexesOnly => "indexes_only",
        }
    }

    pub fn columns(&self) -> &'static [FeatureColumn] {
        match self {
            FeatureSchema::IndexesWithCoreAttributes => &INDEXES_WITH_CORE_ATTRIBUTES,
            FeatureSchema::RawAttributes => &RAW_ATTRIBUTES,
            FeatureSchema::IndexesWithAge => &INDEXES_WITH_AGE,
            FeatureSchema::IndexesOnly => &INDEXES_ONLY,
        }
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns().iter().map(|c| c.name()).collect()
    }
}

impl fmt::Display for FeatureSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@v{}", self.name(), Self::VERSION)
    }
}

/// Ordered single-row model input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRecord {
    pub schema: FeatureSchema,
    pub columns: Vec<(String, f64)>,
}

impl FeatureRecord {
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.columns.iter().map(|(_, value)| *value).collect()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| *value)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Transform applied to the raw model output to recover a currency value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputTransform {
    /// Labels were `ln(value)` during training
    Exp,
    Identity,
}

impl OutputTransform {
    #[inline]
    pub fn apply(&self, raw: f64) -> f64 {
        match self {
            OutputTransform::Exp => raw.exp(),
            OutputTransform::Identity => raw,
        }
    }
}

/// Final model estimate for one request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub position: PlayerPosition,
    pub schema: FeatureSchema,
    #[serde(rename = "rawOutput")]
    pub raw_output: f64,
    pub transform: OutputTransform,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_parsing() {
        assert_eq!("Defender".parse::<PlayerPosition>().unwrap(), PlayerPosition::Defender);
        assert_eq!("midfielder".parse::<PlayerPosition>().unwrap(), PlayerPosition::Midfielder);
        assert_eq!(" ATTACKER ".parse::<PlayerPosition>().unwrap(), PlayerPosition::Attacker);
    }

    #[test]
    fn test_unknown_position_rejected() {
        let err = "Goalkeeper".parse::<PlayerPosition>().unwrap_err();
        assert!(matches!(err, ValuationError::UnknownPosition(ref p) if p == "Goalkeeper"));
    }

    #[test]
    fn test_schema_column_layouts() {
        assert_eq!(
            FeatureSchema::IndexesWithCoreAttributes.column_names(),
            vec![
                "Reactions",
                "Composure",
                "Playmaker_Index",
                "Finisher_Index",
                "Defender_Index",
                "Physical_Index",
                "Technical_Index",
                "Speed_Index",
            ]
        );
        assert_eq!(FeatureSchema::IndexesWithAge.column_names()[0], "Age");
        assert_eq!(FeatureSchema::IndexesOnly.columns().len(), 6);

        let raw = FeatureSchema::RawAttributes.column_names();
        assert_eq!(raw.len(), 23);
        assert_eq!(raw[0], "Reactions");
        assert_eq!(raw[22], "Agility");

        assert_eq!(FeatureSchema::default(), FeatureSchema::IndexesWithCoreAttributes);
    }

    #[test]
    fn test_attribute_wire_names() {
        let json = r#"{"short_passing": 78, "fk_accuracy": 68, "att_position": 73}"#;
        let set: AttributeSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.get(Attribute::ShortPassing), Some(78));
        assert_eq!(set.get(Attribute::FkAccuracy), Some(68));
        assert_eq!(set.get(Attribute::AttPosition), Some(73));
    }

    #[test]
    fn test_output_transform() {
        assert_eq!(OutputTransform::Identity.apply(42.0), 42.0);
        assert!((OutputTransform::Exp.apply(0.0) - 1.0).abs() < 1e-12);
        assert!(OutputTransform::Exp.apply(-50.0) >= 0.0);
    }
}
