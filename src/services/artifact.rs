use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::core::{ModelSpec, RegressionModel};
use crate::models::{FeatureSchema, OutputTransform, PlayerPosition};

/// Errors that can occur while loading a model artifact
#[derive(Debug, Clone, Error)]
pub enum ArtifactError {
    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse artifact: {0}")]
    Parse(String),

    #[error("Invalid artifact '{name}': {message}")]
    Invalid { name: String, message: String },

    #[error("Artifact '{name}' for {position} does not match schema {schema}: {message}")]
    SchemaMismatch {
        name: String,
        position: PlayerPosition,
        schema: FeatureSchema,
        message: String,
    },

    #[error("No model artifact configured for {0}")]
    NotConfigured(PlayerPosition),
}

/// Artifact file layout
#[derive(Debug, Deserialize)]
struct ArtifactFile {
    name: String,
    position: PlayerPosition,
    schema: FeatureSchema,
    schema_version: u32,
    feature_names: Vec<String>,
    output_transform: OutputTransform,
    model: ModelSpec,
}

/// A loaded, validated, immutable model artifact
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    pub name: String,
    pub position: PlayerPosition,
    pub schema: FeatureSchema,
    /// Column names in the order the model was trained on
    pub feature_names: Vec<String>,
    pub output_transform: OutputTransform,
    pub model: Arc<dyn RegressionModel>,
}

impl ModelArtifact {
    /// Parse and validate an artifact from JSON
    ///
    /// `position` and `schema` are what the caller expects this artifact to
    /// be; any disagreement with the file's own declarations is an error.
    pub fn from_json_str(
        json: &str,
        position: PlayerPosition,
        schema: FeatureSchema,
    ) -> Result<Self, ArtifactError> {
        let file: ArtifactFile =
            serde_json::from_str(json).map_err(|e| ArtifactError::Parse(e.to_string()))?;

        let mismatch = |message: String| ArtifactError::SchemaMismatch {
            name: file.name.clone(),
            position,
            schema,
            message,
        };

        if file.position != position {
            return Err(mismatch(format!("artifact declares position {}", file.position)));
        }
        if file.schema != schema {
            return Err(mismatch(format!("artifact declares schema {}", file.schema)));
        }
        if file.schema_version != FeatureSchema::VERSION {
            return Err(mismatch(format!(
                "artifact declares schema version {}, supported version is {}",
                file.schema_version,
                FeatureSchema::VERSION
            )));
        }

        let expected = schema.column_names();
        if file.feature_names.len() != expected.len()
            || file.feature_names.iter().zip(&expected).any(|(f, e)| f != e)
        {
            return Err(mismatch(format!(
                "feature names {:?} differ from schema columns {:?}",
                file.feature_names, expected
            )));
        }

        let model = file
            .model
            .build(file.feature_names.len())
            .map_err(|message| ArtifactError::Invalid {
                name: file.name.clone(),
                message,
            })?;

        Ok(Self {
            name: file.name,
            position,
            schema,
            feature_names: file.feature_names,
            output_transform: file.output_transform,
            model,
        })
    }

    /// Read, parse and validate an artifact file
    pub fn load<P: AsRef<Path>>(
        path: P,
        position: PlayerPosition,
        schema: FeatureSchema,
    ) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ArtifactError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&content, position, schema)
    }
}

/// Capability to produce the artifact for a position
///
/// Called at most once per position by the model cache.
pub trait ArtifactSource: Send + Sync {
    fn load(&self, position: PlayerPosition) -> Result<ModelArtifact, ArtifactError>;
}

/// Where to find one position's artifact and which schema it must carry
#[derive(Debug, Clone)]
pub struct ArtifactLocation {
    pub path: PathBuf,
    pub schema: FeatureSchema,
}

/// Loads artifacts from JSON files on disk
#[derive(Debug, Clone, Default)]
pub struct FileArtifactSource {
    locations: HashMap<PlayerPosition, ArtifactLocation>,
}

impl FileArtifactSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location(mut self, position: PlayerPosition, location: ArtifactLocation) -> Self {
        self.locations.insert(position, location);
        self
    }

    pub fn location(&self, position: PlayerPosition) -> Option<&ArtifactLocation> {
        self.locations.get(&position)
    }
}

impl ArtifactSource for FileArtifactSource {
    fn load(&self, position: PlayerPosition) -> Result<ModelArtifact, ArtifactError> {
        let location = self
            .locations
            .get(&position)
            .ok_or(ArtifactError::NotConfigured(position))?;

        tracing::info!(
            "Loading {} model from {} (schema {})",
            position,
            location.path.display(),
            location.schema
        );

        let artifact = ModelArtifact::load(&location.path, position, location.schema)?;

        tracing::info!(
            "Loaded {} model '{}' ({}, {} features, transform {:?})",
            position,
            artifact.name,
            artifact.model.kind(),
            artifact.feature_names.len(),
            artifact.output_transform
        );

        Ok(artifact)
    }
}
