// Service exports
pub mod artifact;
pub mod cache;

pub use artifact::{ArtifactError, ArtifactLocation, ArtifactSource, FileArtifactSource, ModelArtifact};
pub use cache::{CacheStats, ModelCache};
