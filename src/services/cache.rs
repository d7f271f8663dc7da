use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::models::PlayerPosition;
use crate::services::artifact::{ArtifactError, ArtifactSource, ModelArtifact};

/// Per-position model cache
///
/// Each position's artifact is loaded lazily on first use and then shared
/// for the lifetime of the process. Concurrent first requests for the same
/// position wait on a single load.
pub struct ModelCache {
    source: Arc<dyn ArtifactSource>,
    models: moka::future::Cache<PlayerPosition, Arc<ModelArtifact>>,
    loads: Arc<AtomicU64>,
}

impl ModelCache {
    /// Create a new cache backed by `source`
    pub fn new(source: Arc<dyn ArtifactSource>) -> Self {
        let models = moka::future::CacheBuilder::new(PlayerPosition::ALL.len() as u64).build();

        Self {
            source,
            models,
            loads: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Get the artifact for a position, loading it on first access
    pub async fn get(&self, position: PlayerPosition) -> Result<Arc<ModelArtifact>, ArtifactError> {
        let source = Arc::clone(&self.source);
        let loads = Arc::clone(&self.loads);

        self.models
            .try_get_with(position, async move {
                loads.fetch_add(1, Ordering::Relaxed);
                source.load(position).map(Arc::new)
            })
            .await
            .map_err(|e: Arc<ArtifactError>| {
                tracing::error!("Failed to load {} model: {}", position, e);
                (*e).clone()
            })
    }

    /// Load every position up front so broken artifacts fail at startup
    pub async fn preload(&self) -> Result<(), ArtifactError> {
        for position in PlayerPosition::ALL {
            self.get(position).await?;
        }
        tracing::info!("Preloaded {} position models", PlayerPosition::ALL.len());
        Ok(())
    }

    /// Artifact for a position if it has already been loaded
    pub async fn peek(&self, position: PlayerPosition) -> Option<Arc<ModelArtifact>> {
        self.models.get(&position).await
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            cached_models: self.models.iter().count() as u64,
            loads: self.loads.load(Ordering::Relaxed),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    #[serde(rename = "cachedModels")]
    pub cached_models: u64,
    pub loads: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::regression::LinearRegressor;
    use crate::models::{FeatureSchema, OutputTransform};
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    impl ArtifactSource for CountingSource {
        fn load(&self, position: PlayerPosition) -> Result<ModelArtifact, ArtifactError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let schema = FeatureSchema::IndexesOnly;
            Ok(ModelArtifact {
                name: format!("{}_model", position.key()),
                position,
                schema,
                feature_names: schema.column_names().into_iter().map(String::from).collect(),
                output_transform: OutputTransform::Exp,
                model: Arc::new(LinearRegressor::new(12.0, vec![0.0; 6], 6).unwrap()),
            })
        }
    }

    struct FailingSource;

    impl ArtifactSource for FailingSource {
        fn load(&self, position: PlayerPosition) -> Result<ModelArtifact, ArtifactError> {
            Err(ArtifactError::NotConfigured(position))
        }
    }

    #[tokio::test]
    async fn test_same_artifact_returned() {
        let source = Arc::new(CountingSource::default());
        let cache = ModelCache::new(source.clone());

        let first = cache.get(PlayerPosition::Defender).await.unwrap();
        let second = cache.get(PlayerPosition::Defender).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_positions_cached_separately() {
        let source = Arc::new(CountingSource::default());
        let cache = ModelCache::new(source.clone());

        let defender = cache.get(PlayerPosition::Defender).await.unwrap();
        let attacker = cache.get(PlayerPosition::Attacker).await.unwrap();

        assert_eq!(defender.position, PlayerPosition::Defender);
        assert_eq!(attacker.position, PlayerPosition::Attacker);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_first_access_loads_once() {
        let source = Arc::new(CountingSource::default());
        let cache = Arc::new(ModelCache::new(source.clone()));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.get(PlayerPosition::Midfielder).await.unwrap() })
            })
            .collect();

        let mut artifacts = Vec::new();
        for handle in handles {
            artifacts.push(handle.await.unwrap());
        }

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(artifacts.iter().all(|a| Arc::ptr_eq(a, &artifacts[0])));
    }

    #[tokio::test]
    async fn test_preload_and_stats() {
        let cache = ModelCache::new(Arc::new(CountingSource::default()));
        cache.preload().await.unwrap();

        assert_eq!(cache.stats().loads, 3);
        assert!(cache.peek(PlayerPosition::Attacker).await.is_some());
    }

    #[tokio::test]
    async fn test_load_failure_propagates() {
        let cache = ModelCache::new(Arc::new(FailingSource));
        let err = cache.get(PlayerPosition::Defender).await.unwrap_err();

        assert!(matches!(err, ArtifactError::NotConfigured(PlayerPosition::Defender)));
        assert!(cache.peek(PlayerPosition::Defender).await.is_none());
    }
}
