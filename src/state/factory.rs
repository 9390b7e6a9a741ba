use crate::config::{StateBackend, StateConfig};
use crate::error::{AppError, Result};
use crate::state::{load_seed, load_seed_file, DonorStore, InMemoryStore, SledStore};
use std::sync::Arc;

/// Create a donor store based on configuration, seeding it when
/// `seed_file` is set
pub async fn create_store(config: &StateConfig) -> Result<Arc<dyn DonorStore>> {
    let seed = config.seed_file.as_ref().map(load_seed_file).transpose()?;

    match config.backend {
        StateBackend::Sled => {
            let path = config.path.as_ref().ok_or_else(|| {
                AppError::Configuration("Sled backend requires 'path' configuration".to_string())
            })?;

            tracing::info!(path = ?path, "Initializing Sled storage backend");

            let store = SledStore::new(path)?;
            if let Some(seed) = &seed {
                load_seed(&store, seed).await?;
                store.flush().await?;
            }
            Ok(Arc::new(store))
        }

        StateBackend::Memory => {
            tracing::info!("Initializing in-memory storage backend");

            let store = InMemoryStore::new();
            if let Some(seed) = &seed {
                load_seed(&store, seed).await?;
            }
            Ok(Arc::new(store))
        }
    }
}

/// Create an empty in-memory store (for testing and development)
pub fn create_in_memory_store() -> Arc<dyn DonorStore> {
    tracing::info!("Initializing in-memory storage backend");
    Arc::new(InMemoryStore::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::SearchPredicate;
    use std::io::Write;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_sled_store() {
        let temp_dir = TempDir::new().unwrap();
        let config = StateConfig {
            backend: StateBackend::Sled,
            path: Some(temp_dir.path().to_path_buf()),
            seed_file: None,
        };

        let store = create_store(&config).await.unwrap();
        let fetch = store.fetch_primary(&SearchPredicate::MatchAll).await.unwrap();
        assert_eq!(fetch.matched_count, 0);
    }

    #[test]
    fn test_create_in_memory_store() {
        let store = create_in_memory_store();
        let fetch = tokio_test::block_on(store.fetch_primary(&SearchPredicate::MatchAll)).unwrap();
        assert_eq!(fetch.matched_count, 0);
    }

    #[tokio::test]
    async fn test_sled_requires_path() {
        let config = StateConfig {
            backend: StateBackend::Sled,
            path: None,
            seed_file: None,
        };

        let result = create_store(&config).await;
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_seed_file_is_applied() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"{ "donors": [{ "id": "a", "email": "a@x.com" }], "pledge_counts": { "a": 4 } }"#,
        )
        .unwrap();

        let config = StateConfig {
            backend: StateBackend::Memory,
            path: None,
            seed_file: Some(file.path().to_path_buf()),
        };

        let store = create_store(&config).await.unwrap();
        let fetch = store.fetch_primary(&SearchPredicate::MatchAll).await.unwrap();
        assert_eq!(fetch.matched_count, 1);
        let counts = store.fetch_counts(&["a".to_string()]).await.unwrap();
        assert_eq!(counts["a"], 4);
    }

    #[tokio::test]
    async fn test_missing_seed_file_fails() {
        let config = StateConfig {
            backend: StateBackend::Memory,
            path: None,
            seed_file: Some("/nonexistent/seed.json".into()),
        };

        assert!(create_store(&config).await.is_err());
    }
}
