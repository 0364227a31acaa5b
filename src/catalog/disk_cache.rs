use crate::catalog::error::CatalogError;
use crate::types::reservoir::CatalogEntry;
use crate::utils::ensure_cache_dir_exists;
use bincode::config::{Configuration, Fixint, LittleEndian};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

pub const CATALOG_CACHE_FILE_NAME: &str = "reservoir_catalog.bin";
/// How long a downloaded catalog stays fresh.
pub const DEFAULT_CATALOG_TTL: Duration = Duration::from_secs(24 * 60 * 60);

const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();

/// Keeps the last successfully downloaded catalog on disk.
///
/// Freshness is judged from the file's modification time.
#[derive(Debug, Clone)]
pub struct CatalogCache {
    cache_dir: PathBuf,
    ttl: Duration,
}

impl CatalogCache {
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            cache_dir: cache_dir.to_path_buf(),
            ttl: DEFAULT_CATALOG_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn path(&self) -> PathBuf {
        self.cache_dir.join(CATALOG_CACHE_FILE_NAME)
    }

    /// The cached catalog, or `None` if there is no cache file or it is older
    /// than the TTL.
    pub async fn load_fresh(&self) -> Result<Option<Vec<CatalogEntry>>, CatalogError> {
        let path = self.path();
        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No catalog cache at {}", path.display());
                return Ok(None);
            }
            Err(e) => return Err(CatalogError::CacheRead(path, e)),
        };

        let modified = metadata
            .modified()
            .map_err(|e| CatalogError::CacheRead(path.clone(), e))?;
        // A modification time in the future counts as brand new.
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or_default();
        if age >= self.ttl {
            info!(
                "Catalog cache {} is stale ({:?} old)",
                path.display(),
                age
            );
            return Ok(None);
        }

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| CatalogError::CacheRead(path.clone(), e))?;
        let entries = tokio::task::spawn_blocking(move || {
            bincode::serde::decode_from_slice::<Vec<CatalogEntry>, _>(&bytes, BINCODE_CONFIG)
                .map(|(entries, _)| entries)
                .map_err(|e| CatalogError::CacheDecode(path, Box::new(e)))
        })
        .await??;
        Ok(Some(entries))
    }

    /// Replaces the cached catalog with `entries`.
    pub async fn store(&self, entries: &[CatalogEntry]) -> Result<(), CatalogError> {
        ensure_cache_dir_exists(&self.cache_dir)
            .await
            .map_err(|e| CatalogError::CacheDirCreation(self.cache_dir.clone(), e))?;

        let owned = entries.to_vec();
        let bytes = tokio::task::spawn_blocking(move || {
            bincode::serde::encode_to_vec(owned, BINCODE_CONFIG)
                .map_err(|e| CatalogError::CacheEncode(Box::new(e)))
        })
        .await??;

        let path = self.path();
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| CatalogError::CacheWrite(path.clone(), e))?;
        info!(
            "Cached {} catalog entries ({} bytes) to {}",
            entries.len(),
            bytes.len(),
            path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::reservoir::LatLon;

    fn entries() -> Vec<CatalogEntry> {
        vec![
            CatalogEntry {
                name: "Castanhão".to_string(),
                external_id: "12368".to_string(),
                municipality: Some("Alto Santo".to_string()),
                state_code: Some("CE".to_string()),
                location: Some(LatLon(-5.5, -38.47)),
            },
            CatalogEntry {
                name: "Billings".to_string(),
                external_id: "12450".to_string(),
                municipality: None,
                state_code: None,
                location: None,
            },
        ]
    }

    #[tokio::test]
    async fn missing_cache_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CatalogCache::new(dir.path());
        assert_eq!(cache.load_fresh().await.unwrap(), None);
    }

    #[tokio::test]
    async fn stored_catalog_is_served_while_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CatalogCache::new(&dir.path().join("nested"));
        cache.store(&entries()).await.unwrap();
        assert_eq!(cache.load_fresh().await.unwrap(), Some(entries()));
    }

    #[tokio::test]
    async fn stale_catalog_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CatalogCache::new(dir.path()).with_ttl(Duration::ZERO);
        cache.store(&entries()).await.unwrap();
        assert_eq!(cache.load_fresh().await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_cache_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CatalogCache::new(dir.path());
        std::fs::write(cache.path(), b"\x01\x02").unwrap();
        assert!(matches!(
            cache.load_fresh().await,
            Err(CatalogError::CacheDecode(_, _))
        ));
    }
}
