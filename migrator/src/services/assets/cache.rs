use lru::LruCache;
use std::num::NonZeroUsize;

/// Source asset id -> rehosted asset id, for one run.
///
/// Disabled by default: every record then rehosts its own copy of an asset,
/// even when another record already uploaded the same source asset.
pub struct AssetCache {
    entries: Option<LruCache<String, String>>,
}

impl AssetCache {
    pub fn disabled() -> Self {
        Self { entries: None }
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Some(LruCache::new(capacity)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.entries.is_some()
    }

    pub fn get(&mut self, source_id: &str) -> Option<String> {
        self.entries
            .as_mut()
            .and_then(|entries| entries.get(source_id).cloned())
    }

    pub fn insert(&mut self, source_id: &str, rehosted_id: &str) {
        if let Some(entries) = self.entries.as_mut() {
            entries.put(source_id.to_string(), rehosted_id.to_string());
        }
    }
}
