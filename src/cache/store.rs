//! Disk persistence of one cached mapping plus its expiry time

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::Result;

/// A cached mapping and the moment it goes stale
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CacheEntry<M> {
    pub mapping: M,
    pub expires_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct CacheEntryRef<'a, M> {
    mapping: &'a M,
    expires_at: DateTime<Utc>,
}

impl<M: Default> CacheEntry<M> {
    /// Empty mapping that is already expired
    pub fn expired() -> Self {
        Self {
            mapping: M::default(),
            expires_at: expired_at(),
        }
    }
}

impl<M> CacheEntry<M> {
    /// Whether the entry must be rebuilt before it is trusted
    pub fn is_stale(&self) -> bool {
        is_stale(self.expires_at)
    }
}

/// Expiry timestamp that is always in the past
pub fn expired_at() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

/// Whether an expiry timestamp has passed
pub fn is_stale(expires_at: DateTime<Utc>) -> bool {
    Utc::now() >= expires_at
}

/// Write a mapping and its expiry to `path`, replacing prior content.
///
/// The parent directory must already exist. Data goes to a sibling temp file
/// first and is renamed into place.
pub fn save<M: Serialize>(path: &Path, mapping: &M, expires_at: DateTime<Utc>) -> Result<()> {
    let json = serde_json::to_string(&CacheEntryRef {
        mapping,
        expires_at,
    })?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;

    Ok(())
}

/// Read a mapping and its expiry from `path`.
///
/// Never fails: a missing, unreadable or corrupt file yields an empty,
/// already-expired entry.
pub fn load<M: DeserializeOwned + Default>(path: &Path) -> CacheEntry<M> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) => {
            log::debug!("No cache at {}: {}", path.display(), e);
            return CacheEntry::expired();
        }
    };

    match serde_json::from_str(&data) {
        Ok(entry) => entry,
        Err(e) => {
            log::warn!("Ignoring corrupt cache file {}: {}", path.display(), e);
            CacheEntry::expired()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::collections::{BTreeMap, BTreeSet};
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("systems");

        let mut mapping = BTreeMap::new();
        mapping.insert(1000010000_i64, "web01".to_string());
        mapping.insert(1000010001_i64, "db01".to_string());
        let expires_at = Utc::now() + Duration::seconds(3600);

        save(&path, &mapping, expires_at).unwrap();
        let entry: CacheEntry<BTreeMap<i64, String>> = load(&path);

        assert_eq!(entry.mapping, mapping);
        assert_eq!(entry.expires_at, expires_at);
        assert!(!entry.is_stale());
    }

    #[test]
    fn test_load_missing_file_is_empty_and_expired() {
        let temp_dir = TempDir::new().unwrap();
        let entry: CacheEntry<BTreeMap<String, i64>> = load(&temp_dir.path().join("nope"));

        assert!(entry.mapping.is_empty());
        assert!(entry.is_stale());
        assert_eq!(entry.expires_at, expired_at());
    }

    #[test]
    fn test_load_corrupt_file_is_empty_and_expired() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("errata");
        fs::write(&path, "{\"mapping\": [1, 2").unwrap();

        let entry: CacheEntry<BTreeSet<String>> = load(&path);
        assert!(entry.mapping.is_empty());
        assert!(entry.is_stale());
    }

    #[test]
    fn test_load_wrong_shape_is_empty_and_expired() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("systems");
        fs::write(&path, r#"{"mapping": ["not", "a", "map"], "expires_at": "2030-01-01T00:00:00Z"}"#)
            .unwrap();

        let entry: CacheEntry<BTreeMap<i64, String>> = load(&path);
        assert!(entry.mapping.is_empty());
        assert!(entry.is_stale());
    }

    #[test]
    fn test_save_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("short");

        let first: BTreeSet<String> = ["bash".to_string()].into();
        let second: BTreeSet<String> = ["zsh".to_string(), "fish".to_string()].into();
        save(&path, &first, Utc::now()).unwrap();
        save(&path, &second, Utc::now()).unwrap();

        let entry: CacheEntry<BTreeSet<String>> = load(&path);
        assert_eq!(entry.mapping, second);
        assert!(!temp_dir.path().join("short.tmp").exists());
    }

    #[test]
    fn test_save_into_missing_directory_errors() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gone").join("systems");

        let mapping: BTreeMap<i64, String> = BTreeMap::new();
        assert!(save(&path, &mapping, Utc::now()).is_err());
    }

    #[test]
    fn test_expired_entry_is_stale() {
        let entry: CacheEntry<BTreeMap<i64, String>> = CacheEntry::expired();
        assert!(entry.is_stale());
        assert!(is_stale(Utc::now() - Duration::seconds(1)));
        assert!(!is_stale(Utc::now() + Duration::seconds(60)));
    }
}
