//! Package catalog cache
//!
//! Three views are rebuilt together and must agree:
//! - short names (`bash`)
//! - long name → ids (`bash-5.1-2.x86_64` → one id per build)
//! - id → long name

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{expiry_after, persist, store, CacheTtl};
use crate::api::Remote;
use crate::error::{Result, ShellError};

const SHORT_FILE: &str = "packages_short";
const LONG_FILE: &str = "packages_long";
const BY_ID_FILE: &str = "packages_by_id";

/// Long-name ids as found on disk: current files hold a set, old ones a
/// single id
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredIds {
    Many(BTreeSet<i64>),
    One(i64),
}

/// Short names as found on disk: current files hold a list, old ones a map
/// with empty values
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredNames {
    List(BTreeSet<String>),
    Keys(BTreeMap<String, serde_json::Value>),
}

impl Default for StoredNames {
    fn default() -> Self {
        Self::List(BTreeSet::new())
    }
}

/// Normalize older on-disk shapes into the current one
fn migrate(
    names: StoredNames,
    long: BTreeMap<String, StoredIds>,
) -> (BTreeSet<String>, BTreeMap<String, BTreeSet<i64>>) {
    let short = match names {
        StoredNames::List(set) => set,
        StoredNames::Keys(map) => {
            log::debug!("Migrating legacy short-name package cache");
            map.into_keys().collect()
        }
    };

    let mut legacy = 0;
    let by_name = long
        .into_iter()
        .map(|(name, ids)| {
            let ids = match ids {
                StoredIds::Many(ids) => ids,
                StoredIds::One(id) => {
                    legacy += 1;
                    BTreeSet::from([id])
                }
            };
            (name, ids)
        })
        .collect();

    if legacy > 0 {
        log::debug!("Migrated {} legacy single-id package entries", legacy);
    }

    (short, by_name)
}

/// Reverse the long-name view. Ids are expected to be unique; on collision the
/// last long name (in sorted order) wins.
fn index_by_id(by_name: &BTreeMap<String, BTreeSet<i64>>) -> BTreeMap<i64, String> {
    let mut by_id = BTreeMap::new();
    for (name, ids) in by_name {
        for id in ids {
            if let Some(previous) = by_id.insert(*id, name.clone()) {
                log::debug!(
                    "Non-unique package id {} detected. Taking \"{}\" instead of \"{}\"",
                    id,
                    name,
                    previous
                );
            }
        }
    }
    by_id
}

#[derive(Debug)]
struct PackageFiles {
    short: PathBuf,
    long: PathBuf,
    by_id: PathBuf,
}

/// Cached package names and ids for every accessible channel
#[derive(Debug)]
pub struct PackageCache {
    short_names: BTreeSet<String>,
    by_name: BTreeMap<String, BTreeSet<i64>>,
    by_id: BTreeMap<i64, String>,
    expires_at: DateTime<Utc>,
    files: Option<PackageFiles>,
    ttl: Duration,
}

impl Default for PackageCache {
    fn default() -> Self {
        Self {
            short_names: BTreeSet::new(),
            by_name: BTreeMap::new(),
            by_id: BTreeMap::new(),
            expires_at: store::expired_at(),
            files: None,
            ttl: CacheTtl::PACKAGES,
        }
    }
}

impl PackageCache {
    /// Bind to `dir` and load the three cache files found there.
    ///
    /// The cache is only as fresh as its stalest file.
    pub fn load(&mut self, dir: &Path) {
        let files = PackageFiles {
            short: dir.join(SHORT_FILE),
            long: dir.join(LONG_FILE),
            by_id: dir.join(BY_ID_FILE),
        };

        let short = store::load::<StoredNames>(&files.short);
        let long = store::load::<BTreeMap<String, StoredIds>>(&files.long);
        let by_id = store::load::<BTreeMap<i64, String>>(&files.by_id);

        let (short_names, by_name) = migrate(short.mapping, long.mapping);
        self.short_names = short_names;
        self.by_name = by_name;
        self.by_id = by_id.mapping;
        self.expires_at = short.expires_at.min(long.expires_at).min(by_id.expires_at);
        self.files = Some(files);
    }

    /// Rebuild from every accessible channel unless the cache is fresh and
    /// `force` is false.
    ///
    /// Channels the user cannot read are skipped.
    pub fn generate(&mut self, remote: &Remote<'_>, force: bool) -> Result<bool> {
        if !force && !store::is_stale(self.expires_at) {
            return Ok(false);
        }

        log::info!("Generating package cache");
        let channels = remote.api.list_software_channels(remote.token)?;

        let mut short_names = BTreeSet::new();
        let mut by_name: BTreeMap<String, BTreeSet<i64>> = BTreeMap::new();

        for channel in &channels {
            let packages = match remote.api.list_all_packages(remote.token, &channel.label) {
                Ok(packages) => packages,
                Err(e) if e.is_auth_fault() => return Err(ShellError::Remote(e)),
                Err(e) => {
                    log::debug!("No access to {}: {}", channel.label, e);
                    continue;
                }
            };

            for package in packages {
                by_name.entry(package.long_name()).or_default().insert(package.id);
                short_names.insert(package.name);
            }
        }

        self.by_id = index_by_id(&by_name);
        self.by_name = by_name;
        self.short_names = short_names;
        self.expires_at = expiry_after(self.ttl);
        self.persist();

        Ok(true)
    }

    /// Empty every view and persist them as expired
    pub fn clear(&mut self) {
        self.short_names.clear();
        self.by_name.clear();
        self.by_id.clear();
        self.expires_at = store::expired_at();
        self.persist();
    }

    fn persist(&self) {
        let Some(files) = &self.files else {
            return;
        };

        persist(Some(&files.short), &self.short_names, self.expires_at);
        persist(Some(&files.long), &self.by_name, self.expires_at);
        persist(Some(&files.by_id), &self.by_id, self.expires_at);
    }

    /// Ids of every build with this long name
    pub fn ids(&self, long_name: &str) -> Option<&BTreeSet<i64>> {
        self.by_name.get(long_name)
    }

    pub fn name(&self, id: i64) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    pub fn short_names(&self) -> &BTreeSet<String> {
        &self.short_names
    }

    pub fn long_names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    /// Number of distinct long names
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{package, MockApi};
    use crate::cache::store::CacheEntry;
    use std::fs;
    use tempfile::TempDir;

    fn foo_api() -> MockApi {
        MockApi::new()
            .with_token("tok")
            .with_channel("pool", None)
            .with_channel("updates", Some("pool"))
            .with_packages("pool", vec![package(10, "foo", "1.0")])
            .with_packages(
                "updates",
                vec![package(11, "foo", "2.0"), package(20, "bar", "0.9")],
            )
    }

    #[test]
    fn test_generate_builds_all_views() {
        let api = foo_api();
        let remote = Remote::new(&api, "tok");
        let mut cache = PackageCache::default();

        cache.generate(&remote, false).unwrap();

        assert_eq!(cache.ids("foo-1.0-1.x86_64"), Some(&BTreeSet::from([10])));
        assert_eq!(cache.ids("foo-2.0-1.x86_64"), Some(&BTreeSet::from([11])));
        assert_eq!(cache.name(11), Some("foo-2.0-1.x86_64"));

        let short: Vec<&str> = cache.short_names().iter().map(String::as_str).collect();
        assert_eq!(short, vec!["bar", "foo"]);
    }

    #[test]
    fn test_views_stay_consistent() {
        let api = foo_api();
        let remote = Remote::new(&api, "tok");
        let mut cache = PackageCache::default();
        cache.generate(&remote, false).unwrap();

        for long_name in cache.long_names() {
            for id in cache.ids(long_name).unwrap() {
                assert_eq!(cache.name(*id), Some(long_name));
            }
        }
        assert_eq!(cache.by_id.len(), 3);
    }

    #[test]
    fn test_same_build_in_many_channels_collects_ids() {
        let api = MockApi::new()
            .with_token("tok")
            .with_channel("a", None)
            .with_channel("b", None)
            .with_packages("a", vec![package(10, "foo", "1.0")])
            .with_packages("b", vec![package(12, "foo", "1.0")]);
        let remote = Remote::new(&api, "tok");
        let mut cache = PackageCache::default();
        cache.generate(&remote, false).unwrap();

        assert_eq!(cache.ids("foo-1.0-1.x86_64"), Some(&BTreeSet::from([10, 12])));
        assert_eq!(cache.short_names().len(), 1);
    }

    #[test]
    fn test_inaccessible_channel_is_skipped() {
        let api = foo_api().with_denied_channel("embargoed");
        let remote = Remote::new(&api, "tok");
        let mut cache = PackageCache::default();

        assert!(cache.generate(&remote, false).unwrap());
        assert_eq!(cache.len(), 3);
        assert!(!store::is_stale(cache.expires_at()));
    }

    #[test]
    fn test_generate_fetches_once_within_ttl() {
        let api = foo_api();
        let remote = Remote::new(&api, "tok");
        let mut cache = PackageCache::default();

        cache.generate(&remote, false).unwrap();
        cache.generate(&remote, false).unwrap();

        assert_eq!(api.calls("list_software_channels"), 1);
        assert_eq!(api.calls("list_all_packages"), 2);
    }

    #[test]
    fn test_colliding_id_last_writer_wins() {
        let mut by_name = BTreeMap::new();
        by_name.insert("a-1-1.noarch".to_string(), BTreeSet::from([7]));
        by_name.insert("b-1-1.noarch".to_string(), BTreeSet::from([7, 8]));

        let by_id = index_by_id(&by_name);
        assert_eq!(by_id.get(&7).map(String::as_str), Some("b-1-1.noarch"));
        assert_eq!(by_id.len(), 2);
    }

    #[test]
    fn test_reload_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let api = foo_api();
        let remote = Remote::new(&api, "tok");
        let mut cache = PackageCache::default();
        cache.load(temp_dir.path());
        cache.generate(&remote, false).unwrap();

        let mut reloaded = PackageCache::default();
        reloaded.load(temp_dir.path());
        assert_eq!(reloaded.by_name, cache.by_name);
        assert_eq!(reloaded.by_id, cache.by_id);
        assert_eq!(reloaded.short_names, cache.short_names);
        assert_eq!(reloaded.expires_at(), cache.expires_at());
    }

    #[test]
    fn test_load_migrates_legacy_formats() {
        let temp_dir = TempDir::new().unwrap();
        let future = "2099-01-01T00:00:00Z";
        fs::write(
            temp_dir.path().join(LONG_FILE),
            format!(r#"{{"mapping": {{"foo-1.0-1.x86_64": 10, "foo-2.0-1.x86_64": [11, 12]}}, "expires_at": "{future}"}}"#),
        )
        .unwrap();
        fs::write(
            temp_dir.path().join(SHORT_FILE),
            format!(r#"{{"mapping": {{"foo": ""}}, "expires_at": "{future}"}}"#),
        )
        .unwrap();
        fs::write(
            temp_dir.path().join(BY_ID_FILE),
            format!(r#"{{"mapping": {{"10": "foo-1.0-1.x86_64"}}, "expires_at": "{future}"}}"#),
        )
        .unwrap();

        let mut cache = PackageCache::default();
        cache.load(temp_dir.path());

        assert_eq!(cache.ids("foo-1.0-1.x86_64"), Some(&BTreeSet::from([10])));
        assert_eq!(cache.ids("foo-2.0-1.x86_64"), Some(&BTreeSet::from([11, 12])));
        assert!(cache.short_names().contains("foo"));
        assert!(!store::is_stale(cache.expires_at()));
    }

    #[test]
    fn test_missing_view_makes_cache_stale() {
        let temp_dir = TempDir::new().unwrap();
        let api = foo_api();
        let remote = Remote::new(&api, "tok");
        let mut cache = PackageCache::default();
        cache.load(temp_dir.path());
        cache.generate(&remote, false).unwrap();

        fs::remove_file(temp_dir.path().join(BY_ID_FILE)).unwrap();

        let mut reloaded = PackageCache::default();
        reloaded.load(temp_dir.path());
        assert!(store::is_stale(reloaded.expires_at()));
    }

    #[test]
    fn test_clear_persists_all_views_expired() {
        let temp_dir = TempDir::new().unwrap();
        let api = foo_api();
        let remote = Remote::new(&api, "tok");
        let mut cache = PackageCache::default();
        cache.load(temp_dir.path());
        cache.generate(&remote, false).unwrap();

        cache.clear();

        assert!(cache.is_empty());
        assert!(cache.short_names().is_empty());
        for file in [SHORT_FILE, LONG_FILE, BY_ID_FILE] {
            let entry: CacheEntry<serde_json::Value> = store::load(&temp_dir.path().join(file));
            assert!(entry.is_stale(), "{file} should be expired");
        }
    }
}
