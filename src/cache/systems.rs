//! System inventory cache (id → profile name)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::{expiry_after, persist, store, CacheTtl};
use crate::api::Remote;
use crate::error::Result;

const FILE_NAME: &str = "systems";

/// Cached map of system ids to profile names.
///
/// Names are not unique on the server; ids are.
#[derive(Debug)]
pub struct SystemCache {
    systems: BTreeMap<i64, String>,
    expires_at: DateTime<Utc>,
    file: Option<PathBuf>,
    ttl: Duration,
}

impl Default for SystemCache {
    fn default() -> Self {
        Self {
            systems: BTreeMap::new(),
            expires_at: store::expired_at(),
            file: None,
            ttl: CacheTtl::SYSTEMS,
        }
    }
}

impl SystemCache {
    /// Bind to `dir` and load the cache file found there
    pub fn load(&mut self, dir: &Path) {
        let file = dir.join(FILE_NAME);
        let entry = store::load::<BTreeMap<i64, String>>(&file);
        self.systems = entry.mapping;
        self.expires_at = entry.expires_at;
        self.file = Some(file);
    }

    /// Rebuild from the server unless the cache is fresh and `force` is false.
    ///
    /// Returns whether a rebuild happened.
    pub fn generate(&mut self, remote: &Remote<'_>, force: bool) -> Result<bool> {
        if !force && !store::is_stale(self.expires_at) {
            return Ok(false);
        }

        log::info!("Generating system cache");
        let systems = remote.api.list_systems(remote.token)?;

        self.systems = systems.into_iter().map(|s| (s.id, s.name)).collect();
        self.expires_at = expiry_after(self.ttl);
        self.persist();

        Ok(true)
    }

    /// Empty the cache and persist it as expired
    pub fn clear(&mut self) {
        self.systems.clear();
        self.expires_at = store::expired_at();
        self.persist();
    }

    fn persist(&self) {
        persist(self.file.as_deref(), &self.systems, self.expires_at);
    }

    pub fn systems(&self) -> &BTreeMap<i64, String> {
        &self.systems
    }

    pub fn contains(&self, id: i64) -> bool {
        self.systems.contains_key(&id)
    }

    pub fn name(&self, id: i64) -> Option<&str> {
        self.systems.get(&id).map(String::as_str)
    }

    /// Ids of every system with exactly this name, ascending
    pub fn ids_named(&self, name: &str) -> Vec<i64> {
        self.systems
            .iter()
            .filter(|(_, n)| n.as_str() == name)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.systems.values().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}
