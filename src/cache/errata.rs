//! Errata cache (advisory name → erratum)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::{expiry_after, persist, store, CacheTtl};
use crate::api::{Erratum, Remote};
use crate::error::{Result, ShellError};

const FILE_NAME: &str = "errata";

/// Cached errata for every accessible channel, keyed by advisory name
#[derive(Debug)]
pub struct ErrataCache {
    errata: BTreeMap<String, Erratum>,
    expires_at: DateTime<Utc>,
    file: Option<PathBuf>,
    ttl: Duration,
}

impl Default for ErrataCache {
    fn default() -> Self {
        Self {
            errata: BTreeMap::new(),
            expires_at: store::expired_at(),
            file: None,
            ttl: CacheTtl::ERRATA,
        }
    }
}

impl ErrataCache {
    /// Bind to `dir` and load the cache file found there
    pub fn load(&mut self, dir: &Path) {
        let file = dir.join(FILE_NAME);
        let entry = store::load::<BTreeMap<String, Erratum>>(&file);
        self.errata = entry.mapping;
        self.expires_at = entry.expires_at;
        self.file = Some(file);
    }

    /// Rebuild from every accessible channel unless the cache is fresh and
    /// `force` is false. An advisory published in several channels keeps the
    /// first record seen.
    pub fn generate(&mut self, remote: &Remote<'_>, force: bool) -> Result<bool> {
        if !force && !store::is_stale(self.expires_at) {
            return Ok(false);
        }

        log::info!("Generating errata cache");
        let channels = remote.api.list_software_channels(remote.token)?;

        let mut errata = BTreeMap::new();
        for channel in &channels {
            let listed = match remote.api.list_errata(remote.token, &channel.label) {
                Ok(listed) => listed,
                Err(e) if e.is_auth_fault() => return Err(ShellError::Remote(e)),
                Err(e) => {
                    log::debug!("No access to {}: {}", channel.label, e);
                    continue;
                }
            };

            for erratum in listed {
                errata
                    .entry(erratum.advisory_name.clone())
                    .or_insert(erratum);
            }
        }

        self.errata = errata;
        self.expires_at = expiry_after(self.ttl);
        self.persist();

        Ok(true)
    }

    /// Empty the cache and persist it as expired
    pub fn clear(&mut self) {
        self.errata.clear();
        self.expires_at = store::expired_at();
        self.persist();
    }

    fn persist(&self) {
        persist(self.file.as_deref(), &self.errata, self.expires_at);
    }

    pub fn get(&self, advisory: &str) -> Option<&Erratum> {
        self.errata.get(advisory)
    }

    pub fn id(&self, advisory: &str) -> Option<i64> {
        self.errata.get(advisory).map(|e| e.id)
    }

    /// Advisory name for an erratum id
    pub fn name(&self, id: i64) -> Option<&str> {
        self.errata
            .values()
            .find(|e| e.id == id)
            .map(|e| e.advisory_name.as_str())
    }

    /// Advisory names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.errata.keys().map(String::as_str).collect()
    }

    /// Advisories whose name or synopsis contains `query` (case-insensitive)
    pub fn search(&self, query: &str) -> Vec<&str> {
        let needle = query.to_lowercase();
        self.errata
            .values()
            .filter(|e| {
                e.advisory_name.to_lowercase().contains(&needle)
                    || e.advisory_synopsis.to_lowercase().contains(&needle)
            })
            .map(|e| e.advisory_name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.errata.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errata.is_empty()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}
