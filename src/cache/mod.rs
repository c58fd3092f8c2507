//! Local caches of server entities
//!
//! Each server/username pair owns a directory holding one file per cache.
//! Caches start empty and expired, are loaded from disk after login, rebuilt
//! from the server when their TTL runs out, and written back after every
//! rebuild or clear.

mod errata;
mod packages;
pub mod store;
mod systems;
mod working_set;

pub use errata::ErrataCache;
pub use packages::PackageCache;
pub use systems::SystemCache;
pub use working_set::WorkingSet;

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::ensure_private_dir;
use crate::error::Result;

/// Cache lifetimes per entity kind
pub struct CacheTtl;

impl CacheTtl {
    // Live inventory changes often
    pub const SYSTEMS: Duration = Duration::from_secs(60 * 60); // 1 hr

    // Catalogs change rarely
    pub const PACKAGES: Duration = Duration::from_secs(24 * 60 * 60); // 24 hr
    pub const ERRATA: Duration = Duration::from_secs(24 * 60 * 60); // 24 hr
}

/// Expiry for a cache rebuilt now
pub(crate) fn expiry_after(ttl: Duration) -> DateTime<Utc> {
    Utc::now() + chrono::Duration::seconds(ttl.as_secs() as i64)
}

/// Write a cache file if the cache is bound to a directory.
///
/// Failures are logged; the in-memory cache stays usable.
pub(crate) fn persist<M: Serialize>(file: Option<&Path>, mapping: &M, expires_at: DateTime<Utc>) {
    let Some(path) = file else {
        return;
    };

    if let Err(e) = store::save(path, mapping, expires_at) {
        log::error!("Could not write cache file {}: {}", path.display(), e);
    }
}

/// All caches for the current server/username pair
#[derive(Debug, Default)]
pub struct CacheSet {
    pub systems: SystemCache,
    pub packages: PackageCache,
    pub errata: ErrataCache,
    pub working_set: WorkingSet,
    dir: Option<PathBuf>,
}

impl CacheSet {
    /// Create empty, expired caches not yet bound to disk
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind every cache to `dir` and load what is on disk.
    ///
    /// The directory is created with owner-only permissions. If it cannot be
    /// created the caches stay unbound and in-memory only.
    pub fn load(&mut self, dir: &Path) -> Result<()> {
        ensure_private_dir(dir)?;

        self.systems.load(dir);
        self.packages.load(dir);
        self.errata.load(dir);
        self.working_set.load(dir);
        self.dir = Some(dir.to_path_buf());

        log::debug!("Loaded caches from {}", dir.display());
        Ok(())
    }

    /// Directory the caches persist to
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Invalidate the system, package and errata caches
    pub fn clear(&mut self) {
        self.systems.clear();
        self.packages.clear();
        self.errata.clear();
    }

    /// Summary of every cache
    pub fn status(&self) -> CacheStatus {
        CacheStatus {
            dir: self.dir.clone(),
            systems: CacheEntryStatus::new(self.systems.len(), self.systems.expires_at()),
            packages: CacheEntryStatus::new(self.packages.len(), self.packages.expires_at()),
            errata: CacheEntryStatus::new(self.errata.len(), self.errata.expires_at()),
            working_set: self.working_set.len(),
        }
    }
}

/// Overall cache status
#[derive(Debug, Serialize)]
pub struct CacheStatus {
    pub dir: Option<PathBuf>,
    pub systems: CacheEntryStatus,
    pub packages: CacheEntryStatus,
    pub errata: CacheEntryStatus,
    pub working_set: usize,
}

/// Status of a single cache
#[derive(Debug, Serialize)]
pub struct CacheEntryStatus {
    pub count: usize,
    pub expires_at: DateTime<Utc>,
    pub stale: bool,
}

impl CacheEntryStatus {
    fn new(count: usize, expires_at: DateTime<Utc>) -> Self {
        Self {
            count,
            expires_at,
            stale: store::is_stale(expires_at),
        }
    }
}
