//! Name ↔ id resolution and selection expansion on top of the entity caches
//!
//! Every lookup first lets the relevant cache rebuild itself if its TTL has
//! run out, then answers from memory.

mod selector;

use std::collections::BTreeSet;

pub use selector::{ErrataSelector, SystemSelector};

use crate::api::{ApiResult, Remote, SearchField, SystemSummary};
use crate::cache::CacheSet;
use crate::error::Result;

/// Outcome of resolving a system name or id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemLookup {
    Found(i64),
    Missing,
    /// Several systems share the name; callers must pick one by id
    Ambiguous(Vec<i64>),
}

/// Resolves user-supplied names and selection tokens against the caches of
/// the authenticated session
pub struct Resolver<'a> {
    remote: Remote<'a>,
    caches: &'a mut CacheSet,
}

impl<'a> Resolver<'a> {
    pub fn new(remote: Remote<'a>, caches: &'a mut CacheSet) -> Self {
        Self { remote, caches }
    }

    fn refresh_systems(&mut self) -> Result<()> {
        self.caches.systems.generate(&self.remote, false)?;
        Ok(())
    }

    fn refresh_packages(&mut self) -> Result<()> {
        self.caches.packages.generate(&self.remote, false)?;
        Ok(())
    }

    fn refresh_errata(&mut self) -> Result<()> {
        self.caches.errata.generate(&self.remote, false)?;
        Ok(())
    }

    /// Resolve a system name or id without logging.
    ///
    /// An integer present in the cache wins; anything else is matched
    /// exactly against system names.
    pub fn lookup_system(&mut self, name_or_id: &str) -> Result<SystemLookup> {
        self.refresh_systems()?;
        let systems = &self.caches.systems;

        if let Ok(id) = name_or_id.parse::<i64>() {
            if systems.contains(id) {
                return Ok(SystemLookup::Found(id));
            }
        }

        let ids = systems.ids_named(name_or_id);
        Ok(match ids.as_slice() {
            [] => SystemLookup::Missing,
            [id] => SystemLookup::Found(*id),
            _ => SystemLookup::Ambiguous(ids),
        })
    }

    /// Resolve a system name or id, warning when it is unknown or ambiguous
    pub fn resolve_system_id(&mut self, name_or_id: &str) -> Result<Option<i64>> {
        match self.lookup_system(name_or_id)? {
            SystemLookup::Found(id) => Ok(Some(id)),
            SystemLookup::Missing => {
                log::warn!("No system found matching {name_or_id}");
                Ok(None)
            }
            SystemLookup::Ambiguous(ids) => {
                log::warn!("{}", ambiguous_name_warning(name_or_id, &ids));
                Ok(None)
            }
        }
    }

    pub fn resolve_system_name(&mut self, id: i64) -> Result<Option<String>> {
        self.refresh_systems()?;
        Ok(self.caches.systems.name(id).map(str::to_string))
    }

    /// All system names, sorted, duplicates kept
    pub fn system_names(&mut self) -> Result<Vec<String>> {
        self.refresh_systems()?;
        let mut names: Vec<String> = self.caches.systems.names().into_iter().map(str::to_string).collect();
        names.sort();
        Ok(names)
    }

    /// Ids of every package build with this long name
    pub fn resolve_package_id(&mut self, long_name: &str) -> Result<Option<BTreeSet<i64>>> {
        self.refresh_packages()?;
        Ok(self.caches.packages.ids(long_name).cloned())
    }

    pub fn resolve_package_name(&mut self, id: i64) -> Result<Option<String>> {
        self.refresh_packages()?;
        Ok(self.caches.packages.name(id).map(str::to_string))
    }

    /// Sorted package names, short or long
    pub fn package_names(&mut self, long: bool) -> Result<Vec<String>> {
        self.refresh_packages()?;
        let packages = &self.caches.packages;
        Ok(if long {
            packages.long_names().map(str::to_string).collect()
        } else {
            packages.short_names().iter().cloned().collect()
        })
    }

    pub fn resolve_erratum_id(&mut self, advisory: &str) -> Result<Option<i64>> {
        self.refresh_errata()?;
        Ok(self.caches.errata.id(advisory))
    }

    pub fn resolve_erratum_name(&mut self, id: i64) -> Result<Option<String>> {
        self.refresh_errata()?;
        Ok(self.caches.errata.name(id).map(str::to_string))
    }

    /// Expand selection tokens into the union of matching system ids.
    ///
    /// Tokens that match nothing, and filters the server refuses, are
    /// reported as warnings; only an invalid session aborts the expansion.
    pub fn expand_systems<S: AsRef<str>>(&mut self, tokens: &[S]) -> Result<BTreeSet<i64>> {
        let mut ids = BTreeSet::new();

        for token in tokens {
            let token = token.as_ref();
            let matched = match SystemSelector::parse(token) {
                SystemSelector::WorkingSet => {
                    let selected = self.caches.working_set.ids().clone();
                    if selected.is_empty() {
                        log::warn!("The working set is empty");
                    }
                    selected.into_iter().collect()
                }
                SystemSelector::Group(group) => {
                    let listed = self.remote.api.list_group_systems(self.remote.token, &group);
                    summary_ids(tolerate(listed, &format!("group {group}"))?)
                }
                SystemSelector::Channel(channel) => {
                    let listed = self.remote.api.list_channel_systems(self.remote.token, &channel);
                    summary_ids(tolerate(listed, &format!("channel {channel}"))?)
                }
                SystemSelector::Search { field, query } => self.search_systems(field, &query)?,
                SystemSelector::Id(id) => {
                    self.refresh_systems()?;
                    if self.caches.systems.contains(id) {
                        vec![id]
                    } else {
                        self.caches.systems.ids_named(token)
                    }
                }
                SystemSelector::Name(name) => {
                    self.refresh_systems()?;
                    self.caches.systems.ids_named(&name)
                }
            };

            if matched.is_empty() {
                log::warn!("No systems matched {token}");
            }
            ids.extend(matched);
        }

        Ok(ids)
    }

    /// Run a system search; `id` is matched locally as a substring of the id
    pub fn search_systems(&mut self, field: SearchField, query: &str) -> Result<Vec<i64>> {
        if field == SearchField::Id {
            self.refresh_systems()?;
            return Ok(self
                .caches
                .systems
                .systems()
                .keys()
                .filter(|id| id.to_string().contains(query))
                .copied()
                .collect());
        }

        let found = self.remote.api.search_systems(self.remote.token, field, query);
        Ok(summary_ids(tolerate(found, &format!("search {field}:{query}"))?))
    }

    /// Expand errata tokens into advisory names. No tokens selects every
    /// cached advisory.
    ///
    /// Only advisories present in the errata cache are returned; server
    /// search hits from channels the user cannot see are dropped.
    pub fn expand_errata<S: AsRef<str>>(&mut self, tokens: &[S]) -> Result<BTreeSet<String>> {
        self.refresh_errata()?;
        if tokens.is_empty() {
            return Ok(self.caches.errata.names().into_iter().map(str::to_string).collect());
        }

        let mut names = BTreeSet::new();
        for token in tokens {
            let token = token.as_ref();
            let matched = match ErrataSelector::parse(token) {
                ErrataSelector::Search(query) => {
                    let mut found = self.search_errata(&query)?;
                    found.retain(|name| {
                        let cached = self.caches.errata.get(name).is_some();
                        if !cached {
                            log::debug!("{name} is not in any accessible channel");
                        }
                        cached
                    });
                    found
                }
                ErrataSelector::Name(name) => match self.caches.errata.get(&name) {
                    Some(_) => vec![name],
                    None => Vec::new(),
                },
            };

            if matched.is_empty() {
                log::warn!("No errata matched {token}");
            }
            names.extend(matched);
        }

        Ok(names)
    }

    /// Find advisories by CVE (asked of the server) or by a case-insensitive
    /// substring of the advisory name or synopsis
    pub fn search_errata(&mut self, query: &str) -> Result<Vec<String>> {
        if query.to_uppercase().starts_with("CVE-") {
            let found = self.remote.api.find_errata_by_cve(self.remote.token, query);
            return Ok(match found {
                Ok(errata) => errata.into_iter().map(|e| e.advisory_name).collect(),
                Err(e) if e.is_auth_fault() => return Err(e.into()),
                Err(e) => {
                    log::warn!("CVE lookup for {query} failed: {e}");
                    Vec::new()
                }
            });
        }

        self.refresh_errata()?;
        Ok(self.caches.errata.search(query).into_iter().map(str::to_string).collect())
    }

    /// Labels of channels without a parent, sorted
    pub fn list_base_channels(&self) -> Result<Vec<String>> {
        let channels = self.remote.api.list_software_channels(self.remote.token)?;
        let mut labels: Vec<String> = channels
            .into_iter()
            .filter(|c| c.is_base())
            .map(|c| c.label)
            .collect();
        labels.sort();
        Ok(labels)
    }

    /// Labels of child channels, optionally only those under `parent`
    pub fn list_child_channels(&self, parent: Option<&str>) -> Result<Vec<String>> {
        let channels = self.remote.api.list_software_channels(self.remote.token)?;
        let mut labels: Vec<String> = channels
            .into_iter()
            .filter(|c| match parent {
                Some(parent) => c.is_child_of(parent),
                None => !c.is_base(),
            })
            .map(|c| c.label)
            .collect();
        labels.sort();
        Ok(labels)
    }
}

/// Downgrade a refused listing to an empty one; an invalid session still fails
fn tolerate(result: ApiResult<Vec<SystemSummary>>, what: &str) -> Result<Vec<SystemSummary>> {
    match result {
        Ok(systems) => Ok(systems),
        Err(e) if e.is_auth_fault() => Err(e.into()),
        Err(e) => {
            log::warn!("Could not list systems for {what}: {e}");
            Ok(Vec::new())
        }
    }
}

fn ambiguous_name_warning(name: &str, ids: &[i64]) -> String {
    let ids: Vec<String> = ids.iter().map(i64::to_string).collect();
    format!(
        "Duplicate system profile names found for {name}; use the system id instead: {}",
        ids.join(", ")
    )
}

fn summary_ids(systems: Vec<SystemSummary>) -> Vec<i64> {
    systems.into_iter().map(|s| s.id).collect()
}
