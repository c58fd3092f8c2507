//! Mock remote API for testing
//!
//! Configure responses via builder methods; clones share state so a test can
//! hand one clone to the code under test and inspect call counts on another.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use url::Url;

use super::types::*;
use super::{ApiResult, Connector, RemoteApi};
use crate::error::RemoteError;

#[derive(Default)]
struct MockState {
    api_version: RefCell<String>,
    server_version: RefCell<String>,
    unreachable: Cell<bool>,
    users: RefCell<BTreeMap<String, String>>,
    tokens: RefCell<BTreeSet<String>>,
    issued: Cell<u32>,
    systems: RefCell<Vec<SystemSummary>>,
    channels: RefCell<Vec<SoftwareChannel>>,
    denied_channels: RefCell<BTreeSet<String>>,
    packages: RefCell<BTreeMap<String, Vec<PackageSummary>>>,
    errata: RefCell<BTreeMap<String, Vec<Erratum>>>,
    groups: RefCell<BTreeMap<String, Vec<SystemSummary>>>,
    subscribers: RefCell<BTreeMap<String, Vec<SystemSummary>>>,
    searches: RefCell<BTreeMap<(SearchField, String), Vec<SystemSummary>>>,
    cves: RefCell<BTreeMap<String, Vec<Erratum>>>,
    calls: RefCell<BTreeMap<&'static str, usize>>,
}

/// Mock API client for testing
#[derive(Clone)]
pub struct MockApi {
    state: Rc<MockState>,
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockApi {
    pub fn new() -> Self {
        let state = MockState::default();
        *state.api_version.borrow_mut() = "25".to_string();
        *state.server_version.borrow_mut() = "5.0.0".to_string();
        Self {
            state: Rc::new(state),
        }
    }

    pub fn with_api_version(self, version: &str) -> Self {
        *self.state.api_version.borrow_mut() = version.to_string();
        self
    }

    pub fn with_user(self, username: &str, password: &str) -> Self {
        self.state
            .users
            .borrow_mut()
            .insert(username.to_string(), password.to_string());
        self
    }

    /// Accept `token` as an already-established session
    pub fn with_token(self, token: &str) -> Self {
        self.state.tokens.borrow_mut().insert(token.to_string());
        self
    }

    pub fn with_systems(self, systems: &[(i64, &str)]) -> Self {
        self.set_systems(systems);
        self
    }

    /// Replace the server's system inventory
    pub fn set_systems(&self, systems: &[(i64, &str)]) {
        *self.state.systems.borrow_mut() = systems
            .iter()
            .map(|(id, name)| SystemSummary {
                id: *id,
                name: name.to_string(),
            })
            .collect();
    }

    pub fn with_channel(self, label: &str, parent: Option<&str>) -> Self {
        self.state.channels.borrow_mut().push(SoftwareChannel {
            label: label.to_string(),
            parent_label: parent.map(str::to_string),
        });
        self
    }

    /// Listing this channel's contents fails with a fault
    pub fn with_denied_channel(self, label: &str) -> Self {
        self.state
            .denied_channels
            .borrow_mut()
            .insert(label.to_string());
        self.with_channel(label, None)
    }

    pub fn with_packages(self, channel: &str, packages: Vec<PackageSummary>) -> Self {
        self.state
            .packages
            .borrow_mut()
            .insert(channel.to_string(), packages);
        self
    }

    pub fn with_errata(self, channel: &str, errata: Vec<Erratum>) -> Self {
        self.state
            .errata
            .borrow_mut()
            .insert(channel.to_string(), errata);
        self
    }

    pub fn with_group(self, group: &str, members: &[(i64, &str)]) -> Self {
        self.state
            .groups
            .borrow_mut()
            .insert(group.to_string(), summaries(members));
        self
    }

    pub fn with_subscribers(self, channel: &str, members: &[(i64, &str)]) -> Self {
        self.state
            .subscribers
            .borrow_mut()
            .insert(channel.to_string(), summaries(members));
        self
    }

    pub fn with_search(self, field: SearchField, query: &str, hits: &[(i64, &str)]) -> Self {
        self.state
            .searches
            .borrow_mut()
            .insert((field, query.to_string()), summaries(hits));
        self
    }

    pub fn with_cve(self, cve: &str, errata: Vec<Erratum>) -> Self {
        self.state.cves.borrow_mut().insert(cve.to_string(), errata);
        self
    }

    /// Every call fails as if the server could not be reached
    pub fn unreachable(self) -> Self {
        self.state.unreachable.set(true);
        self
    }

    /// Number of times `method` was called
    pub fn calls(&self, method: &str) -> usize {
        self.state.calls.borrow().get(method).copied().unwrap_or(0)
    }

    pub fn is_token_valid(&self, token: &str) -> bool {
        self.state.tokens.borrow().contains(token)
    }

    fn record(&self, method: &'static str) -> ApiResult<()> {
        *self.state.calls.borrow_mut().entry(method).or_insert(0) += 1;
        if self.state.unreachable.get() {
            return Err(RemoteError::Status {
                status: 503,
                message: "connection refused".to_string(),
            });
        }
        Ok(())
    }

    fn authorized(&self, method: &'static str, token: &str) -> ApiResult<()> {
        self.record(method)?;
        if !self.is_token_valid(token) {
            return Err(RemoteError::Auth("Could not find session".to_string()));
        }
        Ok(())
    }

    fn channel_access(&self, channel: &str) -> ApiResult<()> {
        if self.state.denied_channels.borrow().contains(channel) {
            return Err(RemoteError::Fault {
                code: Some(2850),
                message: format!("No access to {channel}"),
            });
        }
        Ok(())
    }
}

fn summaries(members: &[(i64, &str)]) -> Vec<SystemSummary> {
    members
        .iter()
        .map(|(id, name)| SystemSummary {
            id: *id,
            name: name.to_string(),
        })
        .collect()
}

/// Build a package record for tests
pub fn package(id: i64, name: &str, version: &str) -> PackageSummary {
    PackageSummary {
        id,
        name: name.to_string(),
        version: version.to_string(),
        release: "1".to_string(),
        epoch: None,
        arch: Some("x86_64".to_string()),
    }
}

/// Build an erratum record for tests
pub fn erratum(id: i64, advisory: &str, synopsis: &str) -> Erratum {
    Erratum {
        id,
        advisory_name: advisory.to_string(),
        advisory_type: "Security Advisory".to_string(),
        advisory_status: "final".to_string(),
        date: "2024-05-01".to_string(),
        advisory_synopsis: synopsis.to_string(),
    }
}

impl RemoteApi for MockApi {
    fn api_version(&self) -> ApiResult<String> {
        self.record("api_version")?;
        Ok(self.state.api_version.borrow().clone())
    }

    fn server_version(&self) -> ApiResult<String> {
        self.record("server_version")?;
        Ok(self.state.server_version.borrow().clone())
    }

    fn login(&self, username: &str, password: &str) -> ApiResult<String> {
        self.record("login")?;
        if self.state.users.borrow().get(username).map(String::as_str) != Some(password) {
            return Err(RemoteError::Auth("Either the password or username is incorrect".to_string()));
        }

        let n = self.state.issued.get() + 1;
        self.state.issued.set(n);
        let token = format!("session-{n}");
        self.state.tokens.borrow_mut().insert(token.clone());
        Ok(token)
    }

    fn logout(&self, token: &str) -> ApiResult<()> {
        self.authorized("logout", token)?;
        self.state.tokens.borrow_mut().remove(token);
        Ok(())
    }

    fn list_assignable_roles(&self, token: &str) -> ApiResult<Vec<String>> {
        self.authorized("list_assignable_roles", token)?;
        Ok(vec!["org_admin".to_string()])
    }

    fn list_systems(&self, token: &str) -> ApiResult<Vec<SystemSummary>> {
        self.authorized("list_systems", token)?;
        Ok(self.state.systems.borrow().clone())
    }

    fn list_software_channels(&self, token: &str) -> ApiResult<Vec<SoftwareChannel>> {
        self.authorized("list_software_channels", token)?;
        Ok(self.state.channels.borrow().clone())
    }

    fn list_all_packages(&self, token: &str, channel: &str) -> ApiResult<Vec<PackageSummary>> {
        self.authorized("list_all_packages", token)?;
        self.channel_access(channel)?;
        Ok(self
            .state
            .packages
            .borrow()
            .get(channel)
            .cloned()
            .unwrap_or_default())
    }

    fn list_errata(&self, token: &str, channel: &str) -> ApiResult<Vec<Erratum>> {
        self.authorized("list_errata", token)?;
        self.channel_access(channel)?;
        Ok(self
            .state
            .errata
            .borrow()
            .get(channel)
            .cloned()
            .unwrap_or_default())
    }

    fn list_group_systems(&self, token: &str, group: &str) -> ApiResult<Vec<SystemSummary>> {
        self.authorized("list_group_systems", token)?;
        self.state
            .groups
            .borrow()
            .get(group)
            .cloned()
            .ok_or_else(|| RemoteError::fault(format!("Unable to locate system group {group}")))
    }

    fn list_channel_systems(&self, token: &str, channel: &str) -> ApiResult<Vec<SystemSummary>> {
        self.authorized("list_channel_systems", token)?;
        Ok(self
            .state
            .subscribers
            .borrow()
            .get(channel)
            .cloned()
            .unwrap_or_default())
    }

    fn search_systems(
        &self,
        token: &str,
        field: SearchField,
        query: &str,
    ) -> ApiResult<Vec<SystemSummary>> {
        self.authorized("search_systems", token)?;
        Ok(self
            .state
            .searches
            .borrow()
            .get(&(field, query.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn find_errata_by_cve(&self, token: &str, cve: &str) -> ApiResult<Vec<Erratum>> {
        self.authorized("find_errata_by_cve", token)?;
        Ok(self.state.cves.borrow().get(cve).cloned().unwrap_or_default())
    }
}

/// Connector handing out clones of one [`MockApi`]
pub struct MockConnector {
    pub api: MockApi,
    pub refuse: bool,
}

impl MockConnector {
    pub fn new(api: MockApi) -> Self {
        Self { api, refuse: false }
    }
}

impl Connector for MockConnector {
    fn connect(&self, url: &Url) -> ApiResult<Box<dyn RemoteApi>> {
        if self.refuse {
            return Err(RemoteError::InvalidUrl(url.to_string()));
        }
        Ok(Box::new(self.api.clone()))
    }
}
