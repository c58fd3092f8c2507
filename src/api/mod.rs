//! Remote systems-management API
//!
//! The shell talks to the server only through [`RemoteApi`], so caches and
//! the session manager can be driven by any transport.

mod client;
#[cfg(test)]
pub(crate) mod mock;
pub mod types;

pub use client::{server_url, HttpApi, HttpConnector};
pub use types::*;

use url::Url;

use crate::error::RemoteError;

/// Result type for remote calls
pub type ApiResult<T> = std::result::Result<T, RemoteError>;

/// Operations the shell needs from the server.
///
/// Calls taking a `token` fail with [`RemoteError::Auth`] when the session is
/// not valid, and with [`RemoteError::Fault`] when the caller has no access to
/// the requested resource.
pub trait RemoteApi {
    /// API version string, e.g. `"25"` or `"24.3"`
    fn api_version(&self) -> ApiResult<String>;

    /// Server product version
    fn server_version(&self) -> ApiResult<String>;

    /// Authenticate and return a session token
    fn login(&self, username: &str, password: &str) -> ApiResult<String>;

    fn logout(&self, token: &str) -> ApiResult<()>;

    /// Lightweight authenticated call, used to probe session validity
    fn list_assignable_roles(&self, token: &str) -> ApiResult<Vec<String>>;

    fn list_systems(&self, token: &str) -> ApiResult<Vec<SystemSummary>>;

    fn list_software_channels(&self, token: &str) -> ApiResult<Vec<SoftwareChannel>>;

    fn list_all_packages(&self, token: &str, channel: &str) -> ApiResult<Vec<PackageSummary>>;

    fn list_errata(&self, token: &str, channel: &str) -> ApiResult<Vec<Erratum>>;

    /// Members of a system group
    fn list_group_systems(&self, token: &str, group: &str) -> ApiResult<Vec<SystemSummary>>;

    /// Systems subscribed to a software channel
    fn list_channel_systems(&self, token: &str, channel: &str) -> ApiResult<Vec<SystemSummary>>;

    fn search_systems(
        &self,
        token: &str,
        field: SearchField,
        query: &str,
    ) -> ApiResult<Vec<SystemSummary>>;

    /// Errata fixing a CVE
    fn find_errata_by_cve(&self, token: &str, cve: &str) -> ApiResult<Vec<Erratum>>;
}

/// An API client paired with the session token to call it with
#[derive(Clone, Copy)]
pub struct Remote<'a> {
    pub api: &'a dyn RemoteApi,
    pub token: &'a str,
}

impl<'a> Remote<'a> {
    pub fn new(api: &'a dyn RemoteApi, token: &'a str) -> Self {
        Self { api, token }
    }
}

/// Opens a [`RemoteApi`] for a server URL
pub trait Connector {
    fn connect(&self, url: &Url) -> ApiResult<Box<dyn RemoteApi>>;
}
