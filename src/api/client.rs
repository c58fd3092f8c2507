use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use super::types::*;
use super::{ApiResult, Connector, RemoteApi};
use crate::error::RemoteError;

const API_PATH: &str = "/rhn/manager/api";
const SESSION_COOKIE: &str = "pxt-session-cookie";
const USER_AGENT: &str = concat!("spacesh/", env!("CARGO_PKG_VERSION"));

/// Build the API URL for a server (`https://<server>/rhn/manager/api`)
pub fn server_url(server: &str, nossl: bool) -> ApiResult<Url> {
    let proto = if nossl { "http" } else { "https" };
    let raw = format!("{proto}://{server}{API_PATH}");

    let url = Url::parse(&raw).map_err(|e| RemoteError::InvalidUrl(format!("{raw}: {e}")))?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err(RemoteError::InvalidUrl(raw));
    }

    Ok(url)
}

/// Blocking JSON-over-HTTP client for the server API
pub struct HttpApi {
    client: Client,
    base: String,
}

impl HttpApi {
    /// Create a client for an API base URL
    pub fn new(base: &Url) -> ApiResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            base: base.as_str().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}{}", self.base, method)
    }

    /// Make a GET request to the API
    fn get<T: DeserializeOwned>(
        &self,
        method: &str,
        token: Option<&str>,
        query: &[(&str, &str)],
    ) -> ApiResult<T> {
        let mut request = self.client.get(self.endpoint(method)).query(query);
        if let Some(token) = token {
            request = with_session(request, token);
        }

        log::trace!("GET {}", method);
        decode(send(request)?)
    }

    /// Make a POST request to the API
    fn post<T: DeserializeOwned>(
        &self,
        method: &str,
        token: Option<&str>,
        body: &serde_json::Value,
    ) -> ApiResult<T> {
        let response = self.post_raw(method, token, body)?;
        decode(response)
    }

    fn post_raw(
        &self,
        method: &str,
        token: Option<&str>,
        body: &serde_json::Value,
    ) -> ApiResult<Response> {
        let mut request = self.client.post(self.endpoint(method)).json(body);
        if let Some(token) = token {
            request = with_session(request, token);
        }

        log::trace!("POST {}", method);
        send(request)
    }
}

fn with_session(request: RequestBuilder, token: &str) -> RequestBuilder {
    request.header(COOKIE, format!("{SESSION_COOKIE}={token}"))
}

/// Send a request, mapping rejected sessions and HTTP failures
fn send(request: RequestBuilder) -> ApiResult<Response> {
    let response = request.send()?;

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        let message = response.text().unwrap_or_default();
        return Err(RemoteError::Auth(if message.is_empty() {
            status.to_string()
        } else {
            message
        }));
    }
    if !status.is_success() {
        let message = response.text().unwrap_or_default();
        return Err(RemoteError::Status {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response)
}

/// Unwrap the `{"success", "result", "message"}` envelope
fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let body = response.text()?;
    let envelope: Envelope<T> = serde_json::from_str(&body)
        .map_err(|e| RemoteError::InvalidResponse(e.to_string()))?;

    if !envelope.success {
        return Err(RemoteError::fault(
            envelope.message.unwrap_or_else(|| "request failed".to_string()),
        ));
    }

    envelope
        .result
        .ok_or_else(|| RemoteError::InvalidResponse("missing result".to_string()))
}

/// Extract the session cookie value set by a login response
fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|cookie| cookie.split(';').next())
        .filter_map(|pair| pair.trim().strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
        .filter(|value| !value.is_empty())
        .last()
        .map(str::to_string)
}

impl RemoteApi for HttpApi {
    fn api_version(&self) -> ApiResult<String> {
        self.get("/api/getVersion", None, &[])
    }

    fn server_version(&self) -> ApiResult<String> {
        self.get("/api/systemVersion", None, &[])
    }

    fn login(&self, username: &str, password: &str) -> ApiResult<String> {
        let body = serde_json::json!({
            "login": username,
            "password": password,
        });

        let response = self.post_raw("/auth/login", None, &body)?;
        let token = session_cookie(&response);
        let _: serde_json::Value = decode(response)?;

        token.ok_or_else(|| RemoteError::InvalidResponse("login returned no session".to_string()))
    }

    fn logout(&self, token: &str) -> ApiResult<()> {
        let _: serde_json::Value = self.post("/auth/logout", Some(token), &serde_json::json!({}))?;
        Ok(())
    }

    fn list_assignable_roles(&self, token: &str) -> ApiResult<Vec<String>> {
        self.get("/user/listAssignableRoles", Some(token), &[])
    }

    fn list_systems(&self, token: &str) -> ApiResult<Vec<SystemSummary>> {
        self.get("/system/listSystems", Some(token), &[])
    }

    fn list_software_channels(&self, token: &str) -> ApiResult<Vec<SoftwareChannel>> {
        self.get("/channel/listSoftwareChannels", Some(token), &[])
    }

    fn list_all_packages(&self, token: &str, channel: &str) -> ApiResult<Vec<PackageSummary>> {
        self.get(
            "/channel/software/listAllPackages",
            Some(token),
            &[("channelLabel", channel)],
        )
    }

    fn list_errata(&self, token: &str, channel: &str) -> ApiResult<Vec<Erratum>> {
        self.get(
            "/channel/software/listErrata",
            Some(token),
            &[("channelLabel", channel)],
        )
    }

    fn list_group_systems(&self, token: &str, group: &str) -> ApiResult<Vec<SystemSummary>> {
        self.get(
            "/systemgroup/listSystemsMinimal",
            Some(token),
            &[("systemGroupName", group)],
        )
    }

    fn list_channel_systems(&self, token: &str, channel: &str) -> ApiResult<Vec<SystemSummary>> {
        self.get(
            "/channel/software/listSubscribedSystems",
            Some(token),
            &[("channelLabel", channel)],
        )
    }

    fn search_systems(
        &self,
        token: &str,
        field: SearchField,
        query: &str,
    ) -> ApiResult<Vec<SystemSummary>> {
        let method = field.endpoint().ok_or_else(|| {
            RemoteError::fault(format!("'{}' searches are not supported by the server", field))
        })?;

        self.get(method, Some(token), &[("searchTerm", query)])
    }

    fn find_errata_by_cve(&self, token: &str, cve: &str) -> ApiResult<Vec<Erratum>> {
        self.get("/errata/findByCve", Some(token), &[("cveName", cve)])
    }
}

/// Connects to servers over HTTP(S)
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpConnector;

impl Connector for HttpConnector {
    fn connect(&self, url: &Url) -> ApiResult<Box<dyn RemoteApi>> {
        Ok(Box::new(HttpApi::new(url)?))
    }
}
