//! Session management: connecting, authenticating and logging out
//!
//! The manager moves between three states:
//!
//! ```text
//! Disconnected ──login──▶ Connecting ──ok──▶ Authenticated
//!       ▲                     │                   │
//!       └──────── error ──────┘◀──── logout ──────┘
//! ```

mod prompt;
pub mod token;

use std::path::Path;

use serde::Serialize;
use url::Url;

#[cfg(test)]
pub(crate) use prompt::FixedPrompter;
pub use prompt::{Prompter, TerminalPrompter};

use crate::api::{server_url, Connector, HttpConnector, Remote, RemoteApi};
use crate::cache::CacheSet;
use crate::config::{Config, Paths, ServerSection};
use crate::error::{RemoteError, Result, ShellError};
use self::token::CachedToken;

/// Oldest server API this shell talks to
pub const MINIMUM_API_VERSION: &str = "10.8";

/// An authenticated session with one server
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub server: String,
    pub username: String,
    #[serde(skip)]
    pub token: String,
    pub api_version: String,
}

impl Session {
    /// Whether the server API is at least `want`
    pub fn check_api_version(&self, want: &str) -> bool {
        api_version_at_least(&self.api_version, want)
    }
}

/// Compare `major.minor` API versions.
///
/// Equal majors compare minors, differing majors compare only majors; any
/// other shape falls back to a floating point comparison. Unparseable
/// versions never satisfy the check.
pub fn api_version_at_least(have: &str, want: &str) -> bool {
    if let (Some(have_parts), Some(want_parts)) = (major_minor(have), major_minor(want)) {
        let ((have_major, have_minor), (want_major, want_minor)) = (have_parts, want_parts);
        if have_major == want_major {
            return have_minor >= want_minor;
        }
        return have_major >= want_major;
    }

    match (have.trim().parse::<f64>(), want.trim().parse::<f64>()) {
        (Ok(have), Ok(want)) => have >= want,
        _ => false,
    }
}

fn major_minor(version: &str) -> Option<(u64, u64)> {
    let (major, minor) = version.trim().split_once('.')?;
    Some((major.parse().ok()?, minor.parse().ok()?))
}

/// Where the session manager is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Authenticated,
}

struct Connection {
    api: Box<dyn RemoteApi>,
    session: Session,
}

enum State {
    Disconnected,
    Connecting,
    Authenticated(Connection),
}

/// Owns the connection to the server and the credentials used for it
pub struct SessionManager {
    paths: Paths,
    config: Config,
    /// Command-line values; they win over the config file
    overrides: ServerSection,
    /// Password from the command line, used for one login attempt only
    cli_password: Option<String>,
    /// Settings in effect for the current (or next) server
    active: ServerSection,
    connector: Box<dyn Connector>,
    prompter: Box<dyn Prompter>,
    state: State,
}

impl SessionManager {
    /// Manager talking HTTP and prompting on the terminal
    pub fn new(paths: Paths, config: Config, overrides: ServerSection) -> Self {
        Self::with_parts(
            paths,
            config,
            overrides,
            Box::new(HttpConnector),
            Box::new(TerminalPrompter),
        )
    }

    pub fn with_parts(
        paths: Paths,
        config: Config,
        mut overrides: ServerSection,
        connector: Box<dyn Connector>,
        prompter: Box<dyn Prompter>,
    ) -> Self {
        let cli_password = overrides.password.take();
        let active = config.initial(&overrides);
        Self {
            paths,
            config,
            overrides,
            cli_password,
            active,
            connector,
            prompter,
            state: State::Disconnected,
        }
    }

    pub fn state(&self) -> SessionState {
        match self.state {
            State::Disconnected => SessionState::Disconnected,
            State::Connecting => SessionState::Connecting,
            State::Authenticated(_) => SessionState::Authenticated,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, State::Authenticated(_))
    }

    /// Connect and authenticate, then load the caches of the server/user pair.
    ///
    /// Returns `Ok(false)` without touching the current session when already
    /// logged in. Any error leaves the manager disconnected.
    pub fn login(
        &mut self,
        caches: &mut CacheSet,
        username: Option<&str>,
        server: Option<&str>,
    ) -> Result<bool> {
        if self.is_authenticated() {
            log::warn!("You are already logged in");
            return Ok(false);
        }

        let server = server
            .map(str::to_string)
            .or_else(|| self.active.server.clone())
            .filter(|s| !s.is_empty())
            .ok_or(ShellError::NoServer)?;

        self.state = State::Connecting;
        match self.connect(caches, &server, username) {
            Ok(connection) => {
                self.state = State::Authenticated(connection);
                Ok(true)
            }
            Err(e) => {
                self.state = State::Disconnected;
                Err(e)
            }
        }
    }

    fn load_section(&mut self, server: &str) {
        let file = self.config.section(server).cloned().unwrap_or_default();
        self.active.merge(&file, &self.overrides);
        self.active.server = Some(server.to_string());
        log::debug!("Settings for {}: {:?}", server, self.active);
    }

    fn connect(
        &mut self,
        caches: &mut CacheSet,
        server: &str,
        username: Option<&str>,
    ) -> Result<Connection> {
        self.load_section(server);

        if let Some(explicit) = username {
            if self.active.username.as_deref() != Some(explicit) {
                self.active.username = Some(explicit.to_string());
                self.active.password = None;
            }
        }
        let mut username = self.active.username.clone().filter(|u| !u.is_empty());

        let session_file = self.paths.session_file(server)?;
        let (url, api, api_version) = self.open(server)?;
        let mut token = None;

        if self.cli_password.is_none() {
            if let Some(cached) = valid_cached_token(api.as_ref(), &session_file, username.as_deref()) {
                username = Some(cached.username);
                token = Some(cached.token);
            }
        }

        let (username, token) = match (username, token) {
            (Some(username), Some(token)) => (username, token),
            (username, _) => {
                let username = match username {
                    Some(username) => {
                        log::info!("Username: {username}");
                        username
                    }
                    None => self.prompter.username()?,
                };
                let password = match self.cli_password.take().or_else(|| self.active.password.clone()) {
                    Some(password) => password,
                    None => self.prompter.password()?,
                };

                let token = api.login(&username, &password).map_err(|e| match e {
                    RemoteError::Auth(_) | RemoteError::Fault { .. } => {
                        log::debug!("Login error: {e}");
                        ShellError::InvalidCredentials(e)
                    }
                    other => ShellError::Remote(other),
                })?;

                if let Err(e) = token::write(&session_file, &username, &token) {
                    log::error!("Could not write session file: {e}");
                }
                (username, token)
            }
        };

        self.load_caches(caches, server, &username)?;
        Ok(self.established(&url, api, server, username, token, api_version))
    }

    /// Connect to `server` and check that its API is recent enough
    fn open(&self, server: &str) -> Result<(Url, Box<dyn RemoteApi>, String)> {
        let url = server_url(server, self.active.use_plain_http()).map_err(|source| {
            ShellError::Connect {
                url: server.to_string(),
                source,
            }
        })?;
        let connect_error = |source: RemoteError| ShellError::Connect {
            url: url.to_string(),
            source,
        };

        log::debug!("Connecting to {url}");
        let api = self.connector.connect(&url).map_err(connect_error)?;
        let api_version = api.api_version().map_err(connect_error)?;
        log::debug!("Server API Version = {api_version}");

        if !api_version_at_least(&api_version, MINIMUM_API_VERSION) {
            return Err(ShellError::ApiTooOld {
                have: api_version,
                minimum: MINIMUM_API_VERSION.to_string(),
            });
        }

        Ok((url, api, api_version))
    }

    fn load_caches(&self, caches: &mut CacheSet, server: &str, username: &str) -> Result<()> {
        let dir = self.paths.cache_dir(server, username)?;
        if let Err(e) = caches.load(&dir) {
            log::error!("Could not load caches: {e}");
        }
        Ok(())
    }

    fn established(
        &mut self,
        url: &Url,
        api: Box<dyn RemoteApi>,
        server: &str,
        username: String,
        token: String,
        api_version: String,
    ) -> Connection {
        self.active.username = Some(username.clone());
        log::info!("Connected to {url} as {username}");

        Connection {
            api,
            session: Session {
                server: server.to_string(),
                username,
                token,
                api_version,
            },
        }
    }

    /// Pick up the session of the configured server from its cached token,
    /// never prompting.
    ///
    /// Returns whether the manager is authenticated afterwards. When the token
    /// is missing or rejected, the caches of the known server/user pair are
    /// still bound so that a following [`logout`](Self::logout) clears them.
    pub fn resume(&mut self, caches: &mut CacheSet) -> bool {
        if self.is_authenticated() {
            return true;
        }

        let Some(server) = self.active.server.clone().filter(|s| !s.is_empty()) else {
            log::debug!("No server configured, nothing to resume");
            return false;
        };

        self.state = State::Connecting;
        match self.reconnect(caches, &server) {
            Ok(connection) => {
                self.state = State::Authenticated(connection);
                true
            }
            Err(e) => {
                log::debug!("Could not resume session with {server}: {e}");
                self.state = State::Disconnected;
                false
            }
        }
    }

    fn reconnect(&mut self, caches: &mut CacheSet, server: &str) -> Result<Connection> {
        self.load_section(server);

        let session_file = self.paths.session_file(server)?;
        let username = self
            .active
            .username
            .clone()
            .filter(|u| !u.is_empty())
            .or_else(|| token::read(&session_file, None).map(|cached| cached.username));
        if let Some(username) = &username {
            self.load_caches(caches, server, username)?;
        }

        let (url, api, api_version) = self.open(server)?;
        let cached =
            valid_cached_token(api.as_ref(), &session_file, username.as_deref()).ok_or(ShellError::NotLoggedIn)?;
        Ok(self.established(&url, api, server, cached.username, cached.token, api_version))
    }

    /// End the session on the server, clear the entity caches and forget the
    /// user and server. Safe to call when not logged in.
    pub fn logout(&mut self, caches: &mut CacheSet) {
        if let State::Authenticated(connection) = std::mem::replace(&mut self.state, State::Disconnected) {
            if let Err(e) = connection.api.logout(&connection.session.token) {
                log::warn!("Server-side logout failed: {e}");
            }
            log::info!("Logged out of {}", connection.session.server);
        }

        caches.clear();
        self.active = self.config.initial(&self.overrides);
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            State::Authenticated(connection) => Some(&connection.session),
            _ => None,
        }
    }

    /// Handle for remote calls made on behalf of the session
    pub fn remote(&self) -> Result<Remote<'_>> {
        match &self.state {
            State::Authenticated(connection) => Ok(Remote::new(
                connection.api.as_ref(),
                &connection.session.token,
            )),
            _ => Err(ShellError::NotLoggedIn),
        }
    }

    /// Name of the logged in user
    pub fn whoami(&self) -> Option<&str> {
        self.session().map(|s| s.username.as_str())
    }

    /// Server of the current session
    pub fn server(&self) -> Option<&str> {
        self.session().map(|s| s.server.as_str())
    }

    pub fn api_version(&self) -> Option<&str> {
        self.session().map(|s| s.api_version.as_str())
    }

    /// Product version reported by the server
    pub fn server_version(&self) -> Result<String> {
        match &self.state {
            State::Authenticated(connection) => Ok(connection.api.server_version()?),
            _ => Err(ShellError::NotLoggedIn),
        }
    }

    /// Whether the session's API is at least `want`; false when logged out
    pub fn check_api_version(&self, want: &str) -> bool {
        self.session().is_some_and(|s| s.check_api_version(want))
    }
}

/// The cached token in `session_file` if the server still accepts it
fn valid_cached_token(api: &dyn RemoteApi, session_file: &Path, username: Option<&str>) -> Option<CachedToken> {
    let cached = token::read(session_file, username)?;
    log::debug!("Using cached credentials from {}", session_file.display());

    match api.list_assignable_roles(&cached.token) {
        Ok(_) => Some(cached),
        Err(e) => {
            log::warn!("Cached credentials are invalid");
            log::debug!("Session check failed: {e}");
            None
        }
    }
}
