use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs;

use super::paths::Paths;
use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Values used before any server is chosen
    #[serde(default)]
    pub default: ServerSection,

    /// Per-server sections, keyed by server hostname
    #[serde(default)]
    pub servers: BTreeMap<String, ServerSection>,
}

/// Connection settings for one server
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSection {
    pub server: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Talk plain HTTP instead of HTTPS
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub nossl: Option<bool>,
}

impl std::fmt::Debug for ServerSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerSection")
            .field("server", &self.server)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|p| "*".repeat(p.len())))
            .field("nossl", &self.nossl)
            .finish()
    }
}

impl ServerSection {
    /// Layer a file section under command-line overrides.
    ///
    /// Each key takes the override if set, else the file value if present,
    /// else keeps its current value. A username that differs from the file's
    /// username drops the password.
    pub fn merge(&mut self, file: &ServerSection, overrides: &ServerSection) {
        self.server = pick(&overrides.server, &file.server, self.server.take());
        self.username = pick(&overrides.username, &file.username, self.username.take());
        self.password = pick(&overrides.password, &file.password, self.password.take());
        self.nossl = pick(&overrides.nossl, &file.nossl, self.nossl.take());

        if let (Some(current), Some(from_file)) = (&self.username, &file.username) {
            if current != from_file {
                self.password = None;
            }
        }
    }

    /// Whether plain HTTP was requested
    pub fn use_plain_http(&self) -> bool {
        self.nossl.unwrap_or(false)
    }
}

fn pick<T: Clone>(over: &Option<T>, file: &Option<T>, current: Option<T>) -> Option<T> {
    over.clone().or_else(|| file.clone()).or(current)
}

/// Accept `nossl = true` as well as legacy string spellings like `"yes"` or `"1"`
fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(Option::<Flag>::deserialize(deserializer)?.map(|flag| match flag {
        Flag::Bool(b) => b,
        Flag::Text(s) => parse_flag(&s),
    }))
}

/// Parse a truthy string flag
pub fn parse_flag(s: &str) -> bool {
    matches!(s.trim().to_lowercase().as_str(), "1" | "y" | "yes" | "true")
}

impl Config {
    /// Load configuration from a specific paths instance
    pub fn load_from(paths: &Paths) -> Result<Self> {
        if !paths.config_exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&paths.config_file)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Get the section for a server, if the file has one
    pub fn section(&self, server: &str) -> Option<&ServerSection> {
        self.servers.get(server)
    }

    /// Starting values: the `[default]` section under command-line overrides
    pub fn initial(&self, overrides: &ServerSection) -> ServerSection {
        let mut active = ServerSection::default();
        active.merge(&self.default, overrides);
        active
    }
}
