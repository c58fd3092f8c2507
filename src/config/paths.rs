use std::fs;
use std::path::{Path, PathBuf};
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use crate::error::{Result, ShellError};

/// Manages paths for spacesh configuration, sessions and caches
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root configuration directory (~/.spacesh)
    pub root: PathBuf,
    /// Configuration file path (~/.spacesh/config.toml)
    pub config_file: PathBuf,
}

impl Paths {
    /// Create a new Paths instance using the user's home directory
    pub fn new() -> Result<Self> {
        let home = std::env::var("HOME")?;
        Ok(Self::at(PathBuf::from(home).join(".spacesh")))
    }

    /// Create a Paths instance rooted at a specific directory
    pub fn at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            config_file: root.join("config.toml"),
            root,
        }
    }

    /// Directory holding the session file for a server (~/.spacesh/<server>)
    pub fn server_dir(&self, server: &str) -> Result<PathBuf> {
        Ok(self.root.join(path_component("server", server)?))
    }

    /// Session token file for a server
    pub fn session_file(&self, server: &str) -> Result<PathBuf> {
        Ok(self.server_dir(server)?.join("session"))
    }

    /// Cache directory for a server/username pair (~/.spacesh/<server>/<username>)
    pub fn cache_dir(&self, server: &str, username: &str) -> Result<PathBuf> {
        Ok(self.server_dir(server)?.join(path_component("username", username)?))
    }

    /// Check if the config file exists
    pub fn config_exists(&self) -> bool {
        self.config_file.exists()
    }
}

/// Accept `value` only if it names a single entry directly under its parent
fn path_component<'a>(what: &str, value: &'a str) -> Result<&'a str> {
    let invalid = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\', '\0']);
    if invalid {
        return Err(ShellError::InvalidArgument(format!("{what} {value:?} is not usable as a directory name")));
    }
    Ok(value)
}

/// Create a directory (and parents) readable only by the owner
pub fn ensure_private_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;

    // 700 = owner only
    #[cfg(unix)]
    {
        let perms = fs::Permissions::from_mode(0o700);
        fs::set_permissions(dir, perms)?;
    }

    Ok(())
}

impl Default for Paths {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self::at(".spacesh"))
    }
}
