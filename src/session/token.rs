//! Cached session token file (`username:token` per line)

use std::fs;
use std::path::Path;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use crate::config::ensure_private_dir;
use crate::error::Result;

/// A token previously issued to a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub username: String,
    pub token: String,
}

/// Read the cached token for `username`, or the last one in the file when no
/// username is given. A missing or unreadable file yields `None`.
pub fn read(path: &Path, username: Option<&str>) -> Option<CachedToken> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            log::error!("Could not read {}: {}", path.display(), e);
            return None;
        }
    };

    contents
        .lines()
        .filter_map(parse_line)
        .rev()
        .find(|cached| match username {
            Some(u) => cached.username == u,
            None => true,
        })
}

fn parse_line(line: &str) -> Option<CachedToken> {
    let (username, token) = line.trim().split_once(':')?;
    if username.is_empty() || token.is_empty() {
        return None;
    }
    Some(CachedToken {
        username: username.to_string(),
        token: token.to_string(),
    })
}

/// Replace the session file with a single `username:token` line
pub fn write(path: &Path, username: &str, token: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        ensure_private_dir(dir)?;
    }

    fs::write(path, format!("{username}:{token}\n"))?;

    // 600 = owner read/write
    #[cfg(unix)]
    {
        let perms = fs::Permissions::from_mode(0o600);
        fs::set_permissions(path, perms)?;
    }

    Ok(())
}
