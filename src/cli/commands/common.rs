//! Helpers shared by several commands

use crate::cli::Shell;
use crate::error::Result;
use crate::output::SystemEntry;

/// Pair system ids with their cached names, refreshing the system cache first
pub fn system_entries(shell: &mut Shell, ids: impl IntoIterator<Item = i64>) -> Result<Vec<SystemEntry>> {
    let remote = shell.session.remote()?;
    shell.caches.systems.generate(&remote, false)?;

    Ok(ids
        .into_iter()
        .map(|id| SystemEntry {
            id,
            name: shell.caches.systems.name(id).map(str::to_string),
        })
        .collect())
}
