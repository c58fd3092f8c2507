//! Working set (SSM) commands

use serde::Serialize;

use super::common::system_entries;
use crate::cli::args::{OutputFormat, SystemTokens};
use crate::cli::Shell;
use crate::error::Result;
use crate::output;

#[derive(Serialize)]
struct Change {
    changed: usize,
    total: usize,
}

/// Handle the ssm_add command
pub fn ssm_add(shell: &mut Shell, args: &SystemTokens, format: OutputFormat) -> Result<String> {
    let ids = shell.resolver()?.expand_systems(&args.tokens)?;
    let added = shell.caches.working_set.add(ids);
    let total = shell.caches.working_set.len();

    output::format_success(
        &format!("Added {added} systems ({total} in working set)"),
        &Change { changed: added, total },
        format,
    )
}

/// Handle the ssm_remove command
pub fn ssm_remove(shell: &mut Shell, args: &SystemTokens, format: OutputFormat) -> Result<String> {
    let ids = shell.resolver()?.expand_systems(&args.tokens)?;
    let removed = shell.caches.working_set.remove(ids);
    let total = shell.caches.working_set.len();

    output::format_success(
        &format!("Removed {removed} systems ({total} in working set)"),
        &Change { changed: removed, total },
        format,
    )
}

/// Handle the ssm_list command
pub fn ssm_list(shell: &mut Shell, format: OutputFormat) -> Result<String> {
    let ids: Vec<i64> = shell.caches.working_set.ids().iter().copied().collect();
    let systems = system_entries(shell, ids)?;
    output::format_systems(&systems, format)
}

/// Handle the ssm_clear command
pub fn ssm_clear(shell: &mut Shell, format: OutputFormat) -> Result<String> {
    let removed = shell.caches.working_set.len();
    shell.caches.working_set.clear();

    output::format_success(
        "Working set cleared",
        &Change {
            changed: removed,
            total: 0,
        },
        format,
    )
}
