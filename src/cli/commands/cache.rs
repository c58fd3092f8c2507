//! Cache management commands

use crate::cli::args::OutputFormat;
use crate::cli::Shell;
use crate::error::Result;
use crate::output;

/// Handle the clear_caches command
pub fn clear_caches(shell: &mut Shell, format: OutputFormat) -> Result<String> {
    shell.caches.clear();
    output::format_success("Caches cleared", &shell.caches.status(), format)
}

/// Handle the cache_status command
pub fn cache_status(shell: &Shell, format: OutputFormat) -> Result<String> {
    output::format_cache_status(&shell.caches.status(), format)
}
