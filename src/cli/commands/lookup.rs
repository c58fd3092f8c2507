//! Name/id lookup and selection expansion commands

use super::common::system_entries;
use crate::api::Erratum;
use crate::cli::args::{ErrataTokens, IdArgs, NameArgs, OutputFormat, SystemTokens};
use crate::cli::Shell;
use crate::error::{Result, ShellError};
use crate::output;

/// Handle the system_id command
pub fn system_id(shell: &mut Shell, args: &NameArgs, format: OutputFormat) -> Result<String> {
    let id = shell
        .resolver()?
        .resolve_system_id(&args.name)?
        .ok_or_else(|| ShellError::not_found(format!("Could not resolve system {}", args.name)))?;
    output::format_value("system_id", &id, format)
}

/// Handle the system_name command
pub fn system_name(shell: &mut Shell, args: &IdArgs, format: OutputFormat) -> Result<String> {
    let name = shell
        .resolver()?
        .resolve_system_name(args.id)?
        .ok_or_else(|| ShellError::not_found(format!("No system with id {}", args.id)))?;
    output::format_value("system_name", &name, format)
}

/// Handle the package_id command
pub fn package_id(shell: &mut Shell, args: &NameArgs, format: OutputFormat) -> Result<String> {
    let ids = shell
        .resolver()?
        .resolve_package_id(&args.name)?
        .ok_or_else(|| ShellError::not_found(format!("No package named {}", args.name)))?;
    output::format_ids(&ids, format)
}

/// Handle the package_name command
pub fn package_name(shell: &mut Shell, args: &IdArgs, format: OutputFormat) -> Result<String> {
    let name = shell
        .resolver()?
        .resolve_package_name(args.id)?
        .ok_or_else(|| ShellError::not_found(format!("No package with id {}", args.id)))?;
    output::format_value("package_name", &name, format)
}

/// Handle the erratum_id command
pub fn erratum_id(shell: &mut Shell, args: &NameArgs, format: OutputFormat) -> Result<String> {
    let id = shell
        .resolver()?
        .resolve_erratum_id(&args.name)?
        .ok_or_else(|| ShellError::not_found(format!("No erratum named {}", args.name)))?;
    output::format_value("erratum_id", &id, format)
}

/// Handle the erratum_name command
pub fn erratum_name(shell: &mut Shell, args: &IdArgs, format: OutputFormat) -> Result<String> {
    let name = shell
        .resolver()?
        .resolve_erratum_name(args.id)?
        .ok_or_else(|| ShellError::not_found(format!("No erratum with id {}", args.id)))?;
    output::format_value("erratum_name", &name, format)
}

/// Handle the expand_systems command
pub fn expand_systems(shell: &mut Shell, args: &SystemTokens, format: OutputFormat) -> Result<String> {
    let ids = shell.resolver()?.expand_systems(&args.tokens)?;
    let systems = system_entries(shell, ids)?;
    output::format_systems(&systems, format)
}

/// Handle the expand_errata command
pub fn expand_errata(shell: &mut Shell, args: &ErrataTokens, format: OutputFormat) -> Result<String> {
    let names = shell.resolver()?.expand_errata(&args.tokens)?;
    let errata: Vec<Erratum> = names
        .iter()
        .filter_map(|name| shell.caches.errata.get(name).cloned())
        .collect();
    output::format_errata(&errata, format)
}
