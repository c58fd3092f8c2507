pub mod json;
pub mod pretty;

use std::collections::BTreeSet;
use std::fmt::Display;

use serde::Serialize;

use crate::api::Erratum;
use crate::cache::CacheStatus;
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::session::Session;

/// A system id with its cached name, if known
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemEntry {
    pub id: i64,
    pub name: Option<String>,
}

/// Format a confirmation; JSON output carries `details` instead
pub fn format_success<T: Serialize>(message: &str, details: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Pretty => Ok(pretty::format_success(message)),
        OutputFormat::Json => json::format_json(details),
    }
}

/// Format the current session based on output format
pub fn format_session(session: &Session, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Pretty => Ok(pretty::format_session(session)),
        OutputFormat::Json => json::format_session(session),
    }
}

/// Format cache status based on output format
pub fn format_cache_status(status: &CacheStatus, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Pretty => Ok(pretty::format_cache_status(status)),
        OutputFormat::Json => json::format_cache_status(status),
    }
}

/// Format a list of systems based on output format
pub fn format_systems(systems: &[SystemEntry], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Pretty => Ok(pretty::format_systems(systems)),
        OutputFormat::Json => json::format_systems(systems),
    }
}

/// Format a list of errata based on output format
pub fn format_errata(errata: &[Erratum], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Pretty => Ok(pretty::format_errata(errata)),
        OutputFormat::Json => json::format_errata(errata),
    }
}

/// Format a list of plain values; `empty` is shown in pretty mode when there are none
pub fn format_list(items: &[String], empty: &str, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Pretty => Ok(pretty::format_list(items, empty)),
        OutputFormat::Json => json::format_json(&items),
    }
}

/// Format a single value; JSON output wraps it as `{"<key>": value}`
pub fn format_value<T: Display + Serialize>(key: &str, value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Pretty => Ok(value.to_string()),
        OutputFormat::Json => json::format_json(&serde_json::json!({ key: value })),
    }
}

/// Format a set of ids, one per line or as a JSON array
pub fn format_ids(ids: &BTreeSet<i64>, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Pretty => Ok(ids.iter().map(i64::to_string).collect::<Vec<_>>().join("\n")),
        OutputFormat::Json => json::format_json(ids),
    }
}
