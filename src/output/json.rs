use serde::Serialize;

use super::SystemEntry;
use crate::api::Erratum;
use crate::cache::CacheStatus;
use crate::error::Result;
use crate::session::Session;

/// Format the current session as JSON (the token is never included)
pub fn format_session(session: &Session) -> Result<String> {
    Ok(serde_json::to_string_pretty(session)?)
}

/// Format cache status as JSON
pub fn format_cache_status(status: &CacheStatus) -> Result<String> {
    Ok(serde_json::to_string_pretty(status)?)
}

/// Format systems as JSON
pub fn format_systems(systems: &[SystemEntry]) -> Result<String> {
    Ok(serde_json::to_string_pretty(systems)?)
}

/// Format errata as JSON
pub fn format_errata(errata: &[Erratum]) -> Result<String> {
    Ok(serde_json::to_string_pretty(errata)?)
}

/// Format any serializable value as JSON
pub fn format_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
