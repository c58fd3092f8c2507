use chrono::{DateTime, Utc};
use colored::Colorize;

use super::SystemEntry;
use crate::api::Erratum;
use crate::cache::{CacheEntryStatus, CacheStatus};
use crate::session::Session;

/// Safely truncate a string to n characters, appending "..." if truncated.
/// Works correctly with multi-byte UTF-8 characters.
fn truncate_str(s: &str, max_chars: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() > max_chars {
        let truncated: String = chars.iter().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", truncated)
    } else {
        s.to_string()
    }
}

/// Time left until `at`, e.g. "in 59m" or "expired"
fn time_left(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let left = at - now;
    if left <= chrono::Duration::zero() {
        return "expired".to_string();
    }

    let secs = left.num_seconds();
    if secs < 60 {
        format!("in {}s", secs)
    } else if secs < 3600 {
        format!("in {}m", secs / 60)
    } else {
        format!("in {}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

/// Format a success message
pub fn format_success(message: &str) -> String {
    format!("{} {}", "✓".green(), message)
}

/// Format the current session
pub fn format_session(session: &Session) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n", "Session".bold()));
    output.push_str(&"─".repeat(40));
    output.push('\n');
    output.push_str(&format!("{} {}\n", "Server:".cyan(), session.server));
    output.push_str(&format!("{} {}\n", "Username:".cyan(), session.username));
    output.push_str(&format!("{} {}\n", "API version:".cyan(), session.api_version));

    output
}

fn format_entry_status(label: &str, status: &CacheEntryStatus, now: DateTime<Utc>) -> String {
    let expiry = if status.stale {
        "stale".yellow()
    } else {
        time_left(status.expires_at, now).as_str().green()
    };

    format!("{} {} entries, expires {}\n", label.cyan(), status.count, expiry)
}

/// Format cache sizes and expiry times
pub fn format_cache_status(status: &CacheStatus) -> String {
    let now = Utc::now();
    let mut output = String::new();

    output.push_str(&format!("{}\n", "Caches".bold()));
    output.push_str(&"─".repeat(40));
    output.push('\n');

    match status.dir {
        Some(ref dir) => output.push_str(&format!("{} {}\n", "Directory:".cyan(), dir.display())),
        None => output.push_str(&format!("{} {}\n", "Directory:".cyan(), "in memory only".dimmed())),
    }
    output.push_str(&format_entry_status("Systems:", &status.systems, now));
    output.push_str(&format_entry_status("Packages:", &status.packages, now));
    output.push_str(&format_entry_status("Errata:", &status.errata, now));
    output.push_str(&format!("{} {} systems\n", "Working set:".cyan(), status.working_set));

    output
}

/// Format systems, one `id  name` row each
pub fn format_systems(systems: &[SystemEntry]) -> String {
    if systems.is_empty() {
        return "No systems found.".to_string();
    }

    let mut output = String::new();
    for system in systems {
        let name = match system.name {
            Some(ref name) => name.as_str().normal(),
            None => "(unknown)".dimmed(),
        };
        output.push_str(&format!("{} {}\n", format!("{:<12}", system.id).bold(), name));
    }

    output.trim_end().to_string()
}

/// Format errata with their synopsis
pub fn format_errata(errata: &[Erratum]) -> String {
    if errata.is_empty() {
        return "No errata found.".to_string();
    }

    let width = errata.iter().map(|e| e.advisory_name.len()).max().unwrap_or(0);
    let mut output = String::new();
    for erratum in errata {
        output.push_str(&format!(
            "{:<width$}  {}\n",
            erratum.advisory_name,
            truncate_str(&erratum.advisory_synopsis, 60).as_str().dimmed(),
            width = width
        ));
    }

    output.trim_end().to_string()
}

/// Format plain values one per line, or `empty` when there are none
pub fn format_list(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        return empty.to_string();
    }
    items.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::erratum;

    // ─────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("日本語テキスト", 5), "日本...");
    }

    #[test]
    fn test_time_left() {
        let now = Utc::now();
        assert_eq!(time_left(now - chrono::Duration::seconds(1), now), "expired");
        assert_eq!(time_left(now + chrono::Duration::seconds(30), now), "in 30s");
        assert_eq!(time_left(now + chrono::Duration::seconds(59 * 60), now), "in 59m");
        assert_eq!(time_left(now + chrono::Duration::seconds(3600 + 120), now), "in 1h 2m");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Formatters
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_format_session() {
        let session = Session {
            server: "manager.example.com".to_string(),
            username: "admin".to_string(),
            token: "secret-token".to_string(),
            api_version: "25".to_string(),
        };

        let output = format_session(&session);
        assert!(output.contains("manager.example.com"));
        assert!(output.contains("admin"));
        assert!(!output.contains("secret-token"));
    }

    #[test]
    fn test_format_systems() {
        assert_eq!(format_systems(&[]), "No systems found.");

        let output = format_systems(&[
            SystemEntry {
                id: 1000010000,
                name: Some("web01".to_string()),
            },
            SystemEntry { id: 42, name: None },
        ]);
        assert!(output.contains("1000010000"));
        assert!(output.contains("web01"));
        assert!(output.contains("(unknown)"));
        assert_eq!(output.lines().count(), 2);
    }

    #[test]
    fn test_format_errata_truncates_synopsis() {
        let long = "x".repeat(100);
        let output = format_errata(&[erratum(1, "SUSE-2024-101", &long)]);
        assert!(output.contains("SUSE-2024-101"));
        assert!(output.contains("..."));
        assert!(!output.contains(&long));
    }

    #[test]
    fn test_format_list() {
        assert_eq!(format_list(&[], "No channels found."), "No channels found.");
        assert_eq!(format_list(&["a".to_string(), "b".to_string()], ""), "a\nb");
    }
}
