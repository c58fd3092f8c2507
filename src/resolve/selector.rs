//! Parsing of system and errata selection tokens
//!
//! ```text
//! ssm                   the working set
//! group:GROUP           members of a system group
//! channel:CHANNEL       systems subscribed to a software channel
//! search:[FIELD:]QUERY  server-side system search (FIELD defaults to name)
//! 1000010000            a system id
//! web01                 a system name
//! ```

use crate::api::SearchField;

/// One parsed system selection token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemSelector {
    WorkingSet,
    Group(String),
    Channel(String),
    Search { field: SearchField, query: String },
    Id(i64),
    Name(String),
}

impl SystemSelector {
    pub fn parse(token: &str) -> Self {
        if token.eq_ignore_ascii_case("ssm") {
            return Self::WorkingSet;
        }
        if let Some(group) = token.strip_prefix("group:") {
            return Self::Group(group.to_string());
        }
        if let Some(channel) = token.strip_prefix("channel:") {
            return Self::Channel(channel.to_string());
        }
        if let Some(search) = token.strip_prefix("search:") {
            return parse_search(search);
        }
        match token.parse::<i64>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Name(token.to_string()),
        }
    }
}

fn parse_search(search: &str) -> SystemSelector {
    if let Some((field, query)) = search.split_once(':') {
        if let Ok(field) = field.parse::<SearchField>() {
            return SystemSelector::Search {
                field,
                query: query.to_string(),
            };
        }
    }

    SystemSelector::Search {
        field: SearchField::Name,
        query: search.to_string(),
    }
}

/// One parsed errata selection token: `search:QUERY` or an advisory name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrataSelector {
    Search(String),
    Name(String),
}

impl ErrataSelector {
    pub fn parse(token: &str) -> Self {
        match token.strip_prefix("search:") {
            Some(query) => Self::Search(query.to_string()),
            None => Self::Name(token.to_string()),
        }
    }
}
