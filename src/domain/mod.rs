//! Domain collections: projects, tasks, teams and team members
//!
//! Each submodule provides:
//! - the raw record as the API returns it (`Raw*`)
//! - the mapped list item stored by the controller
//! - a [`PageSource`](crate::collection::PageSource) for its endpoint
//! - a constructor wiring both into a `CollectionController`

pub mod projects;
pub mod tasks;
pub mod teams;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::filters::FilterCriteria;

/// A person shown as an avatar chip
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub name: String,
    pub initials: String,
}

impl Member {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let initials = initials(&name);
        Self { name, initials }
    }

    /// Map a list of display names
    pub fn from_names(names: Vec<String>) -> Vec<Self> {
        names.into_iter().map(Self::new).collect()
    }
}

/// Avatar initials: first letter of the first and last words, uppercased
///
/// "Ada Lovelace" → "AL", "ada" → "A", "Jean Luc Picard" → "JP", "" → "?"
pub fn initials(name: &str) -> String {
    let mut words = name.split_whitespace();
    let Some(first) = words.next() else {
        return "?".to_string();
    };

    let mut out: String = first.chars().take(1).flat_map(char::to_uppercase).collect();
    if let Some(last) = words.last() {
        out.extend(last.chars().take(1).flat_map(char::to_uppercase));
    }
    out
}

/// Parse a server timestamp
///
/// Accepts RFC 3339 (`2024-05-01T10:00:00Z`), a naive local timestamp
/// (`2024-05-01T10:00:00` or with fractional seconds, read as UTC) or a bare
/// date (midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// One line of CLI output for a list item
pub trait ListRow {
    fn row(&self) -> String;

    /// Display-time re-filter applied on top of server filtering
    ///
    /// Only teams override this; see [`teams::LocalTeamFilter`].
    fn locally_visible(&self, _title_query: &str, _filters: &FilterCriteria) -> bool {
        true
    }
}

/// Render member chips as "AL, GH +3"
pub(crate) fn member_chips(members: &[Member], max: usize) -> String {
    let shown: Vec<&str> = members
        .iter()
        .take(max)
        .map(|m| m.initials.as_str())
        .collect();
    let mut out = shown.join(", ");
    if members.len() > max {
        out.push_str(&format!(" +{}", members.len() - max));
    }
    out
}
