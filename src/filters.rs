//! Filter criteria for list endpoints
//!
//! A single [`FilterCriteria`] type covers every collection; each page source
//! declares which [`FilterKey`]s its endpoint understands and only those are
//! rendered into the query string. Unset values are omitted entirely.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wire format for date filters
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Task workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    ToDo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToDo => "TO_DO",
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().replace(['-', ' '], "_").as_str() {
            "TO_DO" | "TODO" => Ok(Self::ToDo),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "DONE" => Ok(Self::Done),
            other => bail!("Unknown status '{}' (expected TO_DO, IN_PROGRESS or DONE)", other),
        }
    }
}

/// Query parameters a list endpoint may accept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    Status,
    IsOverdue,
    AssignedUserId,
    CreatedAtAfter,
    CreatedAtBefore,
    DueDateAfter,
    DueDateBefore,
    ConclusionDateAfter,
    ConclusionDateBefore,
}

impl FilterKey {
    pub const ALL: [FilterKey; 9] = [
        Self::Status,
        Self::IsOverdue,
        Self::AssignedUserId,
        Self::CreatedAtAfter,
        Self::CreatedAtBefore,
        Self::DueDateAfter,
        Self::DueDateBefore,
        Self::ConclusionDateAfter,
        Self::ConclusionDateBefore,
    ];

    /// Query parameter name
    pub fn param(&self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::IsOverdue => "isOverdue",
            Self::AssignedUserId => "assignedUserId",
            Self::CreatedAtAfter => "createdAtAfter",
            Self::CreatedAtBefore => "createdAtBefore",
            Self::DueDateAfter => "dueDateAfter",
            Self::DueDateBefore => "dueDateBefore",
            Self::ConclusionDateAfter => "conclusionDateAfter",
            Self::ConclusionDateBefore => "conclusionDateBefore",
        }
    }

    /// Look up a key by its query parameter name (case-insensitive)
    pub fn from_param(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.param().eq_ignore_ascii_case(name.trim()))
    }
}

/// Domain-specific constraints narrowing a collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub status: Option<TaskStatus>,
    pub is_overdue: Option<bool>,
    pub assigned_user_id: Option<u64>,
    pub created_at_after: Option<NaiveDate>,
    pub created_at_before: Option<NaiveDate>,
    pub due_date_after: Option<NaiveDate>,
    pub due_date_before: Option<NaiveDate>,
    pub conclusion_date_after: Option<NaiveDate>,
    pub conclusion_date_before: Option<NaiveDate>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        FilterKey::ALL.iter().all(|key| self.value_for(*key).is_none())
    }

    /// Serialized value for one key, if set
    pub fn value_for(&self, key: FilterKey) -> Option<String> {
        let date = |d: &Option<NaiveDate>| d.map(|d| d.format(DATE_FORMAT).to_string());
        match key {
            FilterKey::Status => self.status.map(|s| s.as_str().to_string()),
            FilterKey::IsOverdue => self.is_overdue.map(|b| b.to_string()),
            FilterKey::AssignedUserId => self.assigned_user_id.map(|id| id.to_string()),
            FilterKey::CreatedAtAfter => date(&self.created_at_after),
            FilterKey::CreatedAtBefore => date(&self.created_at_before),
            FilterKey::DueDateAfter => date(&self.due_date_after),
            FilterKey::DueDateBefore => date(&self.due_date_before),
            FilterKey::ConclusionDateAfter => date(&self.conclusion_date_after),
            FilterKey::ConclusionDateBefore => date(&self.conclusion_date_before),
        }
    }

    /// Query pairs for the keys an endpoint supports, in `supported` order
    pub fn query_pairs(&self, supported: &[FilterKey]) -> Vec<(&'static str, String)> {
        supported
            .iter()
            .filter_map(|key| self.value_for(*key).map(|value| (key.param(), value)))
            .collect()
    }

    /// Set one key from text, e.g. `status=DONE` or `dueDateBefore=2024-06-30`
    ///
    /// An empty value (`status=`) unsets the key.
    pub fn set_from_str(&mut self, assignment: &str) -> Result<()> {
        let (name, value) = assignment
            .split_once('=')
            .with_context(|| format!("Expected key=value, got '{}'", assignment))?;
        let key = FilterKey::from_param(name)
            .with_context(|| format!("Unknown filter '{}'", name.trim()))?;
        let value = value.trim();

        if value.is_empty() {
            self.unset(key);
            return Ok(());
        }

        let date = || {
            NaiveDate::parse_from_str(value, DATE_FORMAT)
                .with_context(|| format!("Invalid date '{}' (expected YYYY-MM-DD)", value))
        };

        match key {
            FilterKey::Status => self.status = Some(value.parse()?),
            FilterKey::IsOverdue => {
                self.is_overdue = Some(
                    value
                        .parse()
                        .with_context(|| format!("Invalid boolean '{}'", value))?,
                )
            }
            FilterKey::AssignedUserId => {
                self.assigned_user_id = Some(
                    value
                        .parse()
                        .with_context(|| format!("Invalid user id '{}'", value))?,
                )
            }
            FilterKey::CreatedAtAfter => self.created_at_after = Some(date()?),
            FilterKey::CreatedAtBefore => self.created_at_before = Some(date()?),
            FilterKey::DueDateAfter => self.due_date_after = Some(date()?),
            FilterKey::DueDateBefore => self.due_date_before = Some(date()?),
            FilterKey::ConclusionDateAfter => self.conclusion_date_after = Some(date()?),
            FilterKey::ConclusionDateBefore => self.conclusion_date_before = Some(date()?),
        }
        Ok(())
    }

    fn unset(&mut self, key: FilterKey) {
        match key {
            FilterKey::Status => self.status = None,
            FilterKey::IsOverdue => self.is_overdue = None,
            FilterKey::AssignedUserId => self.assigned_user_id = None,
            FilterKey::CreatedAtAfter => self.created_at_after = None,
            FilterKey::CreatedAtBefore => self.created_at_before = None,
            FilterKey::DueDateAfter => self.due_date_after = None,
            FilterKey::DueDateBefore => self.due_date_before = None,
            FilterKey::ConclusionDateAfter => self.conclusion_date_after = None,
            FilterKey::ConclusionDateBefore => self.conclusion_date_before = None,
        }
    }
}

impl fmt::Display for FilterCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs = self.query_pairs(&FilterKey::ALL);
        if pairs.is_empty() {
            return f.write_str("(none)");
        }
        let rendered: Vec<String> = pairs
            .into_iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        f.write_str(&rendered.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_criteria_render_nothing() {
        let filters = FilterCriteria::default();
        assert!(filters.is_empty());
        assert!(filters.query_pairs(&FilterKey::ALL).is_empty());
        assert_eq!(filters.to_string(), "(none)");
    }

    #[test]
    fn test_only_supported_keys_are_rendered() {
        let filters = FilterCriteria {
            status: Some(TaskStatus::Done),
            created_at_after: Some(ymd(2024, 1, 5)),
            ..Default::default()
        };

        let pairs = filters.query_pairs(&[FilterKey::CreatedAtAfter, FilterKey::CreatedAtBefore]);
        assert_eq!(pairs, vec![("createdAtAfter", "2024-01-05".to_string())]);

        let all = filters.query_pairs(&FilterKey::ALL);
        assert_eq!(
            all,
            vec![
                ("status", "DONE".to_string()),
                ("createdAtAfter", "2024-01-05".to_string()),
            ]
        );
    }

    #[test]
    fn test_set_from_str() {
        let mut filters = FilterCriteria::default();
        filters.set_from_str("status=in-progress").unwrap();
        filters.set_from_str("isOverdue=true").unwrap();
        filters.set_from_str("assignedUserId=42").unwrap();
        filters.set_from_str("duedatebefore=2024-06-30").unwrap();

        assert_eq!(filters.status, Some(TaskStatus::InProgress));
        assert_eq!(filters.is_overdue, Some(true));
        assert_eq!(filters.assigned_user_id, Some(42));
        assert_eq!(filters.due_date_before, Some(ymd(2024, 6, 30)));

        filters.set_from_str("status=").unwrap();
        assert_eq!(filters.status, None);
    }

    #[test]
    fn test_set_from_str_errors() {
        let mut filters = FilterCriteria::default();
        assert!(filters.set_from_str("status").is_err());
        assert!(filters.set_from_str("color=red").is_err());
        assert!(filters.set_from_str("createdAtAfter=05/01/2024").is_err());
        assert!(filters.set_from_str("status=ARCHIVED").is_err());
        assert!(filters.is_empty());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("todo".parse::<TaskStatus>().unwrap(), TaskStatus::ToDo);
        assert_eq!("TO_DO".parse::<TaskStatus>().unwrap(), TaskStatus::ToDo);
        assert_eq!("done".parse::<TaskStatus>().unwrap(), TaskStatus::Done);
        assert_eq!(TaskStatus::InProgress.to_string(), "IN_PROGRESS");
    }
}
