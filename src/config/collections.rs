//! List view configuration: page sizes, search debounce, local team filter

use serde::Deserialize;
use std::time::Duration;

use crate::collection::{DEFAULT_PAGE_SIZE, MEMBER_PAGE_SIZE};

/// Paging and search behaviour of list views
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionsConfig {
    /// Items per page for projects, tasks and teams
    pub page_size: usize,
    /// Items per page for team member lists
    pub member_page_size: usize,
    /// Quiet period before a typed search is sent
    pub search_debounce_ms: u64,
    /// Re-filter fetched teams by title and creation date on display
    pub teams_local_filter: bool,
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            member_page_size: MEMBER_PAGE_SIZE,
            search_debounce_ms: 500,
            teams_local_filter: true,
        }
    }
}

/// Collections settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileCollections {
    pub page_size: Option<usize>,
    pub member_page_size: Option<usize>,
    pub search_debounce_ms: Option<u64>,
    pub teams_local_filter: Option<bool>,
}

impl CollectionsConfig {
    /// Create from file config with defaults; zero page sizes fall back to defaults
    pub fn from_file(file: Option<FileCollections>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            page_size: file
                .page_size
                .filter(|n| *n > 0)
                .unwrap_or(defaults.page_size),
            member_page_size: file
                .member_page_size
                .filter(|n| *n > 0)
                .unwrap_or(defaults.member_page_size),
            search_debounce_ms: file
                .search_debounce_ms
                .unwrap_or(defaults.search_debounce_ms),
            teams_local_filter: file
                .teams_local_filter
                .unwrap_or(defaults.teams_local_filter),
        }
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}
