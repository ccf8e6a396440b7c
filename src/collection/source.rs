//! Page source abstraction
//!
//! A [`PageSource`] is the per-domain half of a collection: it knows the
//! endpoint, which filter keys it accepts, and the raw record type. The
//! controller owns everything else (cursor, accumulation, race guards).

use std::future::Future;

use crate::api::{ApiError, PageEnvelope};
use crate::filters::{FilterCriteria, FilterKey};

/// Arguments of one page fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based page index
    pub page: usize,
    /// Page size (> 0)
    pub size: usize,
    pub filters: FilterCriteria,
    /// Free-text title filter; empty means no filter
    pub title: String,
}

impl PageRequest {
    /// Render `page`, `size`, `title` and the supported filter keys
    pub fn query_pairs(&self, supported: &[FilterKey]) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string()), ("size", self.size.to_string())];

        let title = self.title.trim();
        if !title.is_empty() {
            pairs.push(("title", title.to_string()));
        }

        pairs.extend(self.filters.query_pairs(supported));
        pairs
    }
}

/// Fetches pages of raw records from a paginated endpoint
///
/// # Thread Safety
///
/// Sources are shared by reference across in-flight fetches and must be
/// `Send + Sync`.
pub trait PageSource: Send + Sync {
    /// Record type as it arrives from the server
    type Raw: Send;

    /// Short name for logging ("projects", "tasks", ...)
    fn name(&self) -> &'static str;

    /// Fetch one page
    fn fetch_page(
        &self,
        request: &PageRequest,
    ) -> impl Future<Output = Result<PageEnvelope<Self::Raw>, ApiError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::TaskStatus;

    #[test]
    fn test_query_pairs_include_paging_and_title() {
        let request = PageRequest {
            page: 2,
            size: 20,
            filters: FilterCriteria {
                status: Some(TaskStatus::ToDo),
                ..Default::default()
            },
            title: "  launch ".to_string(),
        };

        assert_eq!(
            request.query_pairs(&FilterKey::ALL),
            vec![
                ("page", "2".to_string()),
                ("size", "20".to_string()),
                ("title", "launch".to_string()),
                ("status", "TO_DO".to_string()),
            ]
        );
    }

    #[test]
    fn test_blank_title_omitted_and_unsupported_filters_dropped() {
        let request = PageRequest {
            page: 0,
            size: 10,
            filters: FilterCriteria {
                status: Some(TaskStatus::Done),
                ..Default::default()
            },
            title: "   ".to_string(),
        };

        assert_eq!(
            request.query_pairs(&[]),
            vec![("page", "0".to_string()), ("size", "10".to_string())]
        );
    }
}
