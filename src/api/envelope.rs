//! Page envelope normalization
//!
//! List endpoints answer either with a Spring-style page object
//! (`{ "content": [...], "last": true, ... }`) or, for some older routes,
//! with a bare JSON array. Both are normalized into [`PageEnvelope`] here so
//! nothing downstream has to probe the response shape.

use serde::de::DeserializeOwned;
use serde::Deserialize;

/// One fetched page
#[derive(Debug, Clone, PartialEq)]
pub struct PageEnvelope<T> {
    /// Items in server order
    pub content: Vec<T>,
    /// No further pages exist
    pub last: bool,
}

impl<T> PageEnvelope<T> {
    pub fn new(content: Vec<T>, last: bool) -> Self {
        Self { content, last }
    }

    /// Transform the items while keeping the `last` marker
    pub fn map<U, F>(self, f: F) -> PageEnvelope<U>
    where
        F: FnMut(T) -> U,
    {
        PageEnvelope {
            content: self.content.into_iter().map(f).collect(),
            last: self.last,
        }
    }
}

/// Wire shapes accepted for a page
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WirePage<T> {
    Bare(Vec<T>),
    Envelope {
        content: Option<Vec<T>>,
        last: Option<bool>,
    },
}

impl<T> From<WirePage<T>> for PageEnvelope<T> {
    fn from(page: WirePage<T>) -> Self {
        match page {
            // A bare array is the whole collection
            WirePage::Bare(content) => Self::new(content, true),
            // Missing `last` ends pagination rather than looping forever
            WirePage::Envelope { content, last } => {
                Self::new(content.unwrap_or_default(), last.unwrap_or(true))
            }
        }
    }
}

/// Normalize a decoded JSON body into a page
///
/// Accepts a bare array or an envelope object; returns the items in order.
pub fn normalize_page<T: DeserializeOwned>(
    body: serde_json::Value,
) -> Result<PageEnvelope<T>, serde_json::Error> {
    serde_json::from_value::<WirePage<T>>(body).map(PageEnvelope::from)
}
