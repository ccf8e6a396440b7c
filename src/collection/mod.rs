//! Paginated collections
//!
//! [`CollectionController`] is generic over a [`PageSource`]; the domain
//! modules provide the sources and item mappers for projects, tasks, teams
//! and team members.

mod controller;
mod source;

pub use controller::{
    CollectionController, FetchOutcome, SkipReason, DEFAULT_PAGE_SIZE, MEMBER_PAGE_SIZE,
};
pub use source::{PageRequest, PageSource};
