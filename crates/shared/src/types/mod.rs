//! Common types used across the workspace.

pub mod pagination;

pub use pagination::{MAX_PER_PAGE, PageMeta, PageRequest, PageResponse};
