pub mod aggregate;
pub mod discovery;
pub mod hydrate;
pub mod paths;

use serde::Serialize;

/// Structured record for one discovered content page.
///
/// Built by the hydrator and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentItem {
    /// Site-rooted absolute path.
    pub path: String,
    pub title: String,
    /// ISO 8601 date (`YYYY-MM-DD`) or empty.
    pub date: String,
    /// Source order, not deduplicated.
    pub tags: Vec<String>,
    pub category: String,
}
