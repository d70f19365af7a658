//! Substring search over every item of the catalog.

use tracing::{debug, warn};

use crate::catalog::{Catalog, Item};
use crate::errors::CatalogError;

/// Upper bound on result buttons in one reply
pub const MAX_SEARCH_RESULTS: usize = 50;

/// Outcome of one search request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    /// Normalized query the results were computed for
    pub query: String,
    /// Matches in category then item enumeration order
    pub hits: Vec<Item>,
    /// True when more than `MAX_SEARCH_RESULTS` items matched
    pub truncated: bool,
}

/// Lower-case and trim a raw user query
pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Whether `item` matches an already normalized query
pub fn matches(item: &Item, query: &str) -> bool {
    item.label().to_lowercase().contains(query) || item.file_name.to_lowercase().contains(query)
}

/// Case-insensitive substring search across all categories.
///
/// An empty query yields no hits rather than the whole catalog.
pub async fn search(catalog: &Catalog, raw_query: &str) -> Result<SearchResults, CatalogError> {
    let query = normalize_query(raw_query);
    let mut results = SearchResults {
        query,
        ..Default::default()
    };
    if results.query.is_empty() {
        return Ok(results);
    }

    for category in catalog.list_categories().await? {
        let items = match catalog.list_items(&category.name).await {
            Ok(items) => items,
            Err(e) if e.is_not_found() => {
                debug!(category = %category.name, "Category vanished during search");
                continue;
            }
            Err(e) => {
                warn!(category = %category.name, error = %e, "Skipping unreadable category during search");
                continue;
            }
        };

        for item in items {
            if !matches(&item, &results.query) {
                continue;
            }
            if results.hits.len() == MAX_SEARCH_RESULTS {
                results.truncated = true;
                return Ok(results);
            }
            results.hits.push(item);
        }
    }

    Ok(results)
}
