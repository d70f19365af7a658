//! # Search Tests
//!
//! Case-insensitive substring search across the whole catalog.

mod common;

use common::{recipe_dir, recipe_dir_with_categories};
use recetario::catalog::Catalog;
use recetario::search::{search, MAX_SEARCH_RESULTS};
use std::fs;

#[cfg(test)]
mod tests {
    use super::*;

    fn hit_names(results: &recetario::search::SearchResults) -> Vec<String> {
        let mut names: Vec<String> = results.hits.iter().map(|hit| hit.name.clone()).collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_search_matches_across_categories_ignoring_case() {
        let dir = recipe_dir();
        let catalog = Catalog::new(dir.path(), "pdf");

        let results = search(&catalog, "tart").await.unwrap();
        assert_eq!(hit_names(&results), vec!["Fruit Tart", "Tarta de manzana"]);
        assert!(!results.truncated);

        let results = search(&catalog, "  TARTA ").await.unwrap();
        assert_eq!(results.query, "tarta");
        assert_eq!(hit_names(&results), vec!["Tarta de manzana"]);
    }

    #[tokio::test]
    async fn test_search_finds_items_in_every_category() {
        let dir = recipe_dir();
        let catalog = Catalog::new(dir.path(), "pdf");

        let results = search(&catalog, "pie").await.unwrap();
        assert_eq!(results.hits.len(), 1);
        assert_eq!(results.hits[0].category, "carnes");
    }

    #[tokio::test]
    async fn test_search_ignores_other_extensions() {
        let dir = recipe_dir();
        let catalog = Catalog::new(dir.path(), "pdf");

        let results = search(&catalog, "notas").await.unwrap();
        assert!(results.hits.is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_has_no_hits() {
        let dir = recipe_dir();
        let catalog = Catalog::new(dir.path(), "pdf");

        for query in ["", "   ", "\n"] {
            let results = search(&catalog, query).await.unwrap();
            assert!(results.query.is_empty());
            assert!(results.hits.is_empty());
        }
    }

    #[tokio::test]
    async fn test_results_are_capped() {
        let dir = recipe_dir_with_categories(&["sopas"]);
        for i in 0..(MAX_SEARCH_RESULTS + 5) {
            fs::write(dir.path().join("sopas").join(format!("Sopa {i}.pdf")), b"%PDF").unwrap();
        }
        let catalog = Catalog::new(dir.path(), "pdf");

        let results = search(&catalog, "sopa").await.unwrap();
        assert_eq!(results.hits.len(), MAX_SEARCH_RESULTS);
        assert!(results.truncated);
    }

    #[tokio::test]
    async fn test_exactly_the_cap_is_not_truncated() {
        let dir = recipe_dir_with_categories(&["sopas"]);
        for i in 0..MAX_SEARCH_RESULTS {
            fs::write(dir.path().join("sopas").join(format!("Sopa {i}.pdf")), b"%PDF").unwrap();
        }
        let catalog = Catalog::new(dir.path(), "pdf");

        let results = search(&catalog, "sopa").await.unwrap();
        assert_eq!(results.hits.len(), MAX_SEARCH_RESULTS);
        assert!(!results.truncated);
    }
}
