//! # Catalog Module
//!
//! Read-only view of the recipe directory. The layout is two levels deep:
//! `<root>/<category>/<item>.<ext>`. Nothing is cached, every call reads
//! the filesystem again so removed files are noticed immediately.

use std::io::ErrorKind;
use std::path::PathBuf;

use tokio::fs;
use tracing::{debug, warn};

use crate::action::DELIMITER;
use crate::errors::CatalogError;

/// A directory of items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
}

impl Category {
    /// Capitalized directory name
    pub fn label(&self) -> String {
        capitalize(&self.name)
    }
}

/// A deliverable file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub category: String,
    /// File name without the extension
    pub name: String,
    pub file_name: String,
    pub path: PathBuf,
}

impl Item {
    pub fn label(&self) -> String {
        self.name.clone()
    }
}

/// Filesystem-backed recipe catalog
#[derive(Debug, Clone)]
pub struct Catalog {
    root: PathBuf,
    extension: String,
}

impl Catalog {
    pub fn new(root: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            root: root.into(),
            extension: extension.trim_start_matches('.').to_ascii_lowercase(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Immediate subdirectories of the root, in enumeration order
    pub async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut categories = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let Some(name) = usable_name(entry.file_name()) else {
                continue;
            };
            // Follow symlinks so linked category folders still show up
            match fs::metadata(entry.path()).await {
                Ok(meta) if meta.is_dir() => categories.push(Category { name }),
                Ok(_) => {}
                Err(e) => debug!(entry = %name, error = %e, "Skipping unreadable catalog entry"),
            }
        }

        Ok(categories)
    }

    /// Files of `category` carrying the catalog extension
    pub async fn list_items(&self, category: &str) -> Result<Vec<Item>, CatalogError> {
        let dir = self.category_dir(category)?;
        match fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(CatalogError::CategoryNotFound(category.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CatalogError::CategoryNotFound(category.to_string()));
            }
            Err(e) => return Err(e.into()),
        }
        let mut entries = fs::read_dir(&dir).await?;

        let mut items = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Some(file_name) = usable_name(entry.file_name()) else {
                continue;
            };
            let Some(name) = self.strip_extension(&file_name) else {
                continue;
            };
            match fs::metadata(entry.path()).await {
                Ok(meta) if meta.is_file() => items.push(Item {
                    category: category.to_string(),
                    name: name.to_string(),
                    file_name: file_name.clone(),
                    path: entry.path(),
                }),
                Ok(_) => {}
                Err(e) => debug!(entry = %file_name, error = %e, "Skipping unreadable catalog entry"),
            }
        }

        Ok(items)
    }

    /// Locate a listed item given either its full file name or its name.
    ///
    /// Resolution goes through [`Catalog::list_items`], so anything shown in a
    /// listing resolves back to the same file.
    pub async fn resolve_item(&self, category: &str, item: &str) -> Result<Item, CatalogError> {
        let not_found = || CatalogError::ItemNotFound {
            category: category.to_string(),
            item: item.to_string(),
        };
        if !is_safe_name(item) {
            return Err(not_found());
        }

        let mut items = match self.list_items(category).await {
            Ok(items) => items,
            Err(e) if e.is_not_found() => return Err(not_found()),
            Err(e) => return Err(e),
        };

        // An exact file name wins over a stem shared by several files
        let by_file_name = items.iter().position(|listed| listed.file_name == item);
        let index = by_file_name
            .or_else(|| items.iter().position(|listed| listed.name == item))
            .ok_or_else(not_found)?;
        Ok(items.swap_remove(index))
    }

    fn category_dir(&self, category: &str) -> Result<PathBuf, CatalogError> {
        if !is_safe_name(category) {
            return Err(CatalogError::CategoryNotFound(category.to_string()));
        }
        Ok(self.root.join(category))
    }

    /// `Some(stem)` when `file_name` ends with `.<extension>`, ignoring ASCII case
    fn strip_extension<'a>(&self, file_name: &'a str) -> Option<&'a str> {
        let (stem, ext) = file_name.rsplit_once('.')?;
        (!stem.is_empty() && ext.eq_ignore_ascii_case(&self.extension)).then_some(stem)
    }
}

/// Upper-case the first character, leave the rest untouched
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Names usable as a single path component and inside an action token
fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', DELIMITER])
        && !name.contains('\0')
}

fn usable_name(raw: std::ffi::OsString) -> Option<String> {
    let name = match raw.into_string() {
        Ok(name) => name,
        Err(raw) => {
            warn!(entry = ?raw, "Skipping catalog entry with a non UTF-8 name");
            return None;
        }
    };
    if name.starts_with('.') {
        return None;
    }
    if name.contains(DELIMITER) {
        warn!(entry = %name, "Skipping catalog entry whose name contains '{DELIMITER}'");
        return None;
    }
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("postres"), "Postres");
        assert_eq!(capitalize("ñoquis"), "Ñoquis");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_safe_names() {
        assert!(is_safe_name("postres"));
        assert!(is_safe_name("Tarta de manzana"));
        assert!(!is_safe_name(".."));
        assert!(!is_safe_name("a/b"));
        assert!(!is_safe_name("a|b"));
        assert!(!is_safe_name(""));
    }

    #[test]
    fn test_strip_extension_ignores_case() {
        let catalog = Catalog::new("recetas", ".PDF");
        assert_eq!(catalog.extension(), "pdf");
        assert_eq!(catalog.strip_extension("Flan.pdf"), Some("Flan"));
        assert_eq!(catalog.strip_extension("Flan.PDF"), Some("Flan"));
        assert_eq!(catalog.strip_extension("Flan.tex"), None);
        assert_eq!(catalog.strip_extension(".pdf"), None);
        assert_eq!(catalog.strip_extension("notes"), None);
    }
}
