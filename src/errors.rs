//! # Error Types Module
//!
//! This module defines the error types used throughout the bot. Each
//! failure family has its own type so callers can decide locally whether
//! the failure is fatal, shown to the user, or swallowed.

use std::path::PathBuf;

use thiserror::Error;

/// Startup configuration errors. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is absent or blank
    #[error("{0} is not set")]
    Missing(&'static str),
    /// A variable is present but cannot be used
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: String, reason: String },
    /// No user would be allowed to use the bot
    #[error("no authorized users configured (set AUTHORIZED_USERS or USER_ID_*)")]
    NoAuthorizedUsers,
    /// The recipe directory does not exist
    #[error("recipe directory '{}' does not exist or is not a directory", .0.display())]
    BaseDirMissing(PathBuf),
}

/// Catalog lookup errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Category directory was removed (or never existed)
    #[error("category '{0}' not found")]
    CategoryNotFound(String),
    /// Item file was removed (or never existed)
    #[error("item '{item}' not found in category '{category}'")]
    ItemNotFound { category: String, item: String },
    /// Any other filesystem failure while reading the catalog
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    /// Whether the error means a stale reference rather than a broken catalog
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CatalogError::CategoryNotFound(_) | CatalogError::ItemNotFound { .. }
        )
    }
}

/// Outbound messaging failures
#[derive(Debug, Error)]
pub enum TransportError {
    /// The Telegram API rejected or failed the request
    #[error("telegram request failed: {0}")]
    Request(#[from] teloxide::RequestError),
    /// The platform refused the operation for another reason
    #[error("transport rejected the operation: {0}")]
    Rejected(String),
}

/// A callback token that does not match any navigation action
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed action token '{token}': {reason}")]
pub struct MalformedActionError {
    pub token: String,
    pub reason: &'static str,
}

impl MalformedActionError {
    pub fn new(token: &str, reason: &'static str) -> Self {
        Self {
            token: token.to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_formatting() {
        let err = ConfigError::Missing("TELEGRAM_TOKEN");
        assert_eq!(err.to_string(), "TELEGRAM_TOKEN is not set");

        let err = CatalogError::ItemNotFound {
            category: "postres".to_string(),
            item: "flan".to_string(),
        };
        assert_eq!(err.to_string(), "item 'flan' not found in category 'postres'");

        let err = MalformedActionError::new("receta|x", "missing argument");
        assert_eq!(
            err.to_string(),
            "malformed action token 'receta|x': missing argument"
        );
    }

    #[test]
    fn test_not_found_classification() {
        assert!(CatalogError::CategoryNotFound("x".into()).is_not_found());
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(!CatalogError::from(io).is_not_found());
    }
}
