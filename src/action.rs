//! Navigation actions carried by inline keyboard buttons.
//!
//! Each button stores its action as a `kind|arg|arg` token in the callback
//! data. Arguments are category and item names, which never contain the
//! delimiter (the catalog refuses such names), so no escaping is applied.

use std::fmt;
use std::str::FromStr;

use crate::errors::MalformedActionError;

pub const DELIMITER: char = '|';

/// Telegram refuses callback data longer than this many bytes
pub const MAX_TOKEN_BYTES: usize = 64;

const KIND_ROOT: &str = "inicio";
const KIND_CATEGORY: &str = "categoria";
const KIND_ITEM: &str = "receta";
const KIND_BACK: &str = "volver";
const KIND_RESET: &str = "reset";
const KIND_SEARCH: &str = "buscar_recetas";

/// A parsed button-press intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationAction {
    ShowRoot,
    ShowCategory(String),
    DeliverItem { category: String, item: String },
    ReturnToRoot,
    EnterSearchMode,
    ResetSession,
}

impl NavigationAction {
    /// Short name used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            NavigationAction::ShowRoot => KIND_ROOT,
            NavigationAction::ShowCategory(_) => KIND_CATEGORY,
            NavigationAction::DeliverItem { .. } => KIND_ITEM,
            NavigationAction::ReturnToRoot => KIND_BACK,
            NavigationAction::EnterSearchMode => KIND_SEARCH,
            NavigationAction::ResetSession => KIND_RESET,
        }
    }

    /// Encoded token, or `None` when it would not fit in a callback payload
    pub fn to_token(&self) -> Option<String> {
        let token = self.to_string();
        (token.len() <= MAX_TOKEN_BYTES).then_some(token)
    }
}

impl fmt::Display for NavigationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationAction::ShowCategory(category) => {
                write!(f, "{KIND_CATEGORY}{DELIMITER}{category}")
            }
            NavigationAction::DeliverItem { category, item } => {
                write!(f, "{KIND_ITEM}{DELIMITER}{category}{DELIMITER}{item}")
            }
            other => f.write_str(other.kind()),
        }
    }
}

impl FromStr for NavigationAction {
    type Err = MalformedActionError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let mut parts = token.split(DELIMITER);
        let kind = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        if args.iter().any(|arg| arg.is_empty()) {
            return Err(MalformedActionError::new(token, "empty argument"));
        }

        let expect_args = |count: usize| {
            if args.len() < count {
                Err(MalformedActionError::new(token, "missing argument"))
            } else if args.len() > count {
                Err(MalformedActionError::new(token, "unexpected argument"))
            } else {
                Ok(())
            }
        };

        match kind {
            KIND_ROOT => expect_args(0).map(|_| NavigationAction::ShowRoot),
            KIND_CATEGORY => {
                expect_args(1).map(|_| NavigationAction::ShowCategory(args[0].to_string()))
            }
            KIND_ITEM => expect_args(2).map(|_| NavigationAction::DeliverItem {
                category: args[0].to_string(),
                item: args[1].to_string(),
            }),
            KIND_BACK => expect_args(0).map(|_| NavigationAction::ReturnToRoot),
            KIND_RESET => expect_args(0).map(|_| NavigationAction::ResetSession),
            KIND_SEARCH => expect_args(0).map(|_| NavigationAction::EnterSearchMode),
            "" => Err(MalformedActionError::new(token, "empty token")),
            _ => Err(MalformedActionError::new(token, "unknown action")),
        }
    }
}
