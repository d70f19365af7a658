//! Allow-list check applied by every entry point.

use std::collections::HashSet;

use teloxide::types::UserId;

/// Fixed set of users allowed to use the bot
#[derive(Debug, Clone, Default)]
pub struct AccessList {
    allowed: HashSet<UserId>,
}

impl AccessList {
    pub fn new(allowed: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    pub fn is_authorized(&self, user: UserId) -> bool {
        self.allowed.contains(&user)
    }

    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}
