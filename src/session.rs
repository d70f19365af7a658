//! Per-user session state and the reset operation.

use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};
use teloxide::types::{ChatId, MessageId, UserId};
use tracing::{debug, error, info};

use crate::bot::transport::Transport;

/// Where the user currently is in the menu
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Idle,
    Root {
        menu_message: Option<i32>,
    },
    CategoryView {
        category: String,
        menu_message: Option<i32>,
    },
    SearchPrompt,
}

impl SessionState {
    /// Last menu message the bot rendered for this user, if known
    pub fn menu_message(&self) -> Option<MessageId> {
        match self {
            SessionState::Root { menu_message } | SessionState::CategoryView { menu_message, .. } => {
                menu_message.map(MessageId)
            }
            SessionState::Idle | SessionState::SearchPrompt => None,
        }
    }
}

pub type SessionStorage = InMemStorage<SessionState>;

/// Session handle for one user
pub type ChatSession = Dialogue<SessionState, SessionStorage>;

/// What a reset managed to clean up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetReport {
    pub attempted: usize,
    pub deleted: usize,
}

/// Message ids purged by a reset: `start` and the `depth - 1` ids below it
pub fn purge_range(start: MessageId, depth: u32) -> impl Iterator<Item = MessageId> {
    let lowest = (i64::from(start.0) - i64::from(depth) + 1).max(1);
    (lowest..=i64::from(start.0))
        .rev()
        .filter_map(|id| i32::try_from(id).ok())
        .map(MessageId)
}

/// Owns the in-memory sessions, keyed by user
pub struct SessionManager {
    storage: Arc<SessionStorage>,
    reset_depth: u32,
}

impl SessionManager {
    pub fn new(reset_depth: u32) -> Self {
        Self {
            storage: InMemStorage::new(),
            reset_depth,
        }
    }

    pub fn reset_depth(&self) -> u32 {
        self.reset_depth
    }

    /// Sessions are keyed by user id so two users never share state
    pub fn session(&self, user: UserId) -> ChatSession {
        Dialogue::new(Arc::clone(&self.storage), ChatId(user.0 as i64))
    }

    pub async fn current(&self, user: UserId) -> SessionState {
        match self.session(user).get().await {
            Ok(state) => state.unwrap_or_default(),
            Err(e) => {
                error!(user_id = %user, error = %e, "Failed to read session state");
                SessionState::default()
            }
        }
    }

    pub async fn remember(&self, user: UserId, state: SessionState) {
        debug!(user_id = %user, state = ?state, "Updating session state");
        if let Err(e) = self.session(user).update(state).await {
            error!(user_id = %user, error = %e, "Failed to update session state");
        }
    }

    pub async fn clear(&self, user: UserId) {
        // Clearing a user that never interacted is not an error
        if let Err(e) = self.session(user).exit().await {
            debug!(user_id = %user, error = %e, "No session to clear");
        }
    }

    /// Forget the user's session and purge recent messages of the chat.
    ///
    /// Deletions are best-effort: they run concurrently, individual failures
    /// are ignored and the call only waits for all of them to finish.
    pub async fn reset<T: Transport + ?Sized>(
        &self,
        transport: &T,
        user: UserId,
        chat: ChatId,
        trigger: MessageId,
    ) -> ResetReport {
        let previous = self.current(user).await;
        self.clear(user).await;

        let start = match previous.menu_message() {
            Some(menu) if menu.0 > trigger.0 => menu,
            _ => trigger,
        };
        let ids: Vec<MessageId> = purge_range(start, self.reset_depth).collect();

        let results = join_all(ids.iter().map(|id| transport.delete_message(chat, *id))).await;
        let report = ResetReport {
            attempted: ids.len(),
            deleted: results.iter().filter(|result| result.is_ok()).count(),
        };

        info!(
            user_id = %user,
            chat_id = %chat,
            attempted = report.attempted,
            deleted = report.deleted,
            "Session reset"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purge_range_counts_down() {
        let ids: Vec<i32> = purge_range(MessageId(1000), 200).map(|id| id.0).collect();
        assert_eq!(ids.len(), 200);
        assert_eq!(ids.first(), Some(&1000));
        assert_eq!(ids.last(), Some(&801));
    }

    #[test]
    fn test_purge_range_stops_at_first_message() {
        let ids: Vec<i32> = purge_range(MessageId(5), 200).map(|id| id.0).collect();
        assert_eq!(ids, vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_menu_message_lookup() {
        let state = SessionState::CategoryView {
            category: "postres".to_string(),
            menu_message: Some(42),
        };
        assert_eq!(state.menu_message(), Some(MessageId(42)));
        assert_eq!(SessionState::SearchPrompt.menu_message(), None);
        assert_eq!(SessionState::default(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated_per_user() {
        let manager = SessionManager::new(200);
        manager
            .remember(UserId(1), SessionState::Root { menu_message: Some(10) })
            .await;

        assert_eq!(
            manager.current(UserId(1)).await,
            SessionState::Root { menu_message: Some(10) }
        );
        assert_eq!(manager.current(UserId(2)).await, SessionState::Idle);

        manager.clear(UserId(1)).await;
        manager.clear(UserId(1)).await;
        assert_eq!(manager.current(UserId(1)).await, SessionState::Idle);
    }
}
