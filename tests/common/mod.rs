//! Shared fixtures for the integration tests: a temporary recipe directory,
//! a transport that records every call and a pause that returns at once.

#![allow(dead_code)]

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use recetario::action::NavigationAction;
use recetario::bot::progress::Pause;
use recetario::bot::transport::{Reply, Transport};
use recetario::bot::BotContext;
use recetario::config::Config;
use recetario::errors::TransportError;
use teloxide::types::{ChatId, MessageId, UserId};
use tempfile::TempDir;

pub const AUTHORIZED: UserId = UserId(123456789);
pub const STRANGER: UserId = UserId(5555);
pub const CHAT: ChatId = ChatId(123456789);

/// One outbound operation
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SendText { chat: ChatId, reply: Reply },
    EditText { chat: ChatId, message: MessageId, reply: Reply },
    Delete { chat: ChatId, message: MessageId },
    SendDocument { chat: ChatId, path: PathBuf, caption: Reply },
}

/// Transport that records calls and fails on demand
pub struct RecordingTransport {
    calls: Mutex<Vec<Call>>,
    next_id: AtomicI32,
    failing_deletes: HashSet<i32>,
    fail_edits: bool,
    fail_documents: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_id: AtomicI32::new(500),
            failing_deletes: HashSet::new(),
            fail_edits: false,
            fail_documents: false,
        }
    }

    pub fn with_failing_deletes(mut self, ids: impl IntoIterator<Item = i32>) -> Self {
        self.failing_deletes = ids.into_iter().collect();
        self
    }

    pub fn with_failing_edits(mut self) -> Self {
        self.fail_edits = true;
        self
    }

    pub fn with_failing_documents(mut self) -> Self {
        self.fail_documents = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sent_texts(&self) -> Vec<Reply> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::SendText { reply, .. } => Some(reply),
                _ => None,
            })
            .collect()
    }

    pub fn edits(&self) -> Vec<Reply> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::EditText { reply, .. } => Some(reply),
                _ => None,
            })
            .collect()
    }

    pub fn deleted_ids(&self) -> Vec<i32> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Delete { message, .. } => Some(message.0),
                _ => None,
            })
            .collect()
    }

    pub fn documents(&self) -> Vec<(PathBuf, Reply)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::SendDocument { path, caption, .. } => Some((path, caption)),
                _ => None,
            })
            .collect()
    }

    /// Every rendered keyboard, in call order
    pub fn keyboards(&self) -> Vec<recetario::bot::ui_builder::KeyboardLayout> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::SendText { reply, .. } | Call::EditText { reply, .. } => reply.keyboard,
                Call::SendDocument { caption, .. } => caption.keyboard,
                Call::Delete { .. } => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_text(&self, chat: ChatId, reply: &Reply) -> Result<MessageId, TransportError> {
        self.record(Call::SendText {
            chat,
            reply: reply.clone(),
        });
        Ok(MessageId(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }

    async fn edit_text(
        &self,
        chat: ChatId,
        message: MessageId,
        reply: &Reply,
    ) -> Result<(), TransportError> {
        self.record(Call::EditText {
            chat,
            message,
            reply: reply.clone(),
        });
        if self.fail_edits {
            return Err(TransportError::Rejected("message can't be edited".into()));
        }
        Ok(())
    }

    async fn delete_message(&self, chat: ChatId, message: MessageId) -> Result<(), TransportError> {
        self.record(Call::Delete { chat, message });
        if self.failing_deletes.contains(&message.0) {
            return Err(TransportError::Rejected("message to delete not found".into()));
        }
        Ok(())
    }

    async fn send_document(
        &self,
        chat: ChatId,
        path: &Path,
        caption: &Reply,
    ) -> Result<MessageId, TransportError> {
        self.record(Call::SendDocument {
            chat,
            path: path.to_path_buf(),
            caption: caption.clone(),
        });
        if self.fail_documents || !path.is_file() {
            return Err(TransportError::Rejected("file upload failed".into()));
        }
        Ok(MessageId(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }
}

/// Pause that only records the requested delays
#[derive(Default)]
pub struct InstantPause {
    pub requested: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Pause for InstantPause {
    async fn pause(&self, duration: Duration) {
        self.requested.lock().unwrap().push(duration);
    }
}

/// Recipe tree used by most tests:
///
/// ```text
/// postres/Tarta de manzana.pdf
/// postres/Fruit Tart.pdf
/// postres/Flan.pdf
/// postres/notas.txt
/// carnes/Pie.pdf
/// LEEME.txt
/// ```
pub fn recipe_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    let postres = dir.path().join("postres");
    let carnes = dir.path().join("carnes");
    fs::create_dir(&postres).unwrap();
    fs::create_dir(&carnes).unwrap();

    for name in ["Tarta de manzana.pdf", "Fruit Tart.pdf", "Flan.pdf", "notas.txt"] {
        fs::write(postres.join(name), b"%PDF-1.4").unwrap();
    }
    fs::write(carnes.join("Pie.pdf"), b"%PDF-1.4").unwrap();
    fs::write(dir.path().join("LEEME.txt"), b"not a category").unwrap();
    dir
}

/// Empty recipe directory with the given category folders
pub fn recipe_dir_with_categories(categories: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for category in categories {
        fs::create_dir(dir.path().join(category)).unwrap();
    }
    dir
}

pub fn config_for(dir: &TempDir) -> Config {
    let vars = vec![
        ("TELEGRAM_TOKEN".to_string(), "123:test".to_string()),
        ("AUTHORIZED_USERS".to_string(), AUTHORIZED.0.to_string()),
        (
            "RECIPES_DIR".to_string(),
            dir.path().to_string_lossy().to_string(),
        ),
    ];
    Config::from_vars(&vars).unwrap()
}

pub fn context_for(dir: &TempDir) -> (BotContext, Arc<InstantPause>) {
    let pause = Arc::new(InstantPause::default());
    let ctx = BotContext::new(config_for(dir)).with_pause(pause.clone());
    (ctx, pause)
}

pub fn actions_of(row: &[recetario::bot::ui_builder::KeyboardButton]) -> Vec<NavigationAction> {
    row.iter().map(|button| button.action.clone()).collect()
}
