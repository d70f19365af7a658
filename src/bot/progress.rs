//! Staged progress indicator shown before a recipe file is sent.
//!
//! The animation is cosmetic: it always runs its ten steps, then the file
//! is transmitted in one request.

use std::time::Duration;

use async_trait::async_trait;
use teloxide::types::{ChatId, MessageId};
use teloxide::utils::html;
use tracing::{debug, error, info, warn};

use crate::catalog::Item;
use crate::localization::t_args_lang;

use super::transport::{Reply, Transport};
use super::ui_builder::create_navigation_keyboard;

/// Number of updates after the initial 0% message
pub const PROGRESS_STEPS: u32 = 10;

const FILLED: &str = "🟩";
const EMPTY: &str = "⬜";

/// Suspension between animation steps
#[async_trait]
pub trait Pause: Send + Sync {
    async fn pause(&self, duration: Duration);
}

/// [`Pause`] backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPause;

#[async_trait]
impl Pause for TokioPause {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// How a delivery ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Failed,
}

/// Bar with `step` filled cells out of [`PROGRESS_STEPS`]
pub fn render_bar(step: u32) -> String {
    let filled = step.min(PROGRESS_STEPS) as usize;
    let empty = PROGRESS_STEPS as usize - filled;
    format!("{}{}", FILLED.repeat(filled), EMPTY.repeat(empty))
}

pub fn format_progress_message(item: &Item, step: u32, language: &str) -> String {
    let label = html::escape(&item.label());
    let bar = render_bar(step);
    let percent = (step.min(PROGRESS_STEPS) * 100 / PROGRESS_STEPS).to_string();
    t_args_lang(
        "progress-sending",
        &[
            ("item", label.as_str()),
            ("bar", bar.as_str()),
            ("percent", percent.as_str()),
        ],
        language,
    )
}

/// Drives the progress animation and the final file transmission
pub struct ProgressReporter<'a> {
    pause: &'a dyn Pause,
    step_delay: Duration,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(pause: &'a dyn Pause, step_delay: Duration) -> Self {
        Self { pause, step_delay }
    }

    /// Animate 0%..100% on one message, then send the file.
    ///
    /// Both outcomes end with the back/reset keyboard.
    pub async fn deliver<T: Transport + ?Sized>(
        &self,
        transport: &T,
        chat: ChatId,
        item: &Item,
        language: &str,
    ) -> DeliveryOutcome {
        let progress_message = self.show_progress(transport, chat, item, language).await;
        debug!(chat_id = %chat, progress_message = ?progress_message, "Progress animation finished");

        let item_label = html::escape(&item.label());
        let caption = Reply::text(t_args_lang(
            "delivery-success",
            &[("item", item_label.as_str())],
            language,
        ))
        .with_keyboard(create_navigation_keyboard(language));

        match transport.send_document(chat, &item.path, &caption).await {
            Ok(_) => {
                info!(chat_id = %chat, category = %item.category, item = %item.name, "Recipe delivered");
                DeliveryOutcome::Delivered
            }
            Err(e) => {
                error!(
                    chat_id = %chat,
                    category = %item.category,
                    item = %item.name,
                    error = %e,
                    "Failed to send recipe file"
                );
                let failure = Reply::text(t_args_lang(
                    "delivery-failed",
                    &[("item", item_label.as_str())],
                    language,
                ))
                .with_keyboard(create_navigation_keyboard(language));
                if let Err(e) = transport.send_text(chat, &failure).await {
                    error!(chat_id = %chat, error = %e, "Failed to report delivery failure");
                }
                DeliveryOutcome::Failed
            }
        }
    }

    async fn show_progress<T: Transport + ?Sized>(
        &self,
        transport: &T,
        chat: ChatId,
        item: &Item,
        language: &str,
    ) -> Option<MessageId> {
        let initial = Reply::text(format_progress_message(item, 0, language));
        let message = match transport.send_text(chat, &initial).await {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(chat_id = %chat, error = %e, "Failed to send progress message");
                None
            }
        };

        for step in 1..=PROGRESS_STEPS {
            self.pause.pause(self.step_delay).await;
            let Some(id) = message else {
                continue;
            };
            let update = Reply::text(format_progress_message(item, step, language));
            if let Err(e) = transport.edit_text(chat, id, &update).await {
                warn!(chat_id = %chat, step, error = %e, "Failed to update progress message");
            }
        }

        message
    }
}
