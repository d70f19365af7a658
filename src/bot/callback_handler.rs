//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use tracing::{debug, error, warn};

use super::context::BotContext;
use super::router::{CallbackEvent, Router};
use super::transport::TelegramTransport;

/// Handle callback queries from inline keyboards
pub async fn callback_handler(bot: Bot, q: CallbackQuery, ctx: Arc<BotContext>) -> Result<()> {
    debug!(user_id = %q.from.id, data = ?q.data, "Received callback query from user");

    // Answer first so the client drops the loading state whatever happens next
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        warn!(user_id = %q.from.id, error = %e, "Failed to answer callback query");
    }

    let event = CallbackEvent {
        user: q.from.id,
        chat: q.message.as_ref().map(|msg| msg.chat().id),
        message: q.message.as_ref().map(|msg| msg.id()),
        data: q.data.clone(),
        language_code: q.from.language_code.clone(),
    };

    let transport = TelegramTransport::new(bot);
    if let Err(e) = Router::new(&ctx, &transport).handle_callback(event).await {
        error!(
            user_id = %q.from.id,
            action = q.data.as_deref().unwrap_or_default(),
            error = %e,
            "Failed to handle callback query"
        );
    }

    Ok(())
}
