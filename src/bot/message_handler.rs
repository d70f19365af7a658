//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{debug, error};

use super::context::BotContext;
use super::router::{Router, TextEvent};
use super::transport::TelegramTransport;

pub async fn message_handler(bot: Bot, msg: Message, ctx: Arc<BotContext>) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        debug!(chat_id = %msg.chat.id, "Ignoring message without a sender");
        return Ok(());
    };
    let language_code = user.language_code.as_deref();

    let transport = TelegramTransport::new(bot);
    let router = Router::new(&ctx, &transport);

    let result = if let Some(text) = msg.text() {
        debug!(user_id = %user.id, message_length = text.len(), "Received text message from user");
        router
            .handle_text(TextEvent {
                user: user.id,
                chat: msg.chat.id,
                message: msg.id,
                text: text.to_string(),
                language_code: language_code.map(str::to_string),
            })
            .await
    } else {
        debug!(user_id = %user.id, "Received unsupported message type from user");
        router
            .handle_unsupported(user.id, msg.chat.id, language_code)
            .await
    };

    if let Err(e) = result {
        error!(
            user_id = %user.id,
            chat_id = %msg.chat.id,
            error = %e,
            "Failed to handle message"
        );
    }

    Ok(())
}
