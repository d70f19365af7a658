//! Outbound messaging operations used by the router.
//!
//! Handlers talk to Telegram only through [`Transport`], which keeps the
//! navigation logic independent of the network.

use std::path::Path;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId, ParseMode};

use crate::errors::TransportError;

use super::ui_builder::KeyboardLayout;

/// Text to render, optionally with an inline keyboard. Text is HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<KeyboardLayout>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: KeyboardLayout) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

/// Render operations the bot needs from the messaging platform
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_text(&self, chat: ChatId, reply: &Reply) -> Result<MessageId, TransportError>;

    async fn edit_text(
        &self,
        chat: ChatId,
        message: MessageId,
        reply: &Reply,
    ) -> Result<(), TransportError>;

    async fn delete_message(&self, chat: ChatId, message: MessageId) -> Result<(), TransportError>;

    async fn send_document(
        &self,
        chat: ChatId,
        path: &Path,
        caption: &Reply,
    ) -> Result<MessageId, TransportError>;
}

/// [`Transport`] backed by the Telegram Bot API
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_text(&self, chat: ChatId, reply: &Reply) -> Result<MessageId, TransportError> {
        let mut request = self
            .bot
            .send_message(chat, reply.text.clone())
            .parse_mode(ParseMode::Html);
        if let Some(keyboard) = &reply.keyboard {
            request = request.reply_markup(keyboard.to_inline_markup());
        }
        Ok(request.await?.id)
    }

    async fn edit_text(
        &self,
        chat: ChatId,
        message: MessageId,
        reply: &Reply,
    ) -> Result<(), TransportError> {
        let mut request = self
            .bot
            .edit_message_text(chat, message, reply.text.clone())
            .parse_mode(ParseMode::Html);
        if let Some(keyboard) = &reply.keyboard {
            request = request.reply_markup(keyboard.to_inline_markup());
        }
        request.await?;
        Ok(())
    }

    async fn delete_message(&self, chat: ChatId, message: MessageId) -> Result<(), TransportError> {
        self.bot.delete_message(chat, message).await?;
        Ok(())
    }

    async fn send_document(
        &self,
        chat: ChatId,
        path: &Path,
        caption: &Reply,
    ) -> Result<MessageId, TransportError> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(TransportError::Rejected(format!(
                "file '{}' is not readable",
                path.display()
            )));
        }

        let mut request = self
            .bot
            .send_document(chat, InputFile::file(path.to_path_buf()))
            .caption(caption.text.clone())
            .parse_mode(ParseMode::Html);
        if let Some(keyboard) = &caption.keyboard {
            request = request.reply_markup(keyboard.to_inline_markup());
        }
        Ok(request.await?.id)
    }
}
