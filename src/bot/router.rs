//! Navigation state machine.
//!
//! Every inbound event (command, button press, free text) ends up here.
//! The router checks the allow-list, decides which transition applies and
//! renders the resulting message through a [`Transport`].

use anyhow::Result;
use teloxide::types::{ChatId, MessageId, UserId};
use teloxide::utils::html;
use tracing::{debug, error, info, warn};

use crate::action::NavigationAction;
use crate::catalog::Category;
use crate::localization::{detect_language, t_args_lang, t_lang};
use crate::search::{search, MAX_SEARCH_RESULTS};
use crate::session::SessionState;

use super::context::BotContext;
use super::progress::ProgressReporter;
use super::transport::{Reply, Transport};
use super::ui_builder::{
    create_item_keyboard, create_navigation_keyboard, create_root_keyboard,
    create_search_keyboard, format_category_message, format_root_message,
};

/// A button press
#[derive(Debug, Clone)]
pub struct CallbackEvent {
    pub user: UserId,
    /// Chat of the message carrying the button, if Telegram sent it
    pub chat: Option<ChatId>,
    pub message: Option<MessageId>,
    pub data: Option<String>,
    pub language_code: Option<String>,
}

/// A text message
#[derive(Debug, Clone)]
pub struct TextEvent {
    pub user: UserId,
    pub chat: ChatId,
    pub message: MessageId,
    pub text: String,
    pub language_code: Option<String>,
}

/// Reserved slash commands. Any other text is a search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Menu,
    Search { query: Option<String> },
    Reset,
    Help,
    Unknown(String),
}

impl Command {
    /// `None` when `text` is not a command
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (head, rest) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
        let name = head.strip_prefix('/')?;
        // Group chats address commands as /start@some_bot
        let name = name.split('@').next().unwrap_or_default().to_lowercase();
        let rest = rest.trim();

        Some(match name.as_str() {
            "start" => Command::Start,
            "menu" => Command::Menu,
            "buscar" | "search" => Command::Search {
                query: (!rest.is_empty()).then(|| rest.to_string()),
            },
            "reset" => Command::Reset,
            "help" | "ayuda" => Command::Help,
            _ => Command::Unknown(name),
        })
    }
}

/// Where a transition was triggered from
#[derive(Debug, Clone)]
struct Origin {
    user: UserId,
    chat: ChatId,
    /// Message to replace or delete (the menu pressed, or the user's command)
    message: Option<MessageId>,
    language: String,
}

pub struct Router<'a, T: Transport + ?Sized> {
    ctx: &'a BotContext,
    transport: &'a T,
}

impl<'a, T: Transport + ?Sized> Router<'a, T> {
    pub fn new(ctx: &'a BotContext, transport: &'a T) -> Self {
        Self { ctx, transport }
    }

    /// Handle a button press. Malformed tokens are logged and ignored.
    pub async fn handle_callback(&self, event: CallbackEvent) -> Result<()> {
        let language = detect_language(event.language_code.as_deref());
        // Inline-mode callbacks carry no message; answer in the private chat
        let chat = event.chat.unwrap_or(ChatId(event.user.0 as i64));

        if !self.ctx.access.is_authorized(event.user) {
            return self.reject(event.user, chat, &language).await;
        }

        let data = event.data.as_deref().unwrap_or_default();
        let action = match data.parse::<NavigationAction>() {
            Ok(action) => action,
            Err(e) => {
                warn!(user_id = %event.user, error = %e, "Ignoring malformed callback");
                return Ok(());
            }
        };

        let origin = Origin {
            user: event.user,
            chat,
            message: event.message,
            language,
        };
        self.dispatch(origin, action).await
    }

    /// Handle a text message: a reserved command, otherwise a search
    pub async fn handle_text(&self, event: TextEvent) -> Result<()> {
        let language = detect_language(event.language_code.as_deref());
        if !self.ctx.access.is_authorized(event.user) {
            return self.reject(event.user, event.chat, &language).await;
        }

        let origin = Origin {
            user: event.user,
            chat: event.chat,
            message: Some(event.message),
            language,
        };

        match Command::parse(&event.text) {
            Some(Command::Start) | Some(Command::Menu) => {
                self.dispatch(origin, NavigationAction::ShowRoot).await
            }
            Some(Command::Search { query: None }) => {
                self.dispatch(origin, NavigationAction::EnterSearchMode).await
            }
            Some(Command::Search { query: Some(query) }) => self.run_search(&origin, &query).await,
            Some(Command::Reset) => self.dispatch(origin, NavigationAction::ResetSession).await,
            Some(Command::Help) => self.send_help(&origin).await,
            Some(Command::Unknown(name)) => {
                debug!(user_id = %origin.user, command = %name, "Unknown command");
                self.send_help(&origin).await
            }
            None => self.run_search(&origin, &event.text).await,
        }
    }

    /// Anything that is neither text nor a button press
    pub async fn handle_unsupported(
        &self,
        user: UserId,
        chat: ChatId,
        language_code: Option<&str>,
    ) -> Result<()> {
        let language = detect_language(language_code);
        if !self.ctx.access.is_authorized(user) {
            return self.reject(user, chat, &language).await;
        }

        let reply = Reply::text(t_lang("unsupported-message", &language));
        self.transport.send_text(chat, &reply).await?;
        Ok(())
    }

    async fn dispatch(&self, origin: Origin, action: NavigationAction) -> Result<()> {
        info!(user_id = %origin.user, action = %action, "Handling navigation action");

        match action {
            NavigationAction::ShowRoot | NavigationAction::ReturnToRoot => {
                self.show_root(&origin, None).await
            }
            NavigationAction::ShowCategory(category) => self.show_category(&origin, category).await,
            NavigationAction::DeliverItem { category, item } => {
                self.deliver_item(&origin, &category, &item).await
            }
            NavigationAction::EnterSearchMode => self.enter_search(&origin).await,
            NavigationAction::ResetSession => self.reset(&origin).await,
        }
    }

    async fn reject(&self, user: UserId, chat: ChatId, language: &str) -> Result<()> {
        warn!(user_id = %user, chat_id = %chat, "Unauthorized access attempt");
        let reply = Reply::text(t_lang("unauthorized", language));
        self.transport.send_text(chat, &reply).await?;
        Ok(())
    }

    /// Replace the triggering message with a fresh root menu
    async fn show_root(&self, origin: &Origin, notice: Option<String>) -> Result<()> {
        self.delete_quietly(origin.chat, origin.message).await;

        let reply = match self.ctx.catalog.list_categories().await {
            Ok(categories) => {
                let mut text = format_root_message(!categories.is_empty(), &origin.language);
                if let Some(notice) = notice {
                    text = format!("{notice}\n\n{text}");
                }
                Reply::text(text).with_keyboard(create_root_keyboard(&categories, &origin.language))
            }
            Err(e) => {
                error!(user_id = %origin.user, error = %e, "Failed to list categories");
                Reply::text(t_lang("catalog-error", &origin.language))
                    .with_keyboard(create_root_keyboard(&[], &origin.language))
            }
        };

        let sent = self.transport.send_text(origin.chat, &reply).await?;
        self.ctx
            .sessions
            .remember(
                origin.user,
                SessionState::Root {
                    menu_message: Some(sent.0),
                },
            )
            .await;
        Ok(())
    }

    async fn show_category(&self, origin: &Origin, name: String) -> Result<()> {
        let category = Category { name };
        let language = origin.language.as_str();

        let reply = match self.ctx.catalog.list_items(&category.name).await {
            Ok(items) => {
                debug!(user_id = %origin.user, category = %category.name, items = items.len(), "Listing category");
                Reply::text(format_category_message(&category, !items.is_empty(), language))
                    .with_keyboard(create_item_keyboard(&items, language))
            }
            Err(e) if e.is_not_found() => {
                info!(user_id = %origin.user, category = %category.name, "Stale category requested");
                let label = html::escape(&category.name);
                Reply::text(t_args_lang(
                    "category-missing",
                    &[("category", label.as_str())],
                    language,
                ))
                .with_keyboard(create_navigation_keyboard(language))
            }
            Err(e) => {
                error!(user_id = %origin.user, category = %category.name, error = %e, "Failed to list items");
                Reply::text(t_lang("catalog-error", language))
                    .with_keyboard(create_navigation_keyboard(language))
            }
        };

        let shown = self.render_in_place(origin, &reply).await?;
        self.ctx
            .sessions
            .remember(
                origin.user,
                SessionState::CategoryView {
                    category: category.name,
                    menu_message: Some(shown.0),
                },
            )
            .await;
        Ok(())
    }

    async fn deliver_item(&self, origin: &Origin, category: &str, item: &str) -> Result<()> {
        let language = origin.language.as_str();

        let resolved = match self.ctx.catalog.resolve_item(category, item).await {
            Ok(resolved) => resolved,
            Err(e) => {
                let key = if e.is_not_found() {
                    info!(user_id = %origin.user, category = %category, item = %item, "Stale item requested");
                    "delivery-missing"
                } else {
                    error!(user_id = %origin.user, category = %category, item = %item, error = %e, "Failed to resolve item");
                    "delivery-failed"
                };
                let label = html::escape(item);
                let reply = Reply::text(t_args_lang(key, &[("item", label.as_str())], language))
                    .with_keyboard(create_navigation_keyboard(language));
                self.transport.send_text(origin.chat, &reply).await?;
                return Ok(());
            }
        };

        let reporter = ProgressReporter::new(self.ctx.pause.as_ref(), self.ctx.config.progress_step);
        let outcome = reporter
            .deliver(self.transport, origin.chat, &resolved, language)
            .await;
        debug!(user_id = %origin.user, outcome = ?outcome, "Delivery finished");
        Ok(())
    }

    async fn enter_search(&self, origin: &Origin) -> Result<()> {
        self.delete_quietly(origin.chat, origin.message).await;

        let reply = Reply::text(t_lang("search-prompt", &origin.language));
        self.transport.send_text(origin.chat, &reply).await?;
        self.ctx
            .sessions
            .remember(origin.user, SessionState::SearchPrompt)
            .await;
        Ok(())
    }

    async fn reset(&self, origin: &Origin) -> Result<()> {
        let trigger = origin.message.unwrap_or(MessageId(0));
        self.ctx
            .sessions
            .reset(self.transport, origin.user, origin.chat, trigger)
            .await;

        // Everything up to the trigger is gone already
        let fresh = Origin {
            message: None,
            ..origin.clone()
        };
        self.show_root(&fresh, Some(t_lang("reset-done", &origin.language)))
            .await
    }

    async fn run_search(&self, origin: &Origin, raw_query: &str) -> Result<()> {
        let language = origin.language.as_str();

        let reply = match search(&self.ctx.catalog, raw_query).await {
            Ok(results) if results.query.is_empty() => {
                Reply::text(t_lang("search-empty-query", language))
                    .with_keyboard(create_navigation_keyboard(language))
            }
            Ok(results) if results.hits.is_empty() => {
                debug!(user_id = %origin.user, query = %results.query, "Search without results");
                let query = html::escape(&results.query);
                Reply::text(t_args_lang(
                    "search-no-results",
                    &[("query", query.as_str())],
                    language,
                ))
                .with_keyboard(create_navigation_keyboard(language))
            }
            Ok(results) => {
                info!(user_id = %origin.user, query = %results.query, hits = results.hits.len(), "Search completed");
                let query = html::escape(&results.query);
                let count = results.hits.len().to_string();
                let mut text = t_args_lang(
                    "search-results",
                    &[("query", query.as_str()), ("count", count.as_str())],
                    language,
                );
                if results.truncated {
                    let shown = MAX_SEARCH_RESULTS.to_string();
                    text.push_str("\n\n");
                    text.push_str(&t_args_lang(
                        "search-truncated",
                        &[("shown", shown.as_str())],
                        language,
                    ));
                }
                Reply::text(text).with_keyboard(create_search_keyboard(&results.hits, language))
            }
            Err(e) => {
                error!(user_id = %origin.user, error = %e, "Search failed");
                Reply::text(t_lang("catalog-error", language))
                    .with_keyboard(create_navigation_keyboard(language))
            }
        };

        self.transport.send_text(origin.chat, &reply).await?;
        Ok(())
    }

    async fn send_help(&self, origin: &Origin) -> Result<()> {
        let reply = Reply::text(t_lang("help-text", &origin.language))
            .with_keyboard(create_navigation_keyboard(&origin.language));
        self.transport.send_text(origin.chat, &reply).await?;
        Ok(())
    }

    /// Edit the origin message in place, or send a new one if that fails
    async fn render_in_place(&self, origin: &Origin, reply: &Reply) -> Result<MessageId> {
        if let Some(message) = origin.message {
            match self.transport.edit_text(origin.chat, message, reply).await {
                Ok(()) => return Ok(message),
                Err(e) => {
                    warn!(user_id = %origin.user, error = %e, "Failed to edit menu, sending a new one")
                }
            }
        }
        Ok(self.transport.send_text(origin.chat, reply).await?)
    }

    async fn delete_quietly(&self, chat: ChatId, message: Option<MessageId>) {
        let Some(message) = message else {
            return;
        };
        if let Err(e) = self.transport.delete_message(chat, message).await {
            debug!(chat_id = %chat, message_id = message.0, error = %e, "Best-effort delete failed");
        }
    }
}
