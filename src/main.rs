use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use tracing::{error, info};

use recetario::bot::{self, BotContext};
use recetario::config::Config;
use recetario::localization::{get_localization_manager, init_localization};
use recetario::logging::{self, LogSettings};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    logging::init(&LogSettings::from_env())?;

    info!("Starting recipe catalog bot");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration, shutting down");
            std::process::exit(1);
        }
    };

    init_localization(&config.default_language)?;
    info!(
        default_language = get_localization_manager().default_language(),
        "Localization loaded"
    );

    info!(
        recipes_dir = %config.recipes_dir.display(),
        extension = %config.extension,
        authorized_users = config.authorized_users.len(),
        "Configuration loaded"
    );

    let bot = Bot::new(config.token.clone());
    let ctx = Arc::new(BotContext::new(config));

    info!("Bot initialized, starting dispatcher");

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint({
            let ctx = Arc::clone(&ctx);
            move |bot: Bot, msg: Message| {
                let ctx = Arc::clone(&ctx);
                async move { bot::message_handler(bot, msg, ctx).await }
            }
        }))
        .branch(Update::filter_callback_query().endpoint({
            let ctx = Arc::clone(&ctx);
            move |bot: Bot, q: CallbackQuery| {
                let ctx = Arc::clone(&ctx);
                async move { bot::callback_handler(bot, q, ctx).await }
            }
        }));

    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
