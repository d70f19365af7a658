//! # Configuration Module
//!
//! Startup configuration for the bot: token, allow-list, recipe directory
//! and the tunables for delivery and reset. Built once, then shared
//! read-only by every handler.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use teloxide::types::UserId;

use crate::errors::ConfigError;

// Constants for configuration defaults
pub const DEFAULT_RECIPES_DIR: &str = "recetas";
pub const DEFAULT_EXTENSION: &str = "pdf";
pub const DEFAULT_PROGRESS_STEP_MS: u64 = 500;
pub const DEFAULT_RESET_DEPTH: u32 = 200;
pub const MAX_RESET_DEPTH: u32 = 1000;
pub const DEFAULT_LANGUAGE: &str = "es";

/// Prefix of the legacy one-variable-per-user settings (`USER_ID_R`, ...)
const USER_ID_PREFIX: &str = "USER_ID_";

/// Immutable bot configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token
    pub token: String,
    /// Users allowed to talk to the bot
    pub authorized_users: HashSet<UserId>,
    /// Root of the `<category>/<item>.<ext>` hierarchy
    pub recipes_dir: PathBuf,
    /// Item file extension, without the leading dot
    pub extension: String,
    /// Delay between two progress animation steps
    pub progress_step: Duration,
    /// Number of messages purged by a reset
    pub reset_depth: u32,
    /// Language used when the user's own is not supported
    pub default_language: String,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        // Non UTF-8 variables cannot be ours; skip them instead of panicking
        let vars: Vec<(String, String)> = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect();
        Self::from_vars(&vars)
    }

    /// Load configuration from an explicit list of variables
    pub fn from_vars(vars: &[(String, String)]) -> Result<Self, ConfigError> {
        let lookup = |name: &str| {
            vars.iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let token = lookup("TELEGRAM_TOKEN")
            .or_else(|| lookup("TELEGRAM_BOT_TOKEN"))
            .ok_or(ConfigError::Missing("TELEGRAM_TOKEN"))?;

        let mut authorized_users = HashSet::new();
        if let Some(list) = lookup("AUTHORIZED_USERS") {
            for raw in list.split([',', ' ', ';']).filter(|s| !s.is_empty()) {
                authorized_users.insert(parse_user_id("AUTHORIZED_USERS", raw)?);
            }
        }
        for (key, value) in vars {
            if key.starts_with(USER_ID_PREFIX) && !value.trim().is_empty() {
                authorized_users.insert(parse_user_id(key, value.trim())?);
            }
        }
        if authorized_users.is_empty() {
            return Err(ConfigError::NoAuthorizedUsers);
        }

        let recipes_dir =
            PathBuf::from(lookup("RECIPES_DIR").unwrap_or_else(|| DEFAULT_RECIPES_DIR.to_string()));
        if !recipes_dir.is_dir() {
            return Err(ConfigError::BaseDirMissing(recipes_dir));
        }

        let extension = lookup("RECIPE_EXTENSION")
            .map(|ext| ext.trim_start_matches('.').to_string())
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
        if extension.is_empty() || extension.contains(['/', '\\', '|']) {
            return Err(invalid("RECIPE_EXTENSION", "must be a plain file extension"));
        }

        let progress_step_ms = match lookup("PROGRESS_STEP_MS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| invalid("PROGRESS_STEP_MS", "expected milliseconds"))?,
            None => DEFAULT_PROGRESS_STEP_MS,
        };

        let reset_depth = match lookup("RESET_DEPTH") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|depth| (1..=MAX_RESET_DEPTH).contains(depth))
                .ok_or_else(|| invalid("RESET_DEPTH", "expected a number between 1 and 1000"))?,
            None => DEFAULT_RESET_DEPTH,
        };

        let default_language = match lookup("DEFAULT_LANGUAGE") {
            Some(lang) if crate::localization::SUPPORTED_LANGUAGES.contains(&lang.as_str()) => lang,
            Some(_) => return Err(invalid("DEFAULT_LANGUAGE", "supported values are 'es' and 'en'")),
            None => DEFAULT_LANGUAGE.to_string(),
        };

        Ok(Self {
            token,
            authorized_users,
            recipes_dir,
            extension,
            progress_step: Duration::from_millis(progress_step_ms),
            reset_depth,
            default_language,
        })
    }
}

fn parse_user_id(name: &str, raw: &str) -> Result<UserId, ConfigError> {
    raw.parse::<u64>()
        .map(UserId)
        .map_err(|_| invalid(name, &format!("'{raw}' is not a numeric user id")))
}

fn invalid(name: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}
