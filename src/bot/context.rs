//! Shared, read-only state handed to every handler.

use std::sync::Arc;

use crate::auth::AccessList;
use crate::catalog::Catalog;
use crate::config::Config;
use crate::session::SessionManager;

use super::progress::{Pause, TokioPause};

pub struct BotContext {
    pub config: Arc<Config>,
    pub access: AccessList,
    pub catalog: Catalog,
    pub sessions: SessionManager,
    pub pause: Arc<dyn Pause>,
}

impl BotContext {
    pub fn new(config: Config) -> Self {
        Self {
            access: AccessList::new(config.authorized_users.iter().copied()),
            catalog: Catalog::new(config.recipes_dir.clone(), &config.extension),
            sessions: SessionManager::new(config.reset_depth),
            pause: Arc::new(TokioPause),
            config: Arc::new(config),
        }
    }

    /// Replace the progress delay, e.g. with an instant one in tests
    pub fn with_pause(mut self, pause: Arc<dyn Pause>) -> Self {
        self.pause = pause;
        self
    }
}
