//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `message_handler`: Handles incoming text and other messages
//! - `callback_handler`: Handles inline keyboard callback queries
//! - `router`: Navigation state machine shared by both handlers
//! - `ui_builder`: Creates keyboards and formats messages
//! - `progress`: Delivery progress animation
//! - `transport`: Outbound Telegram operations behind a trait

pub mod callback_handler;
pub mod context;
pub mod message_handler;
pub mod progress;
pub mod router;
pub mod transport;
pub mod ui_builder;

// Re-export main handler functions for use in main.rs
pub use callback_handler::callback_handler;
pub use message_handler::message_handler;

pub use context::BotContext;
pub use router::Router;
