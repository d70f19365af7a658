//! # Recetario Telegram Bot
//!
//! A Telegram bot that lets a fixed set of users browse a directory of
//! recipe files by category, search them by name and receive them as
//! documents.

pub mod action;
pub mod auth;
pub mod bot;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod localization;
pub mod logging;
pub mod search;
pub mod session;
