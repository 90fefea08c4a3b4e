//! Telegram bot integration and handlers

pub mod bot;
pub mod callbacks;
pub mod handlers;
pub mod media;
pub mod menus;
pub mod render;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use handlers::{schema, HandlerDeps, HandlerError};
pub use media::TelegramMediaSource;
