//! Telegram bot handler tree configuration
//!
//! Commands and menu buttons drive browsing and admin operations; text, photo
//! and audio messages from admins feed the active editing session.

mod buttons;
mod commands;
mod editing;
mod schema;
mod types;

pub use editing::editor_event;
pub use schema::schema;
pub use types::{HandlerDeps, HandlerError};
