//! Tourcore - content model and admin editing engine of the excursion bot
//!
//! # Module Structure
//!
//! - `core`: configuration, errors and logging
//! - `content`: the Excursion → Point → InformationPart tree and its field contract
//! - `editor`: editing sessions and the workflow controller
//! - `storage`: SQLite persistence and media storage

pub mod content;
pub mod core;
pub mod editor;
pub mod storage;

pub use crate::core::{config, init_logger, AppError, AppResult};
pub use content::Catalog;
pub use editor::EditorController;
pub use storage::{create_pool, LocalMediaStore, SqliteExcursionStore};
