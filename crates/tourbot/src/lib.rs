//! Tourbot - Telegram front end of the excursion bot
//!
//! # Module Structure
//!
//! - `cli`: command line interface
//! - `i18n`: localized texts
//! - `telegram`: dispatcher schema, menus, rendering of editor replies and media download

pub mod cli;
pub mod i18n;
pub mod telegram;
