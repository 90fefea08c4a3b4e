//! Slash command handlers

use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{message_user_id, HandlerDeps};
use crate::i18n;
use crate::telegram::bot::Command;
use crate::telegram::menus;
use crate::telegram::render::send_replies;

pub(super) async fn handle_command(bot: &Bot, msg: &Message, cmd: Command, deps: &HandlerDeps) -> ResponseResult<()> {
    let lang = i18n::user_lang(msg.from.as_ref());
    let admin = msg.from.as_ref().is_some_and(|user| deps.is_admin(user));
    let controller = &deps.controller;

    match cmd {
        Command::Start | Command::Excursions => {
            if let (true, Some(user_id)) = (admin, message_user_id(msg)) {
                let replies = controller.discard(user_id).await;
                send_replies(bot, msg.chat.id, &lang, controller.gateway(), &replies).await?;
            }
            let excursions = controller.catalog().snapshot().await;
            menus::show(bot, msg.chat.id, None, menus::excursion_list(&lang, &excursions, admin)).await?;
        }
        Command::Cancel => {
            let replies = match message_user_id(msg) {
                Some(user_id) if admin => controller.discard(user_id).await,
                _ => Vec::new(),
            };
            if replies.is_empty() {
                bot.send_message(msg.chat.id, i18n::t(&lang, "nothing-to-cancel")).await?;
            } else {
                send_replies(bot, msg.chat.id, &lang, controller.gateway(), &replies).await?;
            }
        }
        Command::Help => {
            let key = if admin { "help-admin" } else { "help" };
            bot.send_message(msg.chat.id, i18n::t(&lang, key)).await?;
        }
    }

    Ok(())
}
