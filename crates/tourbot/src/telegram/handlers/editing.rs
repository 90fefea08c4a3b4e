//! Messages that feed an admin's editing session

use teloxide::prelude::*;
use teloxide::types::Message;

use tourcore::editor::EditorEvent;
use tourcore::storage::IncomingFile;

use super::types::{user_id, HandlerDeps};
use crate::i18n;
use crate::telegram::render::send_replies;

/// Maps a message onto the editor's event, if it carries anything the editor
/// understands. Commands are never editor input.
pub fn editor_event(msg: &Message) -> Option<EditorEvent> {
    if let Some(photos) = msg.photo() {
        // Telegram sends several sizes of one photo; keep the largest
        let photo = photos.iter().max_by_key(|p| u64::from(p.width) * u64::from(p.height))?;
        let mut file = IncomingFile::new(photo.file.id.0.clone());
        file.mime_type = Some("image/jpeg".to_string());
        file.size = Some(u64::from(photo.file.size));
        return Some(EditorEvent::Photo(file));
    }

    if let Some(audio) = msg.audio() {
        let mut file = IncomingFile::new(audio.file.id.0.clone());
        file.file_name = audio.file_name.clone();
        file.mime_type = audio.mime_type.as_ref().map(|m| m.to_string());
        file.size = Some(u64::from(audio.file.size));
        return Some(EditorEvent::Audio(file));
    }

    if let Some(voice) = msg.voice() {
        let mut file = IncomingFile::new(voice.file.id.0.clone());
        file.file_name = Some("voice.ogg".to_string());
        file.mime_type = voice.mime_type.as_ref().map(|m| m.to_string());
        file.size = Some(u64::from(voice.file.size));
        return Some(EditorEvent::Audio(file));
    }

    msg.text()
        .filter(|text| !text.starts_with('/'))
        .map(|text| EditorEvent::Text(text.to_string()))
}

pub(super) async fn handle_editor_message(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> ResponseResult<()> {
    let Some(user) = msg.from.as_ref().filter(|user| deps.is_admin(user)) else {
        return Ok(());
    };
    let Some(event) = editor_event(msg) else {
        return Ok(());
    };

    let lang = i18n::user_lang(Some(user));
    let controller = &deps.controller;
    match controller.handle(user_id(user), event).await {
        Ok(replies) => send_replies(bot, msg.chat.id, &lang, controller.gateway(), &replies).await,
        Err(e) => {
            log::error!("Editor event from user {} aborted: {}", user_id(user), e);
            bot.send_message(msg.chat.id, i18n::t(&lang, "internal-error")).await?;
            Ok(())
        }
    }
}
