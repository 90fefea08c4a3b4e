//! Turns editor replies into Telegram messages.

use std::sync::Arc;

use fluent_templates::fluent_bundle::FluentArgs;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, InputFile, InputMedia, InputMediaPhoto};
use unic_langid::LanguageIdentifier;

use tourcore::content::{FieldKind, FieldValue, FileRef, MediaKind, TargetKind};
use tourcore::editor::{FieldPrompt, FileResolution, NavigationHints, OrderError, Reply};
use tourcore::storage::FileGateway;

use super::callbacks::{CallbackData, FieldAction};
use super::menus::button;
use crate::i18n;

/// Telegram refuses albums with more photos.
const MAX_ALBUM_SIZE: usize = 10;

/// One message to send.
#[derive(Debug, Clone, PartialEq)]
pub enum Outgoing {
    Text {
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    },
    /// Preview of stored photos: a single photo or an album.
    Photos(Vec<FileRef>),
}

impl Outgoing {
    fn text(text: String) -> Self {
        Outgoing::Text { text, keyboard: None }
    }

    fn with_keyboard(text: String, keyboard: InlineKeyboardMarkup) -> Self {
        Outgoing::Text {
            text,
            keyboard: Some(keyboard),
        }
    }
}

/// Buttons offered for a field of the given kind.
pub fn field_keyboard(lang: &LanguageIdentifier, kind: FieldKind) -> InlineKeyboardMarkup {
    let field = |key: &str, action: FieldAction| button(i18n::t(lang, key), CallbackData::Field(action));
    let skip = field("btn-skip", FieldAction::Skip);

    let rows = match kind {
        FieldKind::Text | FieldKind::Integer => vec![vec![skip]],
        FieldKind::Url => vec![vec![field("btn-delete-link", FieldAction::DeleteValue)], vec![skip]],
        FieldKind::Boolean => vec![
            vec![
                field("btn-yes", FieldAction::Choice(true)),
                field("btn-no", FieldAction::Choice(false)),
            ],
            vec![skip],
        ],
        FieldKind::SinglePhoto => vec![vec![field("btn-delete-photo", FieldAction::DeleteValue)], vec![skip]],
        FieldKind::MultiPhoto | FieldKind::MultiAudio => vec![
            vec![
                field("btn-files-replace", FieldAction::Files(FileResolution::Replace)),
                field("btn-files-append", FieldAction::Files(FileResolution::Append)),
            ],
            vec![
                field("btn-files-clear", FieldAction::Files(FileResolution::Clear)),
                skip,
            ],
        ],
    };
    InlineKeyboardMarkup::new(rows)
}

/// Messages describing the value stored before the edit started.
fn current_value(lang: &LanguageIdentifier, kind: FieldKind, value: Option<&FieldValue>) -> Vec<Outgoing> {
    let Some(value) = value else {
        return Vec::new();
    };

    let mut args = FluentArgs::new();
    let line = match (kind, value) {
        (FieldKind::SinglePhoto | FieldKind::MultiPhoto, FieldValue::File(_) | FieldValue::Files(_))
            if !value.files().is_empty() =>
        {
            let photos: Vec<FileRef> = value.files().iter().take(MAX_ALBUM_SIZE).cloned().collect();
            args.set("count", value.files().len());
            return vec![
                Outgoing::text(i18n::t_args(lang, "current-photos", &args)),
                Outgoing::Photos(photos),
            ];
        }
        (FieldKind::SinglePhoto | FieldKind::MultiPhoto, _) => i18n::t(lang, "current-no-photo"),
        (FieldKind::MultiAudio, _) => {
            args.set("count", value.files().len());
            i18n::t_args(lang, "current-audio", &args)
        }
        (_, FieldValue::Text(text)) if text.trim().is_empty() => i18n::t(lang, "current-empty"),
        (_, FieldValue::Text(text)) => current_line(lang, text.clone()),
        (_, FieldValue::Integer(n)) => current_line(lang, n.to_string()),
        (_, FieldValue::Boolean(flag)) => current_line(lang, i18n::t(lang, if *flag { "yes" } else { "no" })),
        (_, FieldValue::Url(url)) => current_line(lang, url.to_string()),
        (FieldKind::Url, FieldValue::Empty) => i18n::t(lang, "current-no-link"),
        _ => i18n::t(lang, "current-empty"),
    };
    vec![Outgoing::text(line)]
}

fn current_line(lang: &LanguageIdentifier, value: String) -> String {
    let mut args = FluentArgs::new();
    args.set("value", value);
    i18n::t_args(lang, "current-value", &args)
}

fn prompt(lang: &LanguageIdentifier, prompt: &FieldPrompt) -> Vec<Outgoing> {
    let mut messages = current_value(lang, prompt.kind, prompt.current.as_ref());

    let mut args = FluentArgs::new();
    args.set("step", prompt.position + 1);
    args.set("total", prompt.total);
    let text = format!(
        "{}\n{}",
        i18n::t_args(lang, "field-step", &args),
        i18n::t(lang, prompt.prompt)
    );
    messages.push(Outgoing::with_keyboard(text, field_keyboard(lang, prompt.kind)));
    messages
}

fn order_rejected(lang: &LanguageIdentifier, err: &OrderError) -> String {
    let mut args = FluentArgs::new();
    match err {
        OrderError::NotANumber(token) => args.set("value", token.clone()),
        OrderError::OutOfRange(number) | OrderError::Repeated(number) => args.set("number", *number),
        OrderError::WrongCount { expected, got } => {
            args.set("expected", *expected);
            args.set("got", *got);
        }
    }
    i18n::t_args(lang, &err.message_key(), &args)
}

fn saved_key(target: TargetKind) -> &'static str {
    match target {
        TargetKind::Excursion => "saved-excursion",
        TargetKind::Point => "saved-point",
        TargetKind::InformationPart => "saved-information-part",
    }
}

fn navigation(lang: &LanguageIdentifier, hints: &NavigationHints) -> InlineKeyboardMarkup {
    let rows = [("btn-back-to-edited", hints.back), ("btn-back-previous", hints.previous)]
        .into_iter()
        .filter_map(|(key, menu)| menu.map(|menu| vec![button(i18n::t(lang, key), CallbackData::from(menu))]))
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(rows)
}

fn to_list(lang: &LanguageIdentifier) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![button(i18n::t(lang, "btn-to-list"), CallbackData::Excursions)]])
}

/// Messages for one editor reply, in sending order.
pub fn render(lang: &LanguageIdentifier, reply: &Reply) -> Vec<Outgoing> {
    match reply {
        Reply::Prompt(field) => prompt(lang, field),
        Reply::Rejected(rejection) => vec![Outgoing::text(i18n::t(lang, &rejection.message_key()))],
        Reply::FileStored { media, uploaded } => {
            let mut args = FluentArgs::new();
            args.set("count", *uploaded);
            let key = match media {
                MediaKind::Photo => "photos-stored",
                MediaKind::Audio => "audio-stored",
            };
            let kind = match media {
                MediaKind::Photo => FieldKind::MultiPhoto,
                MediaKind::Audio => FieldKind::MultiAudio,
            };
            vec![Outgoing::with_keyboard(
                i18n::t_args(lang, key, &args),
                field_keyboard(lang, kind),
            )]
        }
        Reply::UploadFailed => vec![Outgoing::text(i18n::t(lang, "upload-failed"))],
        Reply::Saved { target, name, hints } => {
            let mut args = FluentArgs::new();
            args.set("name", name.clone());
            vec![Outgoing::with_keyboard(
                i18n::t_args(lang, saved_key(*target), &args),
                navigation(lang, hints),
            )]
        }
        Reply::SaveFailed => vec![Outgoing::with_keyboard(i18n::t(lang, "save-failed"), to_list(lang))],
        Reply::TargetMissing => vec![Outgoing::with_keyboard(i18n::t(lang, "target-missing"), to_list(lang))],
        Reply::Discarded => vec![Outgoing::text(i18n::t(lang, "edit-discarded"))],
        Reply::Expired => vec![Outgoing::with_keyboard(i18n::t(lang, "edit-expired"), to_list(lang))],
        Reply::OrderPrompt { points, .. } => {
            let list = points
                .iter()
                .enumerate()
                .map(|(index, (_, name))| format!("{}. {}", index + 1, name))
                .collect::<Vec<_>>()
                .join("\n");
            let skip = button(i18n::t(lang, "btn-cancel"), CallbackData::Field(FieldAction::Skip));
            vec![Outgoing::with_keyboard(
                format!("{}\n\n{}", i18n::t(lang, "order-prompt"), list),
                InlineKeyboardMarkup::new(vec![vec![skip]]),
            )]
        }
        Reply::OrderRejected(err) => vec![Outgoing::text(order_rejected(lang, err))],
        Reply::OrderSaved { excursion_id } => vec![Outgoing::with_keyboard(
            i18n::t(lang, "order-saved"),
            InlineKeyboardMarkup::new(vec![vec![button(
                i18n::t(lang, "btn-back-to-points"),
                CallbackData::Points(*excursion_id),
            )]]),
        )],
    }
}

/// Sends photo previews. Missing files are skipped: the prompt matters more
/// than the preview.
async fn send_photos(bot: &Bot, chat_id: ChatId, gateway: &Arc<dyn FileGateway>, files: &[FileRef]) -> ResponseResult<()> {
    let mut photos = Vec::with_capacity(files.len());
    for file in files {
        match gateway.fetch(file).await {
            Ok(bytes) => photos.push(InputFile::memory(bytes.to_vec()).file_name(file.to_string())),
            Err(e) => log::warn!("Preview of {} unavailable: {}", file, e),
        }
    }

    match photos.len() {
        0 => {}
        1 => {
            if let Some(photo) = photos.pop() {
                bot.send_photo(chat_id, photo).await?;
            }
        }
        _ => {
            let album = photos
                .into_iter()
                .map(|photo| InputMedia::Photo(InputMediaPhoto::new(photo)))
                .collect::<Vec<_>>();
            bot.send_media_group(chat_id, album).await?;
        }
    }
    Ok(())
}

/// Renders and sends every reply in order.
pub async fn send_replies(
    bot: &Bot,
    chat_id: ChatId,
    lang: &LanguageIdentifier,
    gateway: &Arc<dyn FileGateway>,
    replies: &[Reply],
) -> ResponseResult<()> {
    for reply in replies {
        for outgoing in render(lang, reply) {
            match outgoing {
                Outgoing::Text { text, keyboard } => {
                    let request = bot.send_message(chat_id, text);
                    match keyboard {
                        Some(keyboard) => request.reply_markup(keyboard).await?,
                        None => request.await?,
                    };
                }
                Outgoing::Photos(files) => send_photos(bot, chat_id, gateway, &files).await?,
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use teloxide::types::InlineKeyboardButtonKind;
    use tourcore::content::{ExcursionId, PointId};
    use tourcore::editor::{MenuRef, Rejection};

    fn callbacks(keyboard: &InlineKeyboardMarkup) -> Vec<String> {
        keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|b| match &b.kind {
                InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    fn lang() -> LanguageIdentifier {
        i18n::lang_from_code("en")
    }

    fn field(kind: FieldKind, current: Option<FieldValue>) -> Reply {
        Reply::Prompt(FieldPrompt {
            target: TargetKind::Point,
            prompt: "field-photos",
            key: "photos",
            kind,
            current,
            position: 4,
            total: 8,
        })
    }

    #[test]
    fn keyboards_follow_field_kind() {
        assert_eq!(callbacks(&field_keyboard(&lang(), FieldKind::Text)), vec!["fld:skip"]);
        assert_eq!(
            callbacks(&field_keyboard(&lang(), FieldKind::Url)),
            vec!["fld:delete", "fld:skip"]
        );
        assert_eq!(
            callbacks(&field_keyboard(&lang(), FieldKind::Boolean)),
            vec!["fld:bool:yes", "fld:bool:no", "fld:skip"]
        );
        assert_eq!(
            callbacks(&field_keyboard(&lang(), FieldKind::MultiAudio)),
            vec!["fld:files:replace", "fld:files:append", "fld:files:clear", "fld:skip"]
        );
    }

    #[test]
    fn photo_prompt_previews_stored_photos_first() {
        let photos = FieldValue::Files(vec![FileRef::new("photos/a.jpg"), FileRef::new("photos/b.jpg")]);
        let messages = render(&lang(), &field(FieldKind::MultiPhoto, Some(photos)));

        assert_eq!(messages.len(), 3);
        assert_eq!(
            messages[1],
            Outgoing::Photos(vec![FileRef::new("photos/a.jpg"), FileRef::new("photos/b.jpg")])
        );
        match &messages[2] {
            Outgoing::Text { text, keyboard } => {
                assert!(text.contains("5/8"));
                assert!(keyboard.is_some());
            }
            other => panic!("expected prompt text, got {:?}", other),
        }
    }

    #[test]
    fn empty_location_photo_sends_no_preview() {
        let messages = render(&lang(), &field(FieldKind::SinglePhoto, Some(FieldValue::Empty)));
        assert!(messages.iter().all(|m| matches!(m, Outgoing::Text { .. })));
    }

    #[test]
    fn saved_offers_navigation_hints() {
        let reply = Reply::Saved {
            target: TargetKind::Point,
            name: "Gate".into(),
            hints: NavigationHints {
                back: Some(MenuRef::Point(ExcursionId(1), PointId(2))),
                previous: Some(MenuRef::Points(ExcursionId(1))),
            },
        };
        let messages = render(&lang(), &reply);
        match &messages[0] {
            Outgoing::Text {
                text,
                keyboard: Some(keyboard),
            } => {
                assert!(text.contains("Gate"));
                assert_eq!(callbacks(keyboard), vec!["pt:open:1:2", "pt:list:1"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn order_errors_are_explained() {
        let text = order_rejected(&lang(), &OrderError::WrongCount { expected: 3, got: 2 });
        assert!(text.contains('3') && text.contains('2'));
    }

    #[test]
    fn rejections_use_their_own_text() {
        let messages = render(&lang(), &Reply::Rejected(Rejection::InvalidUrl));
        assert_ne!(messages[0], Outgoing::text("rejected-invalid-url".to_string()));
    }
}
