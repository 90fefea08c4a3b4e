//! Browsing and admin menus over the excursion tree.

use fluent_templates::fluent_bundle::FluentArgs;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, MessageId};
use unic_langid::LanguageIdentifier;

use tourcore::content::{Excursion, ExcursionId, Point};

use super::callbacks::CallbackData;
use crate::i18n;

/// Text plus buttons of one menu message.
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub text: String,
    pub keyboard: InlineKeyboardMarkup,
}

pub(crate) fn button(label: impl Into<String>, data: CallbackData) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label.into(), data.to_string())
}

/// Drafts are shown to admins only.
pub fn is_visible(excursion: &Excursion, admin: bool) -> bool {
    admin || !excursion.is_draft
}

fn yes_no(lang: &LanguageIdentifier, flag: bool) -> String {
    i18n::t(lang, if flag { "yes" } else { "no" })
}

pub fn excursion_list(lang: &LanguageIdentifier, excursions: &[Excursion], admin: bool) -> Screen {
    let draft_marker = i18n::t(lang, "draft-marker");
    let mut rows: Vec<Vec<InlineKeyboardButton>> = excursions
        .iter()
        .filter(|excursion| is_visible(excursion, admin))
        .map(|excursion| {
            let label = if excursion.is_draft {
                format!("{} {}", draft_marker, excursion.name)
            } else {
                excursion.name.clone()
            };
            vec![button(label, CallbackData::Excursion(excursion.id))]
        })
        .collect();

    let text = if rows.is_empty() {
        i18n::t(lang, "excursions-empty")
    } else {
        i18n::t(lang, "excursions-title")
    };
    if admin {
        rows.push(vec![button(i18n::t(lang, "btn-add-excursion"), CallbackData::AddExcursion)]);
    }

    Screen {
        text,
        keyboard: InlineKeyboardMarkup::new(rows),
    }
}

pub fn excursion_card(lang: &LanguageIdentifier, excursion: &Excursion, admin: bool) -> Screen {
    let mut args = FluentArgs::new();
    args.set("name", excursion.name.clone());
    args.set("paid", yes_no(lang, excursion.is_paid));
    args.set("duration", excursion.duration_minutes);
    args.set("points", excursion.points.len());
    let mut text = i18n::t_args(lang, "excursion-card", &args);

    let id = excursion.id;
    let mut rows = Vec::new();
    if admin {
        let mut stats = FluentArgs::new();
        stats.set("views", excursion.stats.views);
        stats.set("likes", excursion.stats.likes);
        stats.set("dislikes", excursion.stats.dislikes);
        text.push_str("\n\n");
        text.push_str(&i18n::t_args(lang, "excursion-stats", &stats));
        if excursion.is_draft {
            text.push('\n');
            text.push_str(&i18n::t(lang, "excursion-is-draft"));
        }

        let publish_label = if excursion.is_draft { "btn-publish" } else { "btn-hide" };
        rows.push(vec![button(i18n::t(lang, "btn-edit-excursion"), CallbackData::EditExcursion(id))]);
        rows.push(vec![
            button(i18n::t(lang, "btn-edit-points"), CallbackData::Points(id)),
            button(i18n::t(lang, "btn-change-order"), CallbackData::ChangeOrder(id)),
        ]);
        rows.push(vec![
            button(i18n::t(lang, publish_label), CallbackData::TogglePublish(id)),
            button(i18n::t(lang, "btn-delete"), CallbackData::DeleteExcursion(id)),
        ]);
    }
    rows.push(vec![button(i18n::t(lang, "btn-to-list"), CallbackData::Excursions)]);

    Screen {
        text,
        keyboard: InlineKeyboardMarkup::new(rows),
    }
}

pub fn confirm_delete_excursion(lang: &LanguageIdentifier, excursion: &Excursion) -> Screen {
    let mut args = FluentArgs::new();
    args.set("name", excursion.name.clone());
    args.set("points", excursion.points.len());
    Screen {
        text: i18n::t_args(lang, "delete-excursion-confirm", &args),
        keyboard: InlineKeyboardMarkup::new(vec![vec![
            button(
                i18n::t(lang, "btn-confirm-delete"),
                CallbackData::ConfirmDeleteExcursion(excursion.id),
            ),
            button(i18n::t(lang, "btn-back"), CallbackData::Excursion(excursion.id)),
        ]]),
    }
}

pub fn points_menu(lang: &LanguageIdentifier, excursion: &Excursion) -> Screen {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = excursion
        .points
        .iter()
        .enumerate()
        .map(|(index, point)| {
            vec![button(
                format!("{}. {}", index + 1, point.name()),
                CallbackData::Point(excursion.id, point.id),
            )]
        })
        .collect();
    rows.push(vec![button(i18n::t(lang, "btn-add-point"), CallbackData::AddPoint(excursion.id))]);
    rows.push(vec![button(i18n::t(lang, "btn-back"), CallbackData::Excursion(excursion.id))]);

    let mut args = FluentArgs::new();
    args.set("name", excursion.name.clone());
    args.set("count", excursion.points.len());
    Screen {
        text: i18n::t_args(lang, "points-title", &args),
        keyboard: InlineKeyboardMarkup::new(rows),
    }
}

pub fn point_menu(lang: &LanguageIdentifier, excursion_id: ExcursionId, point: &Point) -> Screen {
    let mut args = FluentArgs::new();
    args.set("name", point.name().to_string());
    args.set("address", point.address.clone());
    args.set("audio", point.content.audio.len());
    args.set("photos", point.content.photos.len());
    args.set("extras", point.extra_parts.len());

    let rows = vec![
        vec![button(
            i18n::t(lang, "btn-edit-point"),
            CallbackData::EditPoint(excursion_id, point.id),
        )],
        vec![
            button(i18n::t(lang, "btn-extras"), CallbackData::Extras(excursion_id, point.id)),
            button(i18n::t(lang, "btn-add-extra"), CallbackData::AddExtra(excursion_id, point.id)),
        ],
        vec![button(
            i18n::t(lang, "btn-delete-point"),
            CallbackData::DeletePoint(excursion_id, point.id),
        )],
        vec![button(i18n::t(lang, "btn-back"), CallbackData::Points(excursion_id))],
    ];

    Screen {
        text: i18n::t_args(lang, "point-card", &args),
        keyboard: InlineKeyboardMarkup::new(rows),
    }
}

pub fn extras_menu(lang: &LanguageIdentifier, excursion_id: ExcursionId, point: &Point) -> Screen {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = point
        .extra_parts
        .iter()
        .map(|part| {
            vec![
                button(part.name(), CallbackData::EditExtra(excursion_id, point.id, part.id)),
                button("🗑", CallbackData::DeleteExtra(excursion_id, point.id, part.id)),
            ]
        })
        .collect();
    rows.push(vec![button(
        i18n::t(lang, "btn-add-extra"),
        CallbackData::AddExtra(excursion_id, point.id),
    )]);
    rows.push(vec![button(i18n::t(lang, "btn-back"), CallbackData::Point(excursion_id, point.id))]);

    let mut args = FluentArgs::new();
    args.set("name", point.name().to_string());
    let key = if point.extra_parts.is_empty() { "extras-empty" } else { "extras-title" };
    Screen {
        text: i18n::t_args(lang, key, &args),
        keyboard: InlineKeyboardMarkup::new(rows),
    }
}

/// Shows a screen in place of the message the button belonged to, or as a new
/// message when there is none or it can no longer be edited.
pub async fn show(bot: &Bot, chat_id: ChatId, message_id: Option<MessageId>, screen: Screen) -> ResponseResult<()> {
    if let Some(message_id) = message_id {
        match bot
            .edit_message_text(chat_id, message_id, screen.text.clone())
            .reply_markup(screen.keyboard.clone())
            .await
        {
            Ok(_) => return Ok(()),
            Err(e) => log::debug!("Menu message {} not editable, sending new: {}", message_id.0, e),
        }
    }
    bot.send_message(chat_id, screen.text)
        .reply_markup(screen.keyboard)
        .await?;
    Ok(())
}
