//! Inline button handlers: menus, admin operations and editor choices

use teloxide::prelude::*;
use teloxide::types::MessageId;
use unic_langid::LanguageIdentifier;

use tourcore::content::{CommitError, ExcursionId, PointId};
use tourcore::editor::{EditError, Reply};

use super::types::{user_id, HandlerDeps};
use crate::i18n;
use crate::telegram::callbacks::CallbackData;
use crate::telegram::menus::{self, Screen};
use crate::telegram::render::send_replies;

/// Where the pressed button lives and who pressed it.
struct Origin<'a> {
    bot: &'a Bot,
    deps: &'a HandlerDeps,
    chat_id: ChatId,
    message_id: Option<MessageId>,
    user_id: i64,
    admin: bool,
    lang: LanguageIdentifier,
}

impl Origin<'_> {
    async fn show(&self, screen: Screen) -> ResponseResult<()> {
        menus::show(self.bot, self.chat_id, self.message_id, screen).await
    }

    async fn reply(&self, replies: &[Reply]) -> ResponseResult<()> {
        send_replies(self.bot, self.chat_id, &self.lang, self.deps.controller.gateway(), replies).await
    }

    async fn editor(&self, result: Result<Vec<Reply>, EditError>) -> ResponseResult<()> {
        match result {
            Ok(replies) => self.reply(&replies).await,
            Err(e) => {
                log::error!("Editor action of user {} aborted: {}", self.user_id, e);
                self.bot
                    .send_message(self.chat_id, i18n::t(&self.lang, "internal-error"))
                    .await?;
                Ok(())
            }
        }
    }

    /// Reports a failed admin operation the way a failed commit is reported.
    async fn commit_failed(&self, err: CommitError) -> ResponseResult<()> {
        let reply = match err {
            CommitError::Splice(e) => {
                log::warn!("User {} acted on a missing entity: {}", self.user_id, e);
                Reply::TargetMissing
            }
            e => {
                log::error!("Admin operation of user {} failed: {}", self.user_id, e);
                Reply::SaveFailed
            }
        };
        self.reply(&[reply]).await
    }

    async fn missing(&self) -> ResponseResult<()> {
        self.reply(&[Reply::TargetMissing]).await
    }

    async fn show_list(&self) -> ResponseResult<()> {
        let excursions = self.deps.controller.catalog().snapshot().await;
        self.show(menus::excursion_list(&self.lang, &excursions, self.admin)).await
    }

    async fn show_points(&self, excursion_id: ExcursionId) -> ResponseResult<()> {
        match self.deps.controller.catalog().excursion(excursion_id).await {
            Some(excursion) => self.show(menus::points_menu(&self.lang, &excursion)).await,
            None => self.missing().await,
        }
    }

    async fn show_extras(&self, excursion_id: ExcursionId, point_id: PointId) -> ResponseResult<()> {
        match self.deps.controller.catalog().point(excursion_id, point_id).await {
            Some(point) => self.show(menus::extras_menu(&self.lang, excursion_id, &point)).await,
            None => self.missing().await,
        }
    }
}

pub(super) async fn handle_callback(bot: &Bot, q: &CallbackQuery, deps: &HandlerDeps) -> ResponseResult<()> {
    let lang = i18n::user_lang(Some(&q.from));
    // Buttons without a message (inline mode) answer in the presser's private chat
    let chat_id = q
        .message
        .as_ref()
        .map(|m| m.chat().id)
        .unwrap_or_else(|| ChatId::from(q.from.id));
    let Some(data) = q.data.as_deref().and_then(CallbackData::parse) else {
        log::warn!("Unknown callback data {:?} from user {}", q.data, q.from.id);
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };

    let origin = Origin {
        bot,
        deps,
        chat_id,
        message_id: q.message.as_ref().map(|m| m.id()),
        user_id: user_id(&q.from),
        admin: deps.is_admin(&q.from),
        lang,
    };

    if !data.is_public() && !origin.admin {
        log::warn!("User {} pressed admin button {}", origin.user_id, data);
        bot.answer_callback_query(q.id.clone())
            .text(i18n::t(&origin.lang, "access-denied"))
            .show_alert(true)
            .await?;
        return Ok(());
    }
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        log::warn!("Failed to answer callback query: {}", e);
    }

    let controller = &deps.controller;
    // Leaving the editor through a menu abandons the walk in progress
    if origin.admin && !matches!(data, CallbackData::Field(_)) {
        let replies = controller.discard(origin.user_id).await;
        origin.reply(&replies).await?;
    }

    match data {
        CallbackData::Excursions => origin.show_list().await,
        CallbackData::Excursion(id) => match controller.catalog().excursion(id).await {
            Some(excursion) if menus::is_visible(&excursion, origin.admin) => {
                origin
                    .show(menus::excursion_card(&origin.lang, &excursion, origin.admin))
                    .await
            }
            _ => origin.missing().await,
        },
        CallbackData::AddExcursion => origin.editor(controller.begin_add_excursion(origin.user_id).await).await,
        CallbackData::EditExcursion(id) => {
            origin
                .editor(controller.begin_edit_excursion(origin.user_id, id).await)
                .await
        }
        CallbackData::TogglePublish(id) => match controller.toggle_draft(origin.user_id, id).await {
            Ok(_) => match controller.catalog().excursion(id).await {
                Some(excursion) => origin.show(menus::excursion_card(&origin.lang, &excursion, true)).await,
                None => origin.missing().await,
            },
            Err(e) => origin.commit_failed(e).await,
        },
        CallbackData::DeleteExcursion(id) => match controller.catalog().excursion(id).await {
            Some(excursion) => origin.show(menus::confirm_delete_excursion(&origin.lang, &excursion)).await,
            None => origin.missing().await,
        },
        CallbackData::ConfirmDeleteExcursion(id) => match controller.delete_excursion(origin.user_id, id).await {
            Ok(_) => origin.show_list().await,
            Err(e) => origin.commit_failed(e).await,
        },
        CallbackData::Points(id) => origin.show_points(id).await,
        CallbackData::Point(ex, pt) => match controller.catalog().point(ex, pt).await {
            Some(point) => origin.show(menus::point_menu(&origin.lang, ex, &point)).await,
            None => origin.missing().await,
        },
        CallbackData::AddPoint(ex) => origin.editor(controller.begin_add_point(origin.user_id, ex).await).await,
        CallbackData::EditPoint(ex, pt) => {
            origin
                .editor(controller.begin_edit_point(origin.user_id, ex, pt).await)
                .await
        }
        CallbackData::DeletePoint(ex, pt) => match controller.delete_point(origin.user_id, ex, pt).await {
            Ok(_) => origin.show_points(ex).await,
            Err(e) => origin.commit_failed(e).await,
        },
        CallbackData::ChangeOrder(ex) => {
            let replies = controller.begin_reorder(origin.user_id, ex).await;
            origin.reply(&replies).await
        }
        CallbackData::Extras(ex, pt) => origin.show_extras(ex, pt).await,
        CallbackData::AddExtra(ex, pt) => {
            origin
                .editor(controller.begin_add_part(origin.user_id, ex, pt).await)
                .await
        }
        CallbackData::EditExtra(ex, pt, part) => {
            origin
                .editor(controller.begin_edit_part(origin.user_id, ex, pt, part).await)
                .await
        }
        CallbackData::DeleteExtra(ex, pt, part) => match controller.delete_part(origin.user_id, ex, pt, part).await {
            Ok(_) => origin.show_extras(ex, pt).await,
            Err(e) => origin.commit_failed(e).await,
        },
        CallbackData::Field(action) => {
            origin
                .editor(controller.handle(origin.user_id, action.into_event()).await)
                .await
        }
    }
}
