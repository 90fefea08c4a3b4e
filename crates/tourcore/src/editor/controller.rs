//! The workflow controller: routes each admin event to that admin's
//! conversation state and drives the editing session one step at a time.

use std::sync::Arc;
use std::time::Duration;

use super::files::{resolve, FileBatch};
use super::input::{interpret, EditorEvent, Interpretation, Rejection};
use super::reorder::{apply_order, parse_order};
use super::reply::{FieldPrompt, Reply};
use super::session::{EditError, EditSession, FinishedSession, MenuRef, NavigationHints, ParentContext};
use super::state::{ConversationState, StateRegistry, StateSlot};
use crate::content::catalog::{splice_part, splice_point};
use crate::content::{
    Accumulator, Catalog, CommitError, EditOrigin, EditTarget, Editable, Excursion, ExcursionId, FieldKind,
    FieldValue, FileRef, InformationPart, MediaKind, PartId, Point, PointId, SpliceError,
};
use crate::core::config;
use crate::storage::{ExcursionStore, FileGateway, IncomingFile, MediaSource};

/// Shared by every handler; one instance per bot process.
pub struct EditorController {
    pub(super) catalog: Arc<Catalog>,
    pub(super) store: Arc<dyn ExcursionStore>,
    pub(super) gateway: Arc<dyn FileGateway>,
    media: Arc<dyn MediaSource>,
    pub(super) states: StateRegistry,
    idle_timeout: Option<Duration>,
}

impl EditorController {
    pub fn new(
        catalog: Arc<Catalog>,
        store: Arc<dyn ExcursionStore>,
        gateway: Arc<dyn FileGateway>,
        media: Arc<dyn MediaSource>,
    ) -> Self {
        Self {
            catalog,
            store,
            gateway,
            media,
            states: StateRegistry::new(),
            idle_timeout: config::editor::idle_timeout(),
        }
    }

    /// Overrides `EDITOR_IDLE_TIMEOUT_SECS`; `None` keeps sessions forever.
    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn gateway(&self) -> &Arc<dyn FileGateway> {
        &self.gateway
    }

    /// Whether the user is editing or reordering right now.
    pub async fn is_active(&self, user_id: i64) -> bool {
        match self.states.existing(user_id) {
            Some(slot) => !slot.lock().await.is_idle(),
            None => false,
        }
    }

    pub async fn begin_add_excursion(&self, user_id: i64) -> Result<Vec<Reply>, EditError> {
        let excursion = Excursion::new(self.catalog.ids().next_excursion());
        let hints = NavigationHints {
            back: Some(MenuRef::Excursion(excursion.id)),
            previous: Some(MenuRef::Excursions),
        };
        self.begin(
            user_id,
            EditTarget::Excursion(excursion),
            EditOrigin::Create,
            ParentContext::default(),
            hints,
        )
        .await
    }

    pub async fn begin_edit_excursion(&self, user_id: i64, excursion_id: ExcursionId) -> Result<Vec<Reply>, EditError> {
        let Some(excursion) = self.catalog.excursion(excursion_id).await else {
            return Ok(vec![Reply::TargetMissing]);
        };
        let hints = NavigationHints {
            back: Some(MenuRef::Excursion(excursion_id)),
            previous: Some(MenuRef::Excursions),
        };
        self.begin(
            user_id,
            EditTarget::Excursion(excursion),
            EditOrigin::Update,
            ParentContext::default(),
            hints,
        )
        .await
    }

    pub async fn begin_add_point(&self, user_id: i64, excursion_id: ExcursionId) -> Result<Vec<Reply>, EditError> {
        if self.catalog.excursion(excursion_id).await.is_none() {
            return Ok(vec![Reply::TargetMissing]);
        }
        let point = Point::new(self.catalog.ids().next_point(), excursion_id);
        let hints = point_hints(excursion_id, point.id);
        self.begin(
            user_id,
            EditTarget::Point(point),
            EditOrigin::Create,
            ParentContext {
                excursion_id: Some(excursion_id),
                point_id: None,
            },
            hints,
        )
        .await
    }

    pub async fn begin_edit_point(
        &self,
        user_id: i64,
        excursion_id: ExcursionId,
        point_id: PointId,
    ) -> Result<Vec<Reply>, EditError> {
        let Some(point) = self.catalog.point(excursion_id, point_id).await else {
            return Ok(vec![Reply::TargetMissing]);
        };
        self.begin(
            user_id,
            EditTarget::Point(point),
            EditOrigin::Update,
            ParentContext {
                excursion_id: Some(excursion_id),
                point_id: None,
            },
            point_hints(excursion_id, point_id),
        )
        .await
    }

    pub async fn begin_add_part(
        &self,
        user_id: i64,
        excursion_id: ExcursionId,
        point_id: PointId,
    ) -> Result<Vec<Reply>, EditError> {
        if self.catalog.point(excursion_id, point_id).await.is_none() {
            return Ok(vec![Reply::TargetMissing]);
        }
        let part = InformationPart::new(self.catalog.ids().next_part(), point_id);
        self.begin(
            user_id,
            EditTarget::Part(part),
            EditOrigin::Create,
            part_parent(excursion_id, point_id),
            part_hints(excursion_id, point_id),
        )
        .await
    }

    pub async fn begin_edit_part(
        &self,
        user_id: i64,
        excursion_id: ExcursionId,
        point_id: PointId,
        part_id: PartId,
    ) -> Result<Vec<Reply>, EditError> {
        let Some(part) = self.catalog.part(excursion_id, point_id, part_id).await else {
            return Ok(vec![Reply::TargetMissing]);
        };
        self.begin(
            user_id,
            EditTarget::Part(part),
            EditOrigin::Update,
            part_parent(excursion_id, point_id),
            part_hints(excursion_id, point_id),
        )
        .await
    }

    async fn begin(
        &self,
        user_id: i64,
        target: EditTarget,
        origin: EditOrigin,
        parent: ParentContext,
        hints: NavigationHints,
    ) -> Result<Vec<Reply>, EditError> {
        let slot = self.states.slot(user_id);
        let mut state = slot.lock().await;
        self.release(user_id, std::mem::take(&mut *state), "a new edit started").await;

        let mut session = EditSession::begin(target, origin, parent, hints);
        session.advance()?;
        let prompt = field_prompt(&session)?;
        log::info!(
            "User {} started editing {} {} ({:?})",
            user_id,
            session.target().kind(),
            session.target().id(),
            origin
        );
        *state = ConversationState::Editing(Box::new(session));
        Ok(vec![Reply::Prompt(prompt)])
    }

    /// Leaves whatever flow the user is in without saving anything.
    pub async fn discard(&self, user_id: i64) -> Vec<Reply> {
        let Some(slot) = self.states.existing(user_id) else {
            return Vec::new();
        };
        let released = {
            let mut state = slot.lock().await;
            self.release(user_id, std::mem::take(&mut *state), "the user left").await
        };
        drop(slot);
        self.states.prune(user_id);

        if released {
            vec![Reply::Discarded]
        } else {
            Vec::new()
        }
    }

    /// Feeds one inbound event to the user's active flow. Users without one get
    /// no replies. An `EditError` aborts the event and keeps the session.
    pub async fn handle(&self, user_id: i64, event: EditorEvent) -> Result<Vec<Reply>, EditError> {
        let Some(slot) = self.states.existing(user_id) else {
            return Ok(Vec::new());
        };
        let result = self.handle_in(user_id, &slot, event).await;
        drop(slot);
        self.states.prune(user_id);
        result
    }

    async fn handle_in(
        &self,
        user_id: i64,
        slot: &StateSlot,
        event: EditorEvent,
    ) -> Result<Vec<Reply>, EditError> {
        let mut state = slot.lock().await;

        match &mut *state {
            ConversationState::Idle => Ok(Vec::new()),

            ConversationState::ChangingOrder { excursion_id, shown } => {
                let (excursion_id, shown) = (*excursion_id, shown.clone());
                let (replies, done) = self.step_order(user_id, excursion_id, &shown, event).await;
                if done {
                    *state = ConversationState::Idle;
                }
                Ok(replies)
            }

            ConversationState::Editing(session) => {
                if self.idle_timeout.is_some_and(|timeout| session.is_idle_for(timeout)) {
                    self.release(user_id, std::mem::take(&mut *state), "it expired").await;
                    return Ok(vec![Reply::Expired]);
                }
                session.touch();

                let replies = self.step(user_id, session, event).await.inspect_err(|err| {
                    log::error!("Editor invariant broken for user {}: {}", user_id, err);
                })?;
                if !session.is_finished() {
                    return Ok(replies);
                }

                match std::mem::take(&mut *state) {
                    ConversationState::Editing(session) => match (*session).into_finished() {
                        Ok(finished) => Ok(self.commit(user_id, finished).await),
                        Err(session) => {
                            let err = session.unfinished_error();
                            *state = ConversationState::Editing(Box::new(session));
                            Err(err)
                        }
                    },
                    other => {
                        *state = other;
                        Ok(replies)
                    }
                }
            }
        }
    }

    /// One step of the field walk. Returns no replies once the walk is finished;
    /// the caller commits then.
    async fn step(&self, user_id: i64, session: &mut EditSession, event: EditorEvent) -> Result<Vec<Reply>, EditError> {
        let descriptor = session.current_descriptor()?;

        match interpret(descriptor.kind, event) {
            Interpretation::Reject(rejection) => {
                log::debug!("User {} sent unusable input for `{}`: {}", user_id, descriptor.key, rejection);
                return if session.is_collecting_files() {
                    Ok(vec![Reply::Rejected(rejection)])
                } else {
                    Ok(vec![Reply::Rejected(rejection), Reply::Prompt(field_prompt(session)?)])
                };
            }

            Interpretation::Collect(media, file) => {
                // The batch opens with the first stored file, so a failed first
                // upload leaves the field in its prompting phase.
                let Some(reference) = self.upload(user_id, media, &file).await else {
                    return Ok(vec![Reply::UploadFailed, Reply::Prompt(field_prompt(session)?)]);
                };
                session.uploads_mut().stage(reference.clone());
                let uploaded = session.file_batch()?.push(reference);
                return Ok(vec![Reply::FileStored { media, uploaded }]);
            }

            Interpretation::UploadSingle(media, file) => {
                let Some(reference) = self.upload(user_id, media, &file).await else {
                    return Ok(vec![Reply::UploadFailed, Reply::Prompt(field_prompt(session)?)]);
                };
                session.uploads_mut().stage(reference.clone());
                supersede_current(session)?;
                session.record_result(FieldValue::File(reference))?;
            }

            Interpretation::Resolve(resolution) => {
                let buffer = session.take_file_batch().map(FileBatch::into_buffer).unwrap_or_default();
                let existing = session.current_value()?.map(|value| value.files().to_vec()).unwrap_or_default();
                let resolved = resolve(resolution, &existing, buffer);
                session.uploads_mut().supersede(resolved.superseded);
                self.delete_uploads_now(user_id, session, resolved.dropped).await;
                session.record_result(FieldValue::Files(resolved.value))?;
            }

            Interpretation::Skip => {
                if let Some(batch) = session.take_file_batch() {
                    self.delete_uploads_now(user_id, session, batch.into_buffer()).await;
                }
            }

            Interpretation::Record(value) => {
                if descriptor.kind == FieldKind::SinglePhoto && value == FieldValue::Empty {
                    supersede_current(session)?;
                }
                session.record_result(value)?;
            }
        }

        session.advance()?;
        if session.is_finished() {
            Ok(Vec::new())
        } else {
            Ok(vec![Reply::Prompt(field_prompt(session)?)])
        }
    }

    async fn commit(&self, user_id: i64, finished: FinishedSession) -> Vec<Reply> {
        let FinishedSession {
            target,
            accumulator,
            origin,
            parent,
            hints,
            uploads,
        } = finished;
        let (kind, id) = (target.kind(), target.id());

        match self.splice_back(target, &accumulator, origin, parent).await {
            Ok(committed) => {
                log::info!("User {} saved {} {} ({:?})", user_id, kind, id, origin);
                let kept = committed.media_refs();
                self.delete_files(user_id, uploads.into_commit_deletions(&kept)).await;
                vec![Reply::Saved {
                    target: kind,
                    name: committed.name().to_string(),
                    hints,
                }]
            }
            Err(err) => {
                let reply = match &err {
                    CommitError::Splice(splice) => {
                        log::warn!("User {} edited {} {} but it is gone: {}", user_id, kind, id, splice);
                        Reply::TargetMissing
                    }
                    CommitError::Persist(_) | CommitError::Apply(_) => {
                        log::error!("Failed to save {} {} for user {}: {}", kind, id, user_id, err);
                        Reply::SaveFailed
                    }
                };
                self.delete_files(user_id, uploads.into_discard_deletions()).await;
                vec![reply]
            }
        }
    }

    /// Applies the collected values and puts the entity back into the live tree.
    /// Updates are applied to the live entity, so edits made to other fields in
    /// the meantime survive.
    async fn splice_back(
        &self,
        target: EditTarget,
        accumulator: &Accumulator,
        origin: EditOrigin,
        parent: ParentContext,
    ) -> Result<EditTarget, CommitError> {
        let persist = |excursion: &Excursion| self.store.save(excursion);

        match target {
            EditTarget::Excursion(mut excursion) => match origin {
                EditOrigin::Create => {
                    excursion.apply_accumulator(accumulator)?;
                    self.catalog.insert_excursion(excursion.clone(), persist).await?;
                    Ok(EditTarget::Excursion(excursion))
                }
                EditOrigin::Update => {
                    let committed = self
                        .catalog
                        .modify_excursion(
                            excursion.id,
                            |live| {
                                live.apply_accumulator(accumulator)?;
                                Ok(live.clone())
                            },
                            persist,
                        )
                        .await?;
                    Ok(EditTarget::Excursion(committed))
                }
            },

            EditTarget::Point(point) => {
                let excursion_id = parent.excursion_id.unwrap_or(point.excursion_id);
                let point_id = point.id;
                let committed = self
                    .catalog
                    .modify_excursion(
                        excursion_id,
                        |excursion| {
                            let mut edited = match origin {
                                EditOrigin::Create => point,
                                EditOrigin::Update => {
                                    excursion
                                        .point(point_id)
                                        .cloned()
                                        .ok_or(SpliceError::PointNotFound {
                                            excursion: excursion_id,
                                            point: point_id,
                                        })?
                                }
                            };
                            edited.apply_accumulator(accumulator)?;
                            splice_point(excursion, edited.clone(), origin)?;
                            Ok(edited)
                        },
                        persist,
                    )
                    .await?;
                Ok(EditTarget::Point(committed))
            }

            EditTarget::Part(part) => {
                let point_id = parent.point_id.unwrap_or(part.point_id);
                let part_id = part.id;
                let excursion_id = parent.excursion_id.ok_or(SpliceError::PartNotFound {
                    point: point_id,
                    part: part_id,
                })?;
                let committed = self
                    .catalog
                    .modify_excursion(
                        excursion_id,
                        |excursion| {
                            let point = excursion.point_mut(point_id).ok_or(SpliceError::PointNotFound {
                                excursion: excursion_id,
                                point: point_id,
                            })?;
                            let mut edited = match origin {
                                EditOrigin::Create => part,
                                EditOrigin::Update => point.part(part_id).cloned().ok_or(SpliceError::PartNotFound {
                                    point: point_id,
                                    part: part_id,
                                })?,
                            };
                            edited.apply_accumulator(accumulator)?;
                            splice_part(point, edited.clone(), origin)?;
                            Ok(edited)
                        },
                        persist,
                    )
                    .await?;
                Ok(EditTarget::Part(committed))
            }
        }
    }

    async fn step_order(
        &self,
        user_id: i64,
        excursion_id: ExcursionId,
        shown: &[PointId],
        event: EditorEvent,
    ) -> (Vec<Reply>, bool) {
        let text = match event {
            EditorEvent::Text(text) => text,
            EditorEvent::Skip => return (vec![Reply::Discarded], true),
            _ => return (vec![Reply::Rejected(Rejection::ExpectedText)], false),
        };

        let order = match parse_order(&text, shown) {
            Ok(order) => order,
            Err(err) => {
                log::debug!("User {} sent an unusable point order: {}", user_id, err);
                return (vec![Reply::OrderRejected(err)], false);
            }
        };

        let result = self
            .catalog
            .modify_excursion(
                excursion_id,
                |excursion| apply_order(excursion, &order).map_err(CommitError::from),
                |excursion: &Excursion| self.store.save(excursion),
            )
            .await;

        match result {
            Ok(()) => {
                log::info!("User {} reordered points of excursion {}", user_id, excursion_id);
                (vec![Reply::OrderSaved { excursion_id }], true)
            }
            Err(CommitError::Splice(err)) => {
                log::warn!("User {} reordered a changed excursion {}: {}", user_id, excursion_id, err);
                (vec![Reply::TargetMissing], true)
            }
            Err(err) => {
                log::error!("Failed to save point order of excursion {}: {}", excursion_id, err);
                (vec![Reply::SaveFailed], true)
            }
        }
    }

    /// Ends the given state, deleting uploads an unfinished session staged.
    /// Returns whether anything was active.
    pub(super) async fn release(&self, user_id: i64, state: ConversationState, reason: &str) -> bool {
        match state {
            ConversationState::Idle => false,
            ConversationState::ChangingOrder { excursion_id, .. } => {
                log::info!("User {} stopped reordering excursion {}: {}", user_id, excursion_id, reason);
                true
            }
            ConversationState::Editing(session) => {
                log::info!(
                    "Discarding edit of {} {} for user {}: {}",
                    session.target().kind(),
                    session.target().id(),
                    user_id,
                    reason
                );
                self.delete_files(user_id, (*session).discard().into_discard_deletions()).await;
                true
            }
        }
    }

    async fn upload(&self, user_id: i64, media: MediaKind, file: &IncomingFile) -> Option<FileRef> {
        let result = async {
            let bytes = self.media.download(file).await?;
            self.gateway
                .upload(bytes, &file.suggested_name(media), media.directory())
                .await
        }
        .await;

        match result {
            Ok(reference) => {
                log::info!("Stored {} for user {} as {}", media, user_id, reference);
                Some(reference)
            }
            Err(e) => {
                log::error!("Failed to store {} for user {}: {}", media, user_id, e);
                None
            }
        }
    }

    /// Deletes uploads of this session that can never be referenced, and stops
    /// tracking the ones that are gone.
    async fn delete_uploads_now(&self, user_id: i64, session: &mut EditSession, files: Vec<FileRef>) {
        let deleted = self.delete_files(user_id, files).await;
        session.uploads_mut().release(&deleted);
    }

    /// Best-effort deletion; returns the references actually deleted.
    pub(super) async fn delete_files(&self, user_id: i64, files: Vec<FileRef>) -> Vec<FileRef> {
        let mut deleted = Vec::with_capacity(files.len());
        for file in files {
            match self.gateway.delete(&file).await {
                Ok(()) => deleted.push(file),
                Err(e) => log::warn!("Failed to delete {} for user {}: {}", file, user_id, e),
            }
        }
        if !deleted.is_empty() {
            log::debug!("Deleted {} stored file(s) for user {}", deleted.len(), user_id);
        }
        deleted
    }
}

fn field_prompt(session: &EditSession) -> Result<FieldPrompt, EditError> {
    let descriptor = session.current_descriptor()?;
    Ok(FieldPrompt {
        target: session.target().kind(),
        prompt: descriptor.prompt,
        key: descriptor.key,
        kind: descriptor.kind,
        current: session.current_value()?,
        position: session.position().unwrap_or(0),
        total: session.total_fields(),
    })
}

/// Marks the stored value of the current field for deletion on commit.
fn supersede_current(session: &mut EditSession) -> Result<(), EditError> {
    if let Some(current) = session.current_value()? {
        session.uploads_mut().supersede(current.files().to_vec());
    }
    Ok(())
}

fn point_hints(excursion_id: ExcursionId, point_id: PointId) -> NavigationHints {
    NavigationHints {
        back: Some(MenuRef::Point(excursion_id, point_id)),
        previous: Some(MenuRef::Points(excursion_id)),
    }
}

fn part_parent(excursion_id: ExcursionId, point_id: PointId) -> ParentContext {
    ParentContext {
        excursion_id: Some(excursion_id),
        point_id: Some(point_id),
    }
}

fn part_hints(excursion_id: ExcursionId, point_id: PointId) -> NavigationHints {
    NavigationHints {
        back: Some(MenuRef::Extras(excursion_id, point_id)),
        previous: Some(MenuRef::Point(excursion_id, point_id)),
    }
}
