//! One user's walk over an entity's fields.

use std::time::{Duration, Instant};

use thiserror::Error;

use super::files::{FileBatch, UploadLedger};
use crate::content::{
    Accumulator, ApplyError, EditOrigin, EditTarget, Editable, ExcursionId, FieldDescriptor, FieldValue, PointId,
};

/// Invariant violations of the session. Unreachable through well-formed event
/// sequences; the controller aborts the current event when one surfaces.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("editing session has not started its field walk")]
    NotStarted,

    #[error("editing session already visited all {0} fields")]
    AlreadyFinished(usize),

    #[error("editing session is not finished: at field {position} of {total}")]
    NotFinished { position: usize, total: usize },

    #[error("field `{0}` does not collect files")]
    NotAFileField(&'static str),

    #[error(transparent)]
    Apply(#[from] ApplyError),
}

/// Where a nested entity is spliced back on commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParentContext {
    pub excursion_id: Option<ExcursionId>,
    pub point_id: Option<PointId>,
}

/// A menu the completion message can link back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuRef {
    Excursions,
    Excursion(ExcursionId),
    Points(ExcursionId),
    Point(ExcursionId, PointId),
    Extras(ExcursionId, PointId),
}

/// Return affordances carried through to the completion message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationHints {
    pub back: Option<MenuRef>,
    pub previous: Option<MenuRef>,
}

/// Field-local state of the current descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldPhase {
    #[default]
    Prompting,
    CollectingFiles(FileBatch),
}

#[derive(Debug)]
pub struct EditSession {
    target: EditTarget,
    descriptors: &'static [FieldDescriptor],
    /// `None` until the walk starts; `Some(len)` once every field was visited.
    cursor: Option<usize>,
    accumulator: Accumulator,
    phase: FieldPhase,
    origin: EditOrigin,
    parent: ParentContext,
    hints: NavigationHints,
    uploads: UploadLedger,
    touched_at: Instant,
}

/// A session whose walk is complete, ready to be applied exactly once.
#[derive(Debug)]
pub struct FinishedSession {
    pub target: EditTarget,
    pub accumulator: Accumulator,
    pub origin: EditOrigin,
    pub parent: ParentContext,
    pub hints: NavigationHints,
    pub uploads: UploadLedger,
}

impl EditSession {
    /// Snapshots the target's descriptors; the walk starts on the first `advance`.
    pub fn begin(target: EditTarget, origin: EditOrigin, parent: ParentContext, hints: NavigationHints) -> Self {
        let descriptors = target.field_descriptors();
        Self {
            target,
            descriptors,
            cursor: None,
            accumulator: Accumulator::new(),
            phase: FieldPhase::Prompting,
            origin,
            parent,
            hints,
            uploads: UploadLedger::default(),
            touched_at: Instant::now(),
        }
    }

    pub fn advance(&mut self) -> Result<(), EditError> {
        let next = match self.cursor {
            None => 0,
            Some(cursor) if cursor < self.descriptors.len() => cursor + 1,
            Some(_) => return Err(EditError::AlreadyFinished(self.descriptors.len())),
        };
        self.cursor = Some(next);
        self.phase = FieldPhase::Prompting;
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.cursor.is_some_and(|cursor| cursor >= self.descriptors.len())
    }

    /// Zero-based index of the current field.
    pub fn position(&self) -> Option<usize> {
        self.cursor
    }

    pub fn total_fields(&self) -> usize {
        self.descriptors.len()
    }

    pub fn current_descriptor(&self) -> Result<&'static FieldDescriptor, EditError> {
        let descriptors = self.descriptors;
        match self.cursor {
            None => Err(EditError::NotStarted),
            Some(cursor) => descriptors
                .get(cursor)
                .ok_or(EditError::AlreadyFinished(descriptors.len())),
        }
    }

    /// Pre-edit value of the current field, as stored on the target.
    pub fn current_value(&self) -> Result<Option<FieldValue>, EditError> {
        let descriptor = self.current_descriptor()?;
        Ok(self.target.current_value(descriptor.key))
    }

    /// Stores the collected value for the current field; last write wins.
    pub fn record_result(&mut self, value: FieldValue) -> Result<(), EditError> {
        let descriptor = self.current_descriptor()?;
        self.accumulator.insert(descriptor.key, value);
        Ok(())
    }

    pub fn recorded(&self, key: &str) -> Option<&FieldValue> {
        self.accumulator.get(key)
    }

    pub fn target(&self) -> &EditTarget {
        &self.target
    }

    pub fn origin(&self) -> EditOrigin {
        self.origin
    }

    pub fn parent(&self) -> ParentContext {
        self.parent
    }

    pub fn phase(&self) -> &FieldPhase {
        &self.phase
    }

    pub fn is_collecting_files(&self) -> bool {
        matches!(self.phase, FieldPhase::CollectingFiles(_))
    }

    /// The batch of the current multi-file field, opened on first use.
    pub fn file_batch(&mut self) -> Result<&mut FileBatch, EditError> {
        let descriptor = self.current_descriptor()?;
        if !descriptor.kind.collects_files() {
            return Err(EditError::NotAFileField(descriptor.key));
        }
        if let FieldPhase::Prompting = self.phase {
            self.phase = FieldPhase::CollectingFiles(FileBatch::default());
        }
        match &mut self.phase {
            FieldPhase::CollectingFiles(batch) => Ok(batch),
            FieldPhase::Prompting => Err(EditError::NotAFileField(descriptor.key)),
        }
    }

    /// Closes the current batch, returning what it buffered.
    pub fn take_file_batch(&mut self) -> Option<FileBatch> {
        match std::mem::take(&mut self.phase) {
            FieldPhase::CollectingFiles(batch) => Some(batch),
            FieldPhase::Prompting => None,
        }
    }

    pub fn uploads_mut(&mut self) -> &mut UploadLedger {
        &mut self.uploads
    }

    pub fn touch(&mut self) {
        self.touched_at = Instant::now();
    }

    pub fn is_idle_for(&self, timeout: Duration) -> bool {
        self.touched_at.elapsed() >= timeout
    }

    /// Consumes a finished session. An unfinished one is handed back untouched.
    pub fn into_finished(self) -> Result<FinishedSession, Self> {
        if !self.is_finished() {
            return Err(self);
        }
        Ok(FinishedSession {
            target: self.target,
            accumulator: self.accumulator,
            origin: self.origin,
            parent: self.parent,
            hints: self.hints,
            uploads: self.uploads,
        })
    }

    /// The error describing why `into_finished` refused this session.
    pub fn unfinished_error(&self) -> EditError {
        EditError::NotFinished {
            position: self.cursor.unwrap_or(0),
            total: self.descriptors.len(),
        }
    }

    /// Drops the walk, returning the ledger of uploads it staged.
    pub fn discard(self) -> UploadLedger {
        self.uploads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Excursion, ExcursionId, FieldKind};
    use pretty_assertions::assert_eq;

    fn session() -> EditSession {
        EditSession::begin(
            EditTarget::Excursion(Excursion::new(ExcursionId(1))),
            EditOrigin::Update,
            ParentContext::default(),
            NavigationHints::default(),
        )
    }

    #[test]
    fn walks_every_descriptor_once_in_order() {
        let mut session = session();
        assert!(!session.is_started());
        assert_eq!(session.current_descriptor(), Err(EditError::NotStarted));

        let mut visited = Vec::new();
        session.advance().unwrap();
        while !session.is_finished() {
            visited.push(session.current_descriptor().unwrap().key);
            session.advance().unwrap();
        }

        assert_eq!(visited, vec!["name", "is_paid", "duration"]);
        assert_eq!(session.position(), Some(3));
    }

    #[test]
    fn advancing_past_the_end_is_an_error() {
        let mut session = session();
        for _ in 0..4 {
            session.advance().unwrap();
        }
        assert!(session.is_finished());
        assert_eq!(session.advance(), Err(EditError::AlreadyFinished(3)));
        assert_eq!(session.current_descriptor(), Err(EditError::AlreadyFinished(3)));
        assert_eq!(session.record_result(FieldValue::Integer(1)), Err(EditError::AlreadyFinished(3)));
    }

    #[test]
    fn record_result_is_last_write_wins() {
        let mut session = session();
        session.advance().unwrap();
        session.record_result(FieldValue::Text("first".into())).unwrap();
        session.record_result(FieldValue::Text("second".into())).unwrap();

        assert_eq!(session.recorded("name"), Some(&FieldValue::Text("second".into())));
    }

    #[test]
    fn current_value_reads_the_untouched_target() {
        let mut session = session();
        session.advance().unwrap();
        session.record_result(FieldValue::Text("Renamed".into())).unwrap();

        assert_eq!(
            session.current_value().unwrap(),
            Some(FieldValue::Text(crate::content::excursion::DEFAULT_EXCURSION_NAME.into()))
        );
    }

    #[test]
    fn unfinished_session_is_handed_back() {
        let mut session = session();
        session.advance().unwrap();

        let session = session.into_finished().unwrap_err();
        assert_eq!(session.unfinished_error(), EditError::NotFinished { position: 0, total: 3 });
    }

    #[test]
    fn file_batch_only_opens_for_media_fields() {
        let mut session = session();
        session.advance().unwrap();
        assert_eq!(session.current_descriptor().unwrap().kind, FieldKind::Text);
        assert_eq!(session.file_batch().unwrap_err(), EditError::NotAFileField("name"));
        assert!(!session.is_collecting_files());
    }
}
