use crate::content::{ExcursionId, FieldKind, FieldValue, MediaKind, PointId, TargetKind};

use super::input::Rejection;
use super::reorder::OrderError;
use super::session::NavigationHints;

/// Prompt for the field the session is waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPrompt {
    pub target: TargetKind,
    /// Localization key of the prompt text.
    pub prompt: &'static str,
    pub key: &'static str,
    pub kind: FieldKind,
    /// Value stored before this edit started.
    pub current: Option<FieldValue>,
    /// Zero-based.
    pub position: usize,
    pub total: usize,
}

/// Transport-neutral outcome of an editor call. The bot renders each one as a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Prompt(FieldPrompt),
    Rejected(Rejection),
    FileStored { media: MediaKind, uploaded: usize },
    UploadFailed,
    Saved {
        target: TargetKind,
        name: String,
        hints: NavigationHints,
    },
    SaveFailed,
    /// The entity to edit, or the place to splice it back into, no longer exists.
    TargetMissing,
    Discarded,
    Expired,
    OrderPrompt {
        excursion_id: ExcursionId,
        points: Vec<(PointId, String)>,
    },
    OrderRejected(OrderError),
    OrderSaved { excursion_id: ExcursionId },
}
