//! The editing engine: per-user field walks over excursions, points and
//! information parts, plus point reordering.

pub mod controller;
pub mod files;
pub mod input;
mod maintenance;
pub mod reorder;
pub mod reply;
pub mod session;
pub mod state;

pub use controller::EditorController;
pub use files::{FileBatch, FileResolution, UploadLedger};
pub use input::{EditorEvent, Rejection, NO_LINK_MARKER};
pub use reorder::OrderError;
pub use reply::{FieldPrompt, Reply};
pub use session::{EditError, EditSession, MenuRef, NavigationHints, ParentContext};
pub use state::{ConversationState, StateRegistry};
