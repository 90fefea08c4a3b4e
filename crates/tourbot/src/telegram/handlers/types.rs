//! Handler types and dependencies

use std::sync::Arc;

use teloxide::types::{Message, User};
use tourcore::EditorController;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub controller: Arc<EditorController>,
    /// Telegram users allowed to edit content (`ADMIN_IDS` in production)
    pub admin_ids: Arc<Vec<i64>>,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(controller: Arc<EditorController>, admin_ids: Vec<i64>) -> Self {
        Self {
            controller,
            admin_ids: Arc::new(admin_ids),
        }
    }

    pub fn is_admin(&self, user: &User) -> bool {
        self.admin_ids.contains(&user_id(user))
    }
}

/// Telegram user id as stored in `ADMIN_IDS` and used as the editor's user key.
pub fn user_id(user: &User) -> i64 {
    i64::try_from(user.id.0).unwrap_or_default()
}

pub fn message_user_id(msg: &Message) -> Option<i64> {
    msg.from.as_ref().map(user_id)
}
