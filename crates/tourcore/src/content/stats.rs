use serde::{Deserialize, Serialize};

/// Audience counters shown on admin cards. Not editable through the field walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub views: u64,
    pub likes: u64,
    pub dislikes: u64,
}
