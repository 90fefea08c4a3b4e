//! Inline button payloads.
//!
//! Every button carries a short colon-separated string (Telegram caps callback
//! data at 64 bytes): a menu prefix, an action and the ids it applies to.

use std::fmt;

use tourcore::content::{ExcursionId, PartId, PointId};
use tourcore::editor::{EditorEvent, FileResolution, MenuRef};

/// A button press the editor session consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAction {
    Skip,
    Choice(bool),
    DeleteValue,
    Files(FileResolution),
}

impl FieldAction {
    pub fn into_event(self) -> EditorEvent {
        match self {
            FieldAction::Skip => EditorEvent::Skip,
            FieldAction::Choice(flag) => EditorEvent::Choice(flag),
            FieldAction::DeleteValue => EditorEvent::DeleteValue,
            FieldAction::Files(resolution) => EditorEvent::ResolveFiles(resolution),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackData {
    Excursions,
    Excursion(ExcursionId),
    AddExcursion,
    EditExcursion(ExcursionId),
    TogglePublish(ExcursionId),
    /// Asks for confirmation first.
    DeleteExcursion(ExcursionId),
    ConfirmDeleteExcursion(ExcursionId),
    Points(ExcursionId),
    Point(ExcursionId, PointId),
    AddPoint(ExcursionId),
    EditPoint(ExcursionId, PointId),
    DeletePoint(ExcursionId, PointId),
    ChangeOrder(ExcursionId),
    Extras(ExcursionId, PointId),
    AddExtra(ExcursionId, PointId),
    EditExtra(ExcursionId, PointId, PartId),
    DeleteExtra(ExcursionId, PointId, PartId),
    Field(FieldAction),
}

impl CallbackData {
    pub fn parse(data: &str) -> Option<Self> {
        let parts: Vec<&str> = data.split(':').collect();
        let id = |index: usize| parts.get(index).and_then(|raw| raw.parse::<i64>().ok());
        let ex = |index: usize| id(index).map(ExcursionId);
        let pt = |index: usize| id(index).map(PointId);
        let xp = |index: usize| id(index).map(PartId);

        let parsed = match parts.as_slice() {
            ["ex", "list"] => CallbackData::Excursions,
            ["ex", "add"] => CallbackData::AddExcursion,
            ["ex", "open", _] => CallbackData::Excursion(ex(2)?),
            ["ex", "edit", _] => CallbackData::EditExcursion(ex(2)?),
            ["ex", "publish", _] => CallbackData::TogglePublish(ex(2)?),
            ["ex", "del", _] => CallbackData::DeleteExcursion(ex(2)?),
            ["ex", "delok", _] => CallbackData::ConfirmDeleteExcursion(ex(2)?),
            ["pt", "list", _] => CallbackData::Points(ex(2)?),
            ["pt", "add", _] => CallbackData::AddPoint(ex(2)?),
            ["pt", "order", _] => CallbackData::ChangeOrder(ex(2)?),
            ["pt", "open", _, _] => CallbackData::Point(ex(2)?, pt(3)?),
            ["pt", "edit", _, _] => CallbackData::EditPoint(ex(2)?, pt(3)?),
            ["pt", "del", _, _] => CallbackData::DeletePoint(ex(2)?, pt(3)?),
            ["xp", "list", _, _] => CallbackData::Extras(ex(2)?, pt(3)?),
            ["xp", "add", _, _] => CallbackData::AddExtra(ex(2)?, pt(3)?),
            ["xp", "edit", _, _, _] => CallbackData::EditExtra(ex(2)?, pt(3)?, xp(4)?),
            ["xp", "del", _, _, _] => CallbackData::DeleteExtra(ex(2)?, pt(3)?, xp(4)?),
            ["fld", "skip"] => CallbackData::Field(FieldAction::Skip),
            ["fld", "delete"] => CallbackData::Field(FieldAction::DeleteValue),
            ["fld", "bool", "yes"] => CallbackData::Field(FieldAction::Choice(true)),
            ["fld", "bool", "no"] => CallbackData::Field(FieldAction::Choice(false)),
            ["fld", "files", resolution] => CallbackData::Field(FieldAction::Files(resolution.parse().ok()?)),
            _ => return None,
        };
        Some(parsed)
    }

    /// Buttons anyone may press; everything else edits content.
    pub fn is_public(&self) -> bool {
        matches!(self, CallbackData::Excursions | CallbackData::Excursion(_))
    }
}

impl fmt::Display for CallbackData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackData::Excursions => write!(f, "ex:list"),
            CallbackData::Excursion(ex) => write!(f, "ex:open:{}", ex),
            CallbackData::AddExcursion => write!(f, "ex:add"),
            CallbackData::EditExcursion(ex) => write!(f, "ex:edit:{}", ex),
            CallbackData::TogglePublish(ex) => write!(f, "ex:publish:{}", ex),
            CallbackData::DeleteExcursion(ex) => write!(f, "ex:del:{}", ex),
            CallbackData::ConfirmDeleteExcursion(ex) => write!(f, "ex:delok:{}", ex),
            CallbackData::Points(ex) => write!(f, "pt:list:{}", ex),
            CallbackData::Point(ex, pt) => write!(f, "pt:open:{}:{}", ex, pt),
            CallbackData::AddPoint(ex) => write!(f, "pt:add:{}", ex),
            CallbackData::EditPoint(ex, pt) => write!(f, "pt:edit:{}:{}", ex, pt),
            CallbackData::DeletePoint(ex, pt) => write!(f, "pt:del:{}:{}", ex, pt),
            CallbackData::ChangeOrder(ex) => write!(f, "pt:order:{}", ex),
            CallbackData::Extras(ex, pt) => write!(f, "xp:list:{}:{}", ex, pt),
            CallbackData::AddExtra(ex, pt) => write!(f, "xp:add:{}:{}", ex, pt),
            CallbackData::EditExtra(ex, pt, part) => write!(f, "xp:edit:{}:{}:{}", ex, pt, part),
            CallbackData::DeleteExtra(ex, pt, part) => write!(f, "xp:del:{}:{}:{}", ex, pt, part),
            CallbackData::Field(FieldAction::Skip) => write!(f, "fld:skip"),
            CallbackData::Field(FieldAction::DeleteValue) => write!(f, "fld:delete"),
            CallbackData::Field(FieldAction::Choice(true)) => write!(f, "fld:bool:yes"),
            CallbackData::Field(FieldAction::Choice(false)) => write!(f, "fld:bool:no"),
            CallbackData::Field(FieldAction::Files(resolution)) => write!(f, "fld:files:{}", resolution),
        }
    }
}

impl From<MenuRef> for CallbackData {
    fn from(menu: MenuRef) -> Self {
        match menu {
            MenuRef::Excursions => CallbackData::Excursions,
            MenuRef::Excursion(ex) => CallbackData::Excursion(ex),
            MenuRef::Points(ex) => CallbackData::Points(ex),
            MenuRef::Point(ex, pt) => CallbackData::Point(ex, pt),
            MenuRef::Extras(ex, pt) => CallbackData::Extras(ex, pt),
        }
    }
}
