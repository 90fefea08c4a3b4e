//! Field descriptors and the values the editor collects for them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, IntoStaticStr};
use thiserror::Error;
use url::Url;

/// Value kind of one editable attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Integer,
    Url,
    Boolean,
    SinglePhoto,
    MultiPhoto,
    MultiAudio,
}

impl FieldKind {
    /// Kinds filled by a batch of uploads resolved with replace / append / clear.
    pub fn collects_files(self) -> bool {
        matches!(self, FieldKind::MultiPhoto | FieldKind::MultiAudio)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Photo,
    Audio,
}

impl MediaKind {
    /// Directory hint handed to the media store.
    pub fn directory(self) -> &'static str {
        match self {
            MediaKind::Photo => "photos",
            MediaKind::Audio => "audio",
        }
    }
}

/// One editable attribute: localization key of the prompt, storage key, value kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub prompt: &'static str,
    pub key: &'static str,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub const fn new(prompt: &'static str, key: &'static str, kind: FieldKind) -> Self {
        Self { prompt, key, kind }
    }
}

/// Stable reference to a stored media file (a key inside the media store).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileRef(String);

impl FileRef {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A value collected for one field. `Empty` clears optional fields (link, location photo).
#[derive(Debug, Clone, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum FieldValue {
    Empty,
    Text(String),
    Integer(i64),
    Boolean(bool),
    Url(Url),
    File(FileRef),
    Files(Vec<FileRef>),
}

impl FieldValue {
    /// Media references held by this value, in order.
    pub fn files(&self) -> &[FileRef] {
        match self {
            FieldValue::File(file) => std::slice::from_ref(file),
            FieldValue::Files(files) => files,
            _ => &[],
        }
    }

    pub(crate) fn optional_url(url: &Option<Url>) -> Self {
        url.clone().map_or(FieldValue::Empty, FieldValue::Url)
    }

    pub(crate) fn optional_file(file: &Option<FileRef>) -> Self {
        file.clone().map_or(FieldValue::Empty, FieldValue::File)
    }
}

/// Values collected during one walk, keyed by field key.
pub type Accumulator = BTreeMap<&'static str, FieldValue>;

/// A collected value could not be stored on the entity.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApplyError {
    #[error("unknown field `{key}`")]
    UnknownField { key: String },

    #[error("field `{key}` expects {expected}, got {got}")]
    KindMismatch {
        key: String,
        expected: FieldKind,
        got: &'static str,
    },
}

impl ApplyError {
    fn mismatch(key: &str, expected: FieldKind, value: &FieldValue) -> Self {
        ApplyError::KindMismatch {
            key: key.to_string(),
            expected,
            got: value.into(),
        }
    }
}

/// Coercions used by entities when applying an accumulator.
pub(crate) mod coerce {
    use super::*;

    pub fn text(key: &str, value: &FieldValue) -> Result<String, ApplyError> {
        match value {
            FieldValue::Text(text) => Ok(text.clone()),
            other => Err(ApplyError::mismatch(key, FieldKind::Text, other)),
        }
    }

    pub fn integer(key: &str, value: &FieldValue) -> Result<i64, ApplyError> {
        match value {
            FieldValue::Integer(n) => Ok(*n),
            other => Err(ApplyError::mismatch(key, FieldKind::Integer, other)),
        }
    }

    pub fn boolean(key: &str, value: &FieldValue) -> Result<bool, ApplyError> {
        match value {
            FieldValue::Boolean(flag) => Ok(*flag),
            other => Err(ApplyError::mismatch(key, FieldKind::Boolean, other)),
        }
    }

    pub fn optional_url(key: &str, value: &FieldValue) -> Result<Option<Url>, ApplyError> {
        match value {
            FieldValue::Url(url) => Ok(Some(url.clone())),
            FieldValue::Empty => Ok(None),
            other => Err(ApplyError::mismatch(key, FieldKind::Url, other)),
        }
    }

    pub fn optional_file(key: &str, value: &FieldValue) -> Result<Option<FileRef>, ApplyError> {
        match value {
            FieldValue::File(file) => Ok(Some(file.clone())),
            FieldValue::Empty => Ok(None),
            other => Err(ApplyError::mismatch(key, FieldKind::SinglePhoto, other)),
        }
    }

    pub fn files(key: &str, kind: FieldKind, value: &FieldValue) -> Result<Vec<FileRef>, ApplyError> {
        match value {
            FieldValue::Files(files) => Ok(files.clone()),
            FieldValue::Empty => Ok(Vec::new()),
            other => Err(ApplyError::mismatch(key, kind, other)),
        }
    }
}

/// An entity the editor can walk field by field.
pub trait Editable: Clone {
    /// Ordered, fixed field list of this entity variant.
    fn field_descriptors(&self) -> &'static [FieldDescriptor];

    /// Live value for `key`, `None` for keys the entity does not have.
    fn current_value(&self, key: &str) -> Option<FieldValue>;

    /// Stores a single coerced value.
    fn apply_field(&mut self, key: &str, value: &FieldValue) -> Result<(), ApplyError>;

    /// Applies every collected value or none of them. Keys absent from the
    /// accumulator keep their previous value.
    fn apply_accumulator(&mut self, accumulator: &Accumulator) -> Result<(), ApplyError> {
        let mut staged = self.clone();
        for (key, value) in accumulator {
            staged.apply_field(key, value)?;
        }
        *self = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_multi_kinds_collect_files() {
        assert!(FieldKind::MultiPhoto.collects_files());
        assert!(!FieldKind::SinglePhoto.collects_files());
    }

    #[test]
    fn mismatch_names_both_sides() {
        let err = coerce::integer("duration", &FieldValue::Text("ten".into())).unwrap_err();
        assert_eq!(err.to_string(), "field `duration` expects integer, got text");
    }

    #[test]
    fn empty_clears_optional_values() {
        assert_eq!(coerce::optional_url("link", &FieldValue::Empty).unwrap(), None);
        assert_eq!(coerce::files("photos", FieldKind::MultiPhoto, &FieldValue::Empty).unwrap(), vec![]);
    }

    #[test]
    fn files_lists_single_and_multi_refs() {
        let one = FieldValue::File(FileRef::new("photos/a.jpg"));
        assert_eq!(one.files(), &[FileRef::new("photos/a.jpg")]);
        assert!(FieldValue::Integer(3).files().is_empty());
    }
}
