//! Field-kind specific interpretation of inbound events.

use strum::{AsRefStr, Display};
use url::Url;

use super::files::FileResolution;
use crate::content::{FieldKind, FieldValue, MediaKind};
use crate::storage::IncomingFile;

/// Text that clears a link field, as an alternative to the delete button.
pub const NO_LINK_MARKER: &str = "-";

/// Transport-neutral event routed to an active editing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    Text(String),
    Choice(bool),
    Skip,
    /// "Delete link" / "delete photo" button.
    DeleteValue,
    Photo(IncomingFile),
    Audio(IncomingFile),
    ResolveFiles(FileResolution),
}

/// Recoverable input problem; the same field is prompted again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Rejection {
    NotAnInteger,
    InvalidUrl,
    ExpectedText,
    ExpectedChoice,
    ExpectedPhoto,
    ExpectedAudio,
    ExpectedFileChoice,
}

impl Rejection {
    /// Localization key of the message shown to the user.
    pub fn message_key(self) -> String {
        format!("rejected-{}", self)
    }
}

/// What the controller should do with an event for the current field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interpretation {
    Record(FieldValue),
    Skip,
    Reject(Rejection),
    /// Upload and record as the single value of the field.
    UploadSingle(MediaKind, IncomingFile),
    /// Upload into the open batch; the field stays current.
    Collect(MediaKind, IncomingFile),
    Resolve(FileResolution),
}

/// Parses a link; a scheme and a non-empty host are required.
pub fn parse_link(raw: &str) -> Option<Url> {
    let url = Url::parse(raw.trim()).ok()?;
    let has_host = url.host_str().is_some_and(|host| !host.is_empty());
    (!url.scheme().is_empty() && has_host).then_some(url)
}

pub fn parse_integer(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

fn expected(kind: FieldKind) -> Rejection {
    match kind {
        FieldKind::Text => Rejection::ExpectedText,
        FieldKind::Integer => Rejection::NotAnInteger,
        FieldKind::Url => Rejection::InvalidUrl,
        FieldKind::Boolean => Rejection::ExpectedChoice,
        FieldKind::SinglePhoto | FieldKind::MultiPhoto => Rejection::ExpectedPhoto,
        FieldKind::MultiAudio => Rejection::ExpectedAudio,
    }
}

/// Maps an event onto the current field's kind. Events that do not fit the
/// kind are rejected so nothing sent by mistake is silently dropped.
pub fn interpret(kind: FieldKind, event: EditorEvent) -> Interpretation {
    use EditorEvent as E;
    use Interpretation as I;

    match (kind, event) {
        (_, E::Skip) => I::Skip,

        (FieldKind::Text, E::Text(text)) => I::Record(FieldValue::Text(text)),

        (FieldKind::Integer, E::Text(text)) => match parse_integer(&text) {
            Some(n) => I::Record(FieldValue::Integer(n)),
            None => I::Reject(Rejection::NotAnInteger),
        },

        (FieldKind::Url, E::DeleteValue) => I::Record(FieldValue::Empty),
        (FieldKind::Url, E::Text(text)) if text.trim() == NO_LINK_MARKER => I::Record(FieldValue::Empty),
        (FieldKind::Url, E::Text(text)) => match parse_link(&text) {
            Some(url) => I::Record(FieldValue::Url(url)),
            None => I::Reject(Rejection::InvalidUrl),
        },

        (FieldKind::Boolean, E::Choice(flag)) => I::Record(FieldValue::Boolean(flag)),

        (FieldKind::SinglePhoto, E::Photo(file)) => I::UploadSingle(MediaKind::Photo, file),
        (FieldKind::SinglePhoto, E::DeleteValue) => I::Record(FieldValue::Empty),

        (FieldKind::MultiPhoto, E::Photo(file)) => I::Collect(MediaKind::Photo, file),
        (FieldKind::MultiAudio, E::Audio(file)) => I::Collect(MediaKind::Audio, file),
        (FieldKind::MultiPhoto | FieldKind::MultiAudio, E::ResolveFiles(resolution)) => I::Resolve(resolution),
        (FieldKind::MultiPhoto | FieldKind::MultiAudio, E::Text(_) | E::Choice(_) | E::DeleteValue) => {
            I::Reject(Rejection::ExpectedFileChoice)
        }

        (kind, _) => I::Reject(expected(kind)),
    }
}
