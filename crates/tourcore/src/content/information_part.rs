use serde::{Deserialize, Serialize};
use url::Url;

use super::field::{coerce, ApplyError, Editable, FieldDescriptor, FieldKind, FieldValue, FileRef};
use super::ids::{PartId, PointId};
use super::stats::Engagement;

pub const DEFAULT_PART_NAME: &str = "Секретная программа";

/// Fields shared by points and extra information parts, in walk order.
pub const INFORMATION_PART_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("field-part-name", "name", FieldKind::Text),
    FieldDescriptor::new("field-link", "link", FieldKind::Url),
    FieldDescriptor::new("field-text", "text", FieldKind::Text),
    FieldDescriptor::new("field-audio", "audio", FieldKind::MultiAudio),
    FieldDescriptor::new("field-photos", "photos", FieldKind::MultiPhoto),
];

/// The content body every point and extra topic carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoContent {
    pub name: String,
    pub link: Option<Url>,
    pub text: String,
    pub audio: Vec<FileRef>,
    pub photos: Vec<FileRef>,
}

impl Default for InfoContent {
    fn default() -> Self {
        Self {
            name: DEFAULT_PART_NAME.to_string(),
            link: None,
            text: String::new(),
            audio: Vec::new(),
            photos: Vec::new(),
        }
    }
}

impl InfoContent {
    pub(crate) fn current_value(&self, key: &str) -> Option<FieldValue> {
        let value = match key {
            "name" => FieldValue::Text(self.name.clone()),
            "link" => FieldValue::optional_url(&self.link),
            "text" => FieldValue::Text(self.text.clone()),
            "audio" => FieldValue::Files(self.audio.clone()),
            "photos" => FieldValue::Files(self.photos.clone()),
            _ => return None,
        };
        Some(value)
    }

    pub(crate) fn apply_field(&mut self, key: &str, value: &FieldValue) -> Result<(), ApplyError> {
        match key {
            "name" => self.name = coerce::text(key, value)?,
            "link" => self.link = coerce::optional_url(key, value)?,
            "text" => self.text = coerce::text(key, value)?,
            "audio" => self.audio = coerce::files(key, FieldKind::MultiAudio, value)?,
            "photos" => self.photos = coerce::files(key, FieldKind::MultiPhoto, value)?,
            _ => return Err(ApplyError::UnknownField { key: key.to_string() }),
        }
        Ok(())
    }

    pub(crate) fn media_refs(&self) -> impl Iterator<Item = &FileRef> {
        self.audio.iter().chain(self.photos.iter())
    }
}

/// An extra sub-topic attached to a point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InformationPart {
    pub id: PartId,
    pub point_id: PointId,
    #[serde(flatten)]
    pub content: InfoContent,
    #[serde(default)]
    pub stats: Engagement,
}

impl InformationPart {
    pub fn new(id: PartId, point_id: PointId) -> Self {
        Self {
            id,
            point_id,
            content: InfoContent::default(),
            stats: Engagement::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.content.name
    }

    pub fn media_refs(&self) -> impl Iterator<Item = &FileRef> {
        self.content.media_refs()
    }
}

impl Editable for InformationPart {
    fn field_descriptors(&self) -> &'static [FieldDescriptor] {
        INFORMATION_PART_FIELDS
    }

    fn current_value(&self, key: &str) -> Option<FieldValue> {
        self.content.current_value(key)
    }

    fn apply_field(&mut self, key: &str, value: &FieldValue) -> Result<(), ApplyError> {
        self.content.apply_field(key, value)
    }
}
