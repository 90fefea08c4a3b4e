use serde::{Deserialize, Serialize};
use url::Url;

use super::field::{coerce, ApplyError, Editable, FieldDescriptor, FieldKind, FieldValue, FileRef};
use super::ids::{ExcursionId, PartId, PointId};
use super::information_part::{InfoContent, InformationPart};
use super::stats::Engagement;

/// Point fields: the information part body first, then the location block.
pub const POINT_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("field-part-name", "name", FieldKind::Text),
    FieldDescriptor::new("field-link", "link", FieldKind::Url),
    FieldDescriptor::new("field-text", "text", FieldKind::Text),
    FieldDescriptor::new("field-audio", "audio", FieldKind::MultiAudio),
    FieldDescriptor::new("field-photos", "photos", FieldKind::MultiPhoto),
    FieldDescriptor::new("field-address", "address", FieldKind::Text),
    FieldDescriptor::new("field-location-photo", "location_photo", FieldKind::SinglePhoto),
    FieldDescriptor::new("field-location-link", "location_link", FieldKind::Url),
];

/// One stop of an excursion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub id: PointId,
    pub excursion_id: ExcursionId,
    #[serde(flatten)]
    pub content: InfoContent,
    pub address: String,
    pub location_photo: Option<FileRef>,
    pub location_link: Option<Url>,
    /// Extra topics, in the order they are offered on the spot.
    #[serde(default)]
    pub extra_parts: Vec<InformationPart>,
    #[serde(default)]
    pub stats: Engagement,
}

impl Point {
    pub fn new(id: PointId, excursion_id: ExcursionId) -> Self {
        Self {
            id,
            excursion_id,
            content: InfoContent::default(),
            address: String::new(),
            location_photo: None,
            location_link: None,
            extra_parts: Vec::new(),
            stats: Engagement::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.content.name
    }

    pub fn part(&self, id: PartId) -> Option<&InformationPart> {
        self.extra_parts.iter().find(|part| part.id == id)
    }

    /// Every stored file of this point, its extra parts included.
    pub fn media_refs(&self) -> impl Iterator<Item = &FileRef> {
        self.content
            .media_refs()
            .chain(self.location_photo.iter())
            .chain(self.extra_parts.iter().flat_map(|part| part.media_refs()))
    }
}

impl Editable for Point {
    fn field_descriptors(&self) -> &'static [FieldDescriptor] {
        POINT_FIELDS
    }

    fn current_value(&self, key: &str) -> Option<FieldValue> {
        match key {
            "address" => Some(FieldValue::Text(self.address.clone())),
            "location_photo" => Some(FieldValue::optional_file(&self.location_photo)),
            "location_link" => Some(FieldValue::optional_url(&self.location_link)),
            _ => self.content.current_value(key),
        }
    }

    fn apply_field(&mut self, key: &str, value: &FieldValue) -> Result<(), ApplyError> {
        match key {
            "address" => self.address = coerce::text(key, value)?,
            "location_photo" => self.location_photo = coerce::optional_file(key, value)?,
            "location_link" => self.location_link = coerce::optional_url(key, value)?,
            _ => self.content.apply_field(key, value)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::field::Accumulator;
    use crate::content::information_part::INFORMATION_PART_FIELDS;

    #[test]
    fn point_fields_extend_the_information_part_fields() {
        assert_eq!(&POINT_FIELDS[..INFORMATION_PART_FIELDS.len()], INFORMATION_PART_FIELDS);
        let extra: Vec<_> = POINT_FIELDS[INFORMATION_PART_FIELDS.len()..].iter().map(|f| f.key).collect();
        assert_eq!(extra, vec!["address", "location_photo", "location_link"]);
    }

    #[test]
    fn every_descriptor_key_has_a_current_value() {
        let point = Point::new(PointId(1), ExcursionId(1));
        for descriptor in POINT_FIELDS {
            assert!(point.current_value(descriptor.key).is_some(), "{}", descriptor.key);
        }
    }

    #[test]
    fn empty_location_photo_clears_it() {
        let mut point = Point::new(PointId(1), ExcursionId(1));
        point.location_photo = Some(FileRef::new("photos/map.jpg"));

        let mut accumulator = Accumulator::new();
        accumulator.insert("location_photo", FieldValue::Empty);
        accumulator.insert("address", FieldValue::Text("Nevsky 28".into()));
        point.apply_accumulator(&accumulator).unwrap();

        assert_eq!(point.location_photo, None);
        assert_eq!(point.address, "Nevsky 28");
    }

    #[test]
    fn media_refs_cover_extra_parts() {
        let mut point = Point::new(PointId(1), ExcursionId(1));
        point.location_photo = Some(FileRef::new("photos/map.jpg"));
        let mut part = InformationPart::new(PartId(1), point.id);
        part.content.audio = vec![FileRef::new("audio/story.mp3")];
        point.extra_parts.push(part);

        let refs: Vec<_> = point.media_refs().map(FileRef::as_str).collect();
        assert_eq!(refs, vec!["photos/map.jpg", "audio/story.mp3"]);
    }
}
