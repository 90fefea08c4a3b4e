use serde::{Deserialize, Serialize};

use super::field::{coerce, ApplyError, Editable, FieldDescriptor, FieldKind, FieldValue, FileRef};
use super::ids::{ExcursionId, PointId};
use super::point::Point;
use super::stats::Engagement;

pub const DEFAULT_EXCURSION_NAME: &str = "Название засекречено";

pub const EXCURSION_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("field-excursion-name", "name", FieldKind::Text),
    FieldDescriptor::new("field-is-paid", "is_paid", FieldKind::Boolean),
    FieldDescriptor::new("field-duration", "duration", FieldKind::Integer),
];

/// A tour: an ordered sequence of points plus publication flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Excursion {
    pub id: ExcursionId,
    pub name: String,
    pub is_paid: bool,
    /// Drafts are visible to admins only.
    pub is_draft: bool,
    pub duration_minutes: i64,
    pub points: Vec<Point>,
    #[serde(default)]
    pub stats: Engagement,
}

impl Excursion {
    pub fn new(id: ExcursionId) -> Self {
        Self {
            id,
            name: DEFAULT_EXCURSION_NAME.to_string(),
            is_paid: false,
            is_draft: true,
            duration_minutes: 0,
            points: Vec::new(),
            stats: Engagement::default(),
        }
    }

    pub fn point(&self, id: PointId) -> Option<&Point> {
        self.points.iter().find(|point| point.id == id)
    }

    pub fn point_mut(&mut self, id: PointId) -> Option<&mut Point> {
        self.points.iter_mut().find(|point| point.id == id)
    }

    /// Every stored file of the tour.
    pub fn media_refs(&self) -> impl Iterator<Item = &FileRef> {
        self.points.iter().flat_map(|point| point.media_refs())
    }
}

impl Editable for Excursion {
    fn field_descriptors(&self) -> &'static [FieldDescriptor] {
        EXCURSION_FIELDS
    }

    fn current_value(&self, key: &str) -> Option<FieldValue> {
        let value = match key {
            "name" => FieldValue::Text(self.name.clone()),
            "is_paid" => FieldValue::Boolean(self.is_paid),
            "duration" => FieldValue::Integer(self.duration_minutes),
            _ => return None,
        };
        Some(value)
    }

    fn apply_field(&mut self, key: &str, value: &FieldValue) -> Result<(), ApplyError> {
        match key {
            "name" => self.name = coerce::text(key, value)?,
            "is_paid" => self.is_paid = coerce::boolean(key, value)?,
            "duration" => self.duration_minutes = coerce::integer(key, value)?,
            _ => return Err(ApplyError::UnknownField { key: key.to_string() }),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::field::Accumulator;

    #[test]
    fn new_excursions_are_drafts_with_default_name() {
        let excursion = Excursion::new(ExcursionId(1));
        assert!(excursion.is_draft);
        assert_eq!(excursion.name, DEFAULT_EXCURSION_NAME);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let mut excursion = Excursion::new(ExcursionId(1));
        let mut accumulator = Accumulator::new();
        accumulator.insert("views", FieldValue::Integer(10));

        assert_eq!(
            excursion.apply_accumulator(&accumulator),
            Err(ApplyError::UnknownField { key: "views".into() })
        );
    }

    #[test]
    fn applies_all_three_fields() {
        let mut excursion = Excursion::new(ExcursionId(1));
        let mut accumulator = Accumulator::new();
        accumulator.insert("name", FieldValue::Text("Old town".into()));
        accumulator.insert("is_paid", FieldValue::Boolean(true));
        accumulator.insert("duration", FieldValue::Integer(90));

        excursion.apply_accumulator(&accumulator).unwrap();

        assert_eq!(excursion.name, "Old town");
        assert!(excursion.is_paid);
        assert_eq!(excursion.duration_minutes, 90);
    }
}
