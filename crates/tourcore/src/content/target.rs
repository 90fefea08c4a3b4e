use serde::Serialize;
use strum::{AsRefStr, Display};

use super::field::{ApplyError, Editable, FieldDescriptor, FieldValue, FileRef};
use super::{Excursion, InformationPart, Point};

/// Which entity variant an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, Serialize)]
#[strum(serialize_all = "snake_case")]
pub enum TargetKind {
    Excursion,
    Point,
    InformationPart,
}

/// The entity an editing session walks. Dispatches the `Editable` contract to the variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    Excursion(Excursion),
    Point(Point),
    Part(InformationPart),
}

impl EditTarget {
    pub fn kind(&self) -> TargetKind {
        match self {
            EditTarget::Excursion(_) => TargetKind::Excursion,
            EditTarget::Point(_) => TargetKind::Point,
            EditTarget::Part(_) => TargetKind::InformationPart,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            EditTarget::Excursion(excursion) => excursion.id.0,
            EditTarget::Point(point) => point.id.0,
            EditTarget::Part(part) => part.id.0,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            EditTarget::Excursion(excursion) => &excursion.name,
            EditTarget::Point(point) => point.name(),
            EditTarget::Part(part) => part.name(),
        }
    }

    pub fn media_refs(&self) -> Vec<FileRef> {
        match self {
            EditTarget::Excursion(excursion) => excursion.media_refs().cloned().collect(),
            EditTarget::Point(point) => point.media_refs().cloned().collect(),
            EditTarget::Part(part) => part.media_refs().cloned().collect(),
        }
    }
}

impl Editable for EditTarget {
    fn field_descriptors(&self) -> &'static [FieldDescriptor] {
        match self {
            EditTarget::Excursion(excursion) => excursion.field_descriptors(),
            EditTarget::Point(point) => point.field_descriptors(),
            EditTarget::Part(part) => part.field_descriptors(),
        }
    }

    fn current_value(&self, key: &str) -> Option<FieldValue> {
        match self {
            EditTarget::Excursion(excursion) => excursion.current_value(key),
            EditTarget::Point(point) => point.current_value(key),
            EditTarget::Part(part) => part.current_value(key),
        }
    }

    fn apply_field(&mut self, key: &str, value: &FieldValue) -> Result<(), ApplyError> {
        match self {
            EditTarget::Excursion(excursion) => excursion.apply_field(key, value),
            EditTarget::Point(point) => point.apply_field(key, value),
            EditTarget::Part(part) => part.apply_field(key, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ids::{ExcursionId, PartId, PointId};

    #[test]
    fn descriptor_counts_per_variant() {
        let excursion = EditTarget::Excursion(Excursion::new(ExcursionId(1)));
        let point = EditTarget::Point(Point::new(PointId(1), ExcursionId(1)));
        let part = EditTarget::Part(InformationPart::new(PartId(1), PointId(1)));

        assert_eq!(excursion.field_descriptors().len(), 3);
        assert_eq!(point.field_descriptors().len(), 8);
        assert_eq!(part.field_descriptors().len(), 5);
        assert_eq!(part.kind().to_string(), "information_part");
    }
}
