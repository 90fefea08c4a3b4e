//! Excursion → Point → InformationPart tree and the field contract the editor walks.

pub mod catalog;
pub mod excursion;
pub mod field;
pub mod ids;
pub mod information_part;
pub mod point;
pub mod stats;
pub mod target;

pub use catalog::{Catalog, CommitError, EditOrigin, SpliceError};
pub use excursion::Excursion;
pub use field::{Accumulator, ApplyError, Editable, FieldDescriptor, FieldKind, FieldValue, FileRef, MediaKind};
pub use ids::{ExcursionId, IdAllocator, PartId, PointId};
pub use information_part::{InfoContent, InformationPart};
pub use point::Point;
pub use stats::Engagement;
pub use target::{EditTarget, TargetKind};
