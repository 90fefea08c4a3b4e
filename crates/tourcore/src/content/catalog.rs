//! The live excursion tree and the splice-back of committed edits.
//!
//! Every mutation follows the same order: copy the affected excursion, change the
//! copy, persist it, and only then publish it to readers. A failed save leaves the
//! tree exactly as it was.

use thiserror::Error;
use tokio::sync::RwLock;

use super::field::ApplyError;
use super::ids::{ExcursionId, IdAllocator, PartId, PointId};
use super::target::TargetKind;
use super::{Excursion, InformationPart, Point};
use crate::core::error::{AppError, AppResult};

/// Whether a committed entity is new or replaces an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOrigin {
    Create,
    Update,
}

/// The place an edited entity belongs to is gone, or a new id collides.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpliceError {
    #[error("excursion {0} not found")]
    ExcursionNotFound(ExcursionId),

    #[error("point {point} not found in excursion {excursion}")]
    PointNotFound { excursion: ExcursionId, point: PointId },

    #[error("information part {part} not found in point {point}")]
    PartNotFound { point: PointId, part: PartId },

    #[error("{kind} {id} already exists")]
    DuplicateId { kind: TargetKind, id: i64 },
}

#[derive(Debug, Error)]
pub enum CommitError {
    #[error(transparent)]
    Splice(#[from] SpliceError),

    #[error(transparent)]
    Apply(#[from] ApplyError),

    #[error("failed to persist excursion: {0}")]
    Persist(#[from] AppError),
}

fn splice<T>(
    items: &mut Vec<T>,
    item: T,
    origin: EditOrigin,
    same: impl Fn(&T, &T) -> bool,
    missing: impl FnOnce() -> SpliceError,
    duplicate: impl FnOnce() -> SpliceError,
) -> Result<(), SpliceError> {
    let position = items.iter().position(|existing| same(existing, &item));
    match (origin, position) {
        (EditOrigin::Update, Some(index)) => items[index] = item,
        (EditOrigin::Update, None) => return Err(missing()),
        (EditOrigin::Create, None) => items.push(item),
        (EditOrigin::Create, Some(_)) => return Err(duplicate()),
    }
    Ok(())
}

/// Replaces an excursion by id, or appends a new one.
pub fn splice_excursion(
    excursions: &mut Vec<Excursion>,
    excursion: Excursion,
    origin: EditOrigin,
) -> Result<(), SpliceError> {
    let id = excursion.id;
    splice(
        excursions,
        excursion,
        origin,
        |a, b| a.id == b.id,
        || SpliceError::ExcursionNotFound(id),
        || SpliceError::DuplicateId {
            kind: TargetKind::Excursion,
            id: id.0,
        },
    )
}

/// Replaces a point by id within its excursion, or appends a new one at the end.
pub fn splice_point(excursion: &mut Excursion, point: Point, origin: EditOrigin) -> Result<(), SpliceError> {
    let (excursion_id, point_id) = (excursion.id, point.id);
    splice(
        &mut excursion.points,
        point,
        origin,
        |a, b| a.id == b.id,
        || SpliceError::PointNotFound {
            excursion: excursion_id,
            point: point_id,
        },
        || SpliceError::DuplicateId {
            kind: TargetKind::Point,
            id: point_id.0,
        },
    )
}

/// Replaces an extra part by id within its point, or appends a new one at the end.
pub fn splice_part(point: &mut Point, part: InformationPart, origin: EditOrigin) -> Result<(), SpliceError> {
    let (point_id, part_id) = (point.id, part.id);
    splice(
        &mut point.extra_parts,
        part,
        origin,
        |a, b| a.id == b.id,
        || SpliceError::PartNotFound {
            point: point_id,
            part: part_id,
        },
        || SpliceError::DuplicateId {
            kind: TargetKind::InformationPart,
            id: part_id.0,
        },
    )
}

/// In-memory excursion tree shared by all handlers.
#[derive(Debug)]
pub struct Catalog {
    excursions: RwLock<Vec<Excursion>>,
    ids: IdAllocator,
}

impl Catalog {
    /// Wraps loaded excursions; id counters start above the loaded maxima.
    pub fn new(excursions: Vec<Excursion>) -> Self {
        let ids = IdAllocator::seeded_from(&excursions);
        Self {
            excursions: RwLock::new(excursions),
            ids,
        }
    }

    pub fn ids(&self) -> &IdAllocator {
        &self.ids
    }

    pub async fn snapshot(&self) -> Vec<Excursion> {
        self.excursions.read().await.clone()
    }

    pub async fn excursion(&self, id: ExcursionId) -> Option<Excursion> {
        self.excursions.read().await.iter().find(|e| e.id == id).cloned()
    }

    pub async fn point(&self, excursion_id: ExcursionId, point_id: PointId) -> Option<Point> {
        let excursions = self.excursions.read().await;
        excursions
            .iter()
            .find(|e| e.id == excursion_id)
            .and_then(|e| e.point(point_id))
            .cloned()
    }

    pub async fn part(&self, excursion_id: ExcursionId, point_id: PointId, part_id: PartId) -> Option<InformationPart> {
        let excursions = self.excursions.read().await;
        excursions
            .iter()
            .find(|e| e.id == excursion_id)
            .and_then(|e| e.point(point_id))
            .and_then(|p| p.part(part_id))
            .cloned()
    }

    /// Adds a new excursion once `persist` accepted it.
    pub async fn insert_excursion(
        &self,
        excursion: Excursion,
        persist: impl FnOnce(&Excursion) -> AppResult<()>,
    ) -> Result<(), CommitError> {
        let mut excursions = self.excursions.write().await;
        if excursions.iter().any(|e| e.id == excursion.id) {
            return Err(SpliceError::DuplicateId {
                kind: TargetKind::Excursion,
                id: excursion.id.0,
            }
            .into());
        }
        persist(&excursion)?;
        splice_excursion(&mut excursions, excursion, EditOrigin::Create)?;
        Ok(())
    }

    /// Edits a copy of one excursion, persists it, then swaps it into the tree.
    pub async fn modify_excursion<T>(
        &self,
        id: ExcursionId,
        edit: impl FnOnce(&mut Excursion) -> Result<T, CommitError>,
        persist: impl FnOnce(&Excursion) -> AppResult<()>,
    ) -> Result<T, CommitError> {
        let mut excursions = self.excursions.write().await;
        let mut staged = excursions
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or(SpliceError::ExcursionNotFound(id))?;

        let outcome = edit(&mut staged)?;
        persist(&staged)?;
        splice_excursion(&mut excursions, staged, EditOrigin::Update)?;
        Ok(outcome)
    }

    /// Drops an excursion once `remove` deleted it from storage.
    pub async fn remove_excursion(
        &self,
        id: ExcursionId,
        remove: impl FnOnce(ExcursionId) -> AppResult<()>,
    ) -> Result<Excursion, CommitError> {
        let mut excursions = self.excursions.write().await;
        let index = excursions
            .iter()
            .position(|e| e.id == id)
            .ok_or(SpliceError::ExcursionNotFound(id))?;
        remove(id)?;
        Ok(excursions.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn excursion_with_points(ids: &[i64]) -> Excursion {
        let mut excursion = Excursion::new(ExcursionId(1));
        for id in ids {
            excursion.points.push(Point::new(PointId(*id), excursion.id));
        }
        excursion
    }

    #[test]
    fn update_replaces_in_place() {
        let mut excursion = excursion_with_points(&[1, 2]);
        let mut edited = excursion.points[1].clone();
        edited.content.name = "New Name".into();

        splice_point(&mut excursion, edited, EditOrigin::Update).unwrap();

        let names: Vec<_> = excursion.points.iter().map(|p| (p.id.0, p.name().to_string())).collect();
        assert_eq!(names[0].0, 1);
        assert_eq!(names[1], (2, "New Name".to_string()));
        assert_eq!(excursion.points.len(), 2);
    }

    #[test]
    fn update_of_missing_point_is_an_error_not_an_append() {
        let mut excursion = excursion_with_points(&[1]);
        let ghost = Point::new(PointId(5), excursion.id);

        let err = splice_point(&mut excursion, ghost, EditOrigin::Update).unwrap_err();

        assert_eq!(
            err,
            SpliceError::PointNotFound {
                excursion: ExcursionId(1),
                point: PointId(5)
            }
        );
        assert_eq!(excursion.points.len(), 1);
    }

    #[test]
    fn create_with_taken_id_is_rejected() {
        let mut point = Point::new(PointId(1), ExcursionId(1));
        point.extra_parts.push(InformationPart::new(PartId(3), point.id));

        let err = splice_part(&mut point, InformationPart::new(PartId(3), PointId(1)), EditOrigin::Create).unwrap_err();
        assert!(matches!(err, SpliceError::DuplicateId { id: 3, .. }));
    }

    #[tokio::test]
    async fn failed_persist_keeps_tree_unchanged() {
        let catalog = Catalog::new(vec![excursion_with_points(&[1])]);

        let result = catalog
            .modify_excursion(
                ExcursionId(1),
                |excursion| {
                    excursion.name = "Changed".into();
                    Ok(())
                },
                |_| Err(AppError::Validation("disk full".into())),
            )
            .await;

        assert!(matches!(result, Err(CommitError::Persist(_))));
        assert_eq!(catalog.excursion(ExcursionId(1)).await.unwrap().name, Excursion::new(ExcursionId(1)).name);
    }

    #[tokio::test]
    async fn remove_returns_the_dropped_excursion() {
        let catalog = Catalog::new(vec![excursion_with_points(&[1, 2])]);

        let removed = catalog.remove_excursion(ExcursionId(1), |_| Ok(())).await.unwrap();

        assert_eq!(removed.points.len(), 2);
        assert!(catalog.snapshot().await.is_empty());
        assert!(matches!(
            catalog.remove_excursion(ExcursionId(1), |_| Ok(())).await,
            Err(CommitError::Splice(SpliceError::ExcursionNotFound(_)))
        ));
    }
}
