//! Admin operations that change the tree without a field walk.

use super::controller::EditorController;
use super::reply::Reply;
use super::state::ConversationState;
use crate::content::{CommitError, Excursion, ExcursionId, InformationPart, PartId, Point, PointId, SpliceError};

impl EditorController {
    /// Switches the user into point reordering for one excursion.
    pub async fn begin_reorder(&self, user_id: i64, excursion_id: ExcursionId) -> Vec<Reply> {
        let slot = self.states.slot(user_id);
        let mut state = slot.lock().await;
        self.release(user_id, std::mem::take(&mut *state), "reordering started").await;

        let Some(excursion) = self.catalog.excursion(excursion_id).await else {
            drop(state);
            drop(slot);
            self.states.prune(user_id);
            return vec![Reply::TargetMissing];
        };
        let points: Vec<(PointId, String)> = excursion
            .points
            .iter()
            .map(|point| (point.id, point.name().to_string()))
            .collect();

        log::info!("User {} is reordering {} points of excursion {}", user_id, points.len(), excursion_id);
        *state = ConversationState::ChangingOrder {
            excursion_id,
            shown: points.iter().map(|(id, _)| *id).collect(),
        };
        vec![Reply::OrderPrompt { excursion_id, points }]
    }

    /// Flips the draft flag and returns the new value.
    pub async fn toggle_draft(&self, user_id: i64, excursion_id: ExcursionId) -> Result<bool, CommitError> {
        let is_draft = self
            .catalog
            .modify_excursion(
                excursion_id,
                |excursion| {
                    excursion.is_draft = !excursion.is_draft;
                    Ok(excursion.is_draft)
                },
                |excursion: &Excursion| self.store.save(excursion),
            )
            .await?;
        log::info!(
            "User {} made excursion {} {}",
            user_id,
            excursion_id,
            if is_draft { "a draft" } else { "public" }
        );
        Ok(is_draft)
    }

    pub async fn delete_point(
        &self,
        user_id: i64,
        excursion_id: ExcursionId,
        point_id: PointId,
    ) -> Result<Point, CommitError> {
        let removed = self
            .catalog
            .modify_excursion(
                excursion_id,
                |excursion| {
                    let index = excursion
                        .points
                        .iter()
                        .position(|point| point.id == point_id)
                        .ok_or(SpliceError::PointNotFound {
                            excursion: excursion_id,
                            point: point_id,
                        })?;
                    Ok(excursion.points.remove(index))
                },
                |excursion: &Excursion| self.store.save(excursion),
            )
            .await?;

        log::info!("User {} deleted point {} of excursion {}", user_id, point_id, excursion_id);
        self.delete_files(user_id, removed.media_refs().cloned().collect()).await;
        Ok(removed)
    }

    pub async fn delete_part(
        &self,
        user_id: i64,
        excursion_id: ExcursionId,
        point_id: PointId,
        part_id: PartId,
    ) -> Result<InformationPart, CommitError> {
        let removed = self
            .catalog
            .modify_excursion(
                excursion_id,
                |excursion| {
                    let point = excursion.point_mut(point_id).ok_or(SpliceError::PointNotFound {
                        excursion: excursion_id,
                        point: point_id,
                    })?;
                    let index = point
                        .extra_parts
                        .iter()
                        .position(|part| part.id == part_id)
                        .ok_or(SpliceError::PartNotFound {
                            point: point_id,
                            part: part_id,
                        })?;
                    Ok(point.extra_parts.remove(index))
                },
                |excursion: &Excursion| self.store.save(excursion),
            )
            .await?;

        log::info!("User {} deleted information part {} of point {}", user_id, part_id, point_id);
        self.delete_files(user_id, removed.media_refs().cloned().collect()).await;
        Ok(removed)
    }

    /// Removes the excursion from storage and the tree, then deletes its media.
    pub async fn delete_excursion(&self, user_id: i64, excursion_id: ExcursionId) -> Result<Excursion, CommitError> {
        let removed = self
            .catalog
            .remove_excursion(excursion_id, |id| self.store.delete(id))
            .await?;

        log::info!(
            "User {} deleted excursion {} with {} points",
            user_id,
            excursion_id,
            removed.points.len()
        );
        self.delete_files(user_id, removed.media_refs().cloned().collect()).await;
        Ok(removed)
    }
}
