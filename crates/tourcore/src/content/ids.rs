//! Entity identifiers and the allocator handing them out.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

use serde::{Deserialize, Serialize};

use super::Excursion;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    };
}

entity_id!(
    /// Identifier of an excursion.
    ExcursionId
);
entity_id!(
    /// Identifier of a point, unique across all excursions.
    PointId
);
entity_id!(
    /// Identifier of an extra information part, unique across all points.
    PartId
);

/// Hands out fresh ids per entity type. Ids are never reused within a run.
#[derive(Debug, Default)]
pub struct IdAllocator {
    excursion: AtomicI64,
    point: AtomicI64,
    part: AtomicI64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts every counter above the largest id already present in `excursions`.
    pub fn seeded_from(excursions: &[Excursion]) -> Self {
        let points = excursions.iter().flat_map(|e| e.points.iter());
        let max_point = points.clone().map(|p| p.id.0).max().unwrap_or(0);
        let max_part = points
            .flat_map(|p| p.extra_parts.iter())
            .map(|part| part.id.0)
            .max()
            .unwrap_or(0);
        let max_excursion = excursions.iter().map(|e| e.id.0).max().unwrap_or(0);

        Self {
            excursion: AtomicI64::new(max_excursion),
            point: AtomicI64::new(max_point),
            part: AtomicI64::new(max_part),
        }
    }

    pub fn next_excursion(&self) -> ExcursionId {
        ExcursionId(self.excursion.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn next_point(&self) -> PointId {
        PointId(self.point.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn next_part(&self) -> PartId {
        PartId(self.part.fetch_add(1, Ordering::SeqCst) + 1)
    }
}
