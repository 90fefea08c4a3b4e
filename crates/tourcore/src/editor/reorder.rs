//! Changing the order of an excursion's points.
//!
//! The admin gets the numbered list of points and answers with the numbers in
//! the new order, e.g. `3 1 2`.

use strum::AsRefStr;
use thiserror::Error;

use crate::content::{Excursion, PointId, SpliceError};

#[derive(Debug, Error, Clone, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum OrderError {
    #[error("`{0}` is not a point number")]
    NotANumber(String),

    #[error("there is no point number {0}")]
    OutOfRange(usize),

    #[error("point number {0} is listed twice")]
    Repeated(usize),

    #[error("expected {expected} numbers, got {got}")]
    WrongCount { expected: usize, got: usize },
}

impl OrderError {
    /// Localization key of the message shown to the user.
    pub fn message_key(&self) -> String {
        format!("order-{}", self.as_ref())
    }
}

/// Turns `"3 1 2"` into the point ids in their new order. `shown` is the list
/// the numbers refer to, in the order it was displayed.
pub fn parse_order(input: &str, shown: &[PointId]) -> Result<Vec<PointId>, OrderError> {
    let mut seen = vec![false; shown.len()];
    let mut order = Vec::with_capacity(shown.len());

    for token in input.split(|c: char| c.is_whitespace() || c == ',').filter(|t| !t.is_empty()) {
        let number: usize = token.parse().map_err(|_| OrderError::NotANumber(token.to_string()))?;
        let index = number
            .checked_sub(1)
            .filter(|index| *index < shown.len())
            .ok_or(OrderError::OutOfRange(number))?;
        if seen[index] {
            return Err(OrderError::Repeated(number));
        }
        seen[index] = true;
        order.push(shown[index]);
    }

    if order.len() != shown.len() {
        return Err(OrderError::WrongCount {
            expected: shown.len(),
            got: order.len(),
        });
    }
    Ok(order)
}

/// Rearranges points to follow `order`. Points added after the list was shown
/// keep their relative order at the end.
pub fn apply_order(excursion: &mut Excursion, order: &[PointId]) -> Result<(), SpliceError> {
    let mut remaining = std::mem::take(&mut excursion.points);
    let mut ordered = Vec::with_capacity(remaining.len());

    for id in order {
        let Some(index) = remaining.iter().position(|point| point.id == *id) else {
            return Err(SpliceError::PointNotFound {
                excursion: excursion.id,
                point: *id,
            });
        };
        ordered.push(remaining.remove(index));
    }

    ordered.extend(remaining);
    excursion.points = ordered;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ExcursionId, Point};
    use pretty_assertions::assert_eq;

    fn ids(raw: &[i64]) -> Vec<PointId> {
        raw.iter().copied().map(PointId).collect()
    }

    #[test]
    fn parses_spaces_and_commas() {
        let shown = ids(&[10, 20, 30]);
        assert_eq!(parse_order("3, 1 2", &shown).unwrap(), ids(&[30, 10, 20]));
    }

    #[test]
    fn rejects_non_permutations() {
        let shown = ids(&[10, 20, 30]);
        assert_eq!(parse_order("1 2", &shown), Err(OrderError::WrongCount { expected: 3, got: 2 }));
        assert_eq!(parse_order("1 1 2", &shown), Err(OrderError::Repeated(1)));
        assert_eq!(parse_order("0 1 2", &shown), Err(OrderError::OutOfRange(0)));
        assert_eq!(parse_order("1 two 3", &shown), Err(OrderError::NotANumber("two".into())));
    }

    #[test]
    fn message_keys_follow_variant_names() {
        assert_eq!(OrderError::Repeated(1).message_key(), "order-repeated");
        assert_eq!(OrderError::WrongCount { expected: 1, got: 2 }.message_key(), "order-wrong-count");
    }

    #[test]
    fn apply_keeps_late_points_at_the_end() {
        let mut excursion = Excursion::new(ExcursionId(1));
        for id in [1, 2, 3] {
            excursion.points.push(Point::new(PointId(id), excursion.id));
        }

        apply_order(&mut excursion, &ids(&[2, 1])).unwrap();

        let order: Vec<_> = excursion.points.iter().map(|p| p.id.0).collect();
        assert_eq!(order, vec![2, 1, 3]);
    }

    #[test]
    fn apply_fails_for_vanished_point() {
        let mut excursion = Excursion::new(ExcursionId(1));
        excursion.points.push(Point::new(PointId(1), excursion.id));

        assert!(apply_order(&mut excursion, &ids(&[1, 9])).is_err());
    }
}
