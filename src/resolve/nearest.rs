//! Nearest-postal-code search.
//!
//! A linear scan is plenty for a few thousand Finnish postal codes. A spatial
//! index can replace it behind the same signature.

use crate::domain::Coordinate;

/// Candidate closest to `target` by flat squared distance on raw degrees.
///
/// Only a strictly smaller distance replaces the current best, so ties keep
/// the first candidate in iteration order. `None` when there are no candidates.
pub fn nearest_candidate<'a, K: ?Sized + 'a>(
    target: Coordinate,
    candidates: impl IntoIterator<Item = (&'a K, Coordinate)>,
) -> Option<(&'a K, f64)> {
    let mut best: Option<(&'a K, f64)> = None;
    for (key, coord) in candidates {
        let distance = target.squared_distance(coord);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((key, distance)),
        }
    }
    best
}
