//! Star rating for finished escape runs.
//!
//! Presentation-layer arithmetic over the two path lengths; the grid engine
//! itself knows nothing about stars.

use maze_escape_core::LevelOutcome;

/// Stars earned for a run: 0 for failed or unfinished runs, then 1 to 3
/// by how closely the walked path tracks the reference path.
pub(crate) fn star_rating(
    outcome: Option<LevelOutcome>,
    optimal_len: usize,
    walked_len: usize,
) -> u8 {
    if outcome != Some(LevelOutcome::Success) || optimal_len == 0 || walked_len == 0 {
        return 0;
    }
    let similarity = optimal_len as f64 / walked_len as f64;
    if similarity >= 0.98 {
        3
    } else if similarity >= 0.8 {
        2
    } else {
        1
    }
}
