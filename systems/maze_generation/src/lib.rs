#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Randomized maze carving with a connectivity guarantee.
//!
//! The generator runs a growing-tree carve over a wall-filled grid, punches
//! optional loop cells into the spanning structure, prunes a configurable
//! share of dead ends and finally force-writes the start and end markers.
//! All randomness flows through the caller-supplied [`Rng`], so identical
//! seeds reproduce identical grids under test.

use maze_escape_core::{CellType, Coordinate, Direction, Grid, MazeSettings};
use rand::seq::SliceRandom;
use rand::Rng;

/// Generates a maze of the requested dimensions with the markers in place.
///
/// The carve seeds at the odd-parity cell nearest `start`, which keeps the
/// lattice aligned with the one-cell wall margin. Dead-end pruning skips the
/// endpoint cells and their orthogonal neighbors: pruned cells are always
/// leaves of the spanning tree, so the surviving open cells stay connected,
/// and protecting the endpoint approaches keeps that property intact once
/// the markers are force-written.
#[must_use]
pub fn generate(
    width: u32,
    height: u32,
    start: Coordinate,
    end: Coordinate,
    settings: &MazeSettings,
    rng: &mut impl Rng,
) -> Grid {
    let mut grid = Grid::filled(width, height, CellType::Wall);
    let step = settings.corridor_width() as i32 + 1;

    carve_passages(&mut grid, start, step, rng);
    punch_loops(&mut grid, settings.extra_paths(), rng);
    prune_dead_ends(&mut grid, start, end, settings.dead_end_density(), rng);

    grid.set(start, CellType::Start);
    grid.set(end, CellType::End);
    open_approach(&mut grid, start);
    open_approach(&mut grid, end);

    grid
}

/// Depth-first growing-tree carve over a `step`-spaced lattice.
fn carve_passages(grid: &mut Grid, start: Coordinate, step: i32, rng: &mut impl Rng) {
    let seed = odd_align(start);
    if !inside(grid, seed, 1) {
        return;
    }
    grid.set(seed, CellType::Empty);

    let mut stack = vec![seed];
    while let Some(&current) = stack.last() {
        let mut directions = Direction::ALL;
        directions.shuffle(rng);

        let next = directions
            .into_iter()
            .map(|direction| current.step_by(direction, step))
            .find(|&candidate| {
                inside(grid, candidate, 1) && grid.get(candidate) == Some(CellType::Wall)
            });

        match next {
            Some(next) => {
                carve_block(grid, current, next, step);
                stack.push(next);
            }
            None => {
                let _ = stack.pop();
            }
        }
    }
}

/// Opens every cell on the straight run between two lattice neighbors.
fn carve_block(grid: &mut Grid, current: Coordinate, next: Coordinate, step: i32) {
    let sx = (next.x() - current.x()) / step;
    let sy = (next.y() - current.y()) / step;
    for i in 0..=step {
        for j in 0..=step {
            let cell = Coordinate::new(current.x() + i * sx, current.y() + j * sy);
            if inside(grid, cell, 0) {
                grid.set(cell, CellType::Empty);
            }
        }
    }
}

/// Attempts `count` random single-wall punctures that join two open runs.
///
/// A wall qualifies only when both its vertical or both its horizontal
/// neighbors are already open, so every puncture introduces a cycle rather
/// than a new dead end.
fn punch_loops(grid: &mut Grid, count: u32, rng: &mut impl Rng) {
    if grid.width() < 3 || grid.height() < 3 {
        return;
    }
    for _ in 0..count {
        let x = rng.gen_range(1..grid.width() as i32 - 1);
        let y = rng.gen_range(1..grid.height() as i32 - 1);
        let candidate = Coordinate::new(x, y);
        if grid.get(candidate) != Some(CellType::Wall) {
            continue;
        }
        let open = |direction: Direction| {
            grid.get(candidate.step(direction)) == Some(CellType::Empty)
        };
        if (open(Direction::North) && open(Direction::South))
            || (open(Direction::West) && open(Direction::East))
        {
            grid.set(candidate, CellType::Empty);
        }
    }
}

/// Re-walls a `1 - density` share of the maze's dead ends.
fn prune_dead_ends(
    grid: &mut Grid,
    start: Coordinate,
    end: Coordinate,
    density: f32,
    rng: &mut impl Rng,
) {
    let mut dead_ends = collect_dead_ends(grid, start, end);
    dead_ends.shuffle(rng);
    let fill = (dead_ends.len() as f32 * (1.0 - density)).floor() as usize;
    for cell in dead_ends.into_iter().take(fill) {
        grid.set(cell, CellType::Wall);
    }
}

/// Interior open cells with exactly one open orthogonal neighbor.
///
/// Cells on or next to an endpoint are exempt so the marker pass never finds
/// its approach sealed.
fn collect_dead_ends(grid: &Grid, start: Coordinate, end: Coordinate) -> Vec<Coordinate> {
    let mut dead_ends = Vec::new();
    for y in 1..grid.height() as i32 - 1 {
        for x in 1..grid.width() as i32 - 1 {
            let cell = Coordinate::new(x, y);
            if grid.get(cell) != Some(CellType::Empty) {
                continue;
            }
            if cell.manhattan_distance(start) <= 1 || cell.manhattan_distance(end) <= 1 {
                continue;
            }
            let open = grid
                .neighbors(cell)
                .filter(|&neighbor| grid.get(neighbor) == Some(CellType::Empty))
                .count();
            if open == 1 {
                dead_ends.push(cell);
            }
        }
    }
    dead_ends
}

/// Carves one orthogonal neighbor open when an endpoint is fully sealed.
fn open_approach(grid: &mut Grid, marker: Coordinate) {
    let sealed = grid.neighbors(marker).all(|neighbor| {
        matches!(
            grid.get(neighbor),
            Some(CellType::Wall) | Some(CellType::BrickWall)
        )
    });
    if !sealed {
        return;
    }

    let candidate = Direction::ALL
        .into_iter()
        .map(|direction| marker.step(direction))
        .find(|&neighbor| inside(grid, neighbor, 1))
        .or_else(|| grid.neighbors(marker).next());
    if let Some(neighbor) = candidate {
        grid.set(neighbor, CellType::Empty);
    }
}

/// Nudges even components up by one so the cell sits on the odd lattice.
const fn odd_align(at: Coordinate) -> Coordinate {
    let x = if at.x() % 2 != 0 { at.x() } else { at.x() + 1 };
    let y = if at.y() % 2 != 0 { at.y() } else { at.y() + 1 };
    Coordinate::new(x, y)
}

const fn inside(grid: &Grid, at: Coordinate, margin: i32) -> bool {
    at.x() >= margin
        && at.x() < grid.width() as i32 - margin
        && at.y() >= margin
        && at.y() < grid.height() as i32 - margin
}
