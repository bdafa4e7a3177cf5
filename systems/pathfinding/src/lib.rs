#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Resource-gated shortest-path search over a cell grid.
//!
//! The search state is `(position, resources)`, not position alone: the same
//! cell is legitimately revisited once a key or the crowbar has been picked
//! up, because doors and planks that were impassable before become
//! traversable edges afterwards. The engine is fully deterministic for a
//! fixed grid and endpoints.

use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap, HashMap};

use maze_escape_core::{CellType, Coordinate, Direction, Grid, ResourceSet};

/// Cost of stepping onto an occupied guard cell.
const GUARD_COST: u32 = 10;
/// Cost of stepping onto an occupied thug cell.
const THUG_COST: u32 = 5;

/// Every in-bounds cell orthogonally adjacent to a guard or thug.
///
/// Pure over the grid; sessions recompute it once per grid load rather than
/// maintaining it incrementally. The set is ordered so iteration is
/// deterministic.
#[must_use]
pub fn danger_zones(grid: &Grid) -> BTreeSet<Coordinate> {
    let mut zones = BTreeSet::new();
    for (at, cell) in grid.iter() {
        if cell.is_hostile() {
            for neighbor in grid.neighbors(at) {
                let _ = zones.insert(neighbor);
            }
        }
    }
    zones
}

/// Finds the cheapest route from `start` to `end`, both ends inclusive.
///
/// Successors are the four orthogonal neighbors, rejecting walls, locked
/// doors without their key, planks without the crowbar, and any cell inside
/// a danger zone — unless that cell is the destination itself, so levels
/// bordered by enemies remain solvable. Ordinary steps cost 1; entering a
/// guard or thug cell (reachable only through the goal exemption) costs 10
/// or 5. Returns `None` when the frontier empties without reaching the goal;
/// an unreachable goal is an expected outcome, not an error.
#[must_use]
pub fn find_path(grid: &Grid, start: Coordinate, end: Coordinate) -> Option<Vec<Coordinate>> {
    if !grid.in_bounds(start) || !grid.in_bounds(end) {
        return None;
    }

    let danger = danger_zones(grid);

    let mut nodes = vec![Node {
        position: start,
        resources: ResourceSet::empty(),
        cost: 0,
        parent: None,
    }];
    let mut best_cost: HashMap<(Coordinate, ResourceSet), u32> = HashMap::new();
    let _ = best_cost.insert((start, ResourceSet::empty()), 0);

    let mut frontier = BinaryHeap::new();
    let mut sequence: u64 = 0;
    frontier.push(FrontierEntry {
        priority: start.manhattan_distance(end),
        sequence,
        node: 0,
    });

    let mut sealed: BTreeSet<(Coordinate, ResourceSet)> = BTreeSet::new();

    while let Some(entry) = frontier.pop() {
        let current = nodes[entry.node];
        let key = (current.position, current.resources);
        if !sealed.insert(key) {
            continue;
        }

        if current.position == end {
            return Some(reconstruct(&nodes, entry.node));
        }

        for direction in Direction::ALL {
            let next = current.position.step(direction);
            let Some(cell) = grid.get(next) else {
                continue;
            };
            if next != end && danger.contains(&next) {
                continue;
            }
            if cell.is_solid() {
                continue;
            }
            if !current.resources.unlocks(cell) {
                continue;
            }

            let next_cost = current.cost + step_cost(cell);
            let mut next_resources = current.resources;
            if let Some(item) = cell.item() {
                next_resources.grant(item);
            }

            let next_key = (next, next_resources);
            if sealed.contains(&next_key) {
                continue;
            }
            match best_cost.get(&next_key) {
                Some(&known) if next_cost >= known => continue,
                _ => {}
            }
            let _ = best_cost.insert(next_key, next_cost);

            nodes.push(Node {
                position: next,
                resources: next_resources,
                cost: next_cost,
                parent: Some(entry.node),
            });
            sequence += 1;
            frontier.push(FrontierEntry {
                priority: next_cost + next.manhattan_distance(end),
                sequence,
                node: nodes.len() - 1,
            });
        }
    }

    None
}

const fn step_cost(cell: CellType) -> u32 {
    match cell {
        CellType::Guard => GUARD_COST,
        CellType::Thug => THUG_COST,
        _ => 1,
    }
}

fn reconstruct(nodes: &[Node], goal: usize) -> Vec<Coordinate> {
    let mut path = Vec::new();
    let mut cursor = Some(goal);
    while let Some(index) = cursor {
        path.push(nodes[index].position);
        cursor = nodes[index].parent;
    }
    path.reverse();
    path
}

#[derive(Clone, Copy, Debug)]
struct Node {
    position: Coordinate,
    resources: ResourceSet,
    cost: u32,
    parent: Option<usize>,
}

/// Frontier entry ordered by lowest estimate first, then by discovery order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FrontierEntry {
    priority: u32,
    sequence: u64,
    node: usize,
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_escape_core::layout::{parse_layout, LevelData};

    fn parse(rows: &[&str]) -> (Grid, Coordinate, Coordinate) {
        let level = LevelData {
            id: 0,
            layout: rows.iter().map(|row| (*row).to_owned()).collect(),
        };
        let parsed = parse_layout(&level).expect("test layout parses");
        (parsed.grid, parsed.start, parsed.end)
    }

    #[test]
    fn danger_zones_surround_hostiles_and_clip_bounds() {
        let (grid, _, _) = parse(&["G_S", "__E"]);
        let zones = danger_zones(&grid);

        assert!(zones.contains(&Coordinate::new(1, 0)));
        assert!(zones.contains(&Coordinate::new(0, 1)));
        assert!(!zones.contains(&Coordinate::new(2, 1)));
        assert_eq!(zones.len(), 2);
    }

    #[test]
    fn frontier_orders_by_estimate_then_discovery() {
        let early = FrontierEntry {
            priority: 4,
            sequence: 9,
            node: 0,
        };
        let cheap = FrontierEntry {
            priority: 3,
            sequence: 10,
            node: 1,
        };
        let tied = FrontierEntry {
            priority: 3,
            sequence: 2,
            node: 2,
        };

        let mut heap = BinaryHeap::new();
        heap.push(early);
        heap.push(cheap);
        heap.push(tied);

        assert_eq!(heap.pop().map(|entry| entry.node), Some(2));
        assert_eq!(heap.pop().map(|entry| entry.node), Some(1));
        assert_eq!(heap.pop().map(|entry| entry.node), Some(0));
    }
}
