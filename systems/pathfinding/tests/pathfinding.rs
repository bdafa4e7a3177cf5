use maze_escape_core::layout::{parse_layout, LevelData};
use maze_escape_core::{CellType, Coordinate, Grid};
use maze_escape_system_pathfinding::{danger_zones, find_path};

fn parse(rows: &[&str]) -> (Grid, Coordinate, Coordinate) {
    let level = LevelData {
        id: 0,
        layout: rows.iter().map(|row| (*row).to_owned()).collect(),
    };
    let parsed = parse_layout(&level).expect("test layout parses");
    (parsed.grid, parsed.start, parsed.end)
}

fn solve(rows: &[&str]) -> Option<Vec<Coordinate>> {
    let (grid, start, end) = parse(rows);
    find_path(&grid, start, end)
}

#[test]
fn path_endpoints_are_start_and_end() {
    let (grid, start, end) = parse(&["S____", "_WWW_", "_W_W_", "_WWW_", "____E"]);
    let path = find_path(&grid, start, end).expect("level is solvable");

    assert_eq!(path.first(), Some(&start));
    assert_eq!(path.last(), Some(&end));
}

#[test]
fn threads_around_a_block_in_nine_cells() {
    let path = solve(&["S____", "_WWW_", "_W_W_", "_WWW_", "____E"])
        .expect("level is solvable");
    assert_eq!(path.len(), 9, "route must hug one side of the block");
}

#[test]
fn straight_corridor_is_walked_end_to_end() {
    let path = solve(&["S___E"]).expect("corridor is solvable");
    assert_eq!(
        path,
        vec![
            Coordinate::new(0, 0),
            Coordinate::new(1, 0),
            Coordinate::new(2, 0),
            Coordinate::new(3, 0),
            Coordinate::new(4, 0),
        ],
    );
}

#[test]
fn walls_without_a_gap_are_unsolvable() {
    assert_eq!(solve(&["S_W_E"]), None);
    assert_eq!(solve(&["S_B_E"]), None);
}

#[test]
fn key_is_collected_before_its_door() {
    let path = solve(&["S_!__", "WWWW1", "E___1", "WWWW_", "_____"])
        .expect("door opens once the key is held");

    let key_at = path
        .iter()
        .position(|&at| at == Coordinate::new(2, 0))
        .expect("path visits the key");
    let door_at = path
        .iter()
        .position(|&at| at == Coordinate::new(4, 1))
        .expect("path passes the door");
    assert!(key_at < door_at, "key must precede the door on the path");
}

#[test]
fn locked_door_without_key_blocks_the_route() {
    assert_eq!(solve(&["S_1_E"]), None);
    assert_eq!(solve(&["S_2_E"]), None);
}

#[test]
fn crowbar_is_collected_before_any_plank() {
    let path = solve(&["S_c__", "WWWWp", "E___p", "WWWW_", "_____"])
        .expect("planks break once the crowbar is held");

    let crowbar_at = path
        .iter()
        .position(|&at| at == Coordinate::new(2, 0))
        .expect("path visits the crowbar");
    let plank_at = path
        .iter()
        .position(|&at| at == Coordinate::new(4, 1))
        .expect("path passes a plank");
    assert!(crowbar_at < plank_at, "crowbar must precede the plank");
}

#[test]
fn plank_without_crowbar_blocks_the_route() {
    assert_eq!(solve(&["S_p_E"]), None);
}

#[test]
fn detour_through_a_door_reuses_a_visited_cell() {
    // The key sits in a cul-de-sac: the route must walk in, grab it, walk
    // back over the same cells with the richer resource state and only then
    // pass the door.
    let path = solve(&["S_1E", "W_WW", "W!WW"]).expect("detour is solvable");

    let mut seen = std::collections::HashMap::new();
    for &at in &path {
        *seen.entry(at).or_insert(0u32) += 1;
    }
    assert!(
        seen.values().any(|&count| count > 1),
        "the cul-de-sac forces a cell revisit",
    );
    assert_eq!(path.first(), Some(&Coordinate::new(0, 0)));
    assert_eq!(path.last(), Some(&Coordinate::new(3, 0)));
}

#[test]
fn danger_zone_cells_are_avoided() {
    // The direct middle row passes next to the guard; the route must take
    // the southern detour even though it is longer.
    let (grid, start, end) = parse(&["__G__", "S___E", "_____"]);
    let path = find_path(&grid, start, end).expect("detour exists");
    let zones = danger_zones(&grid);

    for at in &path[..path.len() - 1] {
        assert!(
            !zones.contains(at),
            "non-goal path cell {at:?} sits in a danger zone",
        );
    }
}

#[test]
fn goal_inside_a_danger_zone_is_still_reachable() {
    let (grid, start, end) = parse(&["S____", "_____", "__EG_"]);
    let path = find_path(&grid, start, end).expect("goal exemption applies");
    assert_eq!(path.last(), Some(&end));
    assert!(danger_zones(&grid).contains(&end));
}

#[test]
fn guard_cell_is_traversable_at_a_premium() {
    // Start sits next to the guard, so the guard cell itself is the only way
    // through; the goal exemption then admits the end cell.
    let (grid, start, end) = parse(&["SGE"]);
    let path = find_path(&grid, start, end).expect("guard can be crossed");
    assert_eq!(
        path,
        vec![
            Coordinate::new(0, 0),
            Coordinate::new(1, 0),
            Coordinate::new(2, 0),
        ],
    );
}

#[test]
fn cheap_detour_beats_a_short_walk_over_the_guard() {
    // Through the guard: two steps costing 11. Around the block: six steps
    // costing 6. The search must prefer the cheaper, longer route.
    let (grid, start, end) = parse(&["SGE", "_W_", "___"]);
    let path = find_path(&grid, start, end).expect("detour exists");
    assert_eq!(path.len(), 7);
    assert!(
        !path.contains(&Coordinate::new(1, 0)),
        "the guard cell costs more than the full detour",
    );
}

#[test]
fn start_equal_to_end_returns_the_single_cell() {
    let mut grid = Grid::filled(3, 3, CellType::Empty);
    grid.set(Coordinate::new(1, 1), CellType::Start);
    let at = Coordinate::new(1, 1);
    assert_eq!(find_path(&grid, at, at), Some(vec![at]));
}

#[test]
fn out_of_bounds_endpoints_report_not_found() {
    let grid = Grid::filled(3, 3, CellType::Empty);
    assert_eq!(
        find_path(&grid, Coordinate::new(-1, 0), Coordinate::new(2, 2)),
        None
    );
    assert_eq!(
        find_path(&grid, Coordinate::new(0, 0), Coordinate::new(3, 0)),
        None
    );
}

#[test]
fn search_is_deterministic_for_a_fixed_grid() {
    let rows = &["S____", "_WW__", "___W_", "_W___", "____E"];
    let first = solve(rows).expect("solvable");
    let second = solve(rows).expect("solvable");
    assert_eq!(first, second, "identical inputs must yield identical paths");
}
