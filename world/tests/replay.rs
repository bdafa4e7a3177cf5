use std::time::Duration;

use maze_escape_core::layout::LevelData;
use maze_escape_core::{
    CellType, Command, Coordinate, Direction, Event, LevelOutcome, MajorTool, MinorTool,
    SimulationReport,
};
use maze_escape_system_simulation::Simulation;
use maze_escape_world::{self as world, query, Session};

const TICK: Duration = Duration::from_millis(100);

/// Runs a command script through the session and the simulation scheduler,
/// the way an adapter would: world events feed the scheduler, scheduler
/// commands feed back into the world within the same frame.
fn replay(session: &mut Session, script: Vec<Command>) -> Vec<Event> {
    let mut simulation = Simulation::default();
    let mut log = Vec::new();

    for command in script {
        let mut events = Vec::new();
        world::apply(session, command, &mut events);

        loop {
            let mut commands = Vec::new();
            simulation.handle(&events, &mut commands);
            log.extend(events.drain(..));
            if commands.is_empty() {
                break;
            }
            for command in commands {
                world::apply(session, command, &mut events);
            }
        }
    }

    log
}

fn escape_level() -> LevelData {
    LevelData {
        id: 3,
        layout: vec![
            "S!1__".to_owned(),
            "WWWW_".to_owned(),
            "E____".to_owned(),
        ],
    }
}

#[test]
fn escape_replay_is_deterministic() {
    let script = || {
        vec![
            Command::MovePlayer {
                direction: Direction::East,
            },
            Command::MovePlayer {
                direction: Direction::East,
            },
            Command::UndoMove,
            Command::MovePlayer {
                direction: Direction::East,
            },
            Command::MovePlayer {
                direction: Direction::East,
            },
            Command::MovePlayer {
                direction: Direction::East,
            },
        ]
    };

    let mut first = Session::escape(&escape_level()).expect("level loads");
    let mut second = Session::escape(&escape_level()).expect("level loads");
    let first_events = replay(&mut first, script());
    let second_events = replay(&mut second, script());

    assert_eq!(first_events, second_events, "replay diverged between runs");
    assert_eq!(
        query::player_position(&first),
        query::player_position(&second)
    );
    assert_eq!(query::player_path(&first), query::player_path(&second));
}

#[test]
fn escape_session_walks_to_victory() {
    let level = LevelData {
        id: 4,
        layout: vec!["S__E".to_owned()],
    };
    let mut session = Session::escape(&level).expect("level loads");

    let events = replay(
        &mut session,
        vec![
            Command::MovePlayer {
                direction: Direction::East,
            },
            Command::MovePlayer {
                direction: Direction::East,
            },
            Command::MovePlayer {
                direction: Direction::East,
            },
        ],
    );

    assert_eq!(query::outcome(&session), Some(LevelOutcome::Success));
    assert!(events.contains(&Event::LevelFinished {
        outcome: LevelOutcome::Success,
    }));
    assert_eq!(
        query::player_path(&session).map(<[Coordinate]>::len),
        Some(4)
    );
}

#[test]
fn builder_simulation_round_trips_through_the_scheduler() {
    let mut session = Session::builder(15, 9);

    // Begin the simulation, then tick the clock past the scheduler's delay;
    // the scheduler must hand the completion back to the world.
    let mut script = vec![Command::BeginSimulation];
    for _ in 0..5 {
        script.push(Command::Tick { dt: TICK });
    }
    let events = replay(&mut session, script);

    let report = events.iter().find_map(|event| match event {
        Event::SimulationCompleted { report } => Some(*report),
        _ => None,
    });
    assert!(
        matches!(report, Some(SimulationReport::Feasible { steps: 13, .. })),
        "a blank 15-wide grid routes straight across in 13 cells, got {report:?}",
    );
    assert!(!query::simulation_pending(&session));
}

#[test]
fn edits_during_the_delay_cancel_the_simulation() {
    let mut session = Session::builder(15, 9);

    let events = replay(
        &mut session,
        vec![
            Command::BeginSimulation,
            Command::Tick { dt: TICK },
            // Tearing the grid down mid-delay discards the pending ticket.
            Command::ResizeGrid {
                width: 21,
                height: 9,
            },
            Command::Tick { dt: TICK },
            Command::Tick { dt: TICK },
            Command::Tick { dt: TICK },
            Command::Tick { dt: TICK },
            Command::Tick { dt: TICK },
        ],
    );

    assert!(
        !events
            .iter()
            .any(|event| matches!(event, Event::SimulationCompleted { .. })),
        "no completion may fire for a torn-down grid",
    );
    assert_eq!(query::simulation_report(&session), None);
}

#[test]
fn builder_edit_and_export_round_trip() {
    let mut session = Session::builder(15, 9);

    let _ = replay(
        &mut session,
        vec![
            Command::SetMaterial {
                material: CellType::BrickWall,
            },
            Command::CellAction {
                at: Coordinate::new(4, 1),
            },
            Command::SetMajorTool {
                tool: MajorTool::Build,
            },
            Command::SetMinorTool {
                tool: MinorTool::Rect,
            },
            Command::BeginSelection {
                at: Coordinate::new(6, 6),
            },
            Command::ExtendSelection {
                to: Coordinate::new(8, 7),
            },
            Command::ApplySelection,
        ],
    );

    let exported = query::export_level(&session);
    let mut imported = Session::builder(15, 9);
    let _ = replay(
        &mut imported,
        vec![Command::ImportLevel {
            payload: serde_json::to_string(&exported).expect("export serializes"),
        }],
    );

    assert_eq!(query::grid(&imported), query::grid(&session));
    assert_eq!(
        query::grid(&imported).get(Coordinate::new(4, 1)),
        Some(CellType::BrickWall)
    );
}

#[test]
fn display_grid_composites_without_mutating_gameplay_cells() {
    let mut session = Session::builder(15, 9);
    let mut script = vec![Command::BeginSimulation];
    for _ in 0..5 {
        script.push(Command::Tick { dt: TICK });
    }
    let _ = replay(&mut session, script);

    let display = query::display_grid(&session);
    assert!(display.count(CellType::OptimalPath) > 0);
    assert_eq!(query::grid(&session).count(CellType::OptimalPath), 0);
}

#[test]
fn commands_foreign_to_the_variant_are_ignored() {
    let mut escape = Session::escape(&escape_level()).expect("level loads");
    let before = query::grid(&escape).clone();
    let events = replay(
        &mut escape,
        vec![
            Command::GenerateMaze { seed: 1 },
            Command::BeginSimulation,
            Command::CellAction {
                at: Coordinate::new(1, 1),
            },
        ],
    );
    assert!(events.is_empty());
    assert_eq!(query::grid(&escape), &before);

    let mut builder = Session::builder(15, 9);
    let events = replay(
        &mut builder,
        vec![
            Command::MovePlayer {
                direction: Direction::East,
            },
            Command::UndoMove,
        ],
    );
    assert!(events.is_empty());
    assert_eq!(query::player_position(&builder), None);
}
