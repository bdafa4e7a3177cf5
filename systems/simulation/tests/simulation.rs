use std::time::Duration;

use maze_escape_core::{Command, Event, SimulationTicket};
use maze_escape_system_simulation::Simulation;

const DELAY: Duration = Duration::from_millis(500);
const TICK: Duration = Duration::from_millis(100);

fn ticket(revision: u64) -> SimulationTicket {
    SimulationTicket::new(revision)
}

#[test]
fn completion_fires_once_the_delay_elapses() {
    let mut simulation = Simulation::new(DELAY);
    let mut commands = Vec::new();

    simulation.handle(
        &[Event::SimulationStarted { ticket: ticket(3) }],
        &mut commands,
    );
    assert!(commands.is_empty(), "completion must wait out the delay");
    assert!(simulation.is_pending());

    for _ in 0..4 {
        simulation.handle(&[Event::TimeAdvanced { dt: TICK }], &mut commands);
        assert!(commands.is_empty());
    }

    simulation.handle(&[Event::TimeAdvanced { dt: TICK }], &mut commands);
    assert_eq!(
        commands,
        vec![Command::CompleteSimulation { ticket: ticket(3) }],
    );
    assert!(!simulation.is_pending());
}

#[test]
fn completion_fires_exactly_once() {
    let mut simulation = Simulation::new(DELAY);
    let mut commands = Vec::new();

    simulation.handle(
        &[Event::SimulationStarted { ticket: ticket(0) }],
        &mut commands,
    );
    simulation.handle(&[Event::TimeAdvanced { dt: DELAY }], &mut commands);
    simulation.handle(&[Event::TimeAdvanced { dt: DELAY }], &mut commands);

    assert_eq!(commands.len(), 1, "a ticket completes at most once");
}

#[test]
fn grid_replacement_drops_the_pending_ticket() {
    let invalidations = [
        Event::GridEdited,
        Event::GridResized {
            width: 21,
            height: 15,
        },
        Event::MazeGenerated { seed: 4 },
        Event::LevelImported { id: 9 },
    ];

    for invalidation in invalidations {
        let mut simulation = Simulation::new(DELAY);
        let mut commands = Vec::new();

        simulation.handle(
            &[Event::SimulationStarted { ticket: ticket(1) }],
            &mut commands,
        );
        simulation.handle(std::slice::from_ref(&invalidation), &mut commands);
        simulation.handle(&[Event::TimeAdvanced { dt: DELAY }], &mut commands);

        assert!(
            commands.is_empty(),
            "{invalidation:?} must cancel the pending simulation",
        );
        assert!(!simulation.is_pending());
    }
}

#[test]
fn restart_resets_the_accumulated_delay() {
    let mut simulation = Simulation::new(DELAY);
    let mut commands = Vec::new();

    simulation.handle(
        &[Event::SimulationStarted { ticket: ticket(1) }],
        &mut commands,
    );
    simulation.handle(
        &[Event::TimeAdvanced {
            dt: Duration::from_millis(400),
        }],
        &mut commands,
    );
    simulation.handle(
        &[Event::SimulationStarted { ticket: ticket(2) }],
        &mut commands,
    );
    simulation.handle(
        &[Event::TimeAdvanced {
            dt: Duration::from_millis(400),
        }],
        &mut commands,
    );
    assert!(commands.is_empty(), "the newer ticket starts a fresh delay");

    simulation.handle(
        &[Event::TimeAdvanced {
            dt: Duration::from_millis(100),
        }],
        &mut commands,
    );
    assert_eq!(
        commands,
        vec![Command::CompleteSimulation { ticket: ticket(2) }],
    );
}
