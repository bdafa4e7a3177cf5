#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure scheduler that turns simulation requests into delayed completions.
//!
//! The builder shows a short "working" indicator before its search runs, so
//! the world emits [`Event::SimulationStarted`] immediately and this system
//! holds the ticket until enough [`Event::TimeAdvanced`] quanta have
//! accumulated, then emits [`Command::CompleteSimulation`]. Any event that
//! replaces the grid while the ticket is pending drops it, so a session torn
//! down or mutated mid-delay never has a stale result applied; the world
//! revalidates the ticket's revision on completion as the second line of
//! defence.

use std::time::Duration;

use maze_escape_core::{Command, Event, SimulationTicket, SIMULATION_DELAY};

/// Pure system that delays simulation execution for user feedback.
#[derive(Debug)]
pub struct Simulation {
    delay: Duration,
    pending: Option<PendingRun>,
}

#[derive(Clone, Copy, Debug)]
struct PendingRun {
    ticket: SimulationTicket,
    remaining: Duration,
}

impl Simulation {
    /// Creates a scheduler with an explicit delay.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Reports whether a ticket is currently waiting out its delay.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Consumes world events and emits a completion once the delay elapses.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::SimulationStarted { ticket } => {
                    self.pending = Some(PendingRun {
                        ticket: *ticket,
                        remaining: self.delay,
                    });
                }
                Event::GridEdited
                | Event::GridResized { .. }
                | Event::MazeGenerated { .. }
                | Event::LevelImported { .. } => {
                    self.pending = None;
                }
                Event::TimeAdvanced { dt } => {
                    let Some(run) = &mut self.pending else {
                        continue;
                    };
                    run.remaining = run.remaining.saturating_sub(*dt);
                    if run.remaining.is_zero() {
                        out.push(Command::CompleteSimulation { ticket: run.ticket });
                        self.pending = None;
                    }
                }
                _ => {}
            }
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SIMULATION_DELAY)
    }
}
