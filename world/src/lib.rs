#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state management for Maze Escape.
//!
//! A [`Session`] owns its grid exclusively: all mutations are synchronous,
//! serialized through [`apply`], and broadcast as events. The two session
//! variants are an explicit sum type — consumers pattern-match the
//! discriminant instead of probing for fields, and commands that do not
//! apply to the active variant are silent no-ops.

mod builder;
mod escape;
mod snapshot;

pub use builder::BuilderSession;
pub use escape::EscapeSession;
pub use snapshot::{sanitize_on_load, BuilderSnapshot, Preset};

use maze_escape_core::layout::{LevelData, LevelFormatError};
use maze_escape_core::{Command, Event};

/// Discriminant of the active session variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionKind {
    /// Scripted escape play over a fixed level.
    Escape,
    /// Interactive grid editing with an automated solver.
    Builder,
}

/// Tagged union of the two session state machines.
#[derive(Clone, Debug)]
pub enum Session {
    /// Manual play against a loaded level.
    Escape(EscapeSession),
    /// Grid editing with transforms, generation and simulation.
    Builder(BuilderSession),
}

impl Session {
    /// Starts an escape run over the provided level.
    pub fn escape(level: &LevelData) -> Result<Self, LevelFormatError> {
        EscapeSession::from_level(level).map(Self::Escape)
    }

    /// Starts a builder session on a blank grid of the given dimensions.
    #[must_use]
    pub fn builder(width: u32, height: u32) -> Self {
        Self::Builder(BuilderSession::new(width, height))
    }

    /// Discriminant of the active variant.
    #[must_use]
    pub const fn kind(&self) -> SessionKind {
        match self {
            Self::Escape(_) => SessionKind::Escape,
            Self::Builder(_) => SessionKind::Builder,
        }
    }
}

/// Applies the provided command to the session, mutating state deterministically.
pub fn apply(session: &mut Session, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => out_events.push(Event::TimeAdvanced { dt }),
        command => match session {
            Session::Escape(escape) => escape.apply(command, out_events),
            Session::Builder(builder) => builder.apply(command, out_events),
        },
    }
}

/// Query functions that provide read-only access to session state.
pub mod query {
    use std::collections::BTreeSet;

    use maze_escape_core::layout::{export_layout, LevelData, CUSTOM_LEVEL_ID};
    use maze_escape_core::{
        CellType, Coordinate, Grid, LevelOutcome, MajorTool, MazeSettings, MinorTool,
        ResourceSet, SimulationReport,
    };

    use super::{Session, SessionKind};

    /// Discriminant of the active session variant.
    #[must_use]
    pub const fn kind(session: &Session) -> SessionKind {
        session.kind()
    }

    /// The gameplay grid owned by the session.
    #[must_use]
    pub const fn grid(session: &Session) -> &Grid {
        match session {
            Session::Escape(escape) => escape.grid(),
            Session::Builder(builder) => builder.grid(),
        }
    }

    /// Location of the start marker.
    #[must_use]
    pub const fn start_position(session: &Session) -> Coordinate {
        match session {
            Session::Escape(escape) => escape.start(),
            Session::Builder(builder) => builder.start(),
        }
    }

    /// Location of the end marker.
    #[must_use]
    pub const fn end_position(session: &Session) -> Coordinate {
        match session {
            Session::Escape(escape) => escape.end(),
            Session::Builder(builder) => builder.end(),
        }
    }

    /// Terminal outcome of an escape run, if the run has finished.
    #[must_use]
    pub const fn outcome(session: &Session) -> Option<LevelOutcome> {
        match session {
            Session::Escape(escape) => escape.outcome(),
            Session::Builder(_) => None,
        }
    }

    /// Current player cell of an escape session.
    #[must_use]
    pub const fn player_position(session: &Session) -> Option<Coordinate> {
        match session {
            Session::Escape(escape) => Some(escape.player()),
            Session::Builder(_) => None,
        }
    }

    /// Cells the escape player has visited, in order, start first.
    #[must_use]
    pub fn player_path(session: &Session) -> Option<&[Coordinate]> {
        match session {
            Session::Escape(escape) => Some(escape.history()),
            Session::Builder(_) => None,
        }
    }

    /// Reference route computed when the escape level was loaded.
    #[must_use]
    pub fn optimal_path(session: &Session) -> Option<&[Coordinate]> {
        match session {
            Session::Escape(escape) => Some(escape.optimal_path()),
            Session::Builder(_) => None,
        }
    }

    /// Danger zones computed when the escape level was loaded.
    #[must_use]
    pub const fn danger_zones(session: &Session) -> Option<&BTreeSet<Coordinate>> {
        match session {
            Session::Escape(escape) => Some(escape.danger_zones()),
            Session::Builder(_) => None,
        }
    }

    /// Items the escape player currently holds.
    #[must_use]
    pub const fn resources(session: &Session) -> Option<ResourceSet> {
        match session {
            Session::Escape(escape) => Some(escape.resources()),
            Session::Builder(_) => None,
        }
    }

    /// Active builder tool pair.
    #[must_use]
    pub const fn tools(session: &Session) -> Option<(MajorTool, MinorTool)> {
        match session {
            Session::Escape(_) => None,
            Session::Builder(builder) => Some(builder.tools()),
        }
    }

    /// Material painted by builder brush, fill and rectangle tools.
    #[must_use]
    pub const fn material(session: &Session) -> Option<CellType> {
        match session {
            Session::Escape(_) => None,
            Session::Builder(builder) => Some(builder.material()),
        }
    }

    /// Maze generator settings of a builder session.
    #[must_use]
    pub const fn maze_settings(session: &Session) -> Option<&MazeSettings> {
        match session {
            Session::Escape(_) => None,
            Session::Builder(builder) => Some(builder.maze_settings()),
        }
    }

    /// Cells of the live builder selection.
    #[must_use]
    pub fn selection(session: &Session) -> Option<&[Coordinate]> {
        match session {
            Session::Escape(_) => None,
            Session::Builder(builder) => Some(builder.selection()),
        }
    }

    /// Reports whether a cut fragment is armed for pasting.
    #[must_use]
    pub const fn clipboard_armed(session: &Session) -> bool {
        match session {
            Session::Escape(_) => false,
            Session::Builder(builder) => builder.clipboard_armed(),
        }
    }

    /// Reports whether a simulation ticket is awaiting completion.
    #[must_use]
    pub const fn simulation_pending(session: &Session) -> bool {
        match session {
            Session::Escape(_) => false,
            Session::Builder(builder) => builder.simulation_pending(),
        }
    }

    /// Result of the most recent completed simulation.
    #[must_use]
    pub const fn simulation_report(session: &Session) -> Option<SimulationReport> {
        match session {
            Session::Escape(_) => None,
            Session::Builder(builder) => builder.report(),
        }
    }

    /// Grid with display markers composited over the gameplay cells.
    ///
    /// Escape sessions overlay the walked path and the player figure;
    /// builder sessions overlay the most recent simulated route. Gameplay
    /// cells themselves are never mutated by either overlay.
    #[must_use]
    pub fn display_grid(session: &Session) -> Grid {
        match session {
            Session::Escape(escape) => {
                let mut grid = escape.grid().clone();
                for &at in escape.history() {
                    grid.set(at, CellType::PlayerPath);
                }
                grid.set(escape.start(), CellType::Start);
                grid.set(escape.end(), CellType::End);
                grid.set(escape.player(), CellType::Player);
                grid
            }
            Session::Builder(builder) => {
                let mut grid = builder.grid().clone();
                for &at in builder.overlay() {
                    grid.set(at, CellType::OptimalPath);
                }
                grid
            }
        }
    }

    /// Current grid re-serialized through the level wire format.
    #[must_use]
    pub fn export_level(session: &Session) -> LevelData {
        let id = match session {
            Session::Escape(escape) => escape.level_id(),
            Session::Builder(_) => CUSTOM_LEVEL_ID,
        };
        LevelData {
            id,
            layout: export_layout(grid(session)),
        }
    }
}
