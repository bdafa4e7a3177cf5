#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Maze Escape engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative session state, and pure systems. Adapters submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems
//! and presentation layers to react to deterministically. Events double as
//! the fire-and-forget notification channel for sounds and animations: a
//! renderer keys off [`Event::PlayerMoved`], [`Event::ItemCollected`],
//! [`Event::PlankBroken`] and [`Event::LevelFinished`] without ever reaching
//! back into session state.

use std::time::Duration;

use serde::{Deserialize, Serialize};

mod grid;
pub mod layout;

pub use grid::Grid;
pub use layout::LevelFormatError;

/// Default width of a freshly created builder grid, in cells.
pub const DEFAULT_GRID_WIDTH: u32 = 35;
/// Default height of a freshly created builder grid, in cells.
pub const DEFAULT_GRID_HEIGHT: u32 = 21;
/// Smallest builder grid width accepted by a resize.
pub const MIN_GRID_WIDTH: u32 = 15;
/// Largest builder grid width accepted by a resize.
pub const MAX_GRID_WIDTH: u32 = 51;
/// Smallest builder grid height accepted by a resize.
pub const MIN_GRID_HEIGHT: u32 = 9;
/// Largest builder grid height accepted by a resize.
pub const MAX_GRID_HEIGHT: u32 = 31;

/// Simulated time a runner spends traversing a single path cell.
pub const STEP_TIME: Duration = Duration::from_millis(100);
/// Artificial delay between requesting a simulation and executing the search.
pub const SIMULATION_DELAY: Duration = Duration::from_millis(500);

/// Location of a single grid cell expressed as signed x/y coordinates.
///
/// Coordinates carry no implicit bounds; validity is always relative to a
/// concrete [`Grid`]. The signed representation lets movement arithmetic step
/// one cell past an edge and be rejected by a bounds check instead of
/// wrapping.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Coordinate {
    x: i32,
    y: i32,
}

impl Coordinate {
    /// Creates a new coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal component of the coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical component of the coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Computes the Manhattan distance between two coordinates.
    #[must_use]
    pub const fn manhattan_distance(self, other: Coordinate) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Coordinate one cell away in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        self.step_by(direction, 1)
    }

    /// Coordinate `distance` cells away in the provided direction.
    #[must_use]
    pub const fn step_by(self, direction: Direction, distance: i32) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx * distance,
            y: self.y + dy * distance,
        }
    }
}

/// Cardinal movement directions available to the player and the search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing y.
    North,
    /// Movement toward increasing x.
    East,
    /// Movement toward increasing y.
    South,
    /// Movement toward decreasing x.
    West,
}

impl Direction {
    /// Every cardinal direction in deterministic scan order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Unit delta of the direction as an `(dx, dy)` pair.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// Closed vocabulary of grid tile kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellType {
    /// Open floor.
    Empty,
    /// Impassable wall.
    Wall,
    /// Impassable brick wall, visually distinct from [`CellType::Wall`].
    BrickWall,
    /// Level entry marker. Exactly one per valid grid.
    Start,
    /// Level exit marker. Exactly one per valid grid.
    End,
    /// Hostile actor; adjacent cells form its danger zone.
    Guard,
    /// Hostile actor; adjacent cells form its danger zone.
    Thug,
    /// Display marker for the player figure.
    Player,
    /// Display marker for cells the player has walked.
    PlayerPath,
    /// Display marker for cells on the engine's reference path.
    OptimalPath,
    /// Boarded-up passage; passable only with the crowbar.
    Plank,
    /// Collectable crowbar.
    Crowbar,
    /// Red door; passable only with the red key.
    DoorRed,
    /// Collectable red key.
    KeyRed,
    /// Blue door; passable only with the blue key.
    DoorBlue,
    /// Collectable blue key.
    KeyBlue,
}

impl CellType {
    /// Reports whether the cell blocks movement unconditionally.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        matches!(self, Self::Wall | Self::BrickWall)
    }

    /// Reports whether the cell hosts a hostile actor.
    #[must_use]
    pub const fn is_hostile(self) -> bool {
        matches!(self, Self::Guard | Self::Thug)
    }

    /// Collectable item carried by the cell, if any.
    #[must_use]
    pub const fn item(self) -> Option<ItemKind> {
        match self {
            Self::KeyRed => Some(ItemKind::RedKey),
            Self::KeyBlue => Some(ItemKind::BlueKey),
            Self::Crowbar => Some(ItemKind::Crowbar),
            _ => None,
        }
    }
}

/// Collectable items the player can hold within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Opens red doors.
    RedKey,
    /// Opens blue doors.
    BlueKey,
    /// Breaks planks.
    Crowbar,
}

/// Monotonic set of items collected by the player.
///
/// Flags only ever transition from absent to held; the sole way back is a
/// full session reload. The set is `Copy` and hashable so the pathfinding
/// engine can key search states on `(position, resources)`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ResourceSet {
    has_red_key: bool,
    has_blue_key: bool,
    has_crowbar: bool,
}

impl ResourceSet {
    /// Resource set with nothing collected.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            has_red_key: false,
            has_blue_key: false,
            has_crowbar: false,
        }
    }

    /// Reports whether the provided item is held.
    #[must_use]
    pub const fn has(&self, item: ItemKind) -> bool {
        match item {
            ItemKind::RedKey => self.has_red_key,
            ItemKind::BlueKey => self.has_blue_key,
            ItemKind::Crowbar => self.has_crowbar,
        }
    }

    /// Marks the provided item as held.
    pub fn grant(&mut self, item: ItemKind) {
        match item {
            ItemKind::RedKey => self.has_red_key = true,
            ItemKind::BlueKey => self.has_blue_key = true,
            ItemKind::Crowbar => self.has_crowbar = true,
        }
    }

    /// Reports whether the held items satisfy the cell's entry requirement.
    ///
    /// Solid cells are not a resource question and always answer `true` here;
    /// callers reject them separately.
    #[must_use]
    pub const fn unlocks(&self, cell: CellType) -> bool {
        match cell {
            CellType::DoorRed => self.has_red_key,
            CellType::DoorBlue => self.has_blue_key,
            CellType::Plank => self.has_crowbar,
            _ => true,
        }
    }
}

/// Tuning knobs for the maze generator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MazeSettings {
    corridor_width: u32,
    extra_paths: u32,
    dead_end_density: f32,
}

impl MazeSettings {
    /// Creates settings with every knob clamped into its legal range:
    /// corridor width to `[1, 3]`, extra paths to `[0, 10]`, dead-end
    /// density to `[0, 1]`.
    #[must_use]
    pub fn new(corridor_width: u32, extra_paths: u32, dead_end_density: f32) -> Self {
        Self {
            corridor_width: corridor_width.clamp(1, 3),
            extra_paths: extra_paths.min(10),
            dead_end_density: dead_end_density.clamp(0.0, 1.0),
        }
    }

    /// Width of carved corridors in cells.
    #[must_use]
    pub const fn corridor_width(&self) -> u32 {
        self.corridor_width
    }

    /// Number of loop punctures attempted after the spanning carve.
    #[must_use]
    pub const fn extra_paths(&self) -> u32 {
        self.extra_paths
    }

    /// Fraction of dead ends retained by the pruning pass.
    #[must_use]
    pub const fn dead_end_density(&self) -> f32 {
        self.dead_end_density
    }
}

impl Default for MazeSettings {
    fn default() -> Self {
        Self::new(1, 0, 0.5)
    }
}

/// Top-level editing mode of the builder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MajorTool {
    /// Paint cells with the active material.
    Build,
    /// Select regions and transform them.
    Select,
    /// Paint cells back to empty.
    Erase,
}

impl MajorTool {
    /// Minor tool activated when this major tool is selected.
    #[must_use]
    pub const fn default_minor(self) -> MinorTool {
        match self {
            Self::Build | Self::Erase => MinorTool::Brush,
            Self::Select => MinorTool::SelectArea,
        }
    }

    /// Reports whether the minor tool belongs to this major tool.
    #[must_use]
    pub const fn allows(self, minor: MinorTool) -> bool {
        match self {
            Self::Build | Self::Erase => {
                matches!(minor, MinorTool::Brush | MinorTool::Fill | MinorTool::Rect)
            }
            Self::Select => matches!(
                minor,
                MinorTool::SelectArea | MinorTool::Move | MinorTool::Rotate
            ),
        }
    }
}

/// Specific action within the active major tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MinorTool {
    /// Paint a single cell.
    Brush,
    /// Flood-fill a connected region.
    Fill,
    /// Paint a dragged rectangle.
    Rect,
    /// Drag out a persistent selection.
    SelectArea,
    /// Cut the selection and arm a paste.
    Move,
    /// Rotate the selection 90 degrees clockwise.
    Rotate,
}

/// Terminal result of an escape run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LevelOutcome {
    /// The player reached the end cell.
    Success,
    /// The player stepped into a danger zone.
    Failure,
}

/// Revision-stamped handle for an in-flight builder simulation.
///
/// The world validates the ticket's revision when the simulation completes,
/// so a result scheduled against an older grid is discarded instead of
/// applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SimulationTicket {
    revision: u64,
}

impl SimulationTicket {
    /// Creates a ticket bound to the provided grid revision.
    #[must_use]
    pub const fn new(revision: u64) -> Self {
        Self { revision }
    }

    /// Grid revision the ticket was issued against.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }
}

/// Outcome of a builder simulation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationReport {
    /// The engine found a route from start to end.
    Feasible {
        /// Number of path cells, both endpoints inclusive.
        steps: usize,
        /// Traversal estimate at [`STEP_TIME`] per cell.
        elapsed: Duration,
    },
    /// No route exists on the current grid.
    Unreachable,
}

/// Commands that express all permissible session mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the session clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the escape player advance one cell.
    MovePlayer {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests that the last escape move be rolled back.
    UndoMove,
    /// Switches the builder's major tool.
    SetMajorTool {
        /// Major tool to activate.
        tool: MajorTool,
    },
    /// Switches the builder's minor tool within the active major tool.
    SetMinorTool {
        /// Minor tool to activate.
        tool: MinorTool,
    },
    /// Changes the material painted by build-mode tools.
    SetMaterial {
        /// Cell type to paint with.
        material: CellType,
    },
    /// Replaces the maze generator settings.
    SetMazeSettings {
        /// New generator tuning.
        settings: MazeSettings,
    },
    /// Discards the builder grid and starts over with new dimensions.
    ResizeGrid {
        /// Requested width in cells; normalized to the odd legal range.
        width: u32,
        /// Requested height in cells; normalized to the odd legal range.
        height: u32,
    },
    /// Anchors a new drag selection at the provided cell.
    BeginSelection {
        /// Cell under the pointer when the drag started.
        at: Coordinate,
    },
    /// Extends the drag selection to the provided cell.
    ExtendSelection {
        /// Cell under the pointer right now.
        to: Coordinate,
    },
    /// Applies the active minor tool to the current selection.
    ApplySelection,
    /// Applies the active tool to a single cell (paint, fill or paste).
    CellAction {
        /// Target cell.
        at: Coordinate,
    },
    /// Replaces the builder grid with a generated maze.
    GenerateMaze {
        /// Seed for the generator's randomness source.
        seed: u64,
    },
    /// Requests a simulation of the current builder grid.
    BeginSimulation,
    /// Executes a previously requested simulation.
    CompleteSimulation {
        /// Ticket issued when the simulation was requested.
        ticket: SimulationTicket,
    },
    /// Replaces the builder grid with an imported level payload.
    ImportLevel {
        /// JSON-encoded level object.
        payload: String,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the session clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the player moved between two cells.
    PlayerMoved {
        /// Cell occupied before the move.
        from: Coordinate,
        /// Cell occupied after the move.
        to: Coordinate,
    },
    /// Confirms that the player collected an item.
    ItemCollected {
        /// Item that was collected.
        item: ItemKind,
        /// Cell the item was collected from.
        at: Coordinate,
    },
    /// Confirms that the player broke a plank with the crowbar.
    PlankBroken {
        /// Cell the plank occupied.
        at: Coordinate,
    },
    /// Announces that the escape run reached a terminal state.
    LevelFinished {
        /// Whether the run succeeded or failed.
        outcome: LevelOutcome,
    },
    /// Announces the builder's active tool pair after a switch.
    ToolChanged {
        /// Active major tool.
        major: MajorTool,
        /// Active minor tool.
        minor: MinorTool,
    },
    /// Reports that one or more builder grid cells changed.
    GridEdited,
    /// Reports that the builder grid was recreated with new dimensions.
    GridResized {
        /// Normalized width of the new grid.
        width: u32,
        /// Normalized height of the new grid.
        height: u32,
    },
    /// Reports that the builder grid was replaced by a generated maze.
    MazeGenerated {
        /// Seed the generator ran with.
        seed: u64,
    },
    /// Confirms that an imported level replaced the builder grid.
    LevelImported {
        /// Identifier carried by the imported level.
        id: i64,
    },
    /// Reports that an import was rejected and the grid left untouched.
    LevelImportRejected {
        /// Why the payload was refused.
        reason: LevelFormatError,
    },
    /// Announces that a simulation was requested.
    SimulationStarted {
        /// Ticket the eventual completion must present.
        ticket: SimulationTicket,
    },
    /// Reports the result of a completed simulation.
    SimulationCompleted {
        /// Feasibility and timing of the simulated run.
        report: SimulationReport,
    },
    /// Reports that a stale simulation ticket was discarded unapplied.
    SimulationDiscarded {
        /// Ticket that no longer matched the session state.
        ticket: SimulationTicket,
    },
}
