#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives Maze Escape headlessly.
//!
//! The binary is a thin shell around the command/event loop: it translates
//! arguments and move scripts into [`Command`] values, pumps the session and
//! the simulation scheduler, and prints events where a desktop shell would
//! play sounds and animations.

mod score;
mod store;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};

use maze_escape_core::layout::LevelData;
use maze_escape_core::{
    Command, Direction, Event, MazeSettings, SimulationReport, DEFAULT_GRID_HEIGHT,
    DEFAULT_GRID_WIDTH,
};
use maze_escape_system_simulation::Simulation;
use maze_escape_world::{self as world, query, sanitize_on_load, BuilderSnapshot, Preset, Session};

use crate::score::star_rating;
use crate::store::{read_level, BestTimeStore, LevelDir, PresetBook};

const TICK: Duration = Duration::from_millis(100);

/// Headless driver for the Maze Escape grid engine.
#[derive(Debug, Parser)]
#[command(name = "maze-escape", version, about)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Simulate a level and report its feasibility and traversal time.
    Solve {
        /// Path to a level JSON file.
        level: Option<PathBuf>,
        /// Load `level-<id>.json` from the level directory instead.
        #[arg(long, conflicts_with = "level")]
        id: Option<i64>,
        /// Directory searched when `--id` is used.
        #[arg(long, default_value = "levels")]
        levels: PathBuf,
        /// File remembering the best simulated time.
        #[arg(long, default_value = "best-time.json")]
        best_time: PathBuf,
    },
    /// Play a scripted escape run and print its star rating.
    Play {
        /// Path to a level JSON file.
        level: Option<PathBuf>,
        /// Load `level-<id>.json` from the level directory instead.
        #[arg(long, conflicts_with = "level")]
        id: Option<i64>,
        /// Directory searched when `--id` is used.
        #[arg(long, default_value = "levels")]
        levels: PathBuf,
        /// Move script: `u`, `d`, `l`, `r` to step, `z` to undo.
        #[arg(long)]
        moves: String,
    },
    /// Generate a maze and print it as a level JSON object.
    Generate {
        /// Grid width; normalized to the odd legal range.
        #[arg(long, default_value_t = DEFAULT_GRID_WIDTH)]
        width: u32,
        /// Grid height; normalized to the odd legal range.
        #[arg(long, default_value_t = DEFAULT_GRID_HEIGHT)]
        height: u32,
        /// Generator seed; random when omitted.
        #[arg(long)]
        seed: Option<u64>,
        /// Corridor width, 1 to 3.
        #[arg(long, default_value_t = 1)]
        corridor_width: u32,
        /// Extra loop punctures, 0 to 10.
        #[arg(long, default_value_t = 0)]
        extra_paths: u32,
        /// Share of dead ends to keep, 0 to 1.
        #[arg(long, default_value_t = 0.5)]
        dead_end_density: f32,
    },
    /// Save, list and restore named builder presets.
    Preset {
        #[command(subcommand)]
        action: PresetAction,
    },
}

#[derive(Debug, Subcommand)]
enum PresetAction {
    /// Capture a level file as a named preset.
    Save {
        /// Path to a level JSON file.
        level: PathBuf,
        /// Name to store the preset under.
        #[arg(long)]
        name: String,
        /// Preset book file.
        #[arg(long, default_value = "presets.json")]
        book: PathBuf,
    },
    /// List the presets in the book.
    List {
        /// Preset book file.
        #[arg(long, default_value = "presets.json")]
        book: PathBuf,
    },
    /// Restore a preset and print it as a level JSON object.
    Load {
        /// Name of the preset to restore.
        name: String,
        /// Preset book file.
        #[arg(long, default_value = "presets.json")]
        book: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        CliCommand::Solve {
            level,
            id,
            levels,
            best_time,
        } => solve(&locate_level(level, id, levels)?, &BestTimeStore::new(best_time)),
        CliCommand::Play {
            level,
            id,
            levels,
            moves,
        } => play(&locate_level(level, id, levels)?, &moves),
        CliCommand::Generate {
            width,
            height,
            seed,
            corridor_width,
            extra_paths,
            dead_end_density,
        } => generate(
            width,
            height,
            seed,
            MazeSettings::new(corridor_width, extra_paths, dead_end_density),
        ),
        CliCommand::Preset { action } => preset(action),
    }
}

fn locate_level(path: Option<PathBuf>, id: Option<i64>, levels: PathBuf) -> Result<LevelData> {
    match (path, id) {
        (Some(path), _) => read_level(&path),
        (None, Some(id)) => LevelDir::new(levels).load(id),
        (None, None) => bail!("provide a level file or --id"),
    }
}

/// Imports the level into a builder session and runs a full simulation.
fn solve(level: &LevelData, best_time: &BestTimeStore) -> Result<()> {
    let mut session = Session::builder(DEFAULT_GRID_WIDTH, DEFAULT_GRID_HEIGHT);
    let payload = serde_json::to_string(level).context("could not serialize the level")?;

    let mut events = pump(&mut session, vec![Command::ImportLevel { payload }]);
    if let Some(reason) = events.iter().find_map(|event| match event {
        Event::LevelImportRejected { reason } => Some(reason.clone()),
        _ => None,
    }) {
        return Err(anyhow!(reason)).context("the level was rejected on import");
    }

    let mut script = vec![Command::BeginSimulation];
    for _ in 0..8 {
        script.push(Command::Tick { dt: TICK });
    }
    events.extend(pump(&mut session, script));

    let report = events
        .iter()
        .find_map(|event| match event {
            Event::SimulationCompleted { report } => Some(*report),
            _ => None,
        })
        .ok_or_else(|| anyhow!("the simulation never completed"))?;

    for row in render(&query::display_grid(&session)) {
        println!("{row}");
    }
    match report {
        SimulationReport::Feasible { steps, elapsed } => {
            let seconds = elapsed.as_secs_f64();
            println!("feasible: {steps} cells, {seconds:.1}s simulated");
            let best = best_time.get()?;
            if seconds > best {
                best_time.set(seconds)?;
                println!("new best time: {seconds:.1}s (was {best:.1}s)");
            }
        }
        SimulationReport::Unreachable => println!("no route from start to end"),
    }
    Ok(())
}

fn play(level: &LevelData, moves: &str) -> Result<()> {
    let mut session = Session::escape(level)
        .map_err(|reason| anyhow!(reason))
        .context("the level failed to load")?;

    let script = moves
        .chars()
        .map(|key| match key {
            'u' => Ok(Command::MovePlayer {
                direction: Direction::North,
            }),
            'd' => Ok(Command::MovePlayer {
                direction: Direction::South,
            }),
            'l' => Ok(Command::MovePlayer {
                direction: Direction::West,
            }),
            'r' => Ok(Command::MovePlayer {
                direction: Direction::East,
            }),
            'z' => Ok(Command::UndoMove),
            other => Err(anyhow!("unknown move '{other}'")),
        })
        .collect::<Result<Vec<Command>>>()?;

    let events = pump(&mut session, script);
    for event in &events {
        if let Some(line) = describe(event) {
            println!("{line}");
        }
    }

    for row in render(&query::display_grid(&session)) {
        println!("{row}");
    }

    let optimal = query::optimal_path(&session).map_or(0, <[_]>::len);
    let walked = query::player_path(&session).map_or(0, <[_]>::len);
    let stars = star_rating(query::outcome(&session), optimal, walked);
    println!("walked {walked} cells against a {optimal}-cell reference: {stars} star(s)");
    Ok(())
}

fn generate(width: u32, height: u32, seed: Option<u64>, settings: MazeSettings) -> Result<()> {
    let seed = seed.unwrap_or_else(rand::random);
    let mut session = Session::builder(width, height);
    let _ = pump(
        &mut session,
        vec![
            Command::SetMazeSettings { settings },
            Command::GenerateMaze { seed },
        ],
    );

    let exported = query::export_level(&session);
    println!(
        "{}",
        serde_json::to_string_pretty(&exported).context("could not serialize the maze")?
    );
    eprintln!("seed: {seed}");
    Ok(())
}

fn preset(action: PresetAction) -> Result<()> {
    match action {
        PresetAction::Save { level, name, book } => {
            let level = read_level(&level)?;
            let mut session = Session::builder(DEFAULT_GRID_WIDTH, DEFAULT_GRID_HEIGHT);
            let payload = serde_json::to_string(&level).context("could not serialize the level")?;
            let events = pump(&mut session, vec![Command::ImportLevel { payload }]);
            if let Some(reason) = events.iter().find_map(|event| match event {
                Event::LevelImportRejected { reason } => Some(reason.clone()),
                _ => None,
            }) {
                return Err(anyhow!(reason)).context("the level was rejected on import");
            }

            let Session::Builder(builder) = &session else {
                bail!("preset capture requires a builder session");
            };
            let book = PresetBook::new(book);
            let mut presets = book.load()?;
            presets.push(Preset {
                name: name.clone(),
                snapshot: BuilderSnapshot::capture(builder),
            });
            book.save(&presets)?;
            println!("saved preset '{name}'");
        }
        PresetAction::List { book } => {
            for preset in PresetBook::new(book).load()? {
                println!(
                    "{} ({}x{})",
                    preset.name, preset.snapshot.width, preset.snapshot.height,
                );
            }
        }
        PresetAction::Load { name, book } => {
            let preset = PresetBook::new(book).find(&name)?;
            let session = sanitize_on_load(&preset.snapshot)
                .map_err(|reason| anyhow!(reason))
                .context("the preset no longer restores cleanly")?;
            let exported = query::export_level(&Session::Builder(session));
            println!(
                "{}",
                serde_json::to_string_pretty(&exported).context("could not serialize the preset")?
            );
        }
    }
    Ok(())
}

/// Pumps commands through the session and the simulation scheduler.
fn pump(session: &mut Session, script: Vec<Command>) -> Vec<Event> {
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

/// Renders a display grid for the terminal, keeping the overlay markers
/// the wire format would flatten to empty floor.
fn render(grid: &maze_escape_core::Grid) -> Vec<String> {
    use maze_escape_core::layout::cell_to_char;
    use maze_escape_core::{CellType, Coordinate};

    let mut rows = Vec::with_capacity(grid.height() as usize);
    for y in 0..grid.height() as i32 {
        let mut row = String::with_capacity(grid.width() as usize);
        for x in 0..grid.width() as i32 {
            let cell = grid
                .get(Coordinate::new(x, y))
                .unwrap_or(CellType::Empty);
            row.push(match cell {
                CellType::Player => 'P',
                CellType::PlayerPath => '.',
                CellType::OptimalPath => '*',
                other => cell_to_char(other),
            });
        }
        rows.push(row);
    }
    rows
}

/// Renders an event as the notification a shell would voice, if any.
fn describe(event: &Event) -> Option<String> {
    match event {
        Event::PlayerMoved { to, .. } => Some(format!("step to ({}, {})", to.x(), to.y())),
        Event::ItemCollected { item, .. } => Some(format!("picked up {item:?}")),
        Event::PlankBroken { .. } => Some("plank breaks".to_owned()),
        Event::LevelFinished { outcome } => Some(format!("finished: {outcome:?}")),
        _ => None,
    }
}
