//! Escape-mode state machine: manual play over a fixed level.

use std::collections::BTreeSet;

use maze_escape_core::layout::{parse_layout, LevelData, LevelFormatError};
use maze_escape_core::{
    CellType, Command, Coordinate, Direction, Event, Grid, ItemKind, LevelOutcome, ResourceSet,
};
use maze_escape_system_pathfinding::{danger_zones, find_path};

/// Manual escape run over a loaded level.
///
/// The session keeps the level's pristine grid alongside the live one:
/// pickups are destructive grid mutations, so undo is implemented as a full
/// replay of the surviving history against the pristine state rather than an
/// incremental rollback. Replay is O(history length) per undo, which is
/// acceptable at the path lengths this game produces.
#[derive(Clone, Debug)]
pub struct EscapeSession {
    level_id: i64,
    pristine: Grid,
    grid: Grid,
    start: Coordinate,
    end: Coordinate,
    optimal_path: Vec<Coordinate>,
    danger: BTreeSet<Coordinate>,
    resources: ResourceSet,
    player: Coordinate,
    history: Vec<Coordinate>,
    outcome: Option<LevelOutcome>,
}

impl EscapeSession {
    /// Parses the level and computes the reference path and danger zones.
    pub fn from_level(level: &LevelData) -> Result<Self, LevelFormatError> {
        let parsed = parse_layout(level)?;
        let optimal_path = find_path(&parsed.grid, parsed.start, parsed.end).unwrap_or_default();
        let danger = danger_zones(&parsed.grid);

        Ok(Self {
            level_id: level.id,
            pristine: parsed.grid.clone(),
            grid: parsed.grid,
            start: parsed.start,
            end: parsed.end,
            optimal_path,
            danger,
            resources: ResourceSet::empty(),
            player: parsed.start,
            history: vec![parsed.start],
            outcome: None,
        })
    }

    pub(crate) fn apply(&mut self, command: Command, out_events: &mut Vec<Event>) {
        match command {
            Command::MovePlayer { direction } => self.move_player(direction, out_events),
            Command::UndoMove => self.undo(),
            _ => {}
        }
    }

    /// Attempts a one-cell step; illegal targets are silent no-ops.
    fn move_player(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        if self.outcome.is_some() {
            return;
        }

        let from = self.player;
        let target = from.step(direction);
        let Some(cell) = self.grid.get(target) else {
            return;
        };
        if cell.is_solid() {
            return;
        }
        if !self.resources.unlocks(cell) {
            return;
        }

        if self.danger.contains(&target) && target != self.end {
            // The failing step is deliberately visible: position and history
            // record the cell that killed the run before play locks.
            self.player = target;
            self.history.push(target);
            self.outcome = Some(LevelOutcome::Failure);
            out_events.push(Event::PlayerMoved { from, to: target });
            out_events.push(Event::LevelFinished {
                outcome: LevelOutcome::Failure,
            });
            return;
        }

        if let Some(item) = cell.item() {
            self.resources.grant(item);
            self.grid.set(target, CellType::Empty);
            out_events.push(Event::ItemCollected { item, at: target });
        } else if cell == CellType::Plank {
            self.grid.set(target, CellType::Empty);
            out_events.push(Event::PlankBroken { at: target });
        }

        self.player = target;
        self.history.push(target);
        out_events.push(Event::PlayerMoved { from, to: target });

        if target == self.end {
            self.outcome = Some(LevelOutcome::Success);
            out_events.push(Event::LevelFinished {
                outcome: LevelOutcome::Success,
            });
        }
    }

    /// Drops the last step and replays the rest from the pristine level.
    fn undo(&mut self) {
        if self.outcome.is_some() || self.history.len() <= 1 {
            return;
        }
        let _ = self.history.pop();

        self.grid = self.pristine.clone();
        self.resources = ResourceSet::empty();
        for index in 1..self.history.len() {
            let at = self.history[index];
            let Some(cell) = self.grid.get(at) else {
                continue;
            };
            if let Some(item) = cell.item() {
                self.resources.grant(item);
                self.grid.set(at, CellType::Empty);
            } else if cell == CellType::Plank && self.resources.has(ItemKind::Crowbar) {
                self.grid.set(at, CellType::Empty);
            }
        }
        self.player = self.history.last().copied().unwrap_or(self.start);
    }

    /// Identifier of the loaded level.
    #[must_use]
    pub const fn level_id(&self) -> i64 {
        self.level_id
    }

    /// Live gameplay grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Location of the start marker.
    #[must_use]
    pub const fn start(&self) -> Coordinate {
        self.start
    }

    /// Location of the end marker.
    #[must_use]
    pub const fn end(&self) -> Coordinate {
        self.end
    }

    /// Reference route computed at load time; empty when unsolvable.
    #[must_use]
    pub fn optimal_path(&self) -> &[Coordinate] {
        &self.optimal_path
    }

    /// Danger zones computed at load time.
    #[must_use]
    pub const fn danger_zones(&self) -> &BTreeSet<Coordinate> {
        &self.danger
    }

    /// Items currently held by the player.
    #[must_use]
    pub const fn resources(&self) -> ResourceSet {
        self.resources
    }

    /// Current player cell.
    #[must_use]
    pub const fn player(&self) -> Coordinate {
        self.player
    }

    /// Visited cells in order, start first.
    #[must_use]
    pub fn history(&self) -> &[Coordinate] {
        &self.history
    }

    /// Terminal outcome, if the run has finished.
    #[must_use]
    pub const fn outcome(&self) -> Option<LevelOutcome> {
        self.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(rows: &[&str]) -> LevelData {
        LevelData {
            id: 1,
            layout: rows.iter().map(|row| (*row).to_owned()).collect(),
        }
    }

    fn session(rows: &[&str]) -> EscapeSession {
        EscapeSession::from_level(&level(rows)).expect("test level parses")
    }

    fn walk(session: &mut EscapeSession, moves: &[Direction]) -> Vec<Event> {
        let mut events = Vec::new();
        for &direction in moves {
            session.apply(Command::MovePlayer { direction }, &mut events);
        }
        events
    }

    #[test]
    fn load_computes_path_and_zones_and_seeds_history() {
        let session = session(&["S_G", "__E"]);

        assert_eq!(session.player(), session.start());
        assert_eq!(session.history(), &[session.start()]);
        assert!(!session.optimal_path().is_empty());
        assert!(session
            .danger_zones()
            .contains(&Coordinate::new(1, 0)));
        assert_eq!(session.outcome(), None);
    }

    #[test]
    fn walls_and_bounds_reject_moves_silently() {
        let mut session = session(&["SW", "_E"]);

        let events = walk(&mut session, &[Direction::East, Direction::North]);
        assert!(events.is_empty());
        assert_eq!(session.player(), session.start());
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn locked_door_without_key_is_a_no_op() {
        let mut session = session(&["S1E"]);

        let events = walk(&mut session, &[Direction::East]);
        assert!(events.is_empty());
        assert_eq!(session.player(), session.start());
        assert_eq!(session.resources(), ResourceSet::empty());
    }

    #[test]
    fn key_pickup_opens_the_matching_door() {
        let mut session = session(&["S!1E"]);

        let events = walk(
            &mut session,
            &[Direction::East, Direction::East, Direction::East],
        );

        assert!(events.contains(&Event::ItemCollected {
            item: ItemKind::RedKey,
            at: Coordinate::new(1, 0),
        }));
        assert_eq!(
            session.grid().get(Coordinate::new(1, 0)),
            Some(CellType::Empty),
            "pickup clears the key cell",
        );
        assert_eq!(session.outcome(), Some(LevelOutcome::Success));
    }

    #[test]
    fn crowbar_breaks_planks_and_emits_the_break() {
        let mut session = session(&["ScpE"]);

        let events = walk(
            &mut session,
            &[Direction::East, Direction::East, Direction::East],
        );

        assert!(events.contains(&Event::PlankBroken {
            at: Coordinate::new(2, 0),
        }));
        assert_eq!(
            session.grid().get(Coordinate::new(2, 0)),
            Some(CellType::Empty)
        );
        assert_eq!(session.outcome(), Some(LevelOutcome::Success));
    }

    #[test]
    fn danger_step_fails_the_run_but_stays_visible() {
        let mut session = session(&["S_G_", "___E"]);

        let events = walk(&mut session, &[Direction::East]);

        assert_eq!(session.outcome(), Some(LevelOutcome::Failure));
        assert_eq!(
            session.player(),
            Coordinate::new(1, 0),
            "the failing step must remain visible",
        );
        assert!(events.contains(&Event::LevelFinished {
            outcome: LevelOutcome::Failure,
        }));

        // Finished runs accept no further movement.
        let after = walk(&mut session, &[Direction::South]);
        assert!(after.is_empty());
        assert_eq!(session.player(), Coordinate::new(1, 0));
    }

    #[test]
    fn reaching_the_end_inside_a_danger_zone_succeeds() {
        let mut session = session(&["S___", "_EG_"]);

        // The end cell sits next to the guard, hence inside its danger
        // zone, but the goal is exempt from the adjacency restriction.
        assert!(session.danger_zones().contains(&session.end()));
        let _ = walk(&mut session, &[Direction::South, Direction::East]);
        assert_eq!(session.outcome(), Some(LevelOutcome::Success));
    }

    #[test]
    fn undo_is_equivalent_to_one_fewer_move() {
        let rows = &["S!1_", "___E"];
        let moves = [
            Direction::East,
            Direction::East,
            Direction::South,
        ];

        let mut undone = session(rows);
        let _ = walk(&mut undone, &moves);
        undone.apply(Command::UndoMove, &mut Vec::new());

        let mut reference = session(rows);
        let _ = walk(&mut reference, &moves[..moves.len() - 1]);

        assert_eq!(undone.player(), reference.player());
        assert_eq!(undone.history(), reference.history());
        assert_eq!(undone.resources(), reference.resources());
        assert_eq!(undone.grid(), reference.grid());
    }

    #[test]
    fn undo_replay_restores_destroyed_pickups() {
        let mut session = session(&["S!_E"]);

        // Collect the key, then step back off it: the key stays collected
        // because the surviving history still crosses its cell.
        let _ = walk(&mut session, &[Direction::East, Direction::East]);
        session.apply(Command::UndoMove, &mut Vec::new());
        assert!(session.resources().has(ItemKind::RedKey));

        // Undoing the pickup itself restores the key to the grid.
        session.apply(Command::UndoMove, &mut Vec::new());
        assert!(!session.resources().has(ItemKind::RedKey));
        assert_eq!(
            session.grid().get(Coordinate::new(1, 0)),
            Some(CellType::KeyRed)
        );
    }

    #[test]
    fn undo_refuses_fresh_and_finished_sessions() {
        let mut fresh = session(&["SE"]);
        fresh.apply(Command::UndoMove, &mut Vec::new());
        assert_eq!(fresh.history().len(), 1);

        let mut finished = session(&["SE"]);
        let _ = walk(&mut finished, &[Direction::East]);
        assert_eq!(finished.outcome(), Some(LevelOutcome::Success));
        finished.apply(Command::UndoMove, &mut Vec::new());
        assert_eq!(finished.history().len(), 2, "finished runs cannot rewind");
    }

    #[test]
    fn unsolvable_levels_load_with_an_empty_reference_path() {
        let session = session(&["SWE"]);
        assert!(session.optimal_path().is_empty());
        assert_eq!(session.outcome(), None);
    }
}
