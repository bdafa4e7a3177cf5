//! Builder-mode state machine: grid editing, transforms and simulation.

use maze_escape_core::layout::{parse_layout, LevelData, LevelFormatError};
use maze_escape_core::{
    CellType, Command, Coordinate, Event, Grid, MajorTool, MazeSettings, MinorTool,
    SimulationReport, SimulationTicket, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH,
    MAX_GRID_HEIGHT, MAX_GRID_WIDTH, MIN_GRID_HEIGHT, MIN_GRID_WIDTH, STEP_TIME,
};
use maze_escape_system_maze_generation::generate;
use maze_escape_system_pathfinding::find_path;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Rectangular fragment cut out of the grid, pending a paste.
#[derive(Clone, Debug)]
struct Clipboard {
    fragment: Grid,
}

/// Interactive editing session over a single grid.
///
/// The grid revision counts every mutation; simulation tickets carry the
/// revision they were issued against so a completion scheduled before a
/// teardown or replacement is discarded instead of applied. While a ticket
/// is pending, editing commands are ignored and the grid stays frozen under
/// the "working" indicator.
#[derive(Clone, Debug)]
pub struct BuilderSession {
    grid: Grid,
    start: Coordinate,
    end: Coordinate,
    major_tool: MajorTool,
    minor_tool: MinorTool,
    material: CellType,
    maze_settings: MazeSettings,
    selection_anchor: Option<Coordinate>,
    selection: Vec<Coordinate>,
    clipboard: Option<Clipboard>,
    overlay: Vec<Coordinate>,
    revision: u64,
    pending: Option<SimulationTicket>,
    report: Option<SimulationReport>,
}

impl BuilderSession {
    /// Creates a blank session, normalizing dimensions to the odd legal range.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let width = normalize(width, MIN_GRID_WIDTH, MAX_GRID_WIDTH);
        let height = normalize(height, MIN_GRID_HEIGHT, MAX_GRID_HEIGHT);

        let mut grid = Grid::filled(width, height, CellType::Empty);
        let start = Coordinate::new(1, height as i32 / 2);
        let end = Coordinate::new(width as i32 - 2, height as i32 / 2);
        grid.set(start, CellType::Start);
        grid.set(end, CellType::End);

        Self {
            grid,
            start,
            end,
            major_tool: MajorTool::Build,
            minor_tool: MinorTool::Brush,
            material: CellType::Wall,
            maze_settings: MazeSettings::default(),
            selection_anchor: None,
            selection: Vec::new(),
            clipboard: None,
            overlay: Vec::new(),
            revision: 0,
            pending: None,
            report: None,
        }
    }

    /// Rebuilds a session from restored parts; transient state starts clean.
    pub(crate) fn from_parts(
        grid: Grid,
        start: Coordinate,
        end: Coordinate,
        maze_settings: MazeSettings,
    ) -> Self {
        Self {
            grid,
            start,
            end,
            major_tool: MajorTool::Build,
            minor_tool: MinorTool::Brush,
            material: CellType::Wall,
            maze_settings,
            selection_anchor: None,
            selection: Vec::new(),
            clipboard: None,
            overlay: Vec::new(),
            revision: 0,
            pending: None,
            report: None,
        }
    }

    pub(crate) fn apply(&mut self, command: Command, out_events: &mut Vec<Event>) {
        match command {
            Command::SetMajorTool { tool } => self.set_major_tool(tool, out_events),
            Command::SetMinorTool { tool } => self.set_minor_tool(tool, out_events),
            Command::SetMaterial { material } => self.set_material(material),
            Command::SetMazeSettings { settings } => self.maze_settings = settings,
            Command::ResizeGrid { width, height } => self.resize(width, height, out_events),
            Command::BeginSelection { at } => self.begin_selection(at),
            Command::ExtendSelection { to } => self.extend_selection(to),
            Command::ApplySelection => self.apply_selection(self.minor_tool, out_events),
            Command::CellAction { at } => self.cell_action(at, out_events),
            Command::GenerateMaze { seed } => self.generate_maze(seed, out_events),
            Command::BeginSimulation => self.begin_simulation(out_events),
            Command::CompleteSimulation { ticket } => {
                self.complete_simulation(ticket, out_events);
            }
            Command::ImportLevel { payload } => self.import_level(&payload, out_events),
            _ => {}
        }
    }

    /// Switching major tool resets the minor tool and any pending selection.
    fn set_major_tool(&mut self, tool: MajorTool, out_events: &mut Vec<Event>) {
        self.major_tool = tool;
        self.minor_tool = tool.default_minor();
        self.clear_selection();
        self.clipboard = None;
        out_events.push(Event::ToolChanged {
            major: self.major_tool,
            minor: self.minor_tool,
        });
    }

    /// Choosing a transform while a selection is live applies it directly.
    fn set_minor_tool(&mut self, tool: MinorTool, out_events: &mut Vec<Event>) {
        if !self.major_tool.allows(tool) {
            return;
        }
        if self.minor_tool == MinorTool::SelectArea
            && tool != MinorTool::SelectArea
            && !self.selection.is_empty()
        {
            self.apply_selection(tool, out_events);
            return;
        }
        self.minor_tool = tool;
        out_events.push(Event::ToolChanged {
            major: self.major_tool,
            minor: self.minor_tool,
        });
    }

    /// Markers and display overlays are not paintable materials.
    fn set_material(&mut self, material: CellType) {
        if matches!(
            material,
            CellType::Start | CellType::End | CellType::Player | CellType::PlayerPath
                | CellType::OptimalPath
        ) {
            return;
        }
        self.material = material;
    }

    fn resize(&mut self, width: u32, height: u32, out_events: &mut Vec<Event>) {
        // A resize is a teardown: the replacement session starts with no
        // pending ticket, so a mid-delay completion dies on the floor.
        *self = Self::new(width, height);
        out_events.push(Event::GridResized {
            width: self.grid.width(),
            height: self.grid.height(),
        });
    }

    fn begin_selection(&mut self, at: Coordinate) {
        if self.pending.is_some() || !self.grid.in_bounds(at) {
            return;
        }
        if !matches!(self.minor_tool, MinorTool::SelectArea | MinorTool::Rect) {
            return;
        }
        self.selection_anchor = Some(at);
        self.selection = vec![at];
    }

    /// Recomputes the dragged rectangle as the pointer moves.
    fn extend_selection(&mut self, to: Coordinate) {
        let Some(anchor) = self.selection_anchor else {
            return;
        };
        if self.pending.is_some() {
            return;
        }
        let to = self.clamp_to_grid(to);

        let min_x = anchor.x().min(to.x());
        let max_x = anchor.x().max(to.x());
        let min_y = anchor.y().min(to.y());
        let max_y = anchor.y().max(to.y());

        self.selection.clear();
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                self.selection.push(Coordinate::new(x, y));
            }
        }
    }

    fn apply_selection(&mut self, tool: MinorTool, out_events: &mut Vec<Event>) {
        if self.pending.is_some() || self.selection.is_empty() {
            // An empty-selection transform is intentionally a no-op, not an
            // error: it is a routine outcome of interactive editing.
            return;
        }
        match tool {
            MinorTool::Rect => self.stamp_selection(out_events),
            MinorTool::Move => self.cut_selection(out_events),
            MinorTool::Rotate => self.rotate_selection(out_events),
            MinorTool::Brush | MinorTool::Fill | MinorTool::SelectArea => {}
        }
    }

    /// Rect release: paint every selected cell except the markers.
    fn stamp_selection(&mut self, out_events: &mut Vec<Event>) {
        let material = self.paint_material();
        for index in 0..self.selection.len() {
            let at = self.selection[index];
            if at == self.start || at == self.end {
                continue;
            }
            self.grid.set(at, material);
        }
        self.clear_selection();
        self.mark_edited(out_events);
    }

    /// Move: cut the selection's bounding box into the clipboard.
    ///
    /// Marker cells stay put and enter the payload as empty floor, so a
    /// paste can never duplicate the start or end.
    fn cut_selection(&mut self, out_events: &mut Vec<Event>) {
        let Some((origin, width, height)) = self.selection_bounds() else {
            return;
        };

        let mut fragment = Grid::filled(width, height, CellType::Empty);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                let at = Coordinate::new(origin.x() + x, origin.y() + y);
                if at == self.start || at == self.end {
                    continue;
                }
                if let Some(cell) = self.grid.get(at) {
                    fragment.set(Coordinate::new(x, y), cell);
                    self.grid.set(at, CellType::Empty);
                }
            }
        }

        self.clipboard = Some(Clipboard { fragment });
        self.minor_tool = MinorTool::Move;
        self.clear_selection();
        self.mark_edited(out_events);
    }

    /// Rotate: turn the bounding-box content 90 degrees clockwise in place.
    ///
    /// Markers inside the box are excluded from the payload and keep their
    /// absolute positions, both as rotation sources and as paste targets.
    fn rotate_selection(&mut self, out_events: &mut Vec<Event>) {
        let Some((origin, width, height)) = self.selection_bounds() else {
            return;
        };

        let mut fragment = Grid::filled(width, height, CellType::Empty);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                let at = Coordinate::new(origin.x() + x, origin.y() + y);
                if at == self.start || at == self.end {
                    continue;
                }
                if let Some(cell) = self.grid.get(at) {
                    fragment.set(Coordinate::new(x, y), cell);
                }
            }
        }

        let mut rotated = Grid::filled(height, width, CellType::Empty);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                let cell = fragment.get(Coordinate::new(x, y)).unwrap_or(CellType::Empty);
                rotated.set(Coordinate::new(height as i32 - 1 - y, x), cell);
            }
        }

        for index in 0..self.selection.len() {
            let at = self.selection[index];
            if at == self.start || at == self.end {
                continue;
            }
            self.grid.set(at, CellType::Empty);
        }

        let mut footprint = Vec::new();
        for y in 0..rotated.height() as i32 {
            for x in 0..rotated.width() as i32 {
                let target = Coordinate::new(origin.x() + x, origin.y() + y);
                if !self.grid.in_bounds(target) {
                    continue;
                }
                if target == self.start || target == self.end {
                    continue;
                }
                let cell = rotated.get(Coordinate::new(x, y)).unwrap_or(CellType::Empty);
                self.grid.set(target, cell);
                footprint.push(target);
            }
        }

        self.selection = footprint;
        self.selection_anchor = None;
        self.minor_tool = MinorTool::Rotate;
        self.mark_edited(out_events);
    }

    fn cell_action(&mut self, at: Coordinate, out_events: &mut Vec<Event>) {
        if self.pending.is_some() || !self.grid.in_bounds(at) {
            return;
        }

        if self.clipboard.is_some() && self.minor_tool == MinorTool::Move {
            self.paste_clipboard(at, out_events);
            return;
        }

        match (self.major_tool, self.minor_tool) {
            (MajorTool::Build | MajorTool::Erase, MinorTool::Brush) => {
                if at == self.start || at == self.end {
                    return;
                }
                self.grid.set(at, self.paint_material());
                self.mark_edited(out_events);
            }
            (MajorTool::Build | MajorTool::Erase, MinorTool::Fill) => {
                self.flood_fill(at, out_events);
            }
            _ => {}
        }
    }

    /// Stamps the armed clipboard at the given origin, clipping overflow.
    fn paste_clipboard(&mut self, at: Coordinate, out_events: &mut Vec<Event>) {
        let Some(clipboard) = self.clipboard.take() else {
            return;
        };
        for y in 0..clipboard.fragment.height() as i32 {
            for x in 0..clipboard.fragment.width() as i32 {
                let target = Coordinate::new(at.x() + x, at.y() + y);
                if !self.grid.in_bounds(target) {
                    continue;
                }
                if target == self.start || target == self.end {
                    continue;
                }
                let cell = clipboard
                    .fragment
                    .get(Coordinate::new(x, y))
                    .unwrap_or(CellType::Empty);
                self.grid.set(target, cell);
            }
        }
        self.clear_selection();
        self.minor_tool = MinorTool::SelectArea;
        self.mark_edited(out_events);
    }

    /// 4-connected flood fill bounded by the original cell type.
    fn flood_fill(&mut self, at: Coordinate, out_events: &mut Vec<Event>) {
        if at == self.start || at == self.end {
            return;
        }
        let Some(target_type) = self.grid.get(at) else {
            return;
        };
        let material = self.paint_material();
        if target_type == material {
            return;
        }

        let mut queue = std::collections::VecDeque::new();
        queue.push_back(at);
        self.grid.set(at, material);

        while let Some(current) = queue.pop_front() {
            let neighbors: Vec<Coordinate> = self.grid.neighbors(current).collect();
            for next in neighbors {
                if self.grid.get(next) != Some(target_type) {
                    continue;
                }
                if next == self.start || next == self.end {
                    continue;
                }
                self.grid.set(next, material);
                queue.push_back(next);
            }
        }
        self.mark_edited(out_events);
    }

    /// Replaces the whole grid with a freshly generated maze.
    fn generate_maze(&mut self, seed: u64, out_events: &mut Vec<Event>) {
        if self.pending.is_some() {
            return;
        }
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.grid = generate(
            self.grid.width(),
            self.grid.height(),
            self.start,
            self.end,
            &self.maze_settings,
            &mut rng,
        );
        self.clear_selection();
        self.clipboard = None;
        self.overlay.clear();
        self.report = None;
        self.revision += 1;
        out_events.push(Event::MazeGenerated { seed });
    }

    fn begin_simulation(&mut self, out_events: &mut Vec<Event>) {
        if self.pending.is_some() {
            return;
        }
        let ticket = SimulationTicket::new(self.revision);
        self.pending = Some(ticket);
        self.report = None;
        self.clear_selection();
        self.clipboard = None;
        out_events.push(Event::SimulationStarted { ticket });
    }

    /// Runs the search for a previously issued ticket.
    ///
    /// A ticket whose revision no longer matches the grid is discarded: the
    /// search never runs and no report is recorded.
    fn complete_simulation(&mut self, ticket: SimulationTicket, out_events: &mut Vec<Event>) {
        match self.pending {
            Some(pending) if pending == ticket => self.pending = None,
            _ => {
                out_events.push(Event::SimulationDiscarded { ticket });
                return;
            }
        }
        if ticket.revision() != self.revision {
            out_events.push(Event::SimulationDiscarded { ticket });
            return;
        }

        let report = match find_path(&self.grid, self.start, self.end) {
            Some(path) => {
                self.overlay = if path.len() > 2 {
                    path[1..path.len() - 1].to_vec()
                } else {
                    Vec::new()
                };
                SimulationReport::Feasible {
                    steps: path.len(),
                    elapsed: STEP_TIME * path.len() as u32,
                }
            }
            None => {
                self.overlay.clear();
                SimulationReport::Unreachable
            }
        };
        self.report = Some(report);
        out_events.push(Event::SimulationCompleted { report });
    }

    /// Replaces the grid from a JSON payload; failures leave it untouched.
    fn import_level(&mut self, payload: &str, out_events: &mut Vec<Event>) {
        if self.pending.is_some() {
            return;
        }
        let level: LevelData = match serde_json::from_str(payload) {
            Ok(level) => level,
            Err(error) => {
                out_events.push(Event::LevelImportRejected {
                    reason: LevelFormatError::MalformedPayload(error.to_string()),
                });
                return;
            }
        };
        let parsed = match parse_layout(&level) {
            Ok(parsed) => parsed,
            Err(reason) => {
                out_events.push(Event::LevelImportRejected { reason });
                return;
            }
        };

        self.grid = parsed.grid;
        self.start = parsed.start;
        self.end = parsed.end;
        self.clear_selection();
        self.clipboard = None;
        self.overlay.clear();
        self.report = None;
        self.revision += 1;
        out_events.push(Event::LevelImported { id: level.id });
    }

    fn mark_edited(&mut self, out_events: &mut Vec<Event>) {
        self.revision += 1;
        self.report = None;
        self.overlay.clear();
        out_events.push(Event::GridEdited);
    }

    fn clear_selection(&mut self) {
        self.selection_anchor = None;
        self.selection.clear();
    }

    const fn paint_material(&self) -> CellType {
        match self.major_tool {
            MajorTool::Build => self.material,
            MajorTool::Select | MajorTool::Erase => CellType::Empty,
        }
    }

    fn selection_bounds(&self) -> Option<(Coordinate, u32, u32)> {
        let min_x = self.selection.iter().map(Coordinate::x).min()?;
        let max_x = self.selection.iter().map(Coordinate::x).max()?;
        let min_y = self.selection.iter().map(Coordinate::y).min()?;
        let max_y = self.selection.iter().map(Coordinate::y).max()?;
        Some((
            Coordinate::new(min_x, min_y),
            (max_x - min_x + 1) as u32,
            (max_y - min_y + 1) as u32,
        ))
    }

    fn clamp_to_grid(&self, at: Coordinate) -> Coordinate {
        Coordinate::new(
            at.x().clamp(0, self.grid.width() as i32 - 1),
            at.y().clamp(0, self.grid.height() as i32 - 1),
        )
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

    /// Active major and minor tool pair.
    #[must_use]
    pub const fn tools(&self) -> (MajorTool, MinorTool) {
        (self.major_tool, self.minor_tool)
    }

    /// Material painted by build-mode tools.
    #[must_use]
    pub const fn material(&self) -> CellType {
        self.material
    }

    /// Maze generator settings.
    #[must_use]
    pub const fn maze_settings(&self) -> &MazeSettings {
        &self.maze_settings
    }

    /// Cells of the live selection.
    #[must_use]
    pub fn selection(&self) -> &[Coordinate] {
        &self.selection
    }

    /// Reports whether a cut fragment awaits a paste.
    #[must_use]
    pub const fn clipboard_armed(&self) -> bool {
        self.clipboard.is_some()
    }

    /// Interior cells of the last simulated route, for display only.
    #[must_use]
    pub fn overlay(&self) -> &[Coordinate] {
        &self.overlay
    }

    /// Monotonic count of grid mutations.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Reports whether a simulation ticket awaits completion.
    #[must_use]
    pub const fn simulation_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Result of the most recent completed simulation.
    #[must_use]
    pub const fn report(&self) -> Option<SimulationReport> {
        self.report
    }
}

impl Default for BuilderSession {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_WIDTH, DEFAULT_GRID_HEIGHT)
    }
}

/// Clamps into the legal range and rounds down to an odd size.
fn normalize(value: u32, min: u32, max: u32) -> u32 {
    let clamped = value.clamp(min, max);
    if clamped % 2 == 0 {
        clamped - 1
    } else {
        clamped
    }
}
