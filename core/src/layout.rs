//! Level wire format: character layouts and their parsing rules.
//!
//! A level is a JSON object `{ "id": …, "layout": ["W_S…", …] }` whose rows
//! map one character to one cell. Import and export both go through the
//! table below; display-only markers have no character and export as empty.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CellType, Coordinate, Grid};

/// Level identifier stamped onto grids exported from the builder.
pub const CUSTOM_LEVEL_ID: i64 = 99;

/// Wire representation of a level or preset layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelData {
    /// Stable identifier of the level.
    pub id: i64,
    /// Equal-length rows of layout characters, top row first.
    pub layout: Vec<String>,
}

/// Grid plus the marker coordinates recovered while parsing a layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedLevel {
    /// The parsed cell grid.
    pub grid: Grid,
    /// Location of the unique start marker.
    pub start: Coordinate,
    /// Location of the unique end marker.
    pub end: Coordinate,
}

/// Reasons a level payload is refused.
///
/// Import failures never partially apply: the caller's grid is left exactly
/// as it was.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LevelFormatError {
    /// The payload was not a well-formed level object.
    #[error("level payload is malformed: {0}")]
    MalformedPayload(String),
    /// The layout contained no rows or no columns.
    #[error("level {id} has an empty layout")]
    EmptyLayout {
        /// Identifier of the offending level.
        id: i64,
    },
    /// A row's length differed from the first row's.
    #[error("level {id} has a ragged layout at row {row}")]
    RaggedLayout {
        /// Identifier of the offending level.
        id: i64,
        /// Zero-based index of the mismatched row.
        row: usize,
    },
    /// No start marker was found anywhere in the layout.
    #[error("level {id} is missing a start (S) marker")]
    MissingStart {
        /// Identifier of the offending level.
        id: i64,
    },
    /// No end marker was found anywhere in the layout.
    #[error("level {id} is missing an end (E) marker")]
    MissingEnd {
        /// Identifier of the offending level.
        id: i64,
    },
    /// More than one start marker was found.
    #[error("level {id} has more than one start (S) marker")]
    DuplicateStart {
        /// Identifier of the offending level.
        id: i64,
    },
    /// More than one end marker was found.
    #[error("level {id} has more than one end (E) marker")]
    DuplicateEnd {
        /// Identifier of the offending level.
        id: i64,
    },
}

/// Cell type denoted by a layout character, if the character is mapped.
#[must_use]
pub const fn char_to_cell(character: char) -> Option<CellType> {
    match character {
        'W' => Some(CellType::Wall),
        'B' => Some(CellType::BrickWall),
        'S' => Some(CellType::Start),
        'E' => Some(CellType::End),
        'G' => Some(CellType::Guard),
        'T' => Some(CellType::Thug),
        '_' | ' ' => Some(CellType::Empty),
        'p' => Some(CellType::Plank),
        'c' => Some(CellType::Crowbar),
        '1' => Some(CellType::DoorRed),
        '!' => Some(CellType::KeyRed),
        '2' => Some(CellType::DoorBlue),
        '@' => Some(CellType::KeyBlue),
        _ => None,
    }
}

/// Layout character for a cell type; display-only markers export as empty.
#[must_use]
pub const fn cell_to_char(cell: CellType) -> char {
    match cell {
        CellType::Empty => '_',
        CellType::Wall => 'W',
        CellType::BrickWall => 'B',
        CellType::Start => 'S',
        CellType::End => 'E',
        CellType::Guard => 'G',
        CellType::Thug => 'T',
        CellType::Plank => 'p',
        CellType::Crowbar => 'c',
        CellType::DoorRed => '1',
        CellType::KeyRed => '!',
        CellType::DoorBlue => '2',
        CellType::KeyBlue => '@',
        CellType::Player | CellType::PlayerPath | CellType::OptimalPath => '_',
    }
}

/// Parses a layout into a grid, enforcing the exactly-one-marker invariant.
///
/// Unknown characters decode as empty floor. Rows must all share the first
/// row's length, and exactly one `S` and one `E` must appear across the
/// whole layout.
pub fn parse_layout(level: &LevelData) -> Result<ParsedLevel, LevelFormatError> {
    let id = level.id;
    let height = level.layout.len();
    let width = level.layout.first().map_or(0, |row| row.chars().count());
    if height == 0 || width == 0 {
        return Err(LevelFormatError::EmptyLayout { id });
    }

    let mut cells = Vec::with_capacity(width * height);
    let mut start = None;
    let mut end = None;

    for (y, row) in level.layout.iter().enumerate() {
        if row.chars().count() != width {
            return Err(LevelFormatError::RaggedLayout { id, row: y });
        }
        for (x, character) in row.chars().enumerate() {
            let cell = char_to_cell(character).unwrap_or(CellType::Empty);
            let at = Coordinate::new(x as i32, y as i32);
            match cell {
                CellType::Start => {
                    if start.replace(at).is_some() {
                        return Err(LevelFormatError::DuplicateStart { id });
                    }
                }
                CellType::End => {
                    if end.replace(at).is_some() {
                        return Err(LevelFormatError::DuplicateEnd { id });
                    }
                }
                _ => {}
            }
            cells.push(cell);
        }
    }

    let start = start.ok_or(LevelFormatError::MissingStart { id })?;
    let end = end.ok_or(LevelFormatError::MissingEnd { id })?;
    let grid = Grid::from_cells(width as u32, height as u32, cells)
        .ok_or(LevelFormatError::EmptyLayout { id })?;

    Ok(ParsedLevel { grid, start, end })
}

/// Serializes a grid back into layout rows through the character table.
#[must_use]
pub fn export_layout(grid: &Grid) -> Vec<String> {
    let mut rows = Vec::with_capacity(grid.height() as usize);
    for y in 0..grid.height() as i32 {
        let mut row = String::with_capacity(grid.width() as usize);
        for x in 0..grid.width() as i32 {
            let cell = grid
                .get(Coordinate::new(x, y))
                .unwrap_or(CellType::Empty);
            row.push(cell_to_char(cell));
        }
        rows.push(row);
    }
    rows
}
