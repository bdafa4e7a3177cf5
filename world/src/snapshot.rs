//! Serializable builder snapshots and named presets.
//!
//! A snapshot captures only the durable parts of a builder session: the
//! grid rendered through the level wire format plus the maze settings.
//! Everything transient — tools, selection, clipboard, overlay, simulation
//! state — is reset deterministically when the snapshot is restored, so a
//! rehydrated session never wakes up mid-simulation or holding a phantom
//! selection.

use serde::{Deserialize, Serialize};

use maze_escape_core::layout::{
    export_layout, parse_layout, LevelData, LevelFormatError, CUSTOM_LEVEL_ID,
};
use maze_escape_core::MazeSettings;

use crate::BuilderSession;

/// Durable capture of a builder session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuilderSnapshot {
    /// Grid width recorded for validation on restore.
    pub width: u32,
    /// Grid height recorded for validation on restore.
    pub height: u32,
    /// Grid rows rendered through the level character table.
    pub layout: Vec<String>,
    /// Maze generator settings in effect when the snapshot was taken.
    pub maze_settings: MazeSettings,
}

impl BuilderSnapshot {
    /// Captures the durable state of the provided session.
    #[must_use]
    pub fn capture(session: &BuilderSession) -> Self {
        Self {
            width: session.grid().width(),
            height: session.grid().height(),
            layout: export_layout(session.grid()),
            maze_settings: *session.maze_settings(),
        }
    }
}

/// Restores a session from a snapshot with transient state reset.
///
/// The layout is revalidated on the way in: missing or duplicated markers
/// and dimension mismatches are format errors, and the caller's session is
/// left untouched when they occur.
pub fn sanitize_on_load(snapshot: &BuilderSnapshot) -> Result<BuilderSession, LevelFormatError> {
    let level = LevelData {
        id: CUSTOM_LEVEL_ID,
        layout: snapshot.layout.clone(),
    };
    let parsed = parse_layout(&level)?;
    if parsed.grid.width() != snapshot.width || parsed.grid.height() != snapshot.height {
        return Err(LevelFormatError::MalformedPayload(format!(
            "snapshot dimensions {}x{} do not match its layout",
            snapshot.width, snapshot.height,
        )));
    }
    // Deserialization bypasses the clamping constructor, so re-clamp here.
    let settings = MazeSettings::new(
        snapshot.maze_settings.corridor_width(),
        snapshot.maze_settings.extra_paths(),
        snapshot.maze_settings.dead_end_density(),
    );
    Ok(BuilderSession::from_parts(
        parsed.grid,
        parsed.start,
        parsed.end,
        settings,
    ))
}

/// Named, persistable builder snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// Display name chosen by the player.
    pub name: String,
    /// Captured builder state.
    pub snapshot: BuilderSnapshot,
}
