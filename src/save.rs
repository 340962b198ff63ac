//! Save-file handling. One JSON document holds the whole state; loading
//! is tolerant of older shapes so a save never strands its owner.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::state::BastionState;

/// Current save format. Bumped when the wire shape changes in a way the
/// field-level defaults cannot absorb.
pub const SAVE_VERSION: u32 = 2;

#[derive(Debug, Serialize)]
pub struct SaveFile {
    pub version: u32,
    pub state: BastionState,
}

#[derive(Debug)]
pub enum SaveError {
    Io(io::Error),
    Format(serde_json::Error),
    /// Save is from a newer build than this one.
    UnsupportedVersion(u32),
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(err) => write!(f, "save io error: {err}"),
            SaveError::Format(err) => write!(f, "save format error: {err}"),
            SaveError::UnsupportedVersion(version) => {
                write!(f, "save version {version} is newer than this build")
            }
        }
    }
}

impl std::error::Error for SaveError {}

impl From<io::Error> for SaveError {
    fn from(err: io::Error) -> Self {
        SaveError::Io(err)
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(err: serde_json::Error) -> Self {
        SaveError::Format(err)
    }
}

/// Parse a save document. Version-1 saves were the bare state object with
/// no envelope; those still load, with every missing field defaulted.
pub fn from_json(json: &str) -> Result<BastionState, SaveError> {
    #[derive(Deserialize)]
    struct Envelope {
        version: u32,
        state: BastionState,
    }

    if let Ok(envelope) = serde_json::from_str::<Envelope>(json) {
        if envelope.version > SAVE_VERSION {
            return Err(SaveError::UnsupportedVersion(envelope.version));
        }
        if envelope.version < SAVE_VERSION {
            tracing::info!(version = envelope.version, "migrated older save");
        }
        return Ok(envelope.state);
    }
    let state = serde_json::from_str::<BastionState>(json)?;
    tracing::info!("loaded legacy save without version envelope");
    Ok(state)
}

pub fn to_json(state: &BastionState) -> Result<String, SaveError> {
    let file = SaveFile {
        version: SAVE_VERSION,
        state: state.clone(),
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

pub fn load_from_path(path: &Path) -> Result<BastionState, SaveError> {
    from_json(&fs::read_to_string(path)?)
}

pub fn save_to_path(path: &Path, state: &BastionState) -> Result<(), SaveError> {
    fs::write(path, to_json(state)?)?;
    Ok(())
}
