//! Level files: one JSON document per level, named `level-<N>.json`.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use snake_core::{CellCoord, Direction, GridDimensions, LevelDescriptor, LevelInvalid};
use thiserror::Error;

/// Reasons a level file cannot be turned into a level.
#[derive(Debug, Error)]
pub(crate) enum LevelFileError {
    /// The file could not be read.
    #[error("failed to read level file {}", .path.display())]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },
    /// The file is not a well-formed level document.
    #[error("failed to parse level file {}", .path.display())]
    Parse {
        /// File that was parsed.
        path: PathBuf,
        /// Underlying JSON failure.
        #[source]
        source: serde_json::Error,
    },
    /// The numeric direction code is not one of 1, 2, -1 or -2.
    #[error("unknown direction code {code}")]
    UnknownDirection {
        /// Code found in the file.
        code: i64,
    },
    /// The level breaks a structural rule.
    #[error(transparent)]
    Invalid(#[from] LevelInvalid),
}

/// Direction stored either by name or by the legacy signed code.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DirectionField {
    Named(Direction),
    Code(i64),
}

impl DirectionField {
    fn resolve(self) -> Result<Direction, LevelFileError> {
        match self {
            Self::Named(direction) => Ok(direction),
            Self::Code(1) => Ok(Direction::Up),
            Self::Code(2) => Ok(Direction::Right),
            Self::Code(-1) => Ok(Direction::Down),
            Self::Code(-2) => Ok(Direction::Left),
            Self::Code(code) => Err(LevelFileError::UnknownDirection { code }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LevelFile {
    dimensions: [u32; 2],
    delay: u64,
    #[serde(default)]
    direction: Option<DirectionField>,
    #[serde(default)]
    walls: Vec<[u32; 2]>,
    snake: Vec<[u32; 2]>,
}

impl LevelFile {
    fn into_descriptor(self) -> Result<LevelDescriptor, LevelFileError> {
        let cells = |pairs: Vec<[u32; 2]>| -> Vec<CellCoord> {
            pairs
                .into_iter()
                .map(|[column, row]| CellCoord::new(column, row))
                .collect()
        };

        let [columns, rows] = self.dimensions;
        let mut descriptor = LevelDescriptor::new(
            GridDimensions::new(columns, rows),
            Duration::from_millis(self.delay),
            cells(self.walls),
            cells(self.snake),
        );
        if let Some(direction) = self.direction {
            descriptor = descriptor.with_direction(direction.resolve()?);
        }

        let _ = descriptor.validate()?;
        Ok(descriptor)
    }
}

/// Location of level `number` inside `directory`.
pub(crate) fn level_path(directory: &Path, number: u32) -> PathBuf {
    directory.join(format!("level-{number}.json"))
}

/// Reads and validates level `number` from `directory`.
pub(crate) fn load_level(directory: &Path, number: u32) -> Result<LevelDescriptor, LevelFileError> {
    let path = level_path(directory, number);
    let contents = fs::read_to_string(&path).map_err(|source| LevelFileError::Io {
        path: path.clone(),
        source,
    })?;
    let descriptor = parse_level(&contents, &path)?;
    log::debug!("loaded level {number}");
    Ok(descriptor)
}

/// Parses and validates one level document read from `origin`.
pub(crate) fn parse_level(
    contents: &str,
    origin: &Path,
) -> Result<LevelDescriptor, LevelFileError> {
    let file: LevelFile =
        serde_json::from_str(contents).map_err(|source| LevelFileError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
    file.into_descriptor()
}
