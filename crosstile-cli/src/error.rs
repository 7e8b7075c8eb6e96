//! CLI error type.

use std::fmt;
use std::path::PathBuf;

use crosstile::coord::CoordError;
use crosstile::cross_tile::SymbolIndexError;

/// Errors surfaced by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Trace file could not be read.
    Io { path: PathBuf, source: std::io::Error },
    /// Trace file is not a valid event list.
    Trace { path: PathBuf, source: serde_json::Error },
    /// A tile coordinate in the arguments or trace is invalid.
    Coord(CoordError),
    /// The index rejected an event.
    Replay {
        event: usize,
        source: SymbolIndexError,
    },
    /// Index configuration or other index error outside a replay.
    Index(SymbolIndexError),
    /// Output could not be serialized.
    Output(serde_json::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Io { .. } | CliError::Trace { .. } => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
            CliError::Trace { path, source } => {
                write!(f, "Invalid trace {}: {}", path.display(), source)
            }
            CliError::Coord(e) => write!(f, "{}", e),
            CliError::Replay { event, source } => {
                write!(f, "Event #{} rejected: {}", event, source)
            }
            CliError::Index(e) => write!(f, "{}", e),
            CliError::Output(e) => write!(f, "Failed to serialize output: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io { source, .. } => Some(source),
            CliError::Trace { source, .. } => Some(source),
            CliError::Coord(e) => Some(e),
            CliError::Replay { source, .. } => Some(source),
            CliError::Index(e) => Some(e),
            CliError::Output(e) => Some(e),
        }
    }
}

impl From<CoordError> for CliError {
    fn from(e: CoordError) -> Self {
        CliError::Coord(e)
    }
}

impl From<SymbolIndexError> for CliError {
    fn from(e: SymbolIndexError) -> Self {
        CliError::Index(e)
    }
}
