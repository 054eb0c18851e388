use std::path::PathBuf;

use crate::game::{MoveError, Player};

/// Errors returned by the environment when a transition cannot be applied.
///
/// None of these mutate the environment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepError {
    #[error("out-of-turn step: it is {expected:?}'s move, not {attempted:?}'s")]
    OutOfTurn { expected: Player, attempted: Player },

    #[error("episode is over; call reset() first")]
    EpisodeOver,

    #[error("unknown action {0} (expected 0, 1 or 2)")]
    UnknownAction(usize),

    #[error("move rejected: {0}")]
    Move(#[from] MoveError),
}

/// Errors raised while reading or writing the binary value table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("not an .npy file (bad magic)")]
    BadMagic,

    #[error("unsupported .npy version {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },

    #[error("malformed .npy header: {0}")]
    Header(String),

    #[error("unsupported dtype '{0}' (expected '<f8')")]
    UnsupportedDtype(String),

    #[error("unexpected table shape {rows}x{cols} (expected Nx3)")]
    Shape { rows: usize, cols: usize },

    #[error("table data truncated: expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during run storage operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("runs directory not found: {0}")]
    DirNotFound(PathBuf),

    #[error("no runs matching '{prefix}' found in {dir}")]
    NoRuns { dir: PathBuf, prefix: String },

    #[error("artifact missing: {0}")]
    ArtifactMissing(PathBuf),

    #[error("failed to read metadata from {path}: {source}")]
    MetadataRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse metadata from {path}: {source}")]
    MetadataParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("value table error in {path}: {source}")]
    Table { path: PathBuf, source: TableError },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during training.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("environment rejected a step: {0}")]
    Step(#[from] StepError),

    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
