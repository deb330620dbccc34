use std::path::PathBuf;
use thiserror::Error;

use crate::log::LogEventKind;

/// A recognized line whose payload could not be decoded.
///
/// These are per-line failures: the caller logs them and moves on.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("malformed {kind:?} payload: {source}")]
    Json {
        kind: LogEventKind,
        source: serde_json::Error,
    },
    #[error("{kind:?} payload is missing {field}")]
    MissingField {
        kind: LogEventKind,
        field: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum RatingsError {
    #[error("card {0} not found in set data")]
    CardNotFound(u32),
    #[error("no ratings for card {card_id} under filter {filter}")]
    NoRatings { card_id: u32, filter: String },
    #[error("failed to read set file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse set file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no drafted cards to analyze")]
    EmptyPool,
    #[error("no color reached the minimum affinity")]
    NoViableColors,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(#[source] confy::ConfyError),
    #[error("failed to save config: {0}")]
    Save(#[source] confy::ConfyError),
}

/// Fatal engine errors. Anything returned from `OverlayEngine::start`.
#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("failed to open log {path}: {source}")]
    OpenLog {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to seek log {path}: {source}")]
    SeekLog {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to watch {path}: {source}")]
    Watch {
        path: PathBuf,
        source: notify::Error,
    },
    #[error("monitoring cancelled")]
    Cancelled,
}
