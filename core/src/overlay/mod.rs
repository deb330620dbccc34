//! Live monitoring of the game log.
//!
//! [`OverlayEngine`] replays the existing log once at startup, then tails it.
//! Every line goes through the same classify, parse and fold path, and the
//! resulting [`OverlayUpdate`]s reach a single registered [`UpdateHandler`].

mod engine;
mod handle;
mod resume;
mod tail;
mod update;


pub use engine::{EngineConfig, OverlayEngine};
pub use handle::{EngineCommand, OverlayHandle, OverlaySnapshot};
pub use resume::{ResumeScan, scan_log};
pub use tail::LogTail;
pub use update::{OverlayUpdate, UpdateHandler, UpdateKind};
