pub mod analysis;
pub mod context;
pub mod draft;
pub mod error;
pub mod log;
pub mod overlay;
pub mod ratings;

// Re-exports for convenience
pub use analysis::{DeckAnalyzer, PoolAnalyzer};
pub use draft::{DraftState, DraftStateMachine, DraftType};
pub use error::{AnalysisError, ConfigError, OverlayError, PayloadError, RatingsError};
pub use log::{LogEvent, LogEventKind, classify_line};
pub use overlay::{EngineConfig, OverlayEngine, OverlayHandle, OverlayUpdate, UpdateHandler};
pub use ratings::{CachedRatings, RatingsCache, RatingsProvider, SetRatings};
