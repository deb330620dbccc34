//! Shared configuration types for pickwatch.
//!
//! Everything here is plain serde data so both the core engine and the
//! command-line front end can read and write the same settings file.

mod settings;

pub use settings::{BayesianConfig, ColorAffinityConfig, OverlaySettings, ALL_COLORS};
