use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The five mana colors in WUBRG order.
pub const ALL_COLORS: [char; 5] = ['W', 'U', 'B', 'R', 'G'];

// ─────────────────────────────────────────────────────────────────────────────
// Overlay Settings
// ─────────────────────────────────────────────────────────────────────────────

/// Settings consumed by the overlay engine at construction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    /// Path to the game's log file. `None` means "use the platform default".
    pub log_path: Option<PathBuf>,
    /// Backup poll cadence in milliseconds.
    pub poll_interval_ms: u64,
    /// Replay the existing log history at startup.
    pub resume_enabled: bool,
    /// Ignore replayed events older than this many hours before the newest
    /// line in the file. 0 disables the window.
    pub lookback_hours: u32,
    pub cache_enabled: bool,
    pub cache_ttl_secs: u64,
    pub cache_max_size: usize,
    pub debug: bool,
    /// Size of the shortlist sent with every new pack.
    pub top_n: usize,
    pub bayesian: BayesianConfig,
    pub colors: ColorAffinityConfig,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            log_path: None,
            poll_interval_ms: 100,
            resume_enabled: true,
            lookback_hours: 24,
            cache_enabled: true,
            cache_ttl_secs: 3600,
            cache_max_size: 1000,
            debug: false,
            top_n: 5,
            bayesian: BayesianConfig::default(),
            colors: ColorAffinityConfig::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Ratings
// ─────────────────────────────────────────────────────────────────────────────

/// Sample-size smoothing of raw win rates toward a prior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BayesianConfig {
    /// Below this many games-in-hand the raw rate is smoothed.
    pub min_gih: u32,
    pub prior_mean: f64,
    pub prior_weight: u32,
}

impl Default for BayesianConfig {
    fn default() -> Self {
        Self {
            min_gih: 300,
            prior_mean: 50.0,
            prior_weight: 100,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Color Affinity
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorAffinityConfig {
    /// Picks required before colors are auto-selected.
    pub min_cards: usize,
    pub max_colors: usize,
    /// Rating lead the best combination needs over the runner-up to be
    /// chosen alone. Shrinks by one per drafted card.
    pub auto_select_threshold_base: f64,
    /// Floor for the shrinking lead requirement.
    pub auto_select_threshold_min: f64,
    /// Suggest the top two combinations when neither clearly leads.
    pub enable_auto_highest: bool,
    /// Cards below `mean - std_dev_factor * sd` do not count toward affinity.
    pub std_dev_factor: f64,
}

impl Default for ColorAffinityConfig {
    fn default() -> Self {
        Self {
            min_cards: 15,
            max_colors: 2,
            auto_select_threshold_base: 70.0,
            auto_select_threshold_min: 25.0,
            enable_auto_highest: true,
            std_dev_factor: 0.33,
        }
    }
}
