//! Color selection and deck building over drafted cards.

mod pool;

pub use pool::PoolAnalyzer;

use serde::Serialize;
use std::collections::BTreeMap;

use crate::draft::CardId;
use crate::error::AnalysisError;
use crate::ratings::CardRating;

/// Spread of card quality in a pool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeckMetrics {
    pub mean: f64,
    pub std_dev: f64,
    pub card_count: usize,
}

/// One candidate color combination and how well the pool supports it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeckColor {
    /// WUBRG-ordered, e.g. `"BR"`.
    pub colors: String,
    pub rating: f64,
    pub win_rate: f64,
    pub curve_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorSuggestion {
    /// Best first. Never empty.
    pub selected: Vec<String>,
    pub ranked: Vec<DeckColor>,
}

impl ColorSuggestion {
    /// The combination used as a ratings filter.
    pub fn primary(&self) -> &str {
        self.selected.first().map(String::as_str).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardSelection {
    pub card_id: CardId,
    pub name: String,
    pub cmc: f64,
    pub rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManaCurve {
    /// CMC (capped at 7) to count.
    pub distribution: BTreeMap<u32, usize>,
    pub average_cmc: f64,
    pub creatures: usize,
    pub non_creatures: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeckRecommendation {
    pub colors: String,
    pub main_deck: Vec<CardSelection>,
    pub sideboard: Vec<CardSelection>,
    pub total_lands: u32,
    /// Basic lands per color.
    pub lands: BTreeMap<char, u32>,
    pub curve: ManaCurve,
    pub average_rating: f64,
    pub grade: String,
}

/// Deck-level heuristics the overlay engine consults.
pub trait DeckAnalyzer: Send + Sync {
    fn deck_metrics(&self, picks: &[CardRating]) -> Result<DeckMetrics, AnalysisError>;

    fn auto_select_colors(&self, picks: &[CardRating]) -> Result<ColorSuggestion, AnalysisError>;

    /// Build a 40-card deck from `picks` in `colors`.
    fn build_deck(
        &self,
        picks: &[CardRating],
        colors: &str,
    ) -> Result<DeckRecommendation, AnalysisError>;
}
