//! Card ratings consumed by the overlay engine.
//!
//! The engine only depends on [`RatingsProvider`]. [`SetRatings`] reads a
//! downloaded set file, and [`CachedRatings`] puts a TTL cache in front of
//! any provider.

mod cache;
mod set_file;

pub use cache::{CacheStats, CachedRatings, RatingsCache};
pub use set_file::{CardRatingData, DeckColorRatings, SetFile, SetMeta, SetRatings, bayesian_gihwr};

use serde::Serialize;

use crate::draft::{CardId, Pack};
use crate::error::RatingsError;
use pickwatch_types::ALL_COLORS;

/// Color filter meaning "all decks".
pub const ALL_FILTER: &str = "ALL";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardRating {
    pub card_id: CardId,
    pub name: String,
    pub mana_cost: String,
    pub cmc: f64,
    pub colors: Vec<char>,
    pub rarity: String,
    pub types: Vec<String>,
    /// Games-in-hand win rate, in percent.
    pub gihwr: f64,
    pub alsa: f64,
    pub ata: f64,
    pub iwd: f64,
    /// Games-in-hand sample size.
    pub gih: u32,
    pub bayesian_gihwr: f64,
    pub is_bayesian_adjusted: bool,
}

impl CardRating {
    pub fn is_land(&self) -> bool {
        self.types.iter().any(|t| t == "Land")
    }
}

/// Ratings for every known card in a pack, best first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackRatings {
    pub pack: Pack,
    pub ratings: Vec<CardRating>,
    pub color_filter: String,
}

impl PackRatings {
    pub fn new(pack: Pack, mut ratings: Vec<CardRating>, color_filter: &str) -> Self {
        ratings.sort_by(|a, b| b.bayesian_gihwr.total_cmp(&a.bayesian_gihwr));
        Self {
            pack,
            ratings,
            color_filter: color_filter.to_string(),
        }
    }

    pub fn best_pick(&self) -> Option<&CardRating> {
        self.ratings.first()
    }

    pub fn top_n(&self, n: usize) -> &[CardRating] {
        &self.ratings[..n.min(self.ratings.len())]
    }
}

/// Source of card ratings.
///
/// Implementations are called synchronously from the engine's control loop
/// and should answer quickly.
pub trait RatingsProvider: Send + Sync {
    fn card_rating(&self, card_id: CardId, color_filter: &str) -> Result<CardRating, RatingsError>;

    /// Rate every card in `pack`. Cards missing from the data are left out.
    fn pack_ratings(&self, pack: &Pack, color_filter: &str) -> PackRatings {
        let filter = if color_filter.is_empty() {
            ALL_FILTER
        } else {
            color_filter
        };
        let ratings = pack
            .card_ids
            .iter()
            .filter_map(|&id| match self.card_rating(id, filter) {
                Ok(rating) => Some(rating),
                Err(e) => {
                    tracing::debug!(card_id = id, error = %e, "Skipping unrated card");
                    None
                }
            })
            .collect();
        PackRatings::new(pack.clone(), ratings, filter)
    }
}

/// Mana symbols in a cost string, in WUBRG order: `{2}{W}{U/B}` -> `['W', 'U', 'B']`.
pub fn parse_mana_cost(cost: &str) -> Vec<char> {
    ALL_COLORS
        .iter()
        .copied()
        .filter(|c| cost.contains(*c))
        .collect()
}
