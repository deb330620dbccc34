use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::{ALL_FILTER, CardRating, RatingsProvider, parse_mana_cost};
use crate::draft::CardId;
use crate::error::RatingsError;
use pickwatch_types::BayesianConfig;

/// Downloaded per-set ratings file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetFile {
    #[serde(default)]
    pub meta: SetMeta,
    /// Keyed by arena id as a string.
    #[serde(default)]
    pub card_ratings: HashMap<String, CardRatingData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetMeta {
    #[serde(default)]
    pub set_code: String,
    #[serde(default)]
    pub draft_format: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardRatingData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mana_cost: String,
    #[serde(default)]
    pub cmc: f64,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub rarity: String,
    /// Keyed by deck color filter: `ALL`, `W`, `UB`, ...
    #[serde(default)]
    pub deck_colors: HashMap<String, DeckColorRatings>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeckColorRatings {
    #[serde(rename = "GIHWR", default)]
    pub gihwr: f64,
    #[serde(rename = "GIH", default)]
    pub gih: u32,
    #[serde(rename = "ALSA", default)]
    pub alsa: f64,
    #[serde(rename = "ATA", default)]
    pub ata: f64,
    #[serde(rename = "IWD", default)]
    pub iwd: f64,
}

/// Smooth `gihwr` toward the prior when the sample is small.
///
/// Returns the adjusted rate and whether an adjustment was applied.
pub fn bayesian_gihwr(gihwr: f64, gih: u32, config: &BayesianConfig) -> (f64, bool) {
    if gih >= config.min_gih {
        return (gihwr, false);
    }
    let weight = config.prior_weight as f64;
    let games = gih as f64;
    if weight + games == 0.0 {
        return (config.prior_mean, true);
    }
    ((weight * config.prior_mean + games * gihwr) / (weight + games), true)
}

/// [`RatingsProvider`] backed by a [`SetFile`].
#[derive(Debug, Clone)]
pub struct SetRatings {
    set: SetFile,
    config: BayesianConfig,
}

impl SetRatings {
    pub fn new(set: SetFile, config: BayesianConfig) -> Self {
        Self { set, config }
    }

    pub fn from_path(path: impl AsRef<Path>, config: BayesianConfig) -> Result<Self, RatingsError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| RatingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let set = serde_json::from_str(&text).map_err(|source| RatingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(set, config))
    }

    pub fn set_code(&self) -> &str {
        &self.set.meta.set_code
    }

    pub fn card_count(&self) -> usize {
        self.set.card_ratings.len()
    }
}

impl RatingsProvider for SetRatings {
    fn card_rating(&self, card_id: CardId, color_filter: &str) -> Result<CardRating, RatingsError> {
        let data = self
            .set
            .card_ratings
            .get(&card_id.to_string())
            .ok_or(RatingsError::CardNotFound(card_id))?;

        let stats = data
            .deck_colors
            .get(color_filter)
            .or_else(|| data.deck_colors.get(ALL_FILTER))
            .ok_or_else(|| RatingsError::NoRatings {
                card_id,
                filter: color_filter.to_string(),
            })?;

        let (bayesian, adjusted) = bayesian_gihwr(stats.gihwr, stats.gih, &self.config);
        let colors = if data.colors.is_empty() {
            parse_mana_cost(&data.mana_cost)
        } else {
            data.colors.iter().filter_map(|c| c.chars().next()).collect()
        };

        Ok(CardRating {
            card_id,
            name: data.name.clone(),
            mana_cost: data.mana_cost.clone(),
            cmc: data.cmc,
            colors,
            rarity: data.rarity.clone(),
            types: data.types.clone(),
            gihwr: stats.gihwr,
            alsa: stats.alsa,
            ata: stats.ata,
            iwd: stats.iwd,
            gih: stats.gih,
            bayesian_gihwr: bayesian,
            is_bayesian_adjusted: adjusted,
        })
    }
}
