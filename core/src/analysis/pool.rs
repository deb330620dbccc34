use std::collections::BTreeMap;

use super::{
    CardSelection, ColorSuggestion, DeckAnalyzer, DeckColor, DeckMetrics, DeckRecommendation,
    ManaCurve,
};
use crate::error::AnalysisError;
use crate::ratings::CardRating;
use pickwatch_types::{ALL_COLORS, ColorAffinityConfig};

const TARGET_SPELLS: usize = 23;
const DEFAULT_LANDS: u32 = 17;
const CMC_CAP: u32 = 7;

/// Rating-driven [`DeckAnalyzer`].
///
/// Colors are scored by how far their cards sit above
/// `mean - std_dev_factor * sd`. Candidate combinations are rated by the
/// average on-color quality, nudged by curve shape.
#[derive(Debug, Clone, Default)]
pub struct PoolAnalyzer {
    config: ColorAffinityConfig,
}

impl PoolAnalyzer {
    pub fn new(config: ColorAffinityConfig) -> Self {
        Self { config }
    }

    fn threshold(&self, metrics: &DeckMetrics) -> f64 {
        metrics.mean - self.config.std_dev_factor * metrics.std_dev
    }

    /// Colors with positive affinity, strongest first, capped at `max_colors`.
    fn strongest_colors(&self, picks: &[CardRating], threshold: f64) -> Vec<char> {
        let mut scores: Vec<(char, f64)> = ALL_COLORS
            .iter()
            .map(|&color| {
                let score = picks
                    .iter()
                    .filter(|c| c.gih > 0 && c.bayesian_gihwr > threshold && c.colors.contains(&color))
                    .map(|c| c.bayesian_gihwr - threshold)
                    .sum();
                (color, score)
            })
            .filter(|(_, score)| *score > 0.0)
            .collect();

        scores.sort_by(|a, b| b.1.total_cmp(&a.1));
        scores.truncate(self.config.max_colors.max(1));

        let mut colors: Vec<char> = scores.into_iter().map(|(c, _)| c).collect();
        colors.sort_by_key(|c| color_order(*c));
        colors
    }

    fn rank_deck_colors(&self, picks: &[CardRating], metrics: &DeckMetrics) -> Vec<DeckColor> {
        let threshold = self.threshold(metrics);
        let colors = self.strongest_colors(picks, threshold);

        let mut ranked: Vec<DeckColor> = combinations(&colors, self.config.max_colors)
            .into_iter()
            .filter_map(|combo| {
                let win_rate = combo_rating(picks, &combo, threshold);
                if win_rate == 0.0 {
                    return None;
                }
                let curve_factor = curve_factor(picks, &combo);
                Some(DeckColor {
                    colors: combo.iter().collect(),
                    rating: win_rate * curve_factor,
                    win_rate,
                    curve_factor,
                })
            })
            .collect();

        ranked.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        ranked
    }
}

impl DeckAnalyzer for PoolAnalyzer {
    fn deck_metrics(&self, picks: &[CardRating]) -> Result<DeckMetrics, AnalysisError> {
        let values: Vec<f64> = picks
            .iter()
            .filter(|c| c.gih > 0)
            .map(|c| c.bayesian_gihwr)
            .collect();
        if values.is_empty() {
            return Err(AnalysisError::EmptyPool);
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Ok(DeckMetrics {
            mean,
            std_dev: variance.sqrt(),
            card_count: values.len(),
        })
    }

    fn auto_select_colors(&self, picks: &[CardRating]) -> Result<ColorSuggestion, AnalysisError> {
        let metrics = self.deck_metrics(picks)?;
        let ranked = self.rank_deck_colors(picks, &metrics);

        let selected = match ranked.as_slice() {
            [] => return Err(AnalysisError::NoViableColors),
            [only] => vec![only.colors.clone()],
            [first, second, ..] => {
                let needed_lead = (self.config.auto_select_threshold_base - picks.len() as f64)
                    .max(self.config.auto_select_threshold_min);
                if first.rating - second.rating > needed_lead || !self.config.enable_auto_highest {
                    vec![first.colors.clone()]
                } else {
                    vec![first.colors.clone(), second.colors.clone()]
                }
            }
        };

        Ok(ColorSuggestion { selected, ranked })
    }

    fn build_deck(
        &self,
        picks: &[CardRating],
        colors: &str,
    ) -> Result<DeckRecommendation, AnalysisError> {
        if picks.is_empty() {
            return Err(AnalysisError::EmptyPool);
        }
        let deck_colors: Vec<char> = colors.chars().collect();

        let mut candidates: Vec<&CardRating> = picks
            .iter()
            .filter(|c| !c.is_land() && is_subset(&c.colors, &deck_colors))
            .collect();
        candidates.sort_by(|a, b| b.bayesian_gihwr.total_cmp(&a.bayesian_gihwr));

        let main: Vec<&CardRating> = candidates.iter().take(TARGET_SPELLS).copied().collect();
        let main_ids: Vec<_> = main.iter().map(|c| c.card_id).collect();
        let sideboard = picks
            .iter()
            .filter(|c| !main_ids.contains(&c.card_id))
            .map(selection)
            .collect();

        let curve = mana_curve(&main);
        let (total_lands, lands) = land_split(&main, &deck_colors, curve.average_cmc);
        let average_rating = if main.is_empty() {
            0.0
        } else {
            main.iter().map(|c| c.bayesian_gihwr).sum::<f64>() / main.len() as f64
        };

        Ok(DeckRecommendation {
            colors: colors.to_string(),
            grade: grade(average_rating, &curve),
            main_deck: main.into_iter().map(selection).collect(),
            sideboard,
            total_lands,
            lands,
            curve,
            average_rating,
        })
    }
}

fn color_order(color: char) -> usize {
    ALL_COLORS.iter().position(|&c| c == color).unwrap_or(ALL_COLORS.len())
}

fn is_subset(card_colors: &[char], deck_colors: &[char]) -> bool {
    card_colors.iter().all(|c| deck_colors.contains(c))
}

fn selection(card: &CardRating) -> CardSelection {
    CardSelection {
        card_id: card.card_id,
        name: card.name.clone(),
        cmc: card.cmc,
        rating: card.bayesian_gihwr,
    }
}

/// All combinations of 1..=max_size colors, preserving input order.
fn combinations(colors: &[char], max_size: usize) -> Vec<Vec<char>> {
    fn extend(colors: &[char], size: usize, start: usize, current: &mut Vec<char>, out: &mut Vec<Vec<char>>) {
        if current.len() == size {
            out.push(current.clone());
            return;
        }
        for i in start..colors.len() {
            current.push(colors[i]);
            extend(colors, size, i + 1, current, out);
            current.pop();
        }
    }

    let mut out = Vec::new();
    for size in 1..=max_size.min(colors.len()) {
        extend(colors, size, 0, &mut Vec::with_capacity(size), &mut out);
    }
    out
}

/// Average rating of on-color cards above `threshold`. 0 when none qualify.
fn combo_rating(picks: &[CardRating], combo: &[char], threshold: f64) -> f64 {
    let values: Vec<f64> = picks
        .iter()
        .filter(|c| is_subset(&c.colors, combo) && c.gih > 0 && c.bayesian_gihwr > threshold)
        .map(|c| c.bayesian_gihwr)
        .collect();
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn is_creature(card: &CardRating) -> bool {
    card.types.iter().any(|t| t.to_lowercase().contains("creature"))
}

fn capped_cmc(card: &CardRating) -> u32 {
    (card.cmc.max(0.0) as u32).min(CMC_CAP)
}

/// Between 0.9 and 1.1. Rewards a balanced creature count and a mid-range curve.
fn curve_factor(picks: &[CardRating], combo: &[char]) -> f64 {
    if picks.len() < 15 {
        return 1.0;
    }
    let matching: Vec<&CardRating> = picks.iter().filter(|c| is_subset(&c.colors, combo)).collect();
    if matching.is_empty() {
        return 1.0;
    }
    let total = matching.len() as f64;

    let creature_ratio = matching.iter().filter(|c| is_creature(c)).count() as f64 / total;
    let high = matching.iter().filter(|c| capped_cmc(c) >= 6).count() as f64 / total;
    let mid = matching
        .iter()
        .filter(|c| (2..=4).contains(&capped_cmc(c)))
        .count() as f64
        / total;

    let mut factor: f64 = 1.0;
    if (0.4..=0.6).contains(&creature_ratio) {
        factor += 0.05;
    } else if !(0.3..=0.7).contains(&creature_ratio) {
        factor -= 0.05;
    }
    if high > 0.25 {
        factor -= 0.05;
    }
    if mid >= 0.5 {
        factor += 0.05;
    }
    factor.clamp(0.9, 1.1)
}

fn mana_curve(main: &[&CardRating]) -> ManaCurve {
    let mut distribution = BTreeMap::new();
    for card in main {
        *distribution.entry(capped_cmc(card)).or_insert(0) += 1;
    }
    let creatures = main.iter().filter(|c| is_creature(c)).count();
    let average_cmc = if main.is_empty() {
        0.0
    } else {
        main.iter().map(|c| c.cmc).sum::<f64>() / main.len() as f64
    };

    ManaCurve {
        distribution,
        average_cmc,
        creatures,
        non_creatures: main.len() - creatures,
    }
}

/// 17 lands, 18 for a high curve, 16 for a low one, split by color pips.
/// The last color takes the remainder so the split always sums to the total.
fn land_split(main: &[&CardRating], colors: &[char], average_cmc: f64) -> (u32, BTreeMap<char, u32>) {
    let total = if average_cmc > 3.5 {
        DEFAULT_LANDS + 1
    } else if average_cmc < 2.5 && !main.is_empty() {
        DEFAULT_LANDS - 1
    } else {
        DEFAULT_LANDS
    };

    let mut split = BTreeMap::new();
    if colors.is_empty() {
        return (total, split);
    }

    let pips: Vec<u32> = colors
        .iter()
        .map(|color| main.iter().filter(|c| c.colors.contains(color)).count() as u32)
        .collect();
    let total_pips: u32 = pips.iter().sum();

    let mut remaining = total;
    for (i, (&color, &count)) in colors.iter().zip(&pips).enumerate() {
        let lands = if i == colors.len() - 1 {
            remaining
        } else if total_pips == 0 {
            total / colors.len() as u32
        } else {
            ((total as f64 * count as f64) / total_pips as f64).round() as u32
        };
        let lands = lands.min(remaining);
        split.insert(color, lands);
        remaining -= lands;
    }
    (total, split)
}

fn grade(average_rating: f64, curve: &ManaCurve) -> String {
    let mut score = average_rating;
    if (2.5..=3.5).contains(&curve.average_cmc) {
        score += 2.0;
    } else if curve.average_cmc < 2.0 || curve.average_cmc > 4.5 {
        score -= 2.0;
    }

    let grade = match score {
        s if s >= 60.0 => "A+",
        s if s >= 58.0 => "A",
        s if s >= 56.0 => "A-",
        s if s >= 54.0 => "B+",
        s if s >= 52.0 => "B",
        s if s >= 50.0 => "C+",
        s if s >= 48.0 => "C",
        s if s >= 45.0 => "D",
        _ => "F",
    };
    grade.to_string()
}
