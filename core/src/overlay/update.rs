use chrono::NaiveDateTime;
use serde::Serialize;

use crate::analysis::{ColorSuggestion, DeckRecommendation};
use crate::draft::{DraftState, Pick};
use crate::ratings::{CardRating, PackRatings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    DraftStart,
    NewPack,
    PickMade,
    DraftEnd,
    ColorRecommendation,
    DeckBuilder,
}

/// Notification emitted by the engine, in the order the log lines were written.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OverlayUpdate {
    DraftStart {
        timestamp: NaiveDateTime,
        state: DraftState,
    },
    NewPack {
        timestamp: NaiveDateTime,
        state: DraftState,
        ratings: PackRatings,
        best_pick: Option<CardRating>,
        top_picks: Vec<CardRating>,
        /// Present once enough cards have been picked to judge colors.
        colors: Option<ColorSuggestion>,
    },
    PickMade {
        timestamp: NaiveDateTime,
        state: DraftState,
        pick: Option<Pick>,
    },
    DraftEnd {
        timestamp: NaiveDateTime,
        state: DraftState,
    },
    ColorRecommendation {
        timestamp: NaiveDateTime,
        colors: ColorSuggestion,
    },
    DeckBuilder {
        timestamp: NaiveDateTime,
        state: DraftState,
        deck: Option<DeckRecommendation>,
    },
}

impl OverlayUpdate {
    pub fn kind(&self) -> UpdateKind {
        match self {
            Self::DraftStart { .. } => UpdateKind::DraftStart,
            Self::NewPack { .. } => UpdateKind::NewPack,
            Self::PickMade { .. } => UpdateKind::PickMade,
            Self::DraftEnd { .. } => UpdateKind::DraftEnd,
            Self::ColorRecommendation { .. } => UpdateKind::ColorRecommendation,
            Self::DeckBuilder { .. } => UpdateKind::DeckBuilder,
        }
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        match self {
            Self::DraftStart { timestamp, .. }
            | Self::NewPack { timestamp, .. }
            | Self::PickMade { timestamp, .. }
            | Self::DraftEnd { timestamp, .. }
            | Self::ColorRecommendation { timestamp, .. }
            | Self::DeckBuilder { timestamp, .. } => *timestamp,
        }
    }

    pub fn state(&self) -> Option<&DraftState> {
        match self {
            Self::DraftStart { state, .. }
            | Self::NewPack { state, .. }
            | Self::PickMade { state, .. }
            | Self::DraftEnd { state, .. }
            | Self::DeckBuilder { state, .. } => Some(state),
            Self::ColorRecommendation { .. } => None,
        }
    }
}

/// Receives every [`OverlayUpdate`].
///
/// Called synchronously on the engine's control loop. Slow work belongs on
/// the implementor's own task.
pub trait UpdateHandler: Send {
    fn on_update(&mut self, update: OverlayUpdate);
}

impl<F> UpdateHandler for F
where
    F: FnMut(OverlayUpdate) + Send,
{
    fn on_update(&mut self, update: OverlayUpdate) {
        self(update)
    }
}
