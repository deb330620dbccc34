use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};

use crate::analysis::ColorSuggestion;
use crate::draft::DraftState;
use crate::ratings::PackRatings;

/// Everything readers outside the control loop can see.
///
/// Replaced as a whole after each fold, so a reader never observes a draft
/// from one fold next to ratings from another.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverlaySnapshot {
    pub draft: Option<DraftState>,
    pub ratings: Option<PackRatings>,
    pub selected_colors: Option<ColorSuggestion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCommand {
    /// Forget the current draft.
    Reset,
    /// Leave the control loop; `start` returns `Ok(())`.
    Stop,
}

// ─────────────────────────────────────────────────────────────────────────────
// Overlay Handle
// ─────────────────────────────────────────────────────────────────────────────

/// Handle to query and control a running [`OverlayEngine`](super::OverlayEngine).
#[derive(Clone)]
pub struct OverlayHandle {
    pub(super) cmd_tx: mpsc::Sender<EngineCommand>,
    pub(super) shared: Arc<RwLock<OverlaySnapshot>>,
}

impl OverlayHandle {
    pub async fn reset(&self) -> Result<(), String> {
        self.cmd_tx
            .send(EngineCommand::Reset)
            .await
            .map_err(|e| e.to_string())
    }

    pub async fn stop(&self) -> Result<(), String> {
        self.cmd_tx
            .send(EngineCommand::Stop)
            .await
            .map_err(|e| e.to_string())
    }

    pub async fn draft_state(&self) -> Option<DraftState> {
        self.shared.read().await.draft.clone()
    }

    pub async fn current_ratings(&self) -> Option<PackRatings> {
        self.shared.read().await.ratings.clone()
    }

    pub async fn selected_colors(&self) -> Option<ColorSuggestion> {
        self.shared.read().await.selected_colors.clone()
    }

    pub async fn snapshot(&self) -> OverlaySnapshot {
        self.shared.read().await.clone()
    }
}
