//! Draft state machine.
//!
//! Folds classified log events into the current [`DraftState`]:
//! - NotStarted: no state yet, waiting for the first pack or pool
//! - Active: a Premier, Quick, Traditional or Sealed session in progress
//! - Complete: 45 picks recorded or the game reported the draft finished
//!
//! A pack whose coordinate goes backwards, or any pack after completion,
//! starts a fresh draft rather than merging into the old one.

use chrono::NaiveDateTime;

use super::model::{DraftEvent, DraftState, DraftType, Pack, Pick};
use super::payload::{EventHint, PackUpdate, ParsedEvent, parse_event};
use crate::error::PayloadError;
use crate::log::LogEvent;

/// Three packs of fifteen.
pub const PICKS_PER_DRAFT: usize = 45;

/// What a single fold changed. Drives notification dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FoldOutcome {
    pub draft_started: bool,
    pub pack_installed: bool,
    pub pick_recorded: bool,
    pub completed: bool,
}

impl FoldOutcome {
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Owns the canonical [`DraftState`]. Everything else sees clones.
#[derive(Debug, Default)]
pub struct DraftStateMachine {
    state: Option<DraftState>,
    /// Set/format info seen before the draft it belongs to has started.
    pending_hint: Option<EventHint>,
}

impl DraftStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode and apply one classified event.
    ///
    /// Only structurally invalid payloads are errors. Events that do not apply
    /// to the current state fold to a no-op outcome.
    pub fn fold(&mut self, event: &LogEvent) -> Result<FoldOutcome, PayloadError> {
        let parsed = parse_event(event)?;
        Ok(self.apply(parsed, event.timestamp))
    }

    pub fn apply(&mut self, parsed: ParsedEvent, timestamp: NaiveDateTime) -> FoldOutcome {
        let mut outcome = FoldOutcome::default();
        match parsed {
            ParsedEvent::Pack(update) => self.apply_pack(update, &mut outcome),
            ParsedEvent::Pool { pack, hint } => self.apply_pool(pack, hint, &mut outcome),
            ParsedEvent::Pick(pick) => self.apply_pick(pick, &mut outcome),
            ParsedEvent::Completed => {
                if let Some(state) = self.state.as_mut()
                    && !state.is_sealed()
                {
                    complete(state, timestamp, &mut outcome);
                }
            }
            ParsedEvent::Session(hint) => self.apply_session(hint),
            ParsedEvent::Ignored => {}
        }
        outcome
    }

    pub fn snapshot(&self) -> Option<&DraftState> {
        self.state.as_ref()
    }

    pub fn reset(&mut self) {
        self.state = None;
        self.pending_hint = None;
    }

    // --- Packs ---

    fn apply_pack(&mut self, update: PackUpdate, outcome: &mut FoldOutcome) {
        let PackUpdate {
            pack,
            hint,
            self_pick,
        } = update;

        let starts_new = match &self.state {
            None => true,
            Some(state) => {
                state.is_complete() || state.is_sealed() || pack.coordinate() < state.coordinate()
            }
        };

        if starts_new {
            let draft_type = hint
                .draft_type
                .or_else(|| self.pending_hint.as_ref().and_then(|h| h.draft_type))
                .filter(|t| t.is_draft())
                .unwrap_or(DraftType::Premier);
            self.start(draft_type, pack.timestamp, hint.set_code.clone());
            outcome.draft_started = true;
        }

        let Some(state) = self.state.as_mut() else {
            return;
        };

        if state.event.set_code.is_empty()
            && let Some(code) = hint.set_code
        {
            state.event.set_code = code;
        }

        install_pack(state, pack);
        outcome.pack_installed = true;

        if let Some(pick) = self_pick {
            record_pick(state, pick, outcome);
        }
    }

    // --- Sealed Pools ---

    fn apply_pool(&mut self, pack: Pack, hint: EventHint, outcome: &mut FoldOutcome) {
        if let Some(state) = &self.state {
            if !state.is_sealed() && state.event.in_progress {
                tracing::debug!(
                    cards = pack.card_ids.len(),
                    "[DRAFT] Ignoring sealed pool during active draft"
                );
                return;
            }
            let same_pool = state
                .current_pack
                .as_ref()
                .is_some_and(|current| current.card_ids == pack.card_ids);
            if state.is_sealed() && same_pool {
                return;
            }
        }

        self.start(DraftType::Sealed, pack.timestamp, hint.set_code);
        if let Some(state) = self.state.as_mut() {
            install_pack(state, pack);
            outcome.draft_started = true;
            outcome.pack_installed = true;
        }
    }

    // --- Picks ---

    fn apply_pick(&mut self, pick: Pick, outcome: &mut FoldOutcome) {
        let Some(state) = self.state.as_mut() else {
            tracing::debug!(card_id = pick.card_id, "[DRAFT] Ignoring pick with no active draft");
            return;
        };
        if state.is_sealed() || state.is_complete() {
            tracing::debug!(card_id = pick.card_id, "[DRAFT] Ignoring pick outside an active draft");
            return;
        }
        record_pick(state, pick, outcome);
    }

    // --- Session Info ---

    fn apply_session(&mut self, hint: EventHint) {
        if let Some(state) = self.state.as_mut()
            && state.event.in_progress
            && state.event.set_code.is_empty()
        {
            if let Some(code) = &hint.set_code {
                state.event.set_code = code.clone();
            }
            if let Some(draft_type) = hint.draft_type
                && draft_type.is_draft()
                && !state.is_sealed()
            {
                state.event.draft_type = draft_type;
            }
            return;
        }
        self.pending_hint = Some(hint);
    }

    fn start(&mut self, draft_type: DraftType, start_time: NaiveDateTime, set_code: Option<String>) {
        let pending = self.pending_hint.take();
        let mut event = DraftEvent::new(draft_type, start_time);
        event.set_code = set_code
            .or_else(|| pending.and_then(|h| h.set_code))
            .unwrap_or_default();

        if let Some(old) = &self.state {
            tracing::info!(
                old_type = ?old.event.draft_type,
                old_picks = old.picks.len(),
                new_type = ?draft_type,
                "[DRAFT] New session replaces previous state"
            );
        } else {
            tracing::info!(draft_type = ?draft_type, set = %event.set_code, "[DRAFT] Session started");
        }

        self.state = Some(DraftState::new(event));
    }
}

/// Make `pack` current. A repeat of the current coordinate replaces it
/// instead of growing history.
fn install_pack(state: &mut DraftState, pack: Pack) {
    let coalesce = state
        .current_pack
        .as_ref()
        .is_some_and(|current| current.coordinate() == pack.coordinate());

    if coalesce {
        if let Some(last) = state.history.last_mut() {
            *last = pack.clone();
        }
    } else {
        state.history.push(pack.clone());
    }

    state.event.current_pack = pack.pack_number;
    state.event.current_pick = pack.pick_number;
    state.event.in_progress = true;
    state.current_pack = Some(pack);
}

fn record_pick(state: &mut DraftState, mut pick: Pick, outcome: &mut FoldOutcome) {
    if pick.pack_number == 0 {
        pick.pack_number = state.event.current_pack;
    }
    if pick.pick_number == 0 {
        pick.pick_number = state.event.current_pick;
    }

    let timestamp = pick.timestamp;
    match state.picks.iter().position(|p| p.coordinate() == pick.coordinate()) {
        Some(i) if state.picks[i].card_id == pick.card_id => return,
        Some(i) => {
            tracing::debug!(
                pack = pick.pack_number,
                pick = pick.pick_number,
                old = state.picks[i].card_id,
                new = pick.card_id,
                "[DRAFT] Pick reported twice, keeping latest card"
            );
            state.picks[i].card_id = pick.card_id;
        }
        None => state.picks.push(pick),
    }
    outcome.pick_recorded = true;

    if state.picks.len() >= PICKS_PER_DRAFT {
        complete(state, timestamp, outcome);
    }
}

/// Stamp completion exactly once.
fn complete(state: &mut DraftState, timestamp: NaiveDateTime, outcome: &mut FoldOutcome) {
    if state.event.end_time.is_some() {
        return;
    }
    state.event.end_time = Some(timestamp);
    state.event.in_progress = false;
    outcome.completed = true;
    tracing::info!(
        picks = state.picks.len(),
        draft_type = ?state.event.draft_type,
        "[DRAFT] Draft complete"
    );
}
