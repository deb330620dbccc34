use chrono::NaiveDateTime;
use serde::Serialize;

/// Arena card identifier.
pub type CardId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum DraftType {
    #[default]
    Premier,
    Quick,
    Traditional,
    Sealed,
}

impl DraftType {
    /// Map an event name prefix (`PremierDraft_TLA_...`) to a draft type.
    pub fn from_event_name(name: &str) -> Option<Self> {
        let prefix = name.split('_').next()?;
        match prefix {
            "PremierDraft" => Some(Self::Premier),
            "QuickDraft" => Some(Self::Quick),
            "TradDraft" | "TraditionalDraft" => Some(Self::Traditional),
            "Sealed" | "TradSealed" | "ArenaSealed" => Some(Self::Sealed),
            _ => None,
        }
    }

    pub fn is_draft(self) -> bool {
        self != Self::Sealed
    }
}

/// Session descriptor for one draft or sealed event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftEvent {
    pub draft_type: DraftType,
    pub set_code: String,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub current_pack: u32,
    pub current_pick: u32,
    pub in_progress: bool,
}

impl DraftEvent {
    pub fn new(draft_type: DraftType, start_time: NaiveDateTime) -> Self {
        Self {
            draft_type,
            set_code: String::new(),
            start_time,
            end_time: None,
            current_pack: 0,
            current_pick: 0,
            in_progress: true,
        }
    }
}

/// One offered group of cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pack {
    pub pack_number: u32,
    pub pick_number: u32,
    pub card_ids: Vec<CardId>,
    pub timestamp: NaiveDateTime,
}

impl Pack {
    pub fn coordinate(&self) -> (u32, u32) {
        (self.pack_number, self.pick_number)
    }
}

/// The card the player took in one round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pick {
    pub pack_number: u32,
    pub pick_number: u32,
    pub card_id: CardId,
    pub timestamp: NaiveDateTime,
}

impl Pick {
    pub fn coordinate(&self) -> (u32, u32) {
        (self.pack_number, self.pick_number)
    }
}

/// Aggregate root for one session. Only the state machine mutates it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftState {
    pub event: DraftEvent,
    pub current_pack: Option<Pack>,
    /// Chronological, one entry per (pack, pick).
    pub picks: Vec<Pick>,
    /// Every pack seen, including the current one.
    pub history: Vec<Pack>,
}

impl DraftState {
    pub fn new(event: DraftEvent) -> Self {
        Self {
            event,
            current_pack: None,
            picks: Vec::new(),
            history: Vec::new(),
        }
    }

    // --- Accessors ---

    pub fn is_sealed(&self) -> bool {
        self.event.draft_type == DraftType::Sealed
    }

    pub fn is_complete(&self) -> bool {
        self.event.end_time.is_some()
    }

    pub fn picked_cards(&self) -> Vec<CardId> {
        self.picks.iter().map(|p| p.card_id).collect()
    }

    /// Coordinate of the newest pack seen, `(0, 0)` before any.
    pub fn coordinate(&self) -> (u32, u32) {
        (self.event.current_pack, self.event.current_pick)
    }
}
