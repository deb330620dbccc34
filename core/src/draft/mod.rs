//! Draft session model, payload decoding and the state machine that folds
//! classified log events into a [`DraftState`].

mod machine;
mod model;
pub mod payload;


pub use machine::{DraftStateMachine, FoldOutcome, PICKS_PER_DRAFT};
pub use model::{CardId, DraftEvent, DraftState, DraftType, Pack, Pick};
