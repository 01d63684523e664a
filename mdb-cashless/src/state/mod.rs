//! Reader enablement state machine
//!
//! Tracks where the reader stands from the VMC's point of view.
//! Transitions are explicit and deterministic.

pub mod events;
pub mod machine;

pub use events::StateEvent;
pub use machine::ReaderState;
