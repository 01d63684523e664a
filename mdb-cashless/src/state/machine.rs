//! Reader state definition
//!
//! Handlers apply events unconditionally; the table below decides where the
//! reader ends up. Events that make no sense in the current state leave it
//! unchanged.

use super::events::StateEvent;

/// Reader enablement states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReaderState {
    /// Power-up or after RESET; prices not yet negotiated
    #[default]
    Inactive,
    /// Configured but not accepting payment media
    Disabled,
    /// Accepting payment media, no session open
    Enabled,
    /// Session open, waiting for the customer's selection
    SessionIdle,
    /// Vend request outstanding
    Vend,
}

impl ReaderState {
    /// Check if a session is open
    pub fn session_open(&self) -> bool {
        matches!(self, ReaderState::SessionIdle | ReaderState::Vend)
    }

    /// Check if a VEND / request would be in sequence
    pub fn accepts_vend(&self) -> bool {
        matches!(self, ReaderState::SessionIdle)
    }

    /// Check if the reader may begin a session
    pub fn accepts_session(&self) -> bool {
        matches!(self, ReaderState::Enabled)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: StateEvent) -> Self {
        use ReaderState::*;
        use StateEvent::*;

        match (self, event) {
            // Unconditional bus-driven transitions
            (_, Reset) => Inactive,
            (_, PricesNegotiated) => Disabled,
            (_, ReaderDisabled) => Disabled,
            (_, ReaderEnabled) => Enabled,

            // Session flow
            (Enabled, SessionBegun) => SessionIdle,
            (SessionIdle, VendRequested) => Vend,
            (_, VendCancelled) => SessionIdle,
            (Vend, VendSettled) => SessionIdle,
            (Vend, VendDenied) => SessionIdle,
            (_, SessionCompleted) => Enabled,

            // Default: stay in current state
            _ => self,
        }
    }
}
