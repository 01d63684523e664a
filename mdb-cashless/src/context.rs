//! Reader context
//!
//! All mutable reader state in one owned value. Handlers receive it by
//! `&mut`; nothing lives in statics.
//!
//! The pending poll event is a single slot. Raising an event while another
//! is still pending replaces it, and the displaced event is handed back so
//! the caller can report it.

use heapless::Vec;
use mdb_protocol::PollEvent;

use crate::config::{
    NegotiatedDisplayConfig, PeripheralInfo, PriceLimits, ReaderIdentity, MAX_DISPLAY_MESSAGE,
};
use crate::state::{ReaderState, StateEvent};
use crate::traits::{Authorization, VendRequest};

/// Display time sent with a display request, in 0.1 s units
pub const DEFAULT_DISPLAY_TIME: u8 = 100;

/// Funds value meaning "unknown" in a begin session response
pub const FUNDS_UNKNOWN: u16 = 0xFFFF;

/// Why an application request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionError {
    /// Reader is not enabled by the VMC
    NotEnabled,
    /// No session is open
    NoSession,
    /// No vend is waiting for an authorization decision
    NoPendingVend,
}

/// Negotiated configuration, reader state and the pending poll event
#[derive(Debug, Clone)]
pub struct ReaderContext {
    identity: ReaderIdentity,
    peripheral: PeripheralInfo,
    display: NegotiatedDisplayConfig,
    prices: PriceLimits,
    state: ReaderState,
    pending: Option<PollEvent>,
    display_time: u8,
    display_message: Vec<u8, MAX_DISPLAY_MESSAGE>,
    funds_available: u16,
    approved_amount: u16,
    malfunction_code: u8,
    current_vend: Option<VendRequest>,
    awaiting_authorization: bool,
}

impl Default for ReaderContext {
    fn default() -> Self {
        Self::new(ReaderIdentity::default())
    }
}

impl ReaderContext {
    /// Power-up context for a reader with the given identity
    pub fn new(identity: ReaderIdentity) -> Self {
        Self {
            identity,
            peripheral: PeripheralInfo::default(),
            display: NegotiatedDisplayConfig::default(),
            prices: PriceLimits::default(),
            state: ReaderState::Inactive,
            pending: None,
            display_time: DEFAULT_DISPLAY_TIME,
            display_message: Vec::new(),
            funds_available: FUNDS_UNKNOWN,
            approved_amount: 0,
            malfunction_code: 0,
            current_vend: None,
            awaiting_authorization: false,
        }
    }

    /// Use `peripheral` for EXPANSION / Request ID responses
    pub fn with_peripheral(mut self, peripheral: PeripheralInfo) -> Self {
        self.peripheral = peripheral;
        self
    }

    /// Use `tenths` (0.1 s units) as the display time of display requests
    pub fn with_display_time(mut self, tenths: u8) -> Self {
        self.display_time = tenths;
        self
    }

    pub fn identity(&self) -> &ReaderIdentity {
        &self.identity
    }

    pub fn peripheral(&self) -> &PeripheralInfo {
        &self.peripheral
    }

    pub fn display_config(&self) -> &NegotiatedDisplayConfig {
        &self.display
    }

    pub fn price_limits(&self) -> &PriceLimits {
        &self.prices
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// The event the next POLL will report, if any
    pub fn pending_event(&self) -> Option<PollEvent> {
        self.pending
    }

    pub fn display_time(&self) -> u8 {
        self.display_time
    }

    pub fn display_message(&self) -> &[u8] {
        &self.display_message
    }

    pub fn funds_available(&self) -> u16 {
        self.funds_available
    }

    pub fn approved_amount(&self) -> u16 {
        self.approved_amount
    }

    pub fn malfunction_code(&self) -> u8 {
        self.malfunction_code
    }

    /// The vend request currently being handled, if any
    pub fn current_vend(&self) -> Option<&VendRequest> {
        self.current_vend.as_ref()
    }

    /// Whether a deferred authorization is outstanding
    pub fn awaiting_authorization(&self) -> bool {
        self.awaiting_authorization
    }

    // ---------------------------------------------------------------
    // Engine-side mutation (handlers)
    // ---------------------------------------------------------------

    /// Return to power-up defaults after RESET
    ///
    /// Negotiated values are zeroed and Just Reset is left pending.
    pub(crate) fn reset(&mut self) {
        self.display = NegotiatedDisplayConfig::default();
        self.prices = PriceLimits::default();
        self.state = self.state.transition(StateEvent::Reset);
        self.display_message.clear();
        self.funds_available = FUNDS_UNKNOWN;
        self.approved_amount = 0;
        self.malfunction_code = 0;
        self.current_vend = None;
        self.awaiting_authorization = false;
        self.pending = Some(PollEvent::JustReset);
    }

    pub(crate) fn set_display_config(&mut self, display: NegotiatedDisplayConfig) {
        self.display = display;
    }

    pub(crate) fn set_price_limits(&mut self, prices: PriceLimits) {
        self.prices = prices;
    }

    pub(crate) fn apply(&mut self, event: StateEvent) {
        self.state = self.state.transition(event);
    }

    /// Put `event` in the poll slot, returning whatever it displaced
    pub(crate) fn raise(&mut self, event: PollEvent) -> Option<PollEvent> {
        self.pending.replace(event)
    }

    /// Empty the poll slot, returning its event
    pub(crate) fn take_pending(&mut self) -> Option<PollEvent> {
        self.pending.take()
    }

    pub(crate) fn start_vend(&mut self, request: VendRequest) {
        self.current_vend = Some(request);
        self.awaiting_authorization = false;
        self.apply(StateEvent::VendRequested);
    }

    pub(crate) fn defer_authorization(&mut self) {
        self.awaiting_authorization = true;
    }

    /// Forget the current vend (settled or cancelled)
    pub(crate) fn end_vend(&mut self) -> Option<VendRequest> {
        self.awaiting_authorization = false;
        self.current_vend.take()
    }

    /// Turn an authorization decision into the matching poll event
    pub(crate) fn decide(&mut self, decision: Authorization) -> Option<PollEvent> {
        match decision {
            Authorization::Approved { amount } => {
                self.awaiting_authorization = false;
                self.approved_amount = amount;
                self.raise(PollEvent::VendApproved)
            }
            Authorization::Denied => {
                self.awaiting_authorization = false;
                self.current_vend = None;
                self.apply(StateEvent::VendDenied);
                self.raise(PollEvent::VendDenied)
            }
            Authorization::Deferred => {
                self.defer_authorization();
                None
            }
        }
    }

    // ---------------------------------------------------------------
    // Application-side requests
    // ---------------------------------------------------------------

    /// Payment media presented: open a session with `funds` available
    ///
    /// Pass [`FUNDS_UNKNOWN`] when the balance is not known. Returns the
    /// poll event this displaced, if any.
    pub fn begin_session(&mut self, funds: u16) -> Result<Option<PollEvent>, SessionError> {
        if !self.state.accepts_session() {
            return Err(SessionError::NotEnabled);
        }
        self.funds_available = funds;
        self.apply(StateEvent::SessionBegun);
        Ok(self.raise(PollEvent::BeginSession))
    }

    /// Ask the VMC to end the open session (card removed, timeout)
    pub fn request_session_cancel(&mut self) -> Result<Option<PollEvent>, SessionError> {
        if !self.state.session_open() {
            return Err(SessionError::NoSession);
        }
        Ok(self.raise(PollEvent::SessionCancelRequest))
    }

    /// Show `message` on the VMC display
    ///
    /// Only the first 32 bytes are kept. The poll response pads or cuts it
    /// to the negotiated `columns × rows`.
    pub fn request_display(&mut self, message: &[u8]) -> Option<PollEvent> {
        let len = message.len().min(MAX_DISPLAY_MESSAGE);
        self.display_message.clear();
        // Cannot fail: len is within capacity
        let _ = self.display_message.extend_from_slice(&message[..len]);
        self.raise(PollEvent::DisplayRequest)
    }

    /// Report a reader fault with an MDB error code
    pub fn report_malfunction(&mut self, code: u8) -> Option<PollEvent> {
        self.malfunction_code = code;
        self.raise(PollEvent::MalfunctionError)
    }

    /// Resend the reader configuration on the next poll
    pub fn request_reader_config(&mut self) -> Option<PollEvent> {
        self.raise(PollEvent::ReaderConfigData)
    }

    /// Deliver the decision for a vend that was answered with `Deferred`
    pub fn complete_authorization(
        &mut self,
        decision: Authorization,
    ) -> Result<Option<PollEvent>, SessionError> {
        if !self.awaiting_authorization {
            return Err(SessionError::NoPendingVend);
        }
        Ok(self.decide(decision))
    }
}
