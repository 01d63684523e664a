//! Events that trigger reader state transitions

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StateEvent {
    // Bus lifecycle
    /// RESET received
    Reset,
    /// SETUP / max-min prices accepted
    PricesNegotiated,

    // READER command
    /// READER / disable
    ReaderDisabled,
    /// READER / enable
    ReaderEnabled,

    // Session flow
    /// Payment media presented, session opened towards the VMC
    SessionBegun,
    /// VEND / request received
    VendRequested,
    /// VEND / cancel received
    VendCancelled,
    /// VEND / success or failure received
    VendSettled,
    /// Vend request refused by the authorizer
    VendDenied,
    /// VEND / session complete received
    SessionCompleted,
}
