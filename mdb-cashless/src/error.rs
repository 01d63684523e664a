//! Engine error type
//!
//! Nothing here is fatal to the reader: the worst case is a dropped
//! response, which the VMC's retry handling covers.

use mdb_protocol::ResponseOverflow;

/// Errors surfaced by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The transport refused an outbound word
    Transport(E),
    /// A response outgrew its fixed buffer
    ResponseOverflow,
}

impl<E> From<ResponseOverflow> for Error<E> {
    fn from(_: ResponseOverflow) -> Self {
        Error::ResponseOverflow
    }
}
