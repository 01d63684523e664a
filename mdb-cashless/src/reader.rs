//! Cashless reader facade
//!
//! Owns the transport, the collaborators, the reader context and the
//! dispatcher. Firmware calls [`CashlessReader::service`] whenever new
//! words may have arrived (UART interrupt, timer tick, main loop) and uses
//! [`CashlessReader::context_mut`] to raise application events.

use mdb_hal::MdbTransport;

use crate::config::{PeripheralInfo, ReaderIdentity};
use crate::context::ReaderContext;
use crate::dispatcher::{Dispatch, Dispatcher};
use crate::error::Error;
use crate::traits::{DenyAll, Diagnostics, NoDiagnostics, VendAuthorizer};

/// MDB cashless device #1 on top of an [`MdbTransport`]
pub struct CashlessReader<T, A = DenyAll, D = NoDiagnostics> {
    transport: T,
    authorizer: A,
    diagnostics: D,
    context: ReaderContext,
    dispatcher: Dispatcher,
}

impl<T: MdbTransport> CashlessReader<T> {
    /// Reader that denies every vend and reports nothing
    pub fn new(transport: T, identity: ReaderIdentity) -> Self {
        Self {
            transport,
            authorizer: DenyAll,
            diagnostics: NoDiagnostics,
            context: ReaderContext::new(identity),
            dispatcher: Dispatcher::new(),
        }
    }
}

impl<T, A, D> CashlessReader<T, A, D>
where
    T: MdbTransport,
    A: VendAuthorizer,
    D: Diagnostics,
{
    /// Replace the vend authorizer
    pub fn with_authorizer<B: VendAuthorizer>(self, authorizer: B) -> CashlessReader<T, B, D> {
        CashlessReader {
            transport: self.transport,
            authorizer,
            diagnostics: self.diagnostics,
            context: self.context,
            dispatcher: self.dispatcher,
        }
    }

    /// Replace the diagnostics sink
    pub fn with_diagnostics<E: Diagnostics>(self, diagnostics: E) -> CashlessReader<T, A, E> {
        CashlessReader {
            transport: self.transport,
            authorizer: self.authorizer,
            diagnostics,
            context: self.context,
            dispatcher: self.dispatcher,
        }
    }

    /// Use `peripheral` for EXPANSION / Request ID
    pub fn with_peripheral(mut self, peripheral: PeripheralInfo) -> Self {
        self.context = self.context.with_peripheral(peripheral);
        self
    }

    /// Handle at most one pending frame
    pub fn step(&mut self) -> Result<Dispatch, Error<T::Error>> {
        self.dispatcher.dispatch(
            &mut self.context,
            &mut self.transport,
            &mut self.authorizer,
            &mut self.diagnostics,
        )
    }

    /// Handle every complete frame that is pending
    ///
    /// Stops at the first step that cannot progress without new input
    /// and returns the number of frames answered.
    pub fn service(&mut self) -> Result<usize, Error<T::Error>> {
        let mut handled = 0;
        loop {
            let outcome = self.step()?;
            if let Dispatch::Handled(_) = outcome {
                handled += 1;
            }
            if !outcome.made_progress() {
                return Ok(handled);
            }
        }
    }

    pub fn context(&self) -> &ReaderContext {
        &self.context
    }

    /// Application access: begin sessions, post display messages and
    /// deferred authorizations
    pub fn context_mut(&mut self) -> &mut ReaderContext {
        &mut self.context
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn authorizer_mut(&mut self) -> &mut A {
        &mut self.authorizer
    }

    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    /// Tear down, returning the transport and collaborators
    pub fn release(self) -> (T, A, D) {
        (self.transport, self.authorizer, self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ReaderState;
    use crate::testing::{framed, response, Recorder};
    use crate::traits::{Authorization, DiagnosticCounters};
    use mdb_hal::RingTransport;
    use mdb_protocol::{PollEvent, Word, ACK};
    use std::vec::Vec;

    type TestReader = CashlessReader<RingTransport, Recorder, DiagnosticCounters>;

    fn reader(decision: Authorization) -> TestReader {
        CashlessReader::new(RingTransport::new(), ReaderIdentity::default())
            .with_authorizer(Recorder::answering(decision))
            .with_diagnostics(DiagnosticCounters::default())
    }

    /// Queue one VMC frame the way the bus delivers it, short-frame
    /// checksum included
    fn vmc_send(reader: &mut TestReader, bytes: &[u8], short: bool) {
        reader.transport_mut().receive_frame(bytes).unwrap();
        if short {
            let sum = mdb_protocol::checksum(bytes);
            reader.transport_mut().receive(Word::data(sum)).unwrap();
        }
    }

    fn drain(reader: &mut TestReader) -> Vec<Word> {
        let mut words = Vec::new();
        while let Some(word) = reader.transport_mut().transmit() {
            words.push(word);
        }
        words
    }

    /// Run RESET, SETUP and READER ENABLE, discarding the replies
    fn bring_up(reader: &mut TestReader) {
        vmc_send(reader, &[0x10], true);
        vmc_send(reader, &[0x12], true);
        vmc_send(reader, &framed(&[0x11, 0x00, 3, 16, 2, 0]), false);
        vmc_send(reader, &framed(&[0x11, 0x01, 0x01, 0xF4, 0x00, 0x0A]), false);
        vmc_send(reader, &[0x14, 0x01], true);
        assert_eq!(reader.service().unwrap(), 5);
        drain(reader);
    }

    #[test]
    fn test_service_drains_back_to_back_frames() {
        let mut reader = reader(Authorization::Denied);
        vmc_send(&mut reader, &[0x10], true);
        vmc_send(&mut reader, &[0x12], true);
        vmc_send(&mut reader, &[0x12], true);

        assert_eq!(reader.service().unwrap(), 3);
        assert_eq!(reader.transport().pending_count(), 0);
        // RESET ACK, Just Reset, then an empty poll
        assert_eq!(
            drain(&mut reader),
            [Word::mode(ACK), Word::data(0x00), Word::mode(ACK), Word::mode(ACK)]
        );
    }

    #[test]
    fn test_service_stops_on_partial_frame() {
        let mut reader = reader(Authorization::Denied);
        vmc_send(&mut reader, &[0x12], true);
        reader.transport_mut().receive_frame(&[0x13, 0x00, 0x00]).unwrap();

        assert_eq!(reader.service().unwrap(), 1);
        assert_eq!(reader.transport().pending_count(), 3);
    }

    #[test]
    fn test_service_recovers_frames_behind_abandoned_one() {
        let mut reader = reader(Authorization::Denied);
        bring_up(&mut reader);
        reader.context_mut().report_malfunction(0x30);

        // Burst: a VEND cut off after its command word, then a POLL
        reader.transport_mut().receive_frame(&[0x13]).unwrap();
        vmc_send(&mut reader, &[0x12], true);

        assert_eq!(reader.service().unwrap(), 1);
        assert_eq!(drain(&mut reader), response(&[0x0A, 0x30, 0x3A]));
        assert_eq!(reader.transport().pending_count(), 0);
        assert_eq!(reader.diagnostics().stale_bytes, 1);
    }

    #[test]
    fn test_bring_up_sequence() {
        let mut reader = reader(Authorization::Denied);
        bring_up(&mut reader);

        let ctx = reader.context();
        assert_eq!(ctx.state(), ReaderState::Enabled);
        assert_eq!(ctx.display_config().columns, 16);
        assert_eq!(ctx.price_limits().max_price, 500);
        assert_eq!(ctx.price_limits().min_price, 10);
        assert_eq!(reader.diagnostics().configs_accepted, 1);
        assert_eq!(reader.diagnostics().prices_accepted, 1);
        assert_eq!(reader.diagnostics().checksum_mismatches, 0);
    }

    #[test]
    fn test_full_vend_cycle() {
        let mut reader = reader(Authorization::Approved { amount: 150 });
        bring_up(&mut reader);

        // Card presented
        assert_eq!(reader.context_mut().begin_session(2000), Ok(None));
        vmc_send(&mut reader, &[0x12], true);
        reader.service().unwrap();
        assert_eq!(drain(&mut reader), response(&[0x03, 0x07, 0xD0, 0xDA]));

        // Selection: item 7 at 150
        vmc_send(&mut reader, &framed(&[0x13, 0x00, 0x00, 0x96, 0x00, 0x07]), false);
        reader.service().unwrap();
        assert_eq!(drain(&mut reader), [Word::mode(ACK)]);
        assert_eq!(reader.context().state(), ReaderState::Vend);

        vmc_send(&mut reader, &[0x12], true);
        reader.service().unwrap();
        assert_eq!(drain(&mut reader), response(&[0x05, 0x00, 0x96, 0x9B]));

        vmc_send(&mut reader, &framed(&[0x13, 0x02, 0x00, 0x07]), false);
        reader.service().unwrap();
        assert_eq!(drain(&mut reader), [Word::mode(ACK)]);
        assert_eq!(reader.context().state(), ReaderState::SessionIdle);

        vmc_send(&mut reader, &framed(&[0x13, 0x04]), false);
        reader.service().unwrap();
        assert_eq!(drain(&mut reader), [Word::mode(PollEvent::EndSession.to_byte())]);
        assert_eq!(reader.context().state(), ReaderState::Enabled);

        let (_, authorizer, _) = reader.release();
        assert_eq!(authorizer.requests.len(), 1);
        assert_eq!(authorizer.succeeded, [7]);
    }

    #[test]
    fn test_deferred_vend_approved_later() {
        let mut reader = reader(Authorization::Deferred);
        bring_up(&mut reader);
        reader.context_mut().begin_session(500).unwrap();
        vmc_send(&mut reader, &[0x12], true);
        reader.service().unwrap();
        drain(&mut reader);

        vmc_send(&mut reader, &framed(&[0x13, 0x00, 0x00, 0x64, 0x00, 0x01]), false);
        vmc_send(&mut reader, &[0x12], true);
        reader.service().unwrap();
        // ACK for the request, bare ACK for the poll
        assert_eq!(drain(&mut reader), [Word::mode(ACK), Word::mode(ACK)]);
        assert!(reader.context().awaiting_authorization());

        reader
            .context_mut()
            .complete_authorization(Authorization::Approved { amount: 100 })
            .unwrap();
        vmc_send(&mut reader, &[0x12], true);
        reader.service().unwrap();
        assert_eq!(drain(&mut reader), response(&[0x05, 0x00, 0x64, 0x69]));
    }

    #[test]
    fn test_denied_vend_returns_to_session() {
        let mut reader = reader(Authorization::Denied);
        bring_up(&mut reader);
        reader.context_mut().begin_session(500).unwrap();
        vmc_send(&mut reader, &[0x12], true);
        reader.service().unwrap();
        drain(&mut reader);

        vmc_send(&mut reader, &framed(&[0x13, 0x00, 0x03, 0xE8, 0x00, 0x02]), false);
        vmc_send(&mut reader, &[0x12], true);
        reader.service().unwrap();
        assert_eq!(
            drain(&mut reader),
            [Word::mode(ACK), Word::mode(PollEvent::VendDenied.to_byte())]
        );
        assert_eq!(reader.context().state(), ReaderState::SessionIdle);
    }

    #[test]
    fn test_release_returns_parts() {
        let reader = reader(Authorization::Denied);
        let (transport, _, diagnostics) = reader.release();
        assert_eq!(transport.pending_count(), 0);
        assert_eq!(diagnostics, DiagnosticCounters::default());
    }
}
