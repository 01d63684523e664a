//! Shared test bench: a dispatcher wired to an in-memory bus

use std::vec::Vec;

use mdb_hal::RingTransport;
use mdb_protocol::{codec, Word};

use crate::context::ReaderContext;
use crate::dispatcher::{Dispatch, Dispatcher};
use crate::state::StateEvent;
use crate::traits::{Authorization, DiagnosticCounters, VendAuthorizer, VendRequest};

/// `bytes` followed by their checksum
pub fn framed(bytes: &[u8]) -> Vec<u8> {
    let mut out = bytes.to_vec();
    out.push(codec::checksum(bytes));
    out
}

/// Authorizer that answers with a fixed decision and records callbacks
pub struct Recorder {
    pub decision: Authorization,
    pub requests: Vec<VendRequest>,
    pub succeeded: Vec<u16>,
    pub failed: Vec<VendRequest>,
    pub cash_sales: Vec<VendRequest>,
}

impl Recorder {
    pub fn answering(decision: Authorization) -> Self {
        Self {
            decision,
            requests: Vec::new(),
            succeeded: Vec::new(),
            failed: Vec::new(),
            cash_sales: Vec::new(),
        }
    }
}

impl VendAuthorizer for Recorder {
    fn authorize(&mut self, request: &VendRequest) -> Authorization {
        self.requests.push(*request);
        self.decision
    }

    fn vend_succeeded(&mut self, item: u16) {
        self.succeeded.push(item);
    }

    fn vend_failed(&mut self, request: &VendRequest) {
        self.failed.push(*request);
    }

    fn cash_sale(&mut self, sale: &VendRequest) {
        self.cash_sales.push(*sale);
    }
}

pub struct Bench {
    pub ctx: ReaderContext,
    pub transport: RingTransport,
    pub dispatcher: Dispatcher,
    pub authorizer: Recorder,
    pub diagnostics: DiagnosticCounters,
}

impl Bench {
    pub fn new() -> Self {
        Self {
            ctx: ReaderContext::default(),
            transport: RingTransport::new(),
            dispatcher: Dispatcher::new(),
            authorizer: Recorder::answering(Authorization::Denied),
            diagnostics: DiagnosticCounters::default(),
        }
    }

    /// Bench whose reader the VMC has configured and enabled
    pub fn enabled() -> Self {
        let mut bench = Self::new();
        bench.ctx.apply(StateEvent::PricesNegotiated);
        bench.ctx.apply(StateEvent::ReaderEnabled);
        bench
    }

    /// Queue a VMC frame (mode bit on the first byte)
    pub fn receive(&mut self, bytes: &[u8]) {
        self.transport.receive_frame(bytes).unwrap();
    }

    pub fn step(&mut self) -> Dispatch {
        self.dispatcher
            .dispatch(
                &mut self.ctx,
                &mut self.transport,
                &mut self.authorizer,
                &mut self.diagnostics,
            )
            .unwrap()
    }

    /// Drain everything the reader transmitted
    pub fn sent(&mut self) -> Vec<Word> {
        let mut words = Vec::new();
        while let Some(word) = self.transport.transmit() {
            words.push(word);
        }
        words
    }

    /// Send one frame, run one step and return the reply
    pub fn exchange(&mut self, bytes: &[u8]) -> (Dispatch, Vec<Word>) {
        self.receive(bytes);
        let outcome = self.step();
        (outcome, self.sent())
    }
}

/// Words as a sealed response: data bytes, mode bit on the last
pub fn response(bytes: &[u8]) -> Vec<Word> {
    let mut words: Vec<Word> = bytes.iter().map(|&b| Word::data(b)).collect();
    if let Some(last) = words.last_mut() {
        *last = last.with_mode();
    }
    words
}
