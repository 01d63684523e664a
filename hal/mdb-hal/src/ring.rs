//! Fixed-capacity receive/transmit queues
//!
//! The receive side is filled word by word from the UART interrupt (or a
//! test script); the transmit side is drained by whatever clocks words out
//! onto the bus. No allocation: capacities are const generics.

use heapless::Deque;
use mdb_protocol::Word;

use crate::transport::{MdbTransport, TransportError};

/// Default receive depth, enough for two back-to-back maximum frames
pub const DEFAULT_RX_CAPACITY: usize = 64;

/// Default transmit depth, enough for one maximum response plus slack
pub const DEFAULT_TX_CAPACITY: usize = 64;

/// In-memory MDB transport backed by two ring buffers
#[derive(Debug)]
pub struct RingTransport<const RX: usize = DEFAULT_RX_CAPACITY, const TX: usize = DEFAULT_TX_CAPACITY> {
    rx: Deque<Word, RX>,
    tx: Deque<Word, TX>,
}

impl<const RX: usize, const TX: usize> Default for RingTransport<RX, TX> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const RX: usize, const TX: usize> RingTransport<RX, TX> {
    /// Create empty queues
    pub const fn new() -> Self {
        Self {
            rx: Deque::new(),
            tx: Deque::new(),
        }
    }

    /// Push a word received from the bus
    pub fn receive(&mut self, word: Word) -> Result<(), TransportError> {
        self.rx.push_back(word).map_err(|_| TransportError::RxOverflow)
    }

    /// Push a VMC frame: mode bit on the first byte, data bits on the rest
    pub fn receive_frame(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        for (i, &byte) in bytes.iter().enumerate() {
            let word = if i == 0 { Word::mode(byte) } else { Word::data(byte) };
            self.receive(word)?;
        }
        Ok(())
    }

    /// Take the oldest word queued for transmission
    pub fn transmit(&mut self) -> Option<Word> {
        self.tx.pop_front()
    }

    /// Words queued for transmission, oldest first
    pub fn transmitted(&self) -> impl Iterator<Item = &Word> {
        self.tx.iter()
    }

    /// Number of words waiting to go out
    pub fn tx_len(&self) -> usize {
        self.tx.len()
    }
}

impl<const RX: usize, const TX: usize> MdbTransport for RingTransport<RX, TX> {
    type Error = TransportError;

    fn peek_at(&self, offset: usize) -> Option<Word> {
        self.rx.iter().nth(offset).copied()
    }

    fn read(&mut self) -> Option<Word> {
        self.rx.pop_front()
    }

    fn write(&mut self, word: Word) -> Result<(), Self::Error> {
        self.tx.push_back(word).map_err(|_| TransportError::TxOverflow)
    }

    fn pending_count(&self) -> usize {
        self.rx.len()
    }
}
