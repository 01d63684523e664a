//! Word-level transport contract
//!
//! The engine never blocks on the transport: it inspects what is pending,
//! consumes whole frames once they are present, and queues its responses.

use mdb_protocol::Word;

/// Errors from the bundled transports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Receive queue full; the inbound word was dropped
    RxOverflow,
    /// Transmit queue full; the outbound word was dropped
    TxOverflow,
    /// Underlying byte stream failed
    Io(embedded_io::ErrorKind),
    /// Line settings cannot carry MDB words
    UnsupportedLine,
}

/// A 9-bit capable serial channel as seen by the reader
///
/// Implementations buffer inbound words until the engine reads them.
/// `peek_at` must not consume anything.
pub trait MdbTransport {
    /// Error type for write operations
    type Error;

    /// Look at the pending word `offset` positions behind the oldest
    fn peek_at(&self, offset: usize) -> Option<Word>;

    /// Remove and return the oldest pending word
    fn read(&mut self) -> Option<Word>;

    /// Queue a word for transmission
    fn write(&mut self, word: Word) -> Result<(), Self::Error>;

    /// Number of unread inbound words
    fn pending_count(&self) -> usize;

    /// Look at the oldest pending word
    fn peek(&self) -> Option<Word> {
        self.peek_at(0)
    }

    /// Queue several words for transmission, in order
    fn write_all(&mut self, words: &[Word]) -> Result<(), Self::Error> {
        for &word in words {
            self.write(word)?;
        }
        Ok(())
    }

    /// Drop up to `count` pending words, returning how many were dropped
    fn discard(&mut self, count: usize) -> usize {
        let mut dropped = 0;
        while dropped < count && self.read().is_some() {
            dropped += 1;
        }
        dropped
    }
}

impl<T: MdbTransport + ?Sized> MdbTransport for &mut T {
    type Error = T::Error;

    fn peek_at(&self, offset: usize) -> Option<Word> {
        (**self).peek_at(offset)
    }

    fn read(&mut self) -> Option<Word> {
        (**self).read()
    }

    fn write(&mut self, word: Word) -> Result<(), Self::Error> {
        (**self).write(word)
    }

    fn pending_count(&self) -> usize {
        (**self).pending_count()
    }
}
