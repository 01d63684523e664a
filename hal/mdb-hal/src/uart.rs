//! Serial line settings and a byte-stream adapter for 9-bit words
//!
//! Most UART drivers only move bytes. 9-bit capable peripherals (and PIO
//! soft-UARTs) commonly hand each bus word over as a byte pair: a prefix
//! byte holding the mode bit, then the data byte. [`PairedWordUart`] turns
//! such a stream into an [`MdbTransport`].

use embedded_io::{Error as _, Read, ReadReady, Write};
use heapless::Deque;
use mdb_protocol::{Word, MODE_BIT};

use crate::transport::{MdbTransport, TransportError};

/// MDB line rate
pub const MDB_BAUDRATE: u32 = 9600;

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (MDB uses 8 data + 1 mode bit)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl UartConfig {
    /// 9600 baud, 9 data bits, no parity, one stop bit
    pub const MDB: Self = Self {
        baudrate: MDB_BAUDRATE,
        data_bits: DataBits::Nine,
        parity: Parity::None,
        stop_bits: StopBits::One,
    };

    /// Check that these settings describe the MDB line
    pub fn validate(&self) -> Result<(), TransportError> {
        if *self == Self::MDB {
            Ok(())
        } else {
            Err(TransportError::UnsupportedLine)
        }
    }
}

impl Default for UartConfig {
    fn default() -> Self {
        Self::MDB
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

/// Read chunk size when draining the byte stream
const PUMP_CHUNK: usize = 16;

/// Highest value a `[mode, data]` prefix byte can take
const MAX_PREFIX: u8 = 0x01;

/// [`MdbTransport`] over a byte stream carrying `[mode, data]` pairs
///
/// Call [`pump`](Self::pump) whenever the stream may have new bytes; it
/// never blocks because it only reads while the stream reports data ready.
pub struct PairedWordUart<U, const RX: usize = 64> {
    uart: U,
    config: UartConfig,
    rx: Deque<Word, RX>,
    prefix: Option<u8>,
}

impl<U, const RX: usize> PairedWordUart<U, RX>
where
    U: Read + ReadReady + Write,
{
    /// Wrap `uart`, which the caller has set up with `config`
    ///
    /// Fails with [`TransportError::UnsupportedLine`] unless `config` is the
    /// MDB line.
    pub fn new(uart: U, config: UartConfig) -> Result<Self, TransportError> {
        config.validate()?;
        Ok(Self {
            uart,
            config,
            rx: Deque::new(),
            prefix: None,
        })
    }

    pub fn config(&self) -> &UartConfig {
        &self.config
    }

    /// Move every ready byte pair from the stream into the receive queue
    ///
    /// Returns the number of complete words queued by this call. A word that
    /// finds the queue full is dropped and pairing carries on, so the bytes
    /// behind it still land in order; the call then reports
    /// [`TransportError::RxOverflow`] once the stream is drained. A byte in
    /// prefix position that cannot be a prefix is skipped to regain the
    /// pair alignment.
    pub fn pump(&mut self) -> Result<usize, TransportError> {
        let mut queued = 0;
        let mut overflowed = false;
        let mut buf = [0u8; PUMP_CHUNK];

        while self.uart.read_ready().map_err(|e| TransportError::Io(e.kind()))? {
            let n = self
                .uart
                .read(&mut buf)
                .map_err(|e| TransportError::Io(e.kind()))?;
            if n == 0 {
                break;
            }

            for &byte in &buf[..n] {
                match self.prefix.take() {
                    None if byte > MAX_PREFIX => {}
                    None => self.prefix = Some(byte),
                    Some(prefix) => {
                        let raw = if prefix & 0x01 != 0 {
                            byte as u16 | MODE_BIT
                        } else {
                            byte as u16
                        };
                        if self.rx.push_back(Word::from_raw(raw)).is_ok() {
                            queued += 1;
                        } else {
                            overflowed = true;
                        }
                    }
                }
            }
        }

        if overflowed {
            Err(TransportError::RxOverflow)
        } else {
            Ok(queued)
        }
    }

    /// Give the underlying stream back
    pub fn release(self) -> U {
        self.uart
    }
}

impl<U, const RX: usize> MdbTransport for PairedWordUart<U, RX>
where
    U: Read + ReadReady + Write,
{
    type Error = TransportError;

    fn peek_at(&self, offset: usize) -> Option<Word> {
        self.rx.iter().nth(offset).copied()
    }

    fn read(&mut self) -> Option<Word> {
        self.rx.pop_front()
    }

    fn write(&mut self, word: Word) -> Result<(), Self::Error> {
        let prefix = u8::from(word.is_mode());
        self.uart
            .write_all(&[prefix, word.byte()])
            .map_err(|e| TransportError::Io(e.kind()))
    }

    fn pending_count(&self) -> usize {
        self.rx.len()
    }
}
