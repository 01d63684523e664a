//! Reader → VMC responses
//!
//! A response is a run of words whose last word carries the mode bit.
//! Single-byte status responses (ACK, NAK, RET) are that one word.
//! Multi-byte responses usually end in a checksum word.

use heapless::Vec;

use crate::codec;
use crate::word::Word;

/// Acknowledge
pub const ACK: u8 = 0x00;
/// Retransmit request
pub const RET: u8 = 0xAA;
/// Negative acknowledge
pub const NAK: u8 = 0xFF;

/// Largest response the reader builds: display request with a full
/// 32-byte message (event code + display time + 32 bytes).
pub const MAX_RESPONSE_SIZE: usize = 36;

// Poll event codes
const EVT_JUST_RESET: u8 = 0x00;
const EVT_READER_CONFIG_DATA: u8 = 0x01;
const EVT_DISPLAY_REQUEST: u8 = 0x02;
const EVT_BEGIN_SESSION: u8 = 0x03;
const EVT_SESSION_CANCEL_REQUEST: u8 = 0x04;
const EVT_VEND_APPROVED: u8 = 0x05;
const EVT_VEND_DENIED: u8 = 0x06;
const EVT_END_SESSION: u8 = 0x07;
const EVT_CANCELLED: u8 = 0x08;
const EVT_PERIPHERAL_ID: u8 = 0x09;
const EVT_MALFUNCTION_ERROR: u8 = 0x0A;
const EVT_CMD_OUT_OF_SEQUENCE: u8 = 0x0B;
const EVT_DIAGNOSTIC_RESPONSE: u8 = 0xFF;

/// Events the reader reports as the first byte of a poll response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollEvent {
    JustReset,
    ReaderConfigData,
    DisplayRequest,
    BeginSession,
    SessionCancelRequest,
    VendApproved,
    VendDenied,
    EndSession,
    Cancelled,
    PeripheralId,
    MalfunctionError,
    CommandOutOfSequence,
    DiagnosticResponse,
}

impl PollEvent {
    /// Parse an event from its wire byte
    ///
    /// 0x00 is both ACK and Just Reset on the wire; it parses as the event.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            EVT_JUST_RESET => Some(PollEvent::JustReset),
            EVT_READER_CONFIG_DATA => Some(PollEvent::ReaderConfigData),
            EVT_DISPLAY_REQUEST => Some(PollEvent::DisplayRequest),
            EVT_BEGIN_SESSION => Some(PollEvent::BeginSession),
            EVT_SESSION_CANCEL_REQUEST => Some(PollEvent::SessionCancelRequest),
            EVT_VEND_APPROVED => Some(PollEvent::VendApproved),
            EVT_VEND_DENIED => Some(PollEvent::VendDenied),
            EVT_END_SESSION => Some(PollEvent::EndSession),
            EVT_CANCELLED => Some(PollEvent::Cancelled),
            EVT_PERIPHERAL_ID => Some(PollEvent::PeripheralId),
            EVT_MALFUNCTION_ERROR => Some(PollEvent::MalfunctionError),
            EVT_CMD_OUT_OF_SEQUENCE => Some(PollEvent::CommandOutOfSequence),
            EVT_DIAGNOSTIC_RESPONSE => Some(PollEvent::DiagnosticResponse),
            _ => None,
        }
    }

    /// Convert to wire byte
    pub fn to_byte(self) -> u8 {
        match self {
            PollEvent::JustReset => EVT_JUST_RESET,
            PollEvent::ReaderConfigData => EVT_READER_CONFIG_DATA,
            PollEvent::DisplayRequest => EVT_DISPLAY_REQUEST,
            PollEvent::BeginSession => EVT_BEGIN_SESSION,
            PollEvent::SessionCancelRequest => EVT_SESSION_CANCEL_REQUEST,
            PollEvent::VendApproved => EVT_VEND_APPROVED,
            PollEvent::VendDenied => EVT_VEND_DENIED,
            PollEvent::EndSession => EVT_END_SESSION,
            PollEvent::Cancelled => EVT_CANCELLED,
            PollEvent::PeripheralId => EVT_PERIPHERAL_ID,
            PollEvent::MalfunctionError => EVT_MALFUNCTION_ERROR,
            PollEvent::CommandOutOfSequence => EVT_CMD_OUT_OF_SEQUENCE,
            PollEvent::DiagnosticResponse => EVT_DIAGNOSTIC_RESPONSE,
        }
    }
}

/// Response did not fit in [`MAX_RESPONSE_SIZE`] words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResponseOverflow;

/// An outbound response under construction
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Response {
    words: Vec<Word, MAX_RESPONSE_SIZE>,
}

impl Response {
    /// Create an empty response
    pub fn new() -> Self {
        Self { words: Vec::new() }
    }

    /// A single status byte (ACK, NAK, RET) with the mode bit set
    pub fn status(byte: u8) -> Self {
        let mut words = Vec::new();
        // Capacity is far above one word
        let _ = words.push(Word::mode(byte));
        Self { words }
    }

    /// Single-word acknowledge
    pub fn ack() -> Self {
        Self::status(ACK)
    }

    /// Append a data byte
    pub fn push(&mut self, byte: u8) -> Result<(), ResponseOverflow> {
        self.words
            .push(Word::data(byte))
            .map_err(|_| ResponseOverflow)
    }

    /// Append a big-endian 16-bit value
    pub fn push_u16(&mut self, value: u16) -> Result<(), ResponseOverflow> {
        self.extend(&value.to_be_bytes())
    }

    /// Append a run of data bytes
    pub fn extend(&mut self, bytes: &[u8]) -> Result<(), ResponseOverflow> {
        for &b in bytes {
            self.push(b)?;
        }
        Ok(())
    }

    /// Mark the last word as the terminator
    pub fn seal(mut self) -> Self {
        if let Some(last) = self.words.last_mut() {
            *last = last.with_mode();
        }
        self
    }

    /// Append the checksum of everything so far as the terminating word
    pub fn seal_with_checksum(mut self) -> Result<Self, ResponseOverflow> {
        let sum = codec::checksum_words(&self.words);
        self.words
            .push(codec::encode_terminator(sum))
            .map_err(|_| ResponseOverflow)?;
        Ok(self)
    }

    /// Words to transmit, in order
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
