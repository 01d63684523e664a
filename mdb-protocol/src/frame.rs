//! Inbound frame layouts and decoding.
//!
//! Frame format (VMC → reader):
//! - COMMAND (1 word): command code, mode bit set
//! - SUBCOMMAND (0-1 byte): selects the layout for VEND/READER/SETUP/EXPANSION
//! - PAYLOAD (0-29 bytes): subcommand-specific data
//! - CHECKSUM (0-1 byte): 8-bit sum of all preceding bytes
//!
//! There is no length byte; the reader knows each frame's length from its
//! command and subcommand. Frames are only decoded once every word is
//! pending, so a partial frame is described by [`FrameStatus::NeedMoreBytes`].

use heapless::Vec;

use crate::codec;
use crate::commands::{Command, ExpansionSubcommand, VendSubcommand};
use crate::word::Word;

/// Longest inbound frame: EXPANSION / Request ID
///
/// Command, subcommand, manufacturer code (3), serial (12), model (12),
/// software version (2), checksum.
pub const MAX_FRAME_SIZE: usize = 32;

/// Errors that can occur while decoding a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Frame is longer than [`MAX_FRAME_SIZE`]
    FrameTooLarge,
    /// Checksum mismatch
    InvalidChecksum,
    /// Fewer words supplied than the layout requires
    Incomplete,
}

/// Length and checksum presence of one frame type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameLayout {
    /// Total words including the command word (and checksum, if any)
    pub len: usize,
    /// Whether the last byte is a checksum that must validate
    pub checksummed: bool,
}

impl FrameLayout {
    /// Frame without a trailing checksum
    pub const fn plain(len: usize) -> Self {
        Self {
            len,
            checksummed: false,
        }
    }

    /// Frame whose last byte is a checksum
    pub const fn checksummed(len: usize) -> Self {
        Self {
            len,
            checksummed: true,
        }
    }

    /// Layout for a command, given its subcommand byte when it has one
    ///
    /// Returns `None` when the command needs its subcommand to decide and
    /// `subcommand` has not arrived yet.
    pub fn for_command(command: Command, subcommand: Option<u8>) -> Option<Self> {
        match command {
            Command::Reset | Command::Poll => Some(Self::plain(1)),
            Command::Setup => Some(Self::checksummed(7)),
            Command::Reader => Some(Self::plain(2)),
            Command::Vend => subcommand.map(|sub| match VendSubcommand::from_byte(sub) {
                Some(VendSubcommand::Request) => Self::checksummed(7),
                Some(VendSubcommand::Cancel) => Self::plain(2),
                Some(VendSubcommand::Success) => Self::checksummed(5),
                Some(VendSubcommand::Failure) => Self::checksummed(3),
                Some(VendSubcommand::SessionComplete) => Self::checksummed(3),
                Some(VendSubcommand::CashSale) => Self::checksummed(7),
                None => Self::plain(2),
            }),
            Command::Expansion => {
                subcommand.map(|sub| match ExpansionSubcommand::from_byte(sub) {
                    Some(ExpansionSubcommand::RequestId) => Self::checksummed(MAX_FRAME_SIZE),
                    None => Self::plain(2),
                })
            }
        }
    }

    /// How many more words are needed before `pending` covers this layout
    pub fn missing(&self, pending: usize) -> usize {
        self.len.saturating_sub(pending)
    }
}

/// Result of looking for a complete frame in the receive buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameStatus {
    /// Not enough words pending; nothing was consumed
    NeedMoreBytes(usize),
    /// A whole frame was consumed and decoded
    Complete(Frame),
    /// A newer frame starts this many words in, so the partial frame in
    /// front of it can never complete
    Overtaken(usize),
}

/// A decoded inbound frame with mode bits stripped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Vec<u8, MAX_FRAME_SIZE>,
    layout: FrameLayout,
}

impl Frame {
    /// Decode `words` according to `layout`
    ///
    /// The mode bit is stripped from every word. Checksummed layouts are
    /// validated; a mismatch yields [`FrameError::InvalidChecksum`].
    pub fn decode(words: &[Word], layout: FrameLayout) -> Result<Self, FrameError> {
        if layout.len > MAX_FRAME_SIZE {
            return Err(FrameError::FrameTooLarge);
        }
        if words.len() < layout.len {
            return Err(FrameError::Incomplete);
        }

        let mut bytes = Vec::new();
        for word in &words[..layout.len] {
            bytes
                .push(word.byte())
                .map_err(|_| FrameError::FrameTooLarge)?;
        }

        if layout.checksummed && !codec::validate(&bytes) {
            return Err(FrameError::InvalidChecksum);
        }

        Ok(Self { bytes, layout })
    }

    /// All bytes of the frame including command and checksum
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The command this frame carries
    pub fn command(&self) -> Option<Command> {
        self.bytes.first().and_then(|&b| Command::from_byte(b))
    }

    /// Subcommand byte, if the frame is long enough to have one
    pub fn subcommand(&self) -> Option<u8> {
        self.bytes.get(1).copied()
    }

    /// Bytes between the subcommand and the checksum
    pub fn payload(&self) -> &[u8] {
        let end = if self.layout.checksummed {
            self.bytes.len() - 1
        } else {
            self.bytes.len()
        };
        if end <= 2 {
            &[]
        } else {
            &self.bytes[2..end]
        }
    }

    /// Big-endian 16-bit value at `offset` into the payload
    pub fn payload_u16(&self, offset: usize) -> Option<u16> {
        let payload = self.payload();
        match (payload.get(offset), payload.get(offset + 1)) {
            (Some(&hi), Some(&lo)) => Some(u16::from_be_bytes([hi, lo])),
            _ => None,
        }
    }
}
