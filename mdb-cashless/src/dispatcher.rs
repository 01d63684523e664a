//! Command dispatch
//!
//! The dispatcher looks at the oldest pending word and routes it to the
//! handler for that command without consuming it. Consumption is the
//! handler's job, so calling [`Dispatcher::dispatch`] again after more words
//! arrive picks up a partial frame where it left off.
//!
//! Two pieces of housekeeping happen before routing:
//!
//! - The VMC follows RESET, POLL and the two-byte frames with a checksum the
//!   frame layout does not cover. The dispatcher remembers what that
//!   checksum would be and swallows it when it shows up.
//! - A head word the reader cannot use (no mode bit, or an unknown command)
//!   is dropped together with everything up to the next mode-bit word, once
//!   such a word is pending. The same goes for a partial frame that a newer
//!   frame has overtaken.

use mdb_hal::MdbTransport;
use mdb_protocol::{Command, FrameError};

use crate::context::ReaderContext;
use crate::error::Error;
use crate::handlers;
use crate::link::Link;
use crate::traits::{DiagnosticEvent, Diagnostics, VendAuthorizer};

/// Why a complete frame was dropped without a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DiscardReason {
    /// Checksum byte did not match the frame
    ChecksumMismatch,
    /// Subcommand the reader does not implement
    UnknownSubcommand(u8),
    /// Frame too short for its subcommand's payload
    ShortPayload,
    /// Frame could not be decoded
    Malformed(FrameError),
}

/// What one dispatch step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dispatch {
    /// Nothing pending
    Idle,
    /// Head word is not a reader command; left pending
    Unrecognized(u8),
    /// `command` frame is incomplete; nothing consumed
    NeedMoreBytes { command: Command, missing: usize },
    /// Frame consumed and answered
    Handled(Command),
    /// Frame consumed and dropped without a response
    Discarded {
        command: Command,
        reason: DiscardReason,
    },
    /// The VMC's checksum for the previous short frame was swallowed
    TrailingChecksum,
    /// Stale words in front of a new frame were dropped
    Resynced(usize),
}

impl Dispatch {
    /// Whether another step could make progress without new input
    pub fn made_progress(&self) -> bool {
        !matches!(
            self,
            Dispatch::Idle | Dispatch::Unrecognized(_) | Dispatch::NeedMoreBytes { .. }
        )
    }
}

/// Routes pending frames to their handlers
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    /// Checksum expected after the last unchecksummed frame
    trailing: Option<u8>,
}

impl Dispatcher {
    pub const fn new() -> Self {
        Self { trailing: None }
    }

    /// Handle at most one frame from `transport`
    pub fn dispatch<T, A, D>(
        &mut self,
        ctx: &mut ReaderContext,
        transport: &mut T,
        authorizer: &mut A,
        diagnostics: &mut D,
    ) -> Result<Dispatch, Error<T::Error>>
    where
        T: MdbTransport,
        A: VendAuthorizer,
        D: Diagnostics,
    {
        let head = match transport.peek() {
            Some(word) => word,
            None => return Ok(Dispatch::Idle),
        };

        if let Some(expected) = self.trailing.take() {
            if !head.is_mode() && head.byte() == expected {
                transport.read();
                trace!("trailing checksum {=u8:#x} swallowed", expected);
                return Ok(Dispatch::TrailingChecksum);
            }
        }

        let command = Command::from_byte(head.byte());
        if !head.is_mode() || command.is_none() {
            if let Some(outcome) = resync(transport, diagnostics) {
                return Ok(outcome);
            }
        }
        let command = match command {
            Some(command) => command,
            None => return Ok(Dispatch::Unrecognized(head.byte())),
        };

        let mut link = Link::new(&mut *transport, &mut *diagnostics);
        let result = match command {
            Command::Reset => handlers::reset::handle(ctx, &mut link),
            Command::Setup => handlers::setup::handle(ctx, &mut link),
            Command::Poll => handlers::poll::handle(ctx, &mut link),
            Command::Vend => handlers::vend::handle(ctx, &mut link, authorizer),
            Command::Reader => handlers::reader::handle(ctx, &mut link),
            Command::Expansion => handlers::expansion::handle(ctx, &mut link),
        };
        self.trailing = link.take_trailing();
        result
    }
}

/// Drop everything before the next pending mode-bit word, if there is one
fn resync<T, D>(transport: &mut T, diagnostics: &mut D) -> Option<Dispatch>
where
    T: MdbTransport,
    D: Diagnostics,
{
    let start = (1..transport.pending_count())
        .find(|&i| transport.peek_at(i).map_or(false, |word| word.is_mode()))?;

    let dropped = transport.discard(start);
    warn!("dropped {=usize} stale words", dropped);
    diagnostics.record(DiagnosticEvent::StaleBytesDiscarded(dropped));
    Some(Dispatch::Resynced(dropped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NegotiatedDisplayConfig;
    use crate::testing::{framed, response, Bench};
    use mdb_protocol::{Word, ACK};

    #[test]
    fn test_empty_bus_is_idle() {
        let mut bench = Bench::new();
        assert_eq!(bench.step(), Dispatch::Idle);
        assert!(!Dispatch::Idle.made_progress());
    }

    #[test]
    fn test_partial_frame_left_pending() {
        let mut bench = Bench::new();
        let setup = framed(&[0x11, 0x00, 3, 2, 1, 0]);
        bench.receive(&setup[..4]);

        assert_eq!(
            bench.step(),
            Dispatch::NeedMoreBytes {
                command: Command::Setup,
                missing: 3
            }
        );
        assert_eq!(bench.transport.pending_count(), 4);
        assert_eq!(bench.transport.tx_len(), 0);

        // Calling again without new input changes nothing
        bench.step();
        assert_eq!(bench.transport.pending_count(), 4);

        for &byte in &setup[4..] {
            bench.transport.receive(Word::data(byte)).unwrap();
        }
        assert_eq!(bench.step(), Dispatch::Handled(Command::Setup));
        assert_eq!(bench.transport.pending_count(), 0);
    }

    #[test]
    fn test_subcommand_not_yet_received() {
        let mut bench = Bench::new();
        bench.receive(&[0x13]);
        assert_eq!(
            bench.step(),
            Dispatch::NeedMoreBytes {
                command: Command::Vend,
                missing: 1
            }
        );
        assert_eq!(bench.transport.pending_count(), 1);
    }

    #[test]
    fn test_unknown_command_left_pending() {
        let mut bench = Bench::new();
        bench.receive(&[0x08]);

        assert_eq!(bench.step(), Dispatch::Unrecognized(0x08));
        assert_eq!(bench.transport.pending_count(), 1);
        assert_eq!(bench.transport.tx_len(), 0);
    }

    #[test]
    fn test_unknown_command_dropped_when_next_frame_arrives() {
        let mut bench = Bench::new();
        bench.receive(&[0x08, 0x01]);
        bench.receive(&[0x12]);

        assert_eq!(bench.step(), Dispatch::Resynced(2));
        assert_eq!(bench.diagnostics.stale_bytes, 2);
        assert_eq!(bench.step(), Dispatch::Handled(Command::Poll));
    }

    #[test]
    fn test_trailing_checksum_swallowed() {
        let mut bench = Bench::new();
        // RESET and POLL as a real VMC sends them
        bench.receive(&[0x10, 0x10]);
        bench.receive(&[0x12, 0x12]);

        assert_eq!(bench.step(), Dispatch::Handled(Command::Reset));
        assert_eq!(bench.step(), Dispatch::TrailingChecksum);
        assert_eq!(bench.step(), Dispatch::Handled(Command::Poll));
        assert_eq!(bench.step(), Dispatch::TrailingChecksum);
        assert_eq!(bench.step(), Dispatch::Idle);

        // ACK for RESET, then Just Reset for the poll
        assert_eq!(
            bench.sent(),
            [Word::mode(ACK), Word::data(0x00), Word::mode(ACK)]
        );
    }

    #[test]
    fn test_trailing_checksum_waits_for_late_word() {
        let mut bench = Bench::new();
        bench.receive(&[0x14, 0x01]);
        assert_eq!(bench.step(), Dispatch::Handled(Command::Reader));
        assert_eq!(bench.step(), Dispatch::Idle);

        bench.transport.receive(Word::data(0x15)).unwrap();
        assert_eq!(bench.step(), Dispatch::TrailingChecksum);
    }

    #[test]
    fn test_trailing_checksum_forgotten_on_new_frame() {
        let mut bench = Bench::new();
        bench.receive(&[0x14, 0x01]);
        bench.receive(&[0x12]);
        // READER's checksum arriving after the next frame is stale
        bench.transport.receive(Word::data(0x15)).unwrap();
        bench.receive(&[0x12]);

        assert_eq!(bench.step(), Dispatch::Handled(Command::Reader));
        assert_eq!(bench.step(), Dispatch::Handled(Command::Poll));
        assert_eq!(bench.step(), Dispatch::Resynced(1));
        assert_eq!(bench.step(), Dispatch::Handled(Command::Poll));
    }

    #[test]
    fn test_stale_data_words_dropped() {
        let mut bench = Bench::new();
        for byte in [0x03, 0x02, 0x01] {
            bench.transport.receive(Word::data(byte)).unwrap();
        }
        bench.receive(&[0x12]);

        assert_eq!(bench.step(), Dispatch::Resynced(3));
        assert_eq!(bench.step(), Dispatch::Handled(Command::Poll));
    }

    #[test]
    fn test_abandoned_partial_frame_dropped() {
        let mut bench = Bench::new();
        bench.receive(&[0x11, 0x00, 0x03]);
        bench.receive(&[0x12]);

        assert_eq!(bench.step(), Dispatch::Resynced(3));
        assert_eq!(bench.step(), Dispatch::Handled(Command::Poll));
        assert_eq!(bench.ctx.display_config().feature_level, 0);
    }

    #[test]
    fn test_vend_missing_subcommand_overtaken_by_poll() {
        let mut bench = Bench::enabled();
        bench.ctx.report_malfunction(0x30);
        bench.receive(&[0x13]);
        bench.receive(&[0x12]);

        assert_eq!(bench.step(), Dispatch::Resynced(1));
        assert_eq!(bench.diagnostics.stale_bytes, 1);
        assert_eq!(bench.step(), Dispatch::Handled(Command::Poll));
        assert_eq!(bench.sent(), response(&[0x0A, 0x30, 0x3A]));
        assert_eq!(bench.transport.pending_count(), 0);
    }

    #[test]
    fn test_frames_behind_overtaken_setup_still_served() {
        let mut bench = Bench::new();
        bench.receive(&[0x11, 0x00, 3]);
        bench.receive(&[0x12]);
        bench.receive(&framed(&[0x11, 0x00, 3, 2, 1, 0]));

        assert_eq!(bench.step(), Dispatch::Resynced(3));
        assert_eq!(bench.step(), Dispatch::Handled(Command::Poll));
        assert_eq!(bench.step(), Dispatch::Handled(Command::Setup));
        assert_eq!(bench.step(), Dispatch::Idle);

        let config = response(&[0x01, 0x01, 0x18, 0x10, 0x01, 0x02, 0x05, 0x00, 0x32]);
        assert!(bench.sent().ends_with(&config));
        assert_eq!(
            bench.ctx.display_config(),
            &NegotiatedDisplayConfig {
                feature_level: 3,
                columns: 2,
                rows: 1,
                info: 0,
            }
        );
        assert_eq!(bench.transport.pending_count(), 0);
    }

    #[test]
    fn test_lone_data_word_left_pending() {
        let mut bench = Bench::new();
        bench.transport.receive(Word::data(0x42)).unwrap();

        assert_eq!(bench.step(), Dispatch::Unrecognized(0x42));
        assert_eq!(bench.transport.pending_count(), 1);
    }
}
