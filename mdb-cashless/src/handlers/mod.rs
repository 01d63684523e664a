//! Command handlers
//!
//! One module per top-level command. Every handler takes its own frame off
//! the bus through [`Link::take_frame`], so a handler invoked on a partial
//! frame returns `NeedMoreBytes` and leaves the receive buffer untouched.
//! A partial frame that a newer frame has overtaken comes back as
//! `Resynced` instead.

pub mod expansion;
pub mod poll;
pub mod reader;
pub mod reset;
pub mod setup;
pub mod vend;

use mdb_hal::MdbTransport;
use mdb_protocol::{Command, Frame, FrameError, FrameStatus, PollEvent};

use crate::dispatcher::{DiscardReason, Dispatch};
use crate::link::Link;
use crate::traits::{DiagnosticEvent, Diagnostics};

/// A whole frame, or the outcome to return instead
pub(crate) enum Taken {
    Frame(Frame),
    Outcome(Dispatch),
}

/// Take a `command` frame, turning partial and corrupt frames into outcomes
pub(crate) fn take<T, D>(link: &mut Link<'_, T, D>, command: Command) -> Taken
where
    T: MdbTransport,
    D: Diagnostics,
{
    match link.take_frame(command) {
        Ok(FrameStatus::Complete(frame)) => {
            trace!("RX frame: {}", frame.bytes());
            Taken::Frame(frame)
        }
        Ok(FrameStatus::NeedMoreBytes(missing)) => {
            Taken::Outcome(Dispatch::NeedMoreBytes { command, missing })
        }
        Ok(FrameStatus::Overtaken(dropped)) => {
            warn!("partial {} frame overtaken, dropped {=usize} words", command, dropped);
            link.report(DiagnosticEvent::StaleBytesDiscarded(dropped));
            Taken::Outcome(Dispatch::Resynced(dropped))
        }
        Err(FrameError::InvalidChecksum) => {
            warn!("{} frame failed checksum, dropped", command);
            link.report(DiagnosticEvent::ChecksumMismatch(command));
            Taken::Outcome(Dispatch::Discarded {
                command,
                reason: DiscardReason::ChecksumMismatch,
            })
        }
        Err(e) => {
            warn!("{} frame malformed: {}", command, e);
            Taken::Outcome(Dispatch::Discarded {
                command,
                reason: DiscardReason::Malformed(e),
            })
        }
    }
}

/// Outcome for a frame whose subcommand the reader does not implement
pub(crate) fn unknown_subcommand<T, D>(
    link: &mut Link<'_, T, D>,
    command: Command,
    subcommand: u8,
) -> Dispatch
where
    T: MdbTransport,
    D: Diagnostics,
{
    debug!("{} subcommand {=u8:#x} ignored", command, subcommand);
    link.report(DiagnosticEvent::UnknownSubcommand {
        command,
        subcommand,
    });
    Dispatch::Discarded {
        command,
        reason: DiscardReason::UnknownSubcommand(subcommand),
    }
}

/// Report a poll event displaced before the VMC polled it
pub(crate) fn report_overwrite<T, D>(link: &mut Link<'_, T, D>, previous: PollEvent, next: PollEvent)
where
    T: MdbTransport,
    D: Diagnostics,
{
    warn!("poll event {} replaced by {} before being polled", previous, next);
    link.report(DiagnosticEvent::PollEventOverwritten { previous, next });
}
