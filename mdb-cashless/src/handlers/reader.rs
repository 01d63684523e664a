//! READER: enable, disable, cancel
//!
//! Two-byte frame `[READER, sub]`, no checksum.

use mdb_hal::MdbTransport;
use mdb_protocol::{Command, PollEvent, ReaderSubcommand, Response};

use super::{take, unknown_subcommand, Taken};
use crate::context::ReaderContext;
use crate::dispatcher::Dispatch;
use crate::error::Error;
use crate::link::Link;
use crate::state::StateEvent;
use crate::traits::Diagnostics;

/// Handle READER
pub fn handle<T, D>(
    ctx: &mut ReaderContext,
    link: &mut Link<'_, T, D>,
) -> Result<Dispatch, Error<T::Error>>
where
    T: MdbTransport,
    D: Diagnostics,
{
    let frame = match take(link, Command::Reader) {
        Taken::Frame(frame) => frame,
        Taken::Outcome(outcome) => return Ok(outcome),
    };

    let sub = frame.subcommand().unwrap_or_default();
    match ReaderSubcommand::from_byte(sub) {
        Some(ReaderSubcommand::Disable) => {
            ctx.apply(StateEvent::ReaderDisabled);
            link.send(&Response::ack())?;
            info!("READER disabled");
        }
        Some(ReaderSubcommand::Enable) => {
            ctx.apply(StateEvent::ReaderEnabled);
            link.send(&Response::ack())?;
            info!("READER enabled");
        }
        Some(ReaderSubcommand::Cancel) => {
            link.send(&Response::status(PollEvent::Cancelled.to_byte()))?;
        }
        None => return Ok(unknown_subcommand(link, Command::Reader, sub)),
    }

    Ok(Dispatch::Handled(Command::Reader))
}
