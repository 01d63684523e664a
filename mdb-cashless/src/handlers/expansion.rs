//! EXPANSION: peripheral identification
//!
//! Request ID frame: `[EXPANSION, 0x00, manufacturer (3), serial (12),
//! model (12), version (2), checksum]`. The VMC's identity is only logged;
//! the reply is Peripheral ID followed by our own identification.

use mdb_hal::MdbTransport;
use mdb_protocol::{Command, ExpansionSubcommand, PollEvent, Response, ResponseOverflow};

use super::{take, unknown_subcommand, Taken};
use crate::config::PeripheralInfo;
use crate::context::ReaderContext;
use crate::dispatcher::Dispatch;
use crate::error::Error;
use crate::link::Link;
use crate::traits::Diagnostics;

/// Handle EXPANSION
pub fn handle<T, D>(
    ctx: &mut ReaderContext,
    link: &mut Link<'_, T, D>,
) -> Result<Dispatch, Error<T::Error>>
where
    T: MdbTransport,
    D: Diagnostics,
{
    let frame = match take(link, Command::Expansion) {
        Taken::Frame(frame) => frame,
        Taken::Outcome(outcome) => return Ok(outcome),
    };

    let sub = frame.subcommand().unwrap_or_default();
    match ExpansionSubcommand::from_byte(sub) {
        Some(ExpansionSubcommand::RequestId) => {
            let payload = frame.payload();
            debug!("EXPANSION request ID from VMC {=[u8]:a}", &payload[..3]);
            link.send(&peripheral_id(ctx.peripheral())?)?;
        }
        None => return Ok(unknown_subcommand(link, Command::Expansion, sub)),
    }

    Ok(Dispatch::Handled(Command::Expansion))
}

/// Peripheral ID response for `info`
pub fn peripheral_id(info: &PeripheralInfo) -> Result<Response, ResponseOverflow> {
    let mut response = Response::new();
    response.push(PollEvent::PeripheralId.to_byte())?;
    response.extend(&info.manufacturer)?;
    response.extend(&info.serial)?;
    response.extend(&info.model)?;
    response.push_u16(info.software_version)?;
    response.seal_with_checksum()
}
