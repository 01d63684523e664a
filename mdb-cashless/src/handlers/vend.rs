//! VEND: purchase session traffic
//!
//! Frame layouts by subcommand:
//!
//! | Subcommand       | Frame                                         |
//! |------------------|-----------------------------------------------|
//! | Request          | VEND, 0x00, price (2), item (2), checksum     |
//! | Cancel           | VEND, 0x01                                    |
//! | Success          | VEND, 0x02, item (2), checksum                |
//! | Failure          | VEND, 0x03, checksum                          |
//! | Session Complete | VEND, 0x04, checksum                          |
//! | Cash Sale        | VEND, 0x05, price (2), item (2), checksum     |
//!
//! Out-of-sequence commands are not rejected; the state machine ignores
//! transitions that do not apply.

use mdb_hal::MdbTransport;
use mdb_protocol::{Command, Frame, PollEvent, Response, VendSubcommand};

use super::{report_overwrite, take, unknown_subcommand, Taken};
use crate::context::ReaderContext;
use crate::dispatcher::{DiscardReason, Dispatch};
use crate::error::Error;
use crate::link::Link;
use crate::state::StateEvent;
use crate::traits::{
    Authorization, DiagnosticEvent, Diagnostics, VendAuthorizer, VendRequest,
};

/// Handle VEND
pub fn handle<T, D, A>(
    ctx: &mut ReaderContext,
    link: &mut Link<'_, T, D>,
    authorizer: &mut A,
) -> Result<Dispatch, Error<T::Error>>
where
    T: MdbTransport,
    D: Diagnostics,
    A: VendAuthorizer,
{
    let frame = match take(link, Command::Vend) {
        Taken::Frame(frame) => frame,
        Taken::Outcome(outcome) => return Ok(outcome),
    };

    let sub = frame.subcommand().unwrap_or_default();
    let sub = match VendSubcommand::from_byte(sub) {
        Some(sub) => sub,
        None => return Ok(unknown_subcommand(link, Command::Vend, sub)),
    };

    match sub {
        VendSubcommand::Request => {
            let request = match vend_request(&frame) {
                Some(request) => request,
                None => return Ok(short_payload()),
            };
            debug!("VEND request: item {=u16} at {=u16}", request.item, request.price);
            let limits = *ctx.price_limits();
            // A zero window means the VMC never sent max/min prices
            if limits.max_price != 0 && !limits.contains(request.price) {
                warn!(
                    "VEND price {=u16} outside {=u16}..={=u16}",
                    request.price,
                    limits.min_price,
                    limits.max_price
                );
                link.report(DiagnosticEvent::PriceOutsideLimits(request.price));
            }

            ctx.start_vend(request);
            let decision = authorizer.authorize(&request);
            if decision == Authorization::Deferred {
                trace!("VEND authorization deferred");
            }
            if let Some(previous) = ctx.decide(decision) {
                let next = match decision {
                    Authorization::Approved { .. } => PollEvent::VendApproved,
                    _ => PollEvent::VendDenied,
                };
                report_overwrite(link, previous, next);
            }
            link.send(&Response::ack())?;
        }
        VendSubcommand::Cancel => {
            ctx.end_vend();
            link.send(&Response::status(PollEvent::VendDenied.to_byte()))?;
            ctx.apply(StateEvent::VendCancelled);
            info!("VEND cancelled by VMC");
        }
        VendSubcommand::Success => {
            let item = match frame.payload_u16(0) {
                Some(item) => item,
                None => return Ok(short_payload()),
            };
            ctx.end_vend();
            authorizer.vend_succeeded(item);
            link.send(&Response::ack())?;
            ctx.apply(StateEvent::VendSettled);
            debug!("VEND success: item {=u16}", item);
        }
        VendSubcommand::Failure => {
            if let Some(request) = ctx.end_vend() {
                authorizer.vend_failed(&request);
            }
            link.send(&Response::ack())?;
            ctx.apply(StateEvent::VendSettled);
            warn!("VEND failure reported by VMC");
        }
        VendSubcommand::SessionComplete => {
            ctx.end_vend();
            link.send(&Response::status(PollEvent::EndSession.to_byte()))?;
            ctx.apply(StateEvent::SessionCompleted);
            info!("VEND session complete");
        }
        VendSubcommand::CashSale => {
            let sale = match vend_request(&frame) {
                Some(sale) => sale,
                None => return Ok(short_payload()),
            };
            authorizer.cash_sale(&sale);
            link.send(&Response::ack())?;
        }
    }

    Ok(Dispatch::Handled(Command::Vend))
}

/// Price and item number from a request or cash sale payload
fn vend_request(frame: &Frame) -> Option<VendRequest> {
    Some(VendRequest {
        price: frame.payload_u16(0)?,
        item: frame.payload_u16(2)?,
    })
}

fn short_payload() -> Dispatch {
    Dispatch::Discarded {
        command: Command::Vend,
        reason: DiscardReason::ShortPayload,
    }
}
