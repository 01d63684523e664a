//! SETUP: configuration and price negotiation
//!
//! Both subcommands share one 7-byte layout:
//! `[SETUP, sub, d0, d1, d2, d3, checksum]`. The whole frame is consumed
//! before the checksum is looked at; a bad checksum changes nothing and
//! gets no answer.

use mdb_hal::MdbTransport;
use mdb_protocol::{Command, Frame, Response, SetupSubcommand};

use super::{take, unknown_subcommand, Taken};
use crate::config::{NegotiatedDisplayConfig, PriceLimits};
use crate::context::ReaderContext;
use crate::dispatcher::{DiscardReason, Dispatch};
use crate::error::Error;
use crate::link::Link;
use crate::state::StateEvent;
use crate::traits::{DiagnosticEvent, Diagnostics};

/// Handle SETUP
pub fn handle<T, D>(
    ctx: &mut ReaderContext,
    link: &mut Link<'_, T, D>,
) -> Result<Dispatch, Error<T::Error>>
where
    T: MdbTransport,
    D: Diagnostics,
{
    let frame = match take(link, Command::Setup) {
        Taken::Frame(frame) => frame,
        Taken::Outcome(outcome) => return Ok(outcome),
    };

    let sub = frame.subcommand().unwrap_or_default();
    match SetupSubcommand::from_byte(sub) {
        Some(SetupSubcommand::ConfigData) => config_data(ctx, link, &frame),
        Some(SetupSubcommand::MaxMinPrices) => max_min_prices(ctx, link, &frame),
        None => Ok(unknown_subcommand(link, Command::Setup, sub)),
    }
}

/// Store the VMC's display geometry and answer with our identity
fn config_data<T, D>(
    ctx: &mut ReaderContext,
    link: &mut Link<'_, T, D>,
    frame: &Frame,
) -> Result<Dispatch, Error<T::Error>>
where
    T: MdbTransport,
    D: Diagnostics,
{
    let display = match NegotiatedDisplayConfig::from_payload(frame.payload()) {
        Some(display) => display,
        None => {
            return Ok(Dispatch::Discarded {
                command: Command::Setup,
                reason: DiscardReason::ShortPayload,
            })
        }
    };
    ctx.set_display_config(display);
    debug!(
        "SETUP config: level {=u8}, display {=u8}x{=u8}",
        display.feature_level,
        display.columns,
        display.rows
    );

    let mut response = Response::new();
    response.extend(&ctx.identity().to_bytes())?;
    link.send(&response.seal_with_checksum()?)?;
    link.report(DiagnosticEvent::ConfigAccepted);

    Ok(Dispatch::Handled(Command::Setup))
}

/// Store the price window and move the reader to Disabled
fn max_min_prices<T, D>(
    ctx: &mut ReaderContext,
    link: &mut Link<'_, T, D>,
    frame: &Frame,
) -> Result<Dispatch, Error<T::Error>>
where
    T: MdbTransport,
    D: Diagnostics,
{
    let (max_price, min_price) = match (frame.payload_u16(0), frame.payload_u16(2)) {
        (Some(max), Some(min)) => (max, min),
        _ => {
            return Ok(Dispatch::Discarded {
                command: Command::Setup,
                reason: DiscardReason::ShortPayload,
            })
        }
    };
    ctx.set_price_limits(PriceLimits {
        max_price,
        min_price,
    });
    link.send(&Response::ack())?;
    ctx.apply(StateEvent::PricesNegotiated);
    link.report(DiagnosticEvent::PricesAccepted);
    info!("SETUP prices: max {=u16}, min {=u16}; reader disabled", max_price, min_price);

    Ok(Dispatch::Handled(Command::Setup))
}
