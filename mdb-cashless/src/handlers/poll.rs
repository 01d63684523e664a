//! POLL: report the single pending event
//!
//! | Pending event            | Response                                         |
//! |--------------------------|--------------------------------------------------|
//! | none                     | ACK                                              |
//! | Just Reset               | 0x00, ACK                                        |
//! | Reader Config Data       | 0x01, identity (feature level..misc), checksum   |
//! | Display Request          | 0x02, display time, `columns × rows` bytes       |
//! | Begin Session            | 0x03, funds available (2), checksum              |
//! | Vend Approved            | 0x05, vend amount (2), checksum                  |
//! | Malfunction / Error      | 0x0A, error code, checksum                       |
//! | anything else            | event code alone                                 |
//!
//! The last word of every response carries the mode bit. Polling empties
//! the slot.

use mdb_hal::MdbTransport;
use mdb_protocol::{Command, PollEvent, Response, ResponseOverflow, ACK};

use super::{take, Taken};
use crate::context::ReaderContext;
use crate::dispatcher::Dispatch;
use crate::error::Error;
use crate::link::Link;
use crate::traits::Diagnostics;

/// Pad byte for display messages shorter than the display
const DISPLAY_PAD: u8 = b' ';

/// Handle POLL
pub fn handle<T, D>(
    ctx: &mut ReaderContext,
    link: &mut Link<'_, T, D>,
) -> Result<Dispatch, Error<T::Error>>
where
    T: MdbTransport,
    D: Diagnostics,
{
    if let Taken::Outcome(outcome) = take(link, Command::Poll) {
        return Ok(outcome);
    }

    let response = match ctx.take_pending() {
        Some(event) => {
            debug!("POLL: reporting {}", event);
            event_response(ctx, event)?
        }
        None => Response::ack(),
    };
    link.send(&response)?;

    Ok(Dispatch::Handled(Command::Poll))
}

/// Build the response for `event` from the current context
pub fn event_response(ctx: &ReaderContext, event: PollEvent) -> Result<Response, ResponseOverflow> {
    let mut response = Response::new();
    response.push(event.to_byte())?;

    match event {
        PollEvent::JustReset => {
            response.push(ACK)?;
            Ok(response.seal())
        }
        PollEvent::ReaderConfigData => {
            // Event code stands in for the config-data byte of the identity
            response.extend(&ctx.identity().to_bytes()[1..])?;
            response.seal_with_checksum()
        }
        PollEvent::DisplayRequest => {
            response.push(ctx.display_time())?;
            let message = ctx.display_message();
            for i in 0..ctx.display_config().message_len() {
                response.push(message.get(i).copied().unwrap_or(DISPLAY_PAD))?;
            }
            Ok(response.seal())
        }
        PollEvent::BeginSession => {
            response.push_u16(ctx.funds_available())?;
            response.seal_with_checksum()
        }
        PollEvent::VendApproved => {
            response.push_u16(ctx.approved_amount())?;
            response.seal_with_checksum()
        }
        PollEvent::MalfunctionError => {
            response.push(ctx.malfunction_code())?;
            response.seal_with_checksum()
        }
        // The event code is the whole response
        PollEvent::SessionCancelRequest
        | PollEvent::VendDenied
        | PollEvent::EndSession
        | PollEvent::Cancelled => Ok(response.seal()),
        // No payload defined for these yet
        PollEvent::PeripheralId
        | PollEvent::CommandOutOfSequence
        | PollEvent::DiagnosticResponse => Ok(response.seal()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NegotiatedDisplayConfig;
    use crate::testing::{response, Bench};

    fn display(columns: u8, rows: u8) -> NegotiatedDisplayConfig {
        NegotiatedDisplayConfig {
            feature_level: 3,
            columns,
            rows,
            info: 0,
        }
    }

    #[test]
    fn test_empty_slot_is_bare_ack() {
        let mut bench = Bench::enabled();
        let (outcome, sent) = bench.exchange(&[0x12]);
        assert_eq!(outcome, Dispatch::Handled(Command::Poll));
        assert_eq!(sent, response(&[ACK]));
    }

    #[test]
    fn test_poll_clears_slot() {
        let mut bench = Bench::enabled();
        bench.ctx.report_malfunction(0x30);

        let (_, sent) = bench.exchange(&[0x12]);
        assert_eq!(sent, response(&[0x0A, 0x30, 0x3A]));
        assert_eq!(bench.ctx.pending_event(), None);

        let (_, sent) = bench.exchange(&[0x12]);
        assert_eq!(sent, response(&[ACK]));
    }

    #[test]
    fn test_display_two_by_one() {
        let mut bench = Bench::enabled();
        bench.ctx.set_display_config(display(2, 1));
        bench.ctx.request_display(b"HELLO");

        let (_, sent) = bench.exchange(&[0x12]);
        assert_eq!(sent, response(&[0x02, 100, b'H', b'E']));
    }

    #[test]
    fn test_display_without_geometry_sends_time_only() {
        for (columns, rows) in [(0, 1), (16, 0), (0, 0)] {
            let mut bench = Bench::enabled();
            bench.ctx.set_display_config(display(columns, rows));
            bench.ctx.request_display(b"HELLO");

            let (_, sent) = bench.exchange(&[0x12]);
            assert_eq!(sent, response(&[0x02, 100]));
        }
    }

    #[test]
    fn test_display_message_padded() {
        let mut bench = Bench::enabled();
        bench.ctx.set_display_config(display(4, 1));
        bench.ctx.request_display(b"AB");

        let (_, sent) = bench.exchange(&[0x12]);
        assert_eq!(sent, response(&[0x02, 100, b'A', b'B', b' ', b' ']));
    }

    #[test]
    fn test_display_capped_at_protocol_limit() {
        let mut bench = Bench::enabled();
        bench.ctx.set_display_config(display(16, 4));
        bench.ctx.request_display(&[b'#'; 64]);

        let (_, sent) = bench.exchange(&[0x12]);
        assert_eq!(sent.len(), 2 + 32);
    }

    #[test]
    fn test_reader_config_data() {
        let mut bench = Bench::enabled();
        bench.ctx.request_reader_config();

        let (_, sent) = bench.exchange(&[0x12]);
        assert_eq!(
            sent,
            response(&[0x01, 0x01, 0x18, 0x10, 0x01, 0x02, 0x05, 0x00, 0x32])
        );
    }

    #[test]
    fn test_begin_session_with_unknown_funds() {
        let mut bench = Bench::enabled();
        bench.ctx.begin_session(crate::context::FUNDS_UNKNOWN).unwrap();

        let (_, sent) = bench.exchange(&[0x12]);
        assert_eq!(sent, response(&[0x03, 0xFF, 0xFF, 0x01]));
    }

    #[test]
    fn test_code_only_events() {
        let mut bench = Bench::enabled();
        bench.ctx.begin_session(100).unwrap();
        bench.exchange(&[0x12]);

        bench.ctx.request_session_cancel().unwrap();
        let (_, sent) = bench.exchange(&[0x12]);
        assert_eq!(sent, response(&[0x04]));
    }

    #[test]
    fn test_just_reset_after_reset() {
        let mut bench = Bench::new();
        bench.exchange(&[0x10]);

        let (_, sent) = bench.exchange(&[0x12]);
        assert_eq!(sent, response(&[0x00, ACK]));
    }
}
