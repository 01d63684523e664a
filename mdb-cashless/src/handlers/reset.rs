//! RESET: return to power-up state

use mdb_hal::MdbTransport;
use mdb_protocol::{Command, Response};

use super::{take, Taken};
use crate::context::ReaderContext;
use crate::dispatcher::Dispatch;
use crate::error::Error;
use crate::link::Link;
use crate::traits::Diagnostics;

/// Handle RESET
///
/// Zeroes the negotiated display config and price limits, answers ACK and
/// drops the reader to Inactive with Just Reset pending for the next poll.
pub fn handle<T, D>(
    ctx: &mut ReaderContext,
    link: &mut Link<'_, T, D>,
) -> Result<Dispatch, Error<T::Error>>
where
    T: MdbTransport,
    D: Diagnostics,
{
    if let Taken::Outcome(outcome) = take(link, Command::Reset) {
        return Ok(outcome);
    }

    ctx.reset();
    link.send(&Response::ack())?;
    info!("RESET: reader inactive");

    Ok(Dispatch::Handled(Command::Reset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NegotiatedDisplayConfig, PriceLimits};
    use crate::state::ReaderState;
    use crate::testing::{framed, response, Bench};
    use mdb_protocol::PollEvent;

    #[test]
    fn test_reset_scenario() {
        let mut bench = Bench::new();
        bench.exchange(&framed(&[0x11, 0x00, 3, 16, 2, 1]));
        bench.exchange(&framed(&[0x11, 0x01, 0x01, 0x00, 0x00, 0x10]));
        assert_eq!(bench.ctx.state(), ReaderState::Disabled);

        let (outcome, sent) = bench.exchange(&[0x10]);

        assert_eq!(outcome, Dispatch::Handled(Command::Reset));
        assert_eq!(sent, response(&[0x00]));
        assert_eq!(bench.ctx.display_config(), &NegotiatedDisplayConfig::default());
        assert_eq!(bench.ctx.price_limits(), &PriceLimits::default());
        assert_eq!(bench.ctx.state(), ReaderState::Inactive);
        assert_eq!(bench.ctx.pending_event(), Some(PollEvent::JustReset));
    }

    #[test]
    fn test_reset_abandons_session() {
        let mut bench = Bench::enabled();
        bench.ctx.begin_session(300).unwrap();
        bench.exchange(&[0x10]);

        assert_eq!(bench.ctx.state(), ReaderState::Inactive);
        assert!(bench.ctx.current_vend().is_none());
        // Begin Session is replaced by Just Reset
        assert_eq!(bench.ctx.pending_event(), Some(PollEvent::JustReset));
    }
}
