//! Diagnostics collaborator
//!
//! The engine reports protocol-level happenings here instead of poking
//! hardware itself. What the product does with them (LEDs, counters,
//! nothing) is up to the implementation.

use embedded_hal::digital::OutputPin;
use mdb_protocol::{Command, PollEvent};

/// Something worth reporting outside the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DiagnosticEvent {
    /// A frame failed its checksum and was dropped
    ChecksumMismatch(Command),
    /// SETUP / config data accepted and answered
    ConfigAccepted,
    /// SETUP / max-min prices accepted
    PricesAccepted,
    /// A frame carried a subcommand the reader does not implement
    UnknownSubcommand { command: Command, subcommand: u8 },
    /// A pending poll event was replaced before the VMC polled it
    PollEventOverwritten { previous: PollEvent, next: PollEvent },
    /// Leftover words of an abandoned frame were dropped
    StaleBytesDiscarded(usize),
    /// VEND request priced outside the negotiated max/min window
    PriceOutsideLimits(u16),
}

/// Sink for [`DiagnosticEvent`]s
pub trait Diagnostics {
    fn record(&mut self, event: DiagnosticEvent);
}

impl<D: Diagnostics + ?Sized> Diagnostics for &mut D {
    fn record(&mut self, event: DiagnosticEvent) {
        (**self).record(event)
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDiagnostics;

impl Diagnostics for NoDiagnostics {
    fn record(&mut self, _event: DiagnosticEvent) {}
}

/// Counts events by kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DiagnosticCounters {
    pub checksum_mismatches: u32,
    pub configs_accepted: u32,
    pub prices_accepted: u32,
    pub unknown_subcommands: u32,
    pub poll_events_overwritten: u32,
    pub stale_bytes: u32,
    pub prices_outside_limits: u32,
}

impl Diagnostics for DiagnosticCounters {
    fn record(&mut self, event: DiagnosticEvent) {
        match event {
            DiagnosticEvent::ChecksumMismatch(_) => {
                self.checksum_mismatches = self.checksum_mismatches.saturating_add(1)
            }
            DiagnosticEvent::ConfigAccepted => {
                self.configs_accepted = self.configs_accepted.saturating_add(1)
            }
            DiagnosticEvent::PricesAccepted => {
                self.prices_accepted = self.prices_accepted.saturating_add(1)
            }
            DiagnosticEvent::UnknownSubcommand { .. } => {
                self.unknown_subcommands = self.unknown_subcommands.saturating_add(1)
            }
            DiagnosticEvent::PollEventOverwritten { .. } => {
                self.poll_events_overwritten = self.poll_events_overwritten.saturating_add(1)
            }
            DiagnosticEvent::StaleBytesDiscarded(n) => {
                self.stale_bytes = self.stale_bytes.saturating_add(n as u32)
            }
            DiagnosticEvent::PriceOutsideLimits(_) => {
                self.prices_outside_limits = self.prices_outside_limits.saturating_add(1)
            }
        }
    }
}

/// Latches bring-up LEDs on key SETUP milestones
///
/// - `fault`: a frame failed its checksum
/// - `config`: config data was answered
/// - `prices`: price limits were accepted
///
/// LEDs stay lit until [`clear`](Self::clear). Pin errors are ignored;
/// a broken LED must not affect the bus.
pub struct LedDiagnostics<F, C, P> {
    fault: F,
    config: C,
    prices: P,
}

impl<F, C, P> LedDiagnostics<F, C, P>
where
    F: OutputPin,
    C: OutputPin,
    P: OutputPin,
{
    pub fn new(fault: F, config: C, prices: P) -> Self {
        Self {
            fault,
            config,
            prices,
        }
    }

    /// Turn every LED off
    pub fn clear(&mut self) {
        let _ = self.fault.set_low();
        let _ = self.config.set_low();
        let _ = self.prices.set_low();
    }

    /// Give the pins back
    pub fn release(self) -> (F, C, P) {
        (self.fault, self.config, self.prices)
    }
}

impl<F, C, P> Diagnostics for LedDiagnostics<F, C, P>
where
    F: OutputPin,
    C: OutputPin,
    P: OutputPin,
{
    fn record(&mut self, event: DiagnosticEvent) {
        match event {
            DiagnosticEvent::ChecksumMismatch(_) => {
                let _ = self.fault.set_high();
            }
            DiagnosticEvent::ConfigAccepted => {
                let _ = self.config.set_high();
            }
            DiagnosticEvent::PricesAccepted => {
                let _ = self.prices.set_high();
            }
            _ => {}
        }
    }
}
