//! MDB Transport Abstraction Layer
//!
//! This crate defines the transport contract the cashless reader engine
//! consumes, plus two implementations that are not tied to a chip:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  mdb-cashless (protocol engine)         │
//! └─────────────────────────────────────────┘
//!                     │  MdbTransport
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ RingTransport │       │ PairedWordUart│
//! │  (ISR queues) │       │ (embedded-io) │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Modules
//!
//! - [`transport::MdbTransport`] - peek/read/write/count over 9-bit words
//! - [`ring::RingTransport`] - fixed-capacity receive and transmit queues
//! - [`uart::PairedWordUart`] - 9-bit words carried as byte pairs on a byte stream

#![no_std]
#![deny(unsafe_code)]

pub mod ring;
pub mod transport;
pub mod uart;

pub use ring::RingTransport;
pub use transport::{MdbTransport, TransportError};
pub use uart::{PairedWordUart, UartConfig};
