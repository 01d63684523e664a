//! Board-agnostic MDB cashless reader protocol engine
//!
//! This crate implements the peripheral side of MDB cashless device #1
//! without depending on any particular UART or board:
//!
//! - Reader configuration (identity, negotiated display and prices)
//! - Reader state machine
//! - Command dispatch and the RESET / SETUP / POLL / VEND / READER /
//!   EXPANSION handlers
//! - Collaborator traits for vend authorization and diagnostics
//!
//! Bytes move through an [`mdb_hal::MdbTransport`]; everything the reader
//! knows lives in one [`ReaderContext`].

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod link;
pub mod reader;
pub mod state;
pub mod traits;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, PeripheralInfo, ReaderIdentity};
pub use context::{ReaderContext, SessionError};
pub use dispatcher::{DiscardReason, Dispatch, Dispatcher};
pub use error::Error;
pub use reader::CashlessReader;
pub use state::{ReaderState, StateEvent};
pub use traits::{Authorization, VendAuthorizer, VendRequest};
