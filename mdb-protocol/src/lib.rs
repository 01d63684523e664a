//! MDB Cashless Device Wire Protocol
//!
//! This crate defines the wire format spoken between a Vending Machine
//! Controller (VMC, the bus master) and a cashless payment reader on the
//! MDB (Multi-Drop Bus) serial link.
//!
//! # Protocol Overview
//!
//! Every word on the bus carries 8 data bits plus a 9th "mode" bit:
//! ```text
//! ┌──────────┬─────────────┬──────────┐
//! │ COMMAND  │ SUB/PAYLOAD │ CHECKSUM │
//! │ mode = 1 │ mode = 0    │ mode = 0 │
//! └──────────┴─────────────┴──────────┘
//! ```
//!
//! Frames from the VMC set the mode bit on the address/command word only.
//! Responses from the reader set it on their final word, which is how the
//! VMC finds the end of a response. The checksum is the 8-bit truncated sum
//! of every preceding byte in the frame.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod codec;
pub mod commands;
pub mod frame;
pub mod responses;
pub mod word;

pub use codec::{checksum, checksum_words, encode_terminator, validate};
pub use commands::{Command, ExpansionSubcommand, ReaderSubcommand, SetupSubcommand, VendSubcommand};
pub use frame::{Frame, FrameError, FrameLayout, FrameStatus, MAX_FRAME_SIZE};
pub use responses::{PollEvent, Response, ResponseOverflow, ACK, MAX_RESPONSE_SIZE, NAK, RET};
pub use word::{Word, MODE_BIT};
