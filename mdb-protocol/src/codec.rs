//! Frame codec: checksum computation and the response terminator.
//!
//! MDB uses a plain additive checksum: the sum of every byte before the
//! checksum byte, truncated to 8 bits. The mode bit never takes part in it.

use crate::word::{Word, MODE_BIT};

/// 8-bit sum of `bytes`, modulo 256
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, &b| sum.wrapping_add(b))
}

/// Checksum over a run of words, ignoring their mode bits
pub fn checksum_words(words: &[Word]) -> u8 {
    words.iter().fold(0u8, |sum, w| sum.wrapping_add(w.byte()))
}

/// Check that the last byte of `frame` is the checksum of the bytes before it
///
/// An empty slice has no checksum byte and never validates.
pub fn validate(frame: &[u8]) -> bool {
    match frame.split_last() {
        Some((&received, body)) => checksum(body) == received,
        None => false,
    }
}

/// Mark `sum` as the terminating word of a multi-byte response
///
/// The VMC infers the end of a response from the mode bit on the last
/// word; there is no length field.
pub fn encode_terminator(sum: u8) -> Word {
    Word::from_raw(sum as u16 | MODE_BIT)
}
