//! The engine's view of the bus while a handler runs
//!
//! Bundles the transport with the diagnostics sink and implements the
//! "consume only whole frames" rule: [`Link::take_frame`] looks at the
//! receive buffer without consuming, and only reads words once every word
//! of the frame is pending.

use heapless::Vec;
use mdb_hal::MdbTransport;
use mdb_protocol::{
    codec, Command, Frame, FrameError, FrameLayout, FrameStatus, Response, Word, MAX_FRAME_SIZE,
};

use crate::error::Error;
use crate::traits::{DiagnosticEvent, Diagnostics};

pub struct Link<'a, T, D> {
    transport: &'a mut T,
    diagnostics: &'a mut D,
    /// Checksum the VMC will append to the last unchecksummed frame
    trailing: Option<u8>,
}

impl<'a, T, D> Link<'a, T, D>
where
    T: MdbTransport,
    D: Diagnostics,
{
    pub fn new(transport: &'a mut T, diagnostics: &'a mut D) -> Self {
        Self {
            transport,
            diagnostics,
            trailing: None,
        }
    }

    /// Try to take one whole `command` frame off the receive buffer
    ///
    /// Returns `NeedMoreBytes` without consuming anything while the frame
    /// is incomplete. Once complete, every word of the frame is consumed,
    /// even if the checksum then fails.
    ///
    /// VMC payload words never carry the mode bit, so a mode-bit word behind
    /// the head marks where the frame ends. If the layout needs more words
    /// than that, the partial frame is dropped up to the newer one and
    /// `Overtaken` reports how many words went.
    pub fn take_frame(&mut self, command: Command) -> Result<FrameStatus, FrameError> {
        let pending = self.transport.pending_count();
        let boundary = (1..pending).find(|&i| {
            self.transport
                .peek_at(i)
                .map_or(false, |word| word.is_mode())
        });
        let available = boundary.unwrap_or(pending);

        let subcommand = if command.has_subcommand() && available > 1 {
            self.transport.peek_at(1).map(Word::byte)
        } else {
            None
        };

        let layout = FrameLayout::for_command(command, subcommand);
        let missing = match layout {
            Some(layout) => layout.missing(available),
            // Subcommand not here yet
            None => 2usize.saturating_sub(available),
        };
        if missing > 0 {
            return Ok(match boundary {
                Some(start) => FrameStatus::Overtaken(self.transport.discard(start)),
                None => FrameStatus::NeedMoreBytes(missing),
            });
        }
        let layout = layout.ok_or(FrameError::Incomplete)?;

        let mut words: Vec<Word, MAX_FRAME_SIZE> = Vec::new();
        for _ in 0..layout.len {
            match self.transport.read() {
                Some(word) => words.push(word).map_err(|_| FrameError::FrameTooLarge)?,
                None => return Err(FrameError::Incomplete),
            }
        }

        let frame = Frame::decode(&words, layout)?;
        if !layout.checksummed {
            self.trailing = Some(codec::checksum(frame.bytes()));
        }
        Ok(FrameStatus::Complete(frame))
    }

    /// Transmit a response
    pub fn send(&mut self, response: &Response) -> Result<(), Error<T::Error>> {
        trace!("TX: {} words", response.len());
        self.transport
            .write_all(response.words())
            .map_err(Error::Transport)
    }

    /// Report a diagnostic event
    pub fn report(&mut self, event: DiagnosticEvent) {
        self.diagnostics.record(event);
    }

    /// Checksum a VMC would append to the frame just taken, if it was
    /// an unchecksummed frame
    pub fn take_trailing(&mut self) -> Option<u8> {
        self.trailing.take()
    }
}
