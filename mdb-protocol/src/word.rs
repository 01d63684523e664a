//! 9-bit bus words

/// The 9th bit of a bus word
///
/// Set on the command/address word of an inbound frame and on the final
/// word of an outbound response.
pub const MODE_BIT: u16 = 0x0100;

/// Mask covering all nine meaningful bits of a word
const WORD_MASK: u16 = 0x01FF;

/// A single 9-bit word as it travels on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Word(u16);

impl Word {
    /// Build a word from a raw value, discarding anything above bit 8
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw & WORD_MASK)
    }

    /// A data word (mode bit clear)
    pub const fn data(byte: u8) -> Self {
        Self(byte as u16)
    }

    /// A word with the mode bit set
    ///
    /// Used for the command byte of a VMC frame and for the last byte
    /// of a peripheral response.
    pub const fn mode(byte: u8) -> Self {
        Self(byte as u16 | MODE_BIT)
    }

    /// The raw 9-bit value
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// The 8 data bits with the mode bit stripped
    pub const fn byte(self) -> u8 {
        (self.0 & 0x00FF) as u8
    }

    /// Whether the mode bit is set
    pub const fn is_mode(self) -> bool {
        self.0 & MODE_BIT != 0
    }

    /// Same data byte with the mode bit set
    pub const fn with_mode(self) -> Self {
        Self(self.0 | MODE_BIT)
    }
}

impl From<u8> for Word {
    fn from(byte: u8) -> Self {
        Word::data(byte)
    }
}
