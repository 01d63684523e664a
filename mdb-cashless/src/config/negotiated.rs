//! Values the VMC negotiates during SETUP
//!
//! Both are zeroed by RESET and only written by their SETUP subcommand.

/// Protocol ceiling on display message length (columns × rows)
pub const MAX_DISPLAY_MESSAGE: usize = 32;

/// VMC capabilities from SETUP / config data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NegotiatedDisplayConfig {
    /// VMC feature level
    pub feature_level: u8,
    /// Display columns (0 = no display)
    pub columns: u8,
    /// Display rows (0 = no display)
    pub rows: u8,
    /// Display type / info flags
    pub info: u8,
}

impl NegotiatedDisplayConfig {
    /// Build from the four SETUP / config data payload bytes
    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        match payload {
            [feature_level, columns, rows, info, ..] => Some(Self {
                feature_level: *feature_level,
                columns: *columns,
                rows: *rows,
                info: *info,
            }),
            _ => None,
        }
    }

    /// Number of message bytes a display request must carry
    ///
    /// `columns × rows`, capped at [`MAX_DISPLAY_MESSAGE`].
    pub fn message_len(&self) -> usize {
        (self.columns as usize * self.rows as usize).min(MAX_DISPLAY_MESSAGE)
    }
}

/// Price window from SETUP / max-min prices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PriceLimits {
    /// Highest price the VMC will ask for, in scaled units
    pub max_price: u16,
    /// Lowest price the VMC will ask for, in scaled units
    pub min_price: u16,
}

impl PriceLimits {
    /// Whether `price` falls inside the negotiated window
    pub fn contains(&self, price: u16) -> bool {
        price >= self.min_price && price <= self.max_price
    }
}
