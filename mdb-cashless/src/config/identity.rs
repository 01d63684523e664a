//! Static reader identity
//!
//! Echoed to the VMC during SETUP / config data negotiation and in the
//! reader-config poll response. Never mutated while the reader runs.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Highest MDB cashless feature level this engine speaks
pub const MAX_FEATURE_LEVEL: u8 = 3;

/// Errors from identity validation and persistence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Feature level outside 1..=3
    InvalidFeatureLevel(u8),
    /// Scale factor of zero makes every price zero
    ZeroScaleFactor,
    /// VMC would time out immediately
    ZeroResponseTime,
    /// Serialized form does not fit in the supplied buffer
    BufferTooSmall,
    /// Stored bytes do not decode
    Corrupted,
}

/// Reader setup data (the SETUP / config data response)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReaderIdentity {
    /// Response identifier, 0x01 ("reader config data")
    pub config_data: u8,
    /// Reader feature level (1-3)
    pub feature_level: u8,
    /// Country/currency code, high byte first
    pub country_code: [u8; 2],
    /// Multiplier applied to all prices on the bus
    pub scale_factor: u8,
    /// Decimal places of the currency
    pub decimal_places: u8,
    /// Longest time the reader may need to answer, in seconds
    pub max_response_time: u8,
    /// Option bits (refunds, multivend, display, cash sale)
    pub misc_options: u8,
}

impl Default for ReaderIdentity {
    fn default() -> Self {
        Self {
            config_data: 0x01,
            feature_level: 0x01,
            country_code: [0x18, 0x10],
            scale_factor: 0x01,
            decimal_places: 0x02,
            max_response_time: 0x05,
            misc_options: 0x00,
        }
    }
}

impl ReaderIdentity {
    /// The 8 identity bytes in wire order
    pub fn to_bytes(&self) -> [u8; 8] {
        [
            self.config_data,
            self.feature_level,
            self.country_code[0],
            self.country_code[1],
            self.scale_factor,
            self.decimal_places,
            self.max_response_time,
            self.misc_options,
        ]
    }

    /// Check the identity is something a VMC can work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feature_level == 0 || self.feature_level > MAX_FEATURE_LEVEL {
            return Err(ConfigError::InvalidFeatureLevel(self.feature_level));
        }
        if self.scale_factor == 0 {
            return Err(ConfigError::ZeroScaleFactor);
        }
        if self.max_response_time == 0 {
            return Err(ConfigError::ZeroResponseTime);
        }
        Ok(())
    }

    /// Serialize for flash storage
    ///
    /// Returns the used prefix of `buf`.
    #[cfg(feature = "serde")]
    pub fn save<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buf).map_err(|_| ConfigError::BufferTooSmall)
    }

    /// Load and validate an identity previously written by [`save`](Self::save)
    #[cfg(feature = "serde")]
    pub fn load(bytes: &[u8]) -> Result<Self, ConfigError> {
        let identity: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
        identity.validate()?;
        Ok(identity)
    }
}

/// Identification returned for EXPANSION / Request ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PeripheralInfo {
    /// Manufacturer code (ASCII)
    pub manufacturer: [u8; 3],
    /// Serial number (ASCII, space padded)
    pub serial: [u8; 12],
    /// Model number (ASCII, space padded)
    pub model: [u8; 12],
    /// Software version (BCD)
    pub software_version: u16,
}

impl Default for PeripheralInfo {
    fn default() -> Self {
        Self {
            manufacturer: *b"OSS",
            serial: *b"000000000001",
            model: *b"CASHLESS-RDR",
            software_version: 0x0100,
        }
    }
}
