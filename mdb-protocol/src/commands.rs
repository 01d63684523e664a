//! Command and subcommand codes sent by the VMC to cashless device #1

// Top-level command codes (address 0x10, cashless device #1)
const CMD_RESET: u8 = 0x10;
const CMD_SETUP: u8 = 0x11;
const CMD_POLL: u8 = 0x12;
const CMD_VEND: u8 = 0x13;
const CMD_READER: u8 = 0x14;
const CMD_EXPANSION: u8 = 0x17;

/// Top-level commands addressed to the reader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Return to power-up state
    Reset,
    /// Configuration and price negotiation
    Setup,
    /// Ask the reader for its next pending event
    Poll,
    /// Purchase session traffic
    Vend,
    /// Enable, disable or cancel the reader
    Reader,
    /// Level 2+ extensions (peripheral identification)
    Expansion,
}

impl Command {
    /// Parse a command from its wire byte (mode bit already stripped)
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            CMD_RESET => Some(Command::Reset),
            CMD_SETUP => Some(Command::Setup),
            CMD_POLL => Some(Command::Poll),
            CMD_VEND => Some(Command::Vend),
            CMD_READER => Some(Command::Reader),
            CMD_EXPANSION => Some(Command::Expansion),
            _ => None,
        }
    }

    /// Convert to wire byte
    pub fn to_byte(self) -> u8 {
        match self {
            Command::Reset => CMD_RESET,
            Command::Setup => CMD_SETUP,
            Command::Poll => CMD_POLL,
            Command::Vend => CMD_VEND,
            Command::Reader => CMD_READER,
            Command::Expansion => CMD_EXPANSION,
        }
    }

    /// Returns true if the frame layout depends on the subcommand byte
    pub fn has_subcommand(&self) -> bool {
        !matches!(self, Command::Reset | Command::Poll)
    }
}

/// SETUP subcommands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SetupSubcommand {
    /// VMC feature level and display geometry
    ConfigData,
    /// Maximum and minimum vend price
    MaxMinPrices,
}

impl SetupSubcommand {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(SetupSubcommand::ConfigData),
            0x01 => Some(SetupSubcommand::MaxMinPrices),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            SetupSubcommand::ConfigData => 0x00,
            SetupSubcommand::MaxMinPrices => 0x01,
        }
    }
}

/// VEND subcommands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VendSubcommand {
    /// Customer selected an item; price and item number follow
    Request,
    /// VMC withdraws an outstanding vend request
    Cancel,
    /// Item was dispensed
    Success,
    /// Item could not be dispensed
    Failure,
    /// VMC is done with the session
    SessionComplete,
    /// Cash purchase reported for audit
    CashSale,
}

impl VendSubcommand {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(VendSubcommand::Request),
            0x01 => Some(VendSubcommand::Cancel),
            0x02 => Some(VendSubcommand::Success),
            0x03 => Some(VendSubcommand::Failure),
            0x04 => Some(VendSubcommand::SessionComplete),
            0x05 => Some(VendSubcommand::CashSale),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            VendSubcommand::Request => 0x00,
            VendSubcommand::Cancel => 0x01,
            VendSubcommand::Success => 0x02,
            VendSubcommand::Failure => 0x03,
            VendSubcommand::SessionComplete => 0x04,
            VendSubcommand::CashSale => 0x05,
        }
    }
}

/// READER subcommands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReaderSubcommand {
    Disable,
    Enable,
    Cancel,
}

impl ReaderSubcommand {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(ReaderSubcommand::Disable),
            0x01 => Some(ReaderSubcommand::Enable),
            0x02 => Some(ReaderSubcommand::Cancel),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            ReaderSubcommand::Disable => 0x00,
            ReaderSubcommand::Enable => 0x01,
            ReaderSubcommand::Cancel => 0x02,
        }
    }
}

/// EXPANSION subcommands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExpansionSubcommand {
    /// VMC identifies itself and asks for the peripheral ID
    RequestId,
}

impl ExpansionSubcommand {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(ExpansionSubcommand::RequestId),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            ExpansionSubcommand::RequestId => 0x00,
        }
    }
}
