//! Error types
//!
//! Every rejected symbol and every failed session step returns a distinct
//! reason so the caller can choose between retrying, restarting the session
//! and giving up.

use core::fmt;

use crate::config::ConfigError;
use crate::filler::FillerState;
use crate::store::record::Field;

/// Malformed or out-of-sequence symbol
///
/// The filler state is unchanged; the caller may retry or abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// Neither a hex digit (`0-9A-F`) nor the separator
    UnexpectedSymbol(u8),
    /// Hex digit that is not one of the five security modes
    UnexpectedSecurity(u8),
    /// Symbol received after the session reached a terminal state
    SessionClosed(FillerState),
}

/// Credential filler errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FillError {
    /// Symbol rejected
    Protocol(ProtocolError),
    /// A reconstructed byte would exceed the field's maximum length
    BufferOverflow(Field),
    /// The received checksum does not match the filled record
    Checksum {
        /// Checksum computed over the filled record
        expected: u8,
        /// Checksum sent by the transmitter
        received: u8,
    },
    /// `finish()` called before the checksum byte was received
    IncompleteSession(FillerState),
}

impl FillError {
    /// Whether the session can continue with the next symbol
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FillError::Protocol(ProtocolError::UnexpectedSymbol(_))
                | FillError::Protocol(ProtocolError::UnexpectedSecurity(_))
        )
    }
}

impl From<ProtocolError> for FillError {
    fn from(error: ProtocolError) -> Self {
        FillError::Protocol(error)
    }
}

/// Credential store errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError<E> {
    /// The storage medium failed
    Storage(E),
    /// The record does not fit in the storage at the configured offset
    OutOfBounds,
    /// A value passed to a setter is longer than its field allows
    FieldTooLong(Field),
    /// The configuration is inconsistent
    Config(ConfigError),
}

/// Stream encoder errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// A value is longer than its field allows
    FieldTooLong(Field),
    /// The separator is a hex digit
    Config(ConfigError),
}

/// Errors of the high-level provisioning loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProvisionError<SE, LE> {
    /// Credential store error
    Store(StoreError<SE>),
    /// Symbol source error
    Link(LE),
    /// Session error
    Fill(FillError),
}

impl<SE, LE> From<StoreError<SE>> for ProvisionError<SE, LE> {
    fn from(error: StoreError<SE>) -> Self {
        ProvisionError::Store(error)
    }
}

impl<SE, LE> From<FillError> for ProvisionError<SE, LE> {
    fn from(error: FillError) -> Self {
        ProvisionError::Fill(error)
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::UnexpectedSymbol(symbol) => {
                write!(f, "unexpected symbol: 0x{:02X}", symbol)
            }
            ProtocolError::UnexpectedSecurity(symbol) => {
                write!(f, "unexpected security: 0x{:02X}", symbol)
            }
            ProtocolError::SessionClosed(state) => {
                write!(f, "session already in terminal state {:?}", state)
            }
        }
    }
}

impl fmt::Display for FillError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillError::Protocol(error) => fmt::Display::fmt(error, f),
            FillError::BufferOverflow(field) => write!(f, "{:?} overflow", field),
            FillError::Checksum { expected, received } => write!(
                f,
                "checksum mismatch: expected 0x{:02X}, received 0x{:02X}",
                expected, received
            ),
            FillError::IncompleteSession(state) => {
                write!(f, "session incomplete in state {:?}", state)
            }
        }
    }
}

impl<E: fmt::Debug> fmt::Display for StoreError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Storage(error) => write!(f, "storage error: {:?}", error),
            StoreError::OutOfBounds => f.write_str("record does not fit in storage"),
            StoreError::FieldTooLong(field) => write!(f, "{:?} too long", field),
            StoreError::Config(error) => write!(f, "invalid configuration: {:?}", error),
        }
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::FieldTooLong(field) => write!(f, "{:?} too long", field),
            EncodeError::Config(error) => write!(f, "invalid configuration: {:?}", error),
        }
    }
}

impl<SE: fmt::Debug, LE: fmt::Debug> fmt::Display for ProvisionError<SE, LE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionError::Store(error) => fmt::Display::fmt(error, f),
            ProvisionError::Link(error) => write!(f, "symbol link error: {:?}", error),
            ProvisionError::Fill(error) => fmt::Display::fmt(error, f),
        }
    }
}
