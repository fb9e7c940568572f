//! Sending-side stream encoder
//!
//! Builds the symbol stream a transmitter emits so that a device ends up
//! with the given credentials, checksum included.

use heapless::Vec;

use crate::config::check_separator;
use crate::error::EncodeError;
use crate::filler::symbol::nibble_symbol;
use crate::store::record::{
    CredentialRecord, DeviceIdentity, DeviceToken, Field, NetworkName, NetworkPassword,
    SecurityMode, DEVICE_TOKEN_MAX, NETWORK_NAME_MAX, NETWORK_PASSWORD_MAX,
};

/// Longest possible stream: mode, four separators, three full fields and the checksum
pub const MAX_STREAM_LEN: usize =
    1 + 4 + 2 * (NETWORK_NAME_MAX + NETWORK_PASSWORD_MAX + DEVICE_TOKEN_MAX) + 2;

/// Encoded symbol stream
pub type SymbolStream = Vec<u8, MAX_STREAM_LEN>;

/// Checksum a device computes after receiving these credentials
pub fn session_checksum(
    security: SecurityMode,
    name: &[u8],
    password: &[u8],
) -> Result<u8, EncodeError> {
    let record = CredentialRecord {
        security,
        network_name: NetworkName::from_bytes(name).map_err(|_| EncodeError::FieldTooLong(Field::NetworkName))?,
        network_password: NetworkPassword::from_bytes(password)
            .map_err(|_| EncodeError::FieldTooLong(Field::NetworkPassword))?,
        checksum: 0,
        // The device marks the record as set before verifying it
        is_set: true,
    };
    Ok(record.compute_checksum())
}

/// Encode a complete credential transfer
///
/// Fails with the offending field if a value is too long, or if the
/// separator is a hex digit.
pub fn encode_session(
    security: SecurityMode,
    name: &[u8],
    password: &[u8],
    token: &[u8],
    separator: u8,
) -> Result<SymbolStream, EncodeError> {
    check_separator(separator).map_err(EncodeError::Config)?;
    let checksum = session_checksum(security, name, password)?;
    // Validates the token length the same way the device will
    let identity = DeviceIdentity {
        device_token: DeviceToken::from_bytes(token).map_err(|_| EncodeError::FieldTooLong(Field::DeviceToken))?,
        is_set: true,
    };

    // Sized for the longest session, so only the field checks above can fail
    build_stream(
        security,
        [name, password, identity.device_token.as_bytes(), &[checksum]],
        separator,
    )
    .map_err(|_| EncodeError::FieldTooLong(Field::Checksum))
}

fn build_stream(
    security: SecurityMode,
    fields: [&[u8]; 4],
    separator: u8,
) -> Result<SymbolStream, u8> {
    let mut stream = SymbolStream::new();
    stream.push(nibble_symbol(security.as_persisted()))?;
    for field in fields {
        stream.push(separator)?;
        for &byte in field {
            stream.push(nibble_symbol(byte >> 4))?;
            stream.push(nibble_symbol(byte))?;
        }
    }
    Ok(stream)
}
