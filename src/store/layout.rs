//! Persisted record layout
//!
//! Offsets are relative to the configured base offset:
//!
//! ```text
//! +0    CRC region (RECORD_LEN bytes)
//!       security        1 byte
//!       network_name    NETWORK_NAME_MAX + 1 bytes
//!       password        NETWORK_PASSWORD_MAX + 1 bytes
//!       checksum        1 byte
//!       is_set          1 byte
//! +RECORD_LEN  identity region (IDENTITY_LEN bytes)
//!       device_token    DEVICE_TOKEN_MAX + 1 bytes
//!       is_set          1 byte
//! ```
//!
//! The checksum covers every byte of the CRC region except itself.

use super::record::{
    CredentialRecord, DeviceIdentity, DeviceToken, NetworkName, NetworkPassword, SecurityMode,
    DEVICE_TOKEN_MAX, NETWORK_NAME_MAX, NETWORK_PASSWORD_MAX,
};
use crate::integrity::Crc8;

/// Security mode byte
pub const SECURITY_OFFSET: usize = 0;
/// First byte of the network name
pub const NAME_OFFSET: usize = SECURITY_OFFSET + 1;
/// First byte of the network password
pub const PASSWORD_OFFSET: usize = NAME_OFFSET + NETWORK_NAME_MAX + 1;
/// Checksum byte
pub const CHECKSUM_OFFSET: usize = PASSWORD_OFFSET + NETWORK_PASSWORD_MAX + 1;
/// `is_set` byte of the CRC region
pub const RECORD_IS_SET_OFFSET: usize = CHECKSUM_OFFSET + 1;
/// Size of the CRC region
pub const RECORD_LEN: usize = RECORD_IS_SET_OFFSET + 1;

/// First byte of the device token, relative to the identity region
pub const TOKEN_OFFSET: usize = 0;
/// `is_set` byte of the identity region, relative to the identity region
pub const IDENTITY_IS_SET_OFFSET: usize = TOKEN_OFFSET + DEVICE_TOKEN_MAX + 1;
/// Size of the identity region
pub const IDENTITY_LEN: usize = IDENTITY_IS_SET_OFFSET + 1;

/// Offset of the identity region from the base offset
pub const IDENTITY_OFFSET: usize = RECORD_LEN;
/// Bytes of storage taken by both regions
pub const TOTAL_LEN: usize = RECORD_LEN + IDENTITY_LEN;

const _: () = assert!(RECORD_LEN == 100);
const _: () = assert!(IDENTITY_LEN == 34);

fn encode_bool(value: bool) -> u8 {
    value as u8
}

fn decode_bool(byte: u8) -> Option<bool> {
    match byte {
        0 => Some(false),
        1 => Some(true),
        _ => None,
    }
}

/// Checksum of an encoded CRC region, skipping the checksum byte itself
pub fn region_checksum(bytes: &[u8; RECORD_LEN]) -> u8 {
    Crc8::new()
        .update(&bytes[..CHECKSUM_OFFSET])
        .update(&bytes[CHECKSUM_OFFSET + 1..])
        .finish()
}

impl CredentialRecord {
    /// Encode into the persisted layout
    pub fn to_bytes(&self) -> [u8; RECORD_LEN] {
        let mut bytes = [0u8; RECORD_LEN];
        bytes[SECURITY_OFFSET] = self.security.as_persisted();
        bytes[NAME_OFFSET..PASSWORD_OFFSET].copy_from_slice(self.network_name.raw());
        bytes[PASSWORD_OFFSET..CHECKSUM_OFFSET].copy_from_slice(self.network_password.raw());
        bytes[CHECKSUM_OFFSET] = self.checksum;
        bytes[RECORD_IS_SET_OFFSET] = encode_bool(self.is_set);
        bytes
    }

    /// Decode from the persisted layout
    ///
    /// Returns `None` for bytes no writer could have produced: an unknown
    /// security mode, a flag other than 0/1, or a field without terminator.
    /// The checksum is carried over, not verified.
    pub fn from_bytes(bytes: &[u8; RECORD_LEN]) -> Option<Self> {
        let mut name = [0u8; NETWORK_NAME_MAX + 1];
        name.copy_from_slice(&bytes[NAME_OFFSET..PASSWORD_OFFSET]);
        let mut password = [0u8; NETWORK_PASSWORD_MAX + 1];
        password.copy_from_slice(&bytes[PASSWORD_OFFSET..CHECKSUM_OFFSET]);

        Some(Self {
            security: SecurityMode::from_persisted(bytes[SECURITY_OFFSET])?,
            network_name: NetworkName::from_raw(name)?,
            network_password: NetworkPassword::from_raw(password)?,
            checksum: bytes[CHECKSUM_OFFSET],
            is_set: decode_bool(bytes[RECORD_IS_SET_OFFSET])?,
        })
    }

    /// Checksum this region should carry given its current content
    pub fn compute_checksum(&self) -> u8 {
        region_checksum(&self.to_bytes())
    }
}

impl DeviceIdentity {
    /// Encode into the persisted layout
    pub fn to_bytes(&self) -> [u8; IDENTITY_LEN] {
        let mut bytes = [0u8; IDENTITY_LEN];
        bytes[TOKEN_OFFSET..IDENTITY_IS_SET_OFFSET].copy_from_slice(self.device_token.raw());
        bytes[IDENTITY_IS_SET_OFFSET] = encode_bool(self.is_set);
        bytes
    }

    /// Decode from the persisted layout; `None` if the bytes are malformed
    pub fn from_bytes(bytes: &[u8; IDENTITY_LEN]) -> Option<Self> {
        let mut token = [0u8; DEVICE_TOKEN_MAX + 1];
        token.copy_from_slice(&bytes[TOKEN_OFFSET..IDENTITY_IS_SET_OFFSET]);

        Some(Self {
            device_token: DeviceToken::from_raw(token)?,
            is_set: decode_bool(bytes[IDENTITY_IS_SET_OFFSET])?,
        })
    }
}
