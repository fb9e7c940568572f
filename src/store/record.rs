//! In-memory credential record
//!
//! Two independently flagged regions:
//! - [`CredentialRecord`]: security mode, network name and password, covered
//!   by the integrity checksum
//! - [`DeviceIdentity`]: the device token, validated only by its own flag
//!
//! Every byte field is a [`BoundedField`]: a zero-terminated buffer with one
//! spare byte so the terminator always fits.

/// Maximum network name length in bytes
pub const NETWORK_NAME_MAX: usize = 32;
/// Maximum network password length in bytes
pub const NETWORK_PASSWORD_MAX: usize = 63;
/// Maximum device token length in bytes
pub const DEVICE_TOKEN_MAX: usize = 32;

/// Network name buffer
pub type NetworkName = BoundedField<{ NETWORK_NAME_MAX + 1 }>;
/// Network password buffer
pub type NetworkPassword = BoundedField<{ NETWORK_PASSWORD_MAX + 1 }>;
/// Device token buffer
pub type DeviceToken = BoundedField<{ DEVICE_TOKEN_MAX + 1 }>;

/// Wi-Fi security mode
///
/// The discriminants are the hex digits the transmitter sends and the byte
/// persisted in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SecurityMode {
    /// No security / auto-detect
    #[default]
    None = 0x0,
    /// Open network
    Open = 0x1,
    /// WEP
    Wep = 0x2,
    /// WPA personal
    WpaPsk = 0x4,
    /// WPA2 personal
    Wpa2Psk = 0x8,
}

impl SecurityMode {
    /// Map a single hex digit value (0..=15) to a security mode
    pub fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            0x0 => Some(SecurityMode::None),
            0x1 => Some(SecurityMode::Open),
            0x2 => Some(SecurityMode::Wep),
            0x4 => Some(SecurityMode::WpaPsk),
            0x8 => Some(SecurityMode::Wpa2Psk),
            _ => None,
        }
    }

    /// Decode the persisted byte
    pub fn from_persisted(byte: u8) -> Option<Self> {
        Self::from_digit(byte)
    }

    /// Byte stored in the record
    pub fn as_persisted(self) -> u8 {
        self as u8
    }

    /// Human readable name
    pub fn name(self) -> &'static str {
        match self {
            SecurityMode::None => "none",
            SecurityMode::Open => "open",
            SecurityMode::Wep => "wep",
            SecurityMode::WpaPsk => "wpa-psk",
            SecurityMode::Wpa2Psk => "wpa2-psk",
        }
    }
}

/// Identifies a field of the record, for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    /// Network name (SSID)
    NetworkName,
    /// Network password
    NetworkPassword,
    /// Device token
    DeviceToken,
    /// Received checksum byte
    Checksum,
}

/// A write would land at or past the field's maximum length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldFull;

/// Zero-terminated byte buffer of `CAP` bytes holding at most `CAP - 1` bytes
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BoundedField<const CAP: usize> {
    bytes: [u8; CAP],
}

impl<const CAP: usize> BoundedField<CAP> {
    /// Maximum content length; the last byte is reserved for the terminator
    pub const MAX: usize = CAP - 1;

    /// Create an empty (all zero) field
    pub const fn new() -> Self {
        Self { bytes: [0; CAP] }
    }

    /// Create a field holding `value`
    pub fn from_bytes(value: &[u8]) -> Result<Self, FieldFull> {
        let mut field = Self::new();
        field.set(value)?;
        Ok(field)
    }

    /// Replace the content, zeroing everything after it
    pub fn set(&mut self, value: &[u8]) -> Result<(), FieldFull> {
        if value.len() > Self::MAX {
            return Err(FieldFull);
        }
        self.bytes[..value.len()].copy_from_slice(value);
        self.bytes[value.len()..].fill(0);
        Ok(())
    }

    /// Store `byte` at `index`, refusing the terminator slot and beyond
    pub fn write_at(&mut self, index: usize, byte: u8) -> Result<(), FieldFull> {
        if index >= Self::MAX {
            return Err(FieldFull);
        }
        self.bytes[index] = byte;
        Ok(())
    }

    /// End the content at `index`, zeroing the rest of the buffer
    pub fn terminate_at(&mut self, index: usize) {
        let index = index.min(Self::MAX);
        self.bytes[index..].fill(0);
    }

    /// Content up to (not including) the terminator
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len()]
    }

    /// Content as UTF-8, if it is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(self.as_bytes()).ok()
    }

    /// Content length
    pub fn len(&self) -> usize {
        self.bytes.iter().position(|&b| b == 0).unwrap_or(Self::MAX)
    }

    /// Whether the content is empty
    pub fn is_empty(&self) -> bool {
        self.bytes[0] == 0
    }

    /// The full buffer as persisted
    pub fn raw(&self) -> &[u8; CAP] {
        &self.bytes
    }

    /// Rebuild a field from persisted bytes; `None` if no terminator is present
    pub fn from_raw(bytes: [u8; CAP]) -> Option<Self> {
        if bytes.contains(&0) {
            Some(Self { bytes })
        } else {
            None
        }
    }
}

impl<const CAP: usize> Default for BoundedField<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAP: usize> core::fmt::Debug for BoundedField<CAP> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.as_str() {
            Some(s) => write!(f, "{:?}", s),
            None => write!(f, "{:02x?}", self.as_bytes()),
        }
    }
}

/// CRC-protected part of the persisted record
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CredentialRecord {
    /// Wi-Fi security mode
    pub security: SecurityMode,
    /// Network name (SSID)
    pub network_name: NetworkName,
    /// Network password
    pub network_password: NetworkPassword,
    /// Stored checksum over the rest of this region
    pub checksum: u8,
    /// Set once a verified credential transfer has filled this region
    pub is_set: bool,
}

impl CredentialRecord {
    /// Reset every field to its cleared value
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Part of the persisted record outside the checksum
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceIdentity {
    /// Token the device authenticates with
    pub device_token: DeviceToken,
    /// Set once a token has been written
    pub is_set: bool,
}

impl DeviceIdentity {
    /// Reset every field to its cleared value
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
