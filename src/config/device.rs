use crate::store::layout::TOTAL_LEN;

/// Field separator used by the stock transmitter
pub const DEFAULT_SEPARATOR: u8 = b'/';

/// What the provisioner does after a session fails its checksum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChecksumFailurePolicy {
    /// Rewind the filler to `Security` and wait for a retransmission
    Restart,
    /// Park the filler in `Failed` until the caller restarts it
    Abandon,
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The separator would be indistinguishable from field data
    SeparatorIsHexDigit(u8),
    /// The storage is too small to hold the record at the requested offset
    RecordDoesNotFit,
}

/// Provisioning configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisioningConfig {
    /// Storage offset of the CRC region; the identity region follows it
    pub base_offset: u32,
    /// Symbol that closes each field of the inbound stream
    pub separator: u8,
    /// Reaction to a session whose checksum does not match
    pub on_checksum_failure: ChecksumFailurePolicy,
    /// Abort the session when a field overflows
    pub abort_on_overflow: bool,
}

/// Reject separators that could be mistaken for field data
pub fn check_separator(separator: u8) -> Result<(), ConfigError> {
    if separator.is_ascii_hexdigit() {
        return Err(ConfigError::SeparatorIsHexDigit(separator));
    }
    Ok(())
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            base_offset: 0,
            separator: DEFAULT_SEPARATOR,
            on_checksum_failure: ChecksumFailurePolicy::Restart,
            abort_on_overflow: true,
        }
    }
}

impl ProvisioningConfig {
    /// Create a configuration with the record at `base_offset`
    pub fn at_offset(base_offset: u32) -> Self {
        Self {
            base_offset,
            ..Self::default()
        }
    }

    /// Place the record at the start of the last sector of the storage
    pub fn last_sector(capacity: usize, sector_size: u32) -> Result<Self, ConfigError> {
        let capacity = u32::try_from(capacity).map_err(|_| ConfigError::RecordDoesNotFit)?;
        if sector_size < TOTAL_LEN as u32 || capacity < sector_size {
            return Err(ConfigError::RecordDoesNotFit);
        }
        Ok(Self::at_offset(capacity - sector_size))
    }

    /// Use a different field separator
    pub fn with_separator(mut self, separator: u8) -> Result<Self, ConfigError> {
        check_separator(separator)?;
        self.separator = separator;
        Ok(self)
    }

    /// Check a configuration built without the `with_*` methods
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_separator(self.separator)
    }

    /// Set the checksum failure policy
    pub fn with_checksum_policy(mut self, policy: ChecksumFailurePolicy) -> Self {
        self.on_checksum_failure = policy;
        self
    }

    /// Set whether overflowing fields abort the session
    pub fn with_abort_on_overflow(mut self, abort: bool) -> Self {
        self.abort_on_overflow = abort;
        self
    }

    /// Check that the whole record fits into `capacity` bytes of storage
    pub fn fits(&self, capacity: usize) -> bool {
        (self.base_offset as usize)
            .checked_add(TOTAL_LEN)
            .map_or(false, |end| end <= capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProvisioningConfig::default();
        assert_eq!(config.base_offset, 0);
        assert_eq!(config.separator, b'/');
        assert_eq!(config.on_checksum_failure, ChecksumFailurePolicy::Restart);
        assert!(config.abort_on_overflow);
    }

    #[test]
    fn test_hex_separator_rejected() {
        let config = ProvisioningConfig::default();
        assert_eq!(
            config.with_separator(b'A'),
            Err(ConfigError::SeparatorIsHexDigit(b'A'))
        );
        assert_eq!(
            config.with_separator(b'f'),
            Err(ConfigError::SeparatorIsHexDigit(b'f'))
        );
        assert_eq!(config.with_separator(b',').unwrap().separator, b',');
    }

    #[test]
    fn test_struct_literal_validated() {
        let config = ProvisioningConfig {
            separator: b'7',
            ..ProvisioningConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::SeparatorIsHexDigit(b'7')));
        assert_eq!(ProvisioningConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_last_sector_placement() {
        let config = ProvisioningConfig::last_sector(4096 * 4, 4096).unwrap();
        assert_eq!(config.base_offset, 4096 * 3);
        assert!(config.fits(4096 * 4));

        assert_eq!(
            ProvisioningConfig::last_sector(64, 64),
            Err(ConfigError::RecordDoesNotFit)
        );
    }

    #[test]
    fn test_fits() {
        assert!(ProvisioningConfig::at_offset(0).fits(TOTAL_LEN));
        assert!(!ProvisioningConfig::at_offset(1).fits(TOTAL_LEN));
        assert!(!ProvisioningConfig::at_offset(u32::MAX).fits(u32::MAX as usize));
    }
}
