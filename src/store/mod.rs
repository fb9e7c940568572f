//! Credential store
//!
//! Owns the two persisted regions and keeps them in sync with storage:
//! - Integrity-checked `load()` / `save()` / `clear()`
//! - Typed accessors and setters
//! - The in-progress credential transfer session, handed out as a
//!   [`CredentialFiller`]
//!
//! A checksum mismatch on load is not an error: it is how an empty or
//! corrupted record is detected, and results in a cleared store.

/// Persisted layout
pub mod layout;

/// In-memory record types
pub mod record;

use embedded_storage::Storage;

use self::layout::{region_checksum, CHECKSUM_OFFSET, IDENTITY_LEN, IDENTITY_OFFSET, RECORD_LEN};
use self::record::{CredentialRecord, DeviceIdentity, Field, SecurityMode};
use crate::config::ProvisioningConfig;
use crate::error::StoreError;
use crate::filler::{CredentialFiller, FillerSession, FillerState};

pub use self::record::{DEVICE_TOKEN_MAX, NETWORK_NAME_MAX, NETWORK_PASSWORD_MAX};

/// Wi-Fi credentials and device token backed by non-volatile storage
pub struct CredentialStore<S> {
    storage: S,
    pub(crate) config: ProvisioningConfig,
    pub(crate) record: CredentialRecord,
    pub(crate) identity: DeviceIdentity,
    pub(crate) session: FillerSession,
}

impl<S: Storage> CredentialStore<S> {
    /// Create a store over `storage`
    ///
    /// The in-memory record starts cleared; call [`load`](Self::load) to
    /// read what is persisted.
    pub fn new(storage: S, config: ProvisioningConfig) -> Result<Self, StoreError<S::Error>> {
        config.validate().map_err(StoreError::Config)?;
        if !config.fits(storage.capacity()) {
            return Err(StoreError::OutOfBounds);
        }
        Ok(Self {
            storage,
            config,
            record: CredentialRecord::default(),
            identity: DeviceIdentity::default(),
            session: FillerSession::new(),
        })
    }

    /// Read both regions from storage
    ///
    /// If the CRC region fails its checksum or holds bytes no writer could
    /// have produced, the store is cleared (and the cleared record persisted).
    pub fn load(&mut self) -> Result<(), StoreError<S::Error>> {
        let mut record = [0u8; RECORD_LEN];
        self.storage
            .read(self.record_offset(), &mut record)
            .map_err(StoreError::Storage)?;
        let mut identity = [0u8; IDENTITY_LEN];
        self.storage
            .read(self.identity_offset(), &mut identity)
            .map_err(StoreError::Storage)?;

        let decoded = if region_checksum(&record) == record[CHECKSUM_OFFSET] {
            CredentialRecord::from_bytes(&record)
        } else {
            None
        };

        match decoded {
            Some(decoded) => {
                self.record = decoded;
                self.identity = DeviceIdentity::from_bytes(&identity).unwrap_or_else(|| {
                    warn!("device identity malformed, ignoring");
                    DeviceIdentity::default()
                });
                debug!(
                    "credentials loaded: wifi {}, token {}",
                    self.record.is_set, self.identity.is_set
                );
                Ok(())
            }
            None => {
                warn!("credential record corrupt or empty, clearing");
                self.clear()
            }
        }
    }

    /// Recompute the checksum and write both regions to storage
    pub fn save(&mut self) -> Result<(), StoreError<S::Error>> {
        self.record.checksum = self.record.compute_checksum();
        let record = self.record.to_bytes();
        let identity = self.identity.to_bytes();
        self.storage
            .write(self.record_offset(), &record)
            .map_err(StoreError::Storage)?;
        self.storage
            .write(self.identity_offset(), &identity)
            .map_err(StoreError::Storage)?;
        debug!("credentials saved, crc {=u8:#x}", self.record.checksum);
        Ok(())
    }

    /// Zero both regions, persist them, and restart any session
    pub fn clear(&mut self) -> Result<(), StoreError<S::Error>> {
        self.record.clear();
        self.identity.clear();
        self.reset_session();
        info!("credentials cleared");
        self.save()
    }

    /// Set the network credentials
    ///
    /// Both values are checked before anything is written, so a rejected
    /// call leaves the record untouched.
    pub fn set_network(
        &mut self,
        security: SecurityMode,
        name: &[u8],
        password: &[u8],
    ) -> Result<(), StoreError<S::Error>> {
        if name.len() > NETWORK_NAME_MAX {
            return Err(StoreError::FieldTooLong(Field::NetworkName));
        }
        if password.len() > NETWORK_PASSWORD_MAX {
            return Err(StoreError::FieldTooLong(Field::NetworkPassword));
        }
        self.record.security = security;
        self.record
            .network_name
            .set(name)
            .map_err(|_| StoreError::FieldTooLong(Field::NetworkName))?;
        self.record
            .network_password
            .set(password)
            .map_err(|_| StoreError::FieldTooLong(Field::NetworkPassword))?;
        self.record.is_set = true;
        Ok(())
    }

    /// Set the device token
    pub fn set_device_token(&mut self, token: &[u8]) -> Result<(), StoreError<S::Error>> {
        self.identity
            .device_token
            .set(token)
            .map_err(|_| StoreError::FieldTooLong(Field::DeviceToken))?;
        self.identity.is_set = true;
        Ok(())
    }

    fn record_offset(&self) -> u32 {
        self.config.base_offset
    }

    fn identity_offset(&self) -> u32 {
        // Cannot overflow: `new` checked that the whole record fits
        self.config.base_offset + IDENTITY_OFFSET as u32
    }
}

impl<S> CredentialStore<S> {
    /// Whether both the network credentials and the device token are set
    pub fn is_credentials_valid(&self) -> bool {
        self.record.is_set && self.identity.is_set
    }

    /// Whether the stored checksum matches the in-memory CRC region
    pub fn is_checksum_ok(&self) -> bool {
        self.record.compute_checksum() == self.record.checksum
    }

    /// Wi-Fi security mode
    pub fn security_mode(&self) -> SecurityMode {
        self.record.security
    }

    /// Network name bytes
    pub fn network_name(&self) -> &[u8] {
        self.record.network_name.as_bytes()
    }

    /// Network name, if it is valid UTF-8
    pub fn network_name_str(&self) -> Option<&str> {
        self.record.network_name.as_str()
    }

    /// Network password bytes
    pub fn network_password(&self) -> &[u8] {
        self.record.network_password.as_bytes()
    }

    /// Network password, if it is valid UTF-8
    pub fn network_password_str(&self) -> Option<&str> {
        self.record.network_password.as_str()
    }

    /// Device token bytes
    pub fn device_token(&self) -> &[u8] {
        self.identity.device_token.as_bytes()
    }

    /// Device token, if it is valid UTF-8
    pub fn device_token_str(&self) -> Option<&str> {
        self.identity.device_token.as_str()
    }

    /// CRC-protected region
    pub fn record(&self) -> &CredentialRecord {
        &self.record
    }

    /// Independent region
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Configuration this store was created with
    pub fn config(&self) -> &ProvisioningConfig {
        &self.config
    }

    /// State of the current credential transfer session
    pub fn session_state(&self) -> FillerState {
        self.session.state()
    }

    /// Start a new credential transfer session
    pub fn begin_session(&mut self) -> CredentialFiller<'_, S> {
        self.reset_session();
        CredentialFiller::new(self)
    }

    /// Rewind the session to `Security` without handing out a filler
    pub(crate) fn reset_session(&mut self) {
        self.session.reset();
    }

    /// Resume the current credential transfer session
    pub fn filler(&mut self) -> CredentialFiller<'_, S> {
        CredentialFiller::new(self)
    }

    /// Log a summary of the record
    ///
    /// Secrets are reported by length only.
    pub fn dump(&self) {
        info!("wifi is_set: {}", self.record.is_set);
        info!("key is_set: {}", self.identity.is_set);
        info!("security: {=str}", self.record.security.name());
        info!("ssid: {=[u8]}", self.network_name());
        info!("password: {} bytes", self.network_password().len());
        info!("device_key: {} bytes", self.device_token().len());
        info!("crc8: {=u8:#x}", self.record.checksum);
    }

    /// Mutable access to the underlying storage
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Give back the underlying storage
    pub fn release(self) -> S {
        self.storage
    }
}
