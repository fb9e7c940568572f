use super::symbol::Symbol;
use crate::error::{FillError, ProtocolError};
use crate::store::record::{CredentialRecord, DeviceIdentity, Field, FieldFull, SecurityMode};

/// Position of a credential transfer session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FillerState {
    /// Waiting for the security mode digit
    Security,
    /// Collecting the network name
    Ssid,
    /// Collecting the network password
    Password,
    /// Collecting the device token
    Token,
    /// Collecting the checksum byte; left only through `finish()`
    Checksum,
    /// Session verified
    Done,
    /// Session aborted by the caller
    Failed,
}

impl FillerState {
    /// State entered when a separator arrives in this state
    ///
    /// `Checksum` maps to itself (separators there are ignored); the
    /// terminal states have no successor.
    pub fn after_separator(self) -> Option<FillerState> {
        match self {
            FillerState::Security => Some(FillerState::Ssid),
            FillerState::Ssid => Some(FillerState::Password),
            FillerState::Password => Some(FillerState::Token),
            FillerState::Token => Some(FillerState::Checksum),
            FillerState::Checksum => Some(FillerState::Checksum),
            FillerState::Done | FillerState::Failed => None,
        }
    }

    /// Whether the session is over
    pub fn is_terminal(self) -> bool {
        matches!(self, FillerState::Done | FillerState::Failed)
    }

    /// Field collected in this state, if any
    pub fn field(self) -> Option<Field> {
        match self {
            FillerState::Ssid => Some(Field::NetworkName),
            FillerState::Password => Some(Field::NetworkPassword),
            FillerState::Token => Some(Field::DeviceToken),
            FillerState::Checksum => Some(Field::Checksum),
            _ => None,
        }
    }
}

/// Transient state of one credential transfer session
///
/// Holds the write cursor of the current field and the high nibble of a byte
/// whose low nibble has not arrived yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillerSession {
    state: FillerState,
    cursor: usize,
    high_nibble: Option<u8>,
}

impl Default for FillerSession {
    fn default() -> Self {
        Self::new()
    }
}

impl FillerSession {
    /// Create a session waiting for the security mode
    pub const fn new() -> Self {
        Self {
            state: FillerState::Security,
            cursor: 0,
            high_nibble: None,
        }
    }

    /// Current state
    pub fn state(&self) -> FillerState {
        self.state
    }

    /// Next index to fill in the current field
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether the high nibble of a byte is waiting for its low nibble
    pub fn has_pending_nibble(&self) -> bool {
        self.high_nibble.is_some()
    }

    /// Whether the checksum byte has been received
    pub fn is_complete(&self) -> bool {
        self.state == FillerState::Checksum && self.cursor == 1 && self.high_nibble.is_none()
    }

    /// Return to `Security` with cursor 0
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Move to `Failed`
    pub fn abort(&mut self) {
        self.state = FillerState::Failed;
        self.high_nibble = None;
    }

    /// Feed one symbol into the session
    pub fn accept(
        &mut self,
        raw: u8,
        separator: u8,
        record: &mut CredentialRecord,
        identity: &mut DeviceIdentity,
    ) -> Result<(), FillError> {
        if self.state.is_terminal() {
            return Err(ProtocolError::SessionClosed(self.state).into());
        }

        let nibble = match Symbol::classify(raw, separator) {
            Some(Symbol::Separator) => {
                Self::invalidate(record, identity);
                self.advance(record, identity);
                return Ok(());
            }
            Some(Symbol::Nibble(nibble)) => nibble,
            None => {
                warn!("unexpected symbol: {=u8:#x}", raw);
                return Err(ProtocolError::UnexpectedSymbol(raw).into());
            }
        };

        if self.state == FillerState::Security {
            return match SecurityMode::from_digit(nibble) {
                Some(mode) => {
                    Self::invalidate(record, identity);
                    record.security = mode;
                    Ok(())
                }
                None => {
                    warn!("unexpected security: {=u8:#x}", raw);
                    Err(ProtocolError::UnexpectedSecurity(raw).into())
                }
            };
        }

        Self::invalidate(record, identity);

        // Bytes arrive as two hex digits, most significant nibble first
        let byte = match self.high_nibble.take() {
            None => {
                self.high_nibble = Some(nibble << 4);
                return Ok(());
            }
            Some(high) => high | nibble,
        };

        self.store_byte(byte, record, identity)
    }

    /// Verify the filled record against the received checksum
    ///
    /// Marks both regions as set before computing the checksum, as the
    /// transmitter does. On mismatch both flags are cleared again and the
    /// session stays in `Checksum` until the caller resets or aborts it.
    pub fn finish(
        &mut self,
        record: &mut CredentialRecord,
        identity: &mut DeviceIdentity,
    ) -> Result<(), FillError> {
        if !self.is_complete() {
            warn!("state error: {}", self.state);
            return Err(FillError::IncompleteSession(self.state));
        }

        record.is_set = true;
        identity.is_set = true;

        let expected = record.compute_checksum();
        if expected != record.checksum {
            warn!("crc error: expected {=u8:#x}, received {=u8:#x}", expected, record.checksum);
            record.is_set = false;
            identity.is_set = false;
            return Err(FillError::Checksum {
                expected,
                received: record.checksum,
            });
        }

        self.state = FillerState::Done;
        debug!("credential session verified");
        Ok(())
    }

    /// Drop both `is_set` flags once the session starts rewriting the record
    ///
    /// They are only raised again by a successful `finish()`.
    fn invalidate(record: &mut CredentialRecord, identity: &mut DeviceIdentity) {
        if record.is_set || identity.is_set {
            debug!("credentials invalidated by incoming session");
        }
        record.is_set = false;
        identity.is_set = false;
    }

    fn advance(&mut self, record: &mut CredentialRecord, identity: &mut DeviceIdentity) {
        // The checksum byte is self-delimiting; separators there are noise
        if self.state == FillerState::Checksum {
            trace!("separator ignored while collecting checksum");
            return;
        }

        match self.state {
            FillerState::Ssid => record.network_name.terminate_at(self.cursor),
            FillerState::Password => record.network_password.terminate_at(self.cursor),
            FillerState::Token => identity.device_token.terminate_at(self.cursor),
            _ => {}
        }

        if let Some(next) = self.state.after_separator() {
            trace!("filler {} -> {}", self.state, next);
            self.state = next;
        }
        self.cursor = 0;
        self.high_nibble = None;
    }

    fn store_byte(
        &mut self,
        byte: u8,
        record: &mut CredentialRecord,
        identity: &mut DeviceIdentity,
    ) -> Result<(), FillError> {
        let written = match self.state {
            FillerState::Ssid => record.network_name.write_at(self.cursor, byte),
            FillerState::Password => record.network_password.write_at(self.cursor, byte),
            FillerState::Token => identity.device_token.write_at(self.cursor, byte),
            FillerState::Checksum if self.cursor == 0 => {
                record.checksum = byte;
                Ok(())
            }
            FillerState::Checksum => Err(FieldFull),
            state => return Err(ProtocolError::SessionClosed(state).into()),
        };

        match written {
            Ok(()) => {
                self.cursor += 1;
                Ok(())
            }
            Err(FieldFull) => {
                // `field()` is always Some for the collecting states above
                let field = self.state.field().unwrap_or(Field::Checksum);
                warn!("overflow in {}", field);
                Err(FillError::BufferOverflow(field))
            }
        }
    }
}
