//! Credential filler
//!
//! Decodes the inbound symbol stream into the credential record:
//!
//! ```text
//! <security digit> / <name hex> / <password hex> / <token hex> / <checksum hex>
//! ```
//!
//! - The security mode is a single hex digit, one of `0 1 2 4 8`
//! - Every other field is a sequence of bytes, each sent as two hex digits,
//!   most significant nibble first
//! - The checksum is exactly one byte and ends the stream
//!
//! A [`CredentialFiller`] is a view over a [`CredentialStore`] that owns the
//! record for as long as it is alive.

/// Session state machine
pub mod state;

/// Symbol alphabet
pub mod symbol;

pub use state::{FillerSession, FillerState};
pub use symbol::Symbol;

use crate::error::FillError;
use crate::store::CredentialStore;

/// Symbol-driven writer into a [`CredentialStore`]
///
/// Obtained from [`CredentialStore::begin_session`] or
/// [`CredentialStore::filler`].
pub struct CredentialFiller<'a, S> {
    store: &'a mut CredentialStore<S>,
}

impl<'a, S> CredentialFiller<'a, S> {
    pub(crate) fn new(store: &'a mut CredentialStore<S>) -> Self {
        Self { store }
    }

    /// Feed one symbol
    pub fn accept(&mut self, symbol: u8) -> Result<(), FillError> {
        let separator = self.store.config.separator;
        self.store.session.accept(
            symbol,
            separator,
            &mut self.store.record,
            &mut self.store.identity,
        )
    }

    /// Feed a run of symbols, stopping at the first rejected one
    ///
    /// Returns the number of symbols accepted before the error.
    pub fn accept_all(&mut self, symbols: &[u8]) -> Result<(), (usize, FillError)> {
        for (index, &symbol) in symbols.iter().enumerate() {
            self.accept(symbol).map_err(|error| (index, error))?;
        }
        Ok(())
    }

    /// Verify the collected record against the received checksum
    ///
    /// On success the session is `Done` and the record is ready for
    /// [`CredentialStore::save`]. Nothing is persisted here.
    pub fn finish(&mut self) -> Result<(), FillError> {
        self.store
            .session
            .finish(&mut self.store.record, &mut self.store.identity)
    }

    /// Current state
    pub fn state(&self) -> FillerState {
        self.store.session.state()
    }

    /// Next index to fill in the current field
    pub fn cursor(&self) -> usize {
        self.store.session.cursor()
    }

    /// Whether the checksum byte has arrived and `finish()` may be called
    pub fn is_complete(&self) -> bool {
        self.store.session.is_complete()
    }

    /// Restart the session from `Security`
    pub fn reset(&mut self) {
        self.store.session.reset();
    }

    /// Give up on the session; further symbols are rejected until `reset()`
    pub fn abort(&mut self) {
        debug!("credential session aborted in {}", self.store.session.state());
        self.store.session.abort();
    }

    /// The store being filled
    pub fn store(&self) -> &CredentialStore<S> {
        self.store
    }
}
