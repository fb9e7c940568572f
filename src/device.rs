//! High-level provisioning interface
//!
//! This module ties the pieces together for firmware that just wants its
//! credentials: symbols are pulled from a [`SymbolSource`], fed into the
//! current session, and once the checksum byte arrives the session is
//! verified and the record saved. What happens after a failed session is
//! decided by the [`ProvisioningConfig`] the store was created with.

use embedded_storage::Storage;

use crate::{
    config::{ChecksumFailurePolicy, ProvisioningConfig},
    error::{FillError, ProvisionError},
    filler::FillerState,
    link::traits::SymbolSource,
    store::CredentialStore,
};

/// Result of feeding one symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Progress {
    /// Symbol accepted; the session is in the given state
    Pending(FillerState),
    /// Session verified and credentials saved
    Provisioned,
}

/// Provisioning error for a given store and link
pub type Error<S, L> =
    ProvisionError<<S as embedded_storage::ReadStorage>::Error, <L as SymbolSource>::Error>;

/// Credential provisioning device
pub struct Provisioner<S, L> {
    store: CredentialStore<S>,
    link: L,
}

impl<S: Storage, L: SymbolSource> Provisioner<S, L> {
    /// Load the persisted credentials and start a fresh session
    pub fn new(mut store: CredentialStore<S>, link: L) -> Result<Self, Error<S, L>> {
        store.load()?;
        store.reset_session();
        Ok(Self { store, link })
    }

    /// Build the store and provisioner in one go
    pub fn with_config(storage: S, link: L, config: ProvisioningConfig) -> Result<Self, Error<S, L>> {
        let store = CredentialStore::new(storage, config)?;
        Self::new(store, link)
    }

    /// Read and process at most one symbol
    ///
    /// Returns `WouldBlock` when the link has nothing to offer.
    pub fn poll(&mut self) -> nb::Result<Progress, Error<S, L>> {
        let symbol = self
            .link
            .read_symbol()
            .map_err(|error| error.map(ProvisionError::Link))?;
        self.feed(symbol).map_err(nb::Error::Other)
    }

    /// Process one symbol
    ///
    /// Overflows abort the session when `abort_on_overflow` is set, and
    /// checksum failures restart or abandon it per `on_checksum_failure`.
    /// Either way the error is returned.
    pub fn feed(&mut self, symbol: u8) -> Result<Progress, Error<S, L>> {
        let config = *self.store.config();
        let mut filler = self.store.filler();

        match filler.accept(symbol) {
            Ok(()) => {}
            Err(error @ FillError::BufferOverflow(_)) => {
                if config.abort_on_overflow {
                    filler.abort();
                }
                return Err(error.into());
            }
            Err(error) => return Err(error.into()),
        }

        if !filler.is_complete() {
            return Ok(Progress::Pending(filler.state()));
        }

        match filler.finish() {
            Ok(()) => {}
            Err(error @ FillError::Checksum { .. }) => {
                match config.on_checksum_failure {
                    ChecksumFailurePolicy::Restart => filler.reset(),
                    ChecksumFailurePolicy::Abandon => filler.abort(),
                }
                return Err(error.into());
            }
            Err(error) => return Err(error.into()),
        }

        self.store.save()?;
        info!("credentials provisioned");
        Ok(Progress::Provisioned)
    }

    /// Block until a session completes
    ///
    /// Rejected symbols and restarted sessions are logged and skipped; any
    /// other error ends the call.
    pub fn run(&mut self) -> Result<(), Error<S, L>> {
        loop {
            match nb::block!(self.poll()) {
                Ok(Progress::Provisioned) => return Ok(()),
                Ok(Progress::Pending(_)) => {}
                Err(ProvisionError::Fill(error)) if error.is_recoverable() => {
                    debug!("symbol skipped: {}", error);
                }
                Err(ProvisionError::Fill(FillError::Checksum { .. }))
                    if self.store.session_state() == FillerState::Security =>
                {
                    debug!("checksum failed, waiting for retransmission");
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// Start a new session, discarding the current one
    pub fn restart(&mut self) {
        self.store.reset_session();
    }

    /// Whether usable credentials are present
    pub fn is_provisioned(&self) -> bool {
        self.store.is_credentials_valid()
    }

    /// State of the current session
    pub fn state(&self) -> FillerState {
        self.store.session_state()
    }

    /// The credential store
    pub fn store(&self) -> &CredentialStore<S> {
        &self.store
    }

    /// Mutable access to the credential store
    pub fn store_mut(&mut self) -> &mut CredentialStore<S> {
        &mut self.store
    }

    /// Give back the store and the link
    pub fn release(self) -> (CredentialStore<S>, L) {
        (self.store, self.link)
    }
}
