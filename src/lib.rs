//! Infrared credential provisioning in Rust
//!
//! This crate lets a small network-connected device receive its Wi-Fi
//! credentials and authentication token as a stream of symbols decoded from
//! infrared pulses, and keep them in non-volatile storage.
//!
//! # Features
//! - Symbol-at-a-time decoding of the framed hex stream, with per-field
//!   bounds checks as bytes arrive
//! - CRC-8 verification of the received credentials
//! - Fixed persisted layout that detects corruption before any field is used
//! - Storage through `embedded-storage`, symbols through `embedded-hal` serial
//!   readers or any [`link::SymbolSource`]
//! - Sending-side encoder for transmitters and tests
//! - No allocation, no unsafe code
//!
//! # Example
//! ```no_run
//! use ir_provision::{
//!     config::ProvisioningConfig,
//!     store::CredentialStore,
//! };
//!
//! # fn run<S: embedded_storage::Storage>(flash: S) -> Result<(), ir_provision::error::StoreError<S::Error>> {
//! let mut store = CredentialStore::new(flash, ProvisioningConfig::default())?;
//! store.load()?;
//!
//! if !store.is_credentials_valid() {
//!     let mut filler = store.begin_session();
//!     for &symbol in b"1/6E6574/70617373/746F6B656E/" {
//!         filler.accept(symbol).ok();
//!     }
//!     // ... two checksum digits, then:
//!     if filler.finish().is_ok() {
//!         store.save()?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![no_std]

#[macro_use]
mod fmt;

/// Device configuration
pub mod config;

/// High-level provisioning interface
pub mod device;

/// Sending-side stream encoder
pub mod encoder;

/// Error types
pub mod error;

/// Credential filler state machine
pub mod filler;

/// Record integrity checks
pub mod integrity;

/// Symbol link abstraction
pub mod link;

/// Credential store and persisted layout
pub mod store;

pub use device::Provisioner;
pub use filler::{CredentialFiller, FillerState};
pub use store::CredentialStore;
