//! Device configuration
//!
//! This module contains the knobs a firmware sets when wiring up credential
//! provisioning. It includes:
//! - Where the credential record lives in non-volatile storage
//! - Which symbol separates fields in the inbound stream
//! - How the high-level provisioner reacts to failed sessions

/// Provisioning configuration
pub mod device;

pub use device::{check_separator, ChecksumFailurePolicy, ConfigError, ProvisioningConfig};
