//! Symbol link abstraction
//!
//! The infrared decoder that turns light pulses into symbols lives outside
//! this crate. It is consumed through the [`SymbolSource`] trait, with
//! adapters for:
//! - Any `embedded-hal` serial reader ([`SerialLink`])
//! - A buffered stream held in memory ([`SliceLink`])

/// Link traits
pub mod traits;

/// Link adapters
pub mod adapters;

pub use adapters::{SerialLink, SliceLink};
pub use traits::SymbolSource;
