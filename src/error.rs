//! Unified error type for rotary-menu.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.

use crate::settings::SettingKey;

/// Top-level error type used across the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Storage
    /// The durable store failed to read or write a setting.
    Storage(StoreError),

    /// A value does not fit the storage width declared for its setting.
    ValueWidth(SettingKey),

    // UI / Display
    /// The display driver rejected a transfer.
    Display,
}

/// Subset of storage errors we propagate (keeps the enum `Copy`-friendly).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Reading the stored record failed.
    Read,
    /// Programming the record failed.
    Write,
    /// The reserved region has no room left, even after garbage collection.
    Full,
    /// A record was found but could not be decoded.
    Corrupt,
}

// Convenience conversions

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Error::Storage(e)
    }
}
