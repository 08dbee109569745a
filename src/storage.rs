//! Durable settings storage.
//!
//! On target, settings live in the nRF52840's internal flash via the
//! `sequential-storage` crate; on the host (and as the firmware's fallback
//! when flash cannot be opened) they live in a `RamStore`.
//!
//! Storage layout:
//!   - One map entry per `SettingKey`, keyed by its 16-bit storage key.
//!   - Entry payload is the little-endian value at the field's width.
//!   - `sequential-storage` appends new entries and handles wear levelling
//!     and GC within the reserved pages.

use crate::error::{Error, StoreError};
use crate::settings::{SettingKey, SETTING_COUNT};

/// Non-volatile key/value primitive the commit protocol writes through.
///
/// Writes are atomic from the caller's point of view.
pub trait DurableStore {
    /// Stored value for `key`, or `None` if it was never written.
    fn read(&mut self, key: SettingKey) -> Result<Option<i32>, Error>;
    fn write(&mut self, key: SettingKey, value: i32) -> Result<(), Error>;
}

impl<T: DurableStore + ?Sized> DurableStore for &mut T {
    fn read(&mut self, key: SettingKey) -> Result<Option<i32>, Error> {
        T::read(self, key)
    }

    fn write(&mut self, key: SettingKey, value: i32) -> Result<(), Error> {
        T::write(self, key, value)
    }
}

/// In-memory store with write accounting and one-shot fault injection.
#[derive(Clone, Debug)]
pub struct RamStore {
    values: [Option<i32>; SETTING_COUNT],
    writes: u32,
    last_written: Option<SettingKey>,
    fail_next_write: bool,
}

impl RamStore {
    pub const fn new() -> Self {
        Self {
            values: [None; SETTING_COUNT],
            writes: 0,
            last_written: None,
            fail_next_write: false,
        }
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> u32 {
        self.writes
    }

    pub fn last_written(&self) -> Option<SettingKey> {
        self.last_written
    }

    /// Current value without going through the trait.
    pub fn peek(&self, key: SettingKey) -> Option<i32> {
        self.values[key.slot()]
    }

    /// Make the next write fail with `StoreError::Write`.
    pub fn fail_next_write(&mut self) {
        self.fail_next_write = true;
    }
}

impl Default for RamStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DurableStore for RamStore {
    fn read(&mut self, key: SettingKey) -> Result<Option<i32>, Error> {
        Ok(self.values[key.slot()])
    }

    fn write(&mut self, key: SettingKey, value: i32) -> Result<(), Error> {
        if !key.field.width().fits(value) {
            return Err(Error::ValueWidth(key));
        }
        if core::mem::take(&mut self.fail_next_write) {
            return Err(StoreError::Write.into());
        }
        self.values[key.slot()] = Some(value);
        self.writes += 1;
        self.last_written = Some(key);
        Ok(())
    }
}

#[cfg(feature = "embedded")]
pub use flash::FlashStore;

#[cfg(feature = "embedded")]
mod flash {
    use core::ops::Range;

    use embedded_storage_async::nor_flash::MultiwriteNorFlash;
    use sequential_storage::cache::NoCache;

    use super::DurableStore;
    use crate::config::{STORAGE_FLASH_PAGE_COUNT, STORAGE_FLASH_PAGE_START};
    use crate::error::{Error, StoreError};
    use crate::settings::SettingKey;

    /// Flash page size for nRF52840 (4 KB).
    const FLASH_PAGE_SIZE: u32 = 4096;

    /// Start address of our storage region.
    const STORAGE_START: u32 = STORAGE_FLASH_PAGE_START * FLASH_PAGE_SIZE;

    /// End address (exclusive) of our storage region.
    const STORAGE_END: u32 = (STORAGE_FLASH_PAGE_START + STORAGE_FLASH_PAGE_COUNT) * FLASH_PAGE_SIZE;

    /// Scratch space for one map entry (key + 4-byte value + header).
    const ITEM_BUF_SIZE: usize = 32;

    /// Settings map over the reserved flash pages.
    ///
    /// The menu runs in a plain scheduler loop, so each operation is
    /// driven to completion with `block_on`.
    pub struct FlashStore<F> {
        flash: F,
        range: Range<u32>,
    }

    impl<F: MultiwriteNorFlash> FlashStore<F> {
        pub fn new(flash: F) -> Self {
            Self {
                flash,
                range: STORAGE_START..STORAGE_END,
            }
        }
    }

    impl<F: MultiwriteNorFlash> DurableStore for FlashStore<F> {
        fn read(&mut self, key: SettingKey) -> Result<Option<i32>, Error> {
            let mut buf = [0u8; ITEM_BUF_SIZE];
            let fetched = embassy_futures::block_on(sequential_storage::map::fetch_item::<u16, &[u8], _>(
                &mut self.flash,
                self.range.clone(),
                &mut NoCache::new(),
                &mut buf,
                &key.storage_key(),
            ));

            match fetched {
                Ok(Some(data)) => match key.field.width().decode(data) {
                    Some(v) => Ok(Some(v)),
                    None => {
                        warn!("flash entry for {:?} has {} bytes", key, data.len());
                        Err(StoreError::Corrupt.into())
                    }
                },
                Ok(None) => Ok(None),
                Err(e) => {
                    error!("Flash read error: {:?}", defmt::Debug2Format(&e));
                    Err(map_error(e, StoreError::Read).into())
                }
            }
        }

        fn write(&mut self, key: SettingKey, value: i32) -> Result<(), Error> {
            let mut raw = [0u8; 4];
            let item = key
                .field
                .width()
                .encode(value, &mut raw)
                .ok_or(Error::ValueWidth(key))?;
            let mut buf = [0u8; ITEM_BUF_SIZE];

            embassy_futures::block_on(sequential_storage::map::store_item::<u16, &[u8], _>(
                &mut self.flash,
                self.range.clone(),
                &mut NoCache::new(),
                &mut buf,
                &key.storage_key(),
                &item,
            ))
            .map_err(|e| {
                error!("Flash write error: {:?}", defmt::Debug2Format(&e));
                Error::from(map_error(e, StoreError::Write))
            })?;

            debug!("stored {:?} = {}", key, value);
            Ok(())
        }
    }

    fn map_error<E>(e: sequential_storage::Error<E>, fallback: StoreError) -> StoreError {
        match e {
            sequential_storage::Error::FullStorage => StoreError::Full,
            sequential_storage::Error::Corrupted { .. } => StoreError::Corrupt,
            _ => fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Field;

    #[test]
    fn unwritten_key_reads_none() {
        let mut store = RamStore::new();
        assert_eq!(store.read(SettingKey::scalar(Field::AudioMode)), Ok(None));
    }

    #[test]
    fn injected_fault_fails_once() {
        let mut store = RamStore::new();
        let key = SettingKey::scalar(Field::FanOffTemp);
        store.fail_next_write();
        assert_eq!(store.write(key, 30), Err(Error::Storage(StoreError::Write)));
        assert_eq!(store.peek(key), None);
        assert_eq!(store.write(key, 30), Ok(()));
        assert_eq!(store.peek(key), Some(30));
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn value_wider_than_field_is_rejected() {
        let mut store = RamStore::new();
        let key = SettingKey::new(Field::I2cAddress, 2);
        assert_eq!(store.write(key, 300), Err(Error::ValueWidth(key)));
    }

    #[test]
    fn writes_through_mutable_reference() {
        let mut store = RamStore::new();
        let key = SettingKey::new(Field::BpfCrossover, 4);
        {
            let mut by_ref = &mut store;
            DurableStore::write(&mut by_ref, key, 2000).unwrap();
        }
        assert_eq!(store.peek(key), Some(2000));
    }
}
